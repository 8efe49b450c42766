//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one line per application event to
//! the ESP-IDF logger (UART in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { mode } => {
                info!("START | mode={}", mode);
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {} -> {}", from, to);
            }
            AppEvent::BoostStarted { mode, expires_at } => {
                info!("BOOST | {} until t={}s", mode, expires_at);
            }
            AppEvent::BoostExpired { from, reverted_to } => {
                info!("BOOST | {} lapsed -> {}", from, reverted_to);
            }
            AppEvent::CommandIgnored { command, reason } => {
                warn!("IGNORED | {} ({})", command, reason.describe());
            }
        }
    }
}
