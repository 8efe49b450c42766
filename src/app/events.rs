//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::app::commands::ModeCommand;
use crate::fsm::{IgnoreReason, Mode};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries the cold mode).
    Started { mode: Mode },

    /// A persistent mode was selected.
    ModeChanged { from: Mode, to: Mode },

    /// A boost was started or restarted.
    BoostStarted { mode: Mode, expires_at: u64 },

    /// A boost lapsed; the persistent mode is in effect again.
    BoostExpired { from: Mode, reverted_to: Mode },

    /// A valid command was dropped by policy.
    CommandIgnored {
        command: ModeCommand,
        reason: IgnoreReason,
    },
}
