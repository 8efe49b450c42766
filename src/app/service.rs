//! Application service: the hexagonal core.
//!
//! [`AppService`] drives the control loop: expire lapsed boosts, take the
//! pending command, apply it to the state machine and run the resulting
//! pulse train.  All I/O flows through port traits injected at call sites,
//! making the entire service testable with mock adapters.
//!
//! ```text
//!  ClockPort ───▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │       AppService       │
//! ActuatorPort ◀──│  expire · take · apply │
//!                 └───────────┬────────────┘
//!                             │ Arc
//!                     SharedController ◀── HTTP ingress
//! ```
//!
//! Within one tick the state machine is updated under its lock, the lock
//! is dropped, and only then are the relays pulsed.  A query arriving
//! mid-train therefore already sees the new mode, and a command submitted
//! mid-train waits in the pending slot for the next tick.

use std::sync::Arc;

use log::{info, warn};

use crate::config::ControllerConfig;
use crate::fsm::{Expiry, Transition};

use super::commands::ModeCommand;
use super::events::AppEvent;
use super::ports::{ActuatorPort, ClockPort, EventSink};
use super::shared::SharedController;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    controller: Arc<SharedController>,
    startup_command: Option<ModeCommand>,
    tick_count: u64,
    commands_applied: u64,
}

impl AppService {
    /// Construct the service around an existing controller handle.
    ///
    /// The controller should have been created with
    /// [`ControllerConfig::mode_policy`].  Does **not** start the service;
    /// call [`start`](Self::start) next.
    pub fn new(config: &ControllerConfig, controller: Arc<SharedController>) -> Self {
        Self {
            controller,
            startup_command: config.startup_command,
            tick_count: 0,
            commands_applied: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the cold state and queue the startup command, if any.
    ///
    /// The startup command goes through the pending slot like any other,
    /// so an ingress submission that lands before the first tick wins.
    pub fn start(&mut self, clock: &impl ClockPort, sink: &mut impl EventSink) {
        let mode = self.controller.effective_mode(clock.now_secs());
        sink.emit(&AppEvent::Started { mode });
        info!("AppService started in {}", mode);

        if let Some(cmd) = self.startup_command {
            if self.controller.has_pending() {
                info!("Startup command '{}' skipped, a command is already pending", cmd);
            } else {
                self.controller.submit_command(cmd);
                info!("Startup command '{}' queued", cmd);
            }
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: expire → take pending → apply → pulse.
    ///
    /// Returns the transition produced by the pending command, if there
    /// was one.
    pub fn tick(
        &mut self,
        hw: &mut impl ActuatorPort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> Option<Transition> {
        self.tick_count += 1;
        let now = clock.now_secs();

        // 1. Boost expiry (never pulses)
        if let Some(Expiry { boost, reverted_to }) =
            self.controller.with_machine(|m| m.expire(now))
        {
            sink.emit(&AppEvent::BoostExpired {
                from: boost.mode,
                reverted_to,
            });
        }

        // 2. Take the pending command
        let command = self.controller.take_pending()?;

        // 3. Update state under the lock, released before any pulse
        let transition = self.controller.with_machine(|m| m.apply(command, now));
        self.emit_transition(&transition, sink);

        // 4. Drive the relays.  The busy indicator brackets every consumed
        //    command, ignored ones included.
        hw.set_busy(true);
        if let Some(actuation) = transition.actuation() {
            hw.run(&actuation);
            self.commands_applied += 1;
        }
        hw.set_busy(false);

        Some(transition)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn controller(&self) -> &Arc<SharedController> {
        &self.controller
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Commands that produced a pulse train since startup.
    pub fn commands_applied(&self) -> u64 {
        self.commands_applied
    }

    // ── Internal ──────────────────────────────────────────────

    fn emit_transition(&self, transition: &Transition, sink: &mut impl EventSink) {
        match *transition {
            Transition::Persistent { from, to, .. } => {
                sink.emit(&AppEvent::ModeChanged { from, to });
            }
            Transition::Boost { boost, .. } => {
                sink.emit(&AppEvent::BoostStarted {
                    mode: boost.mode,
                    expires_at: boost.expires_at,
                });
            }
            Transition::Ignored { command, reason } => {
                warn!("Command '{}' ignored: {}", command, reason.describe());
                sink.emit(&AppEvent::CommandIgnored { command, reason });
            }
        }
    }
}
