//! Ventilation mode state machine.
//!
//! ```text
//!                 persistent cmd P                boost cmd T (D min, R pulses)
//!   ┌──────────────────────────────┐   ┌────────────────────────────────────────┐
//!   │ current := P                 │   │ [guard: current == High → ignored]     │
//!   │ boost   := none              │   │ boost := (T, now, now + D·60)          │
//!   │ pulse line(P) ×1             │   │ pulse Max ×R, gap between pulses       │
//!   └──────────────────────────────┘   │ current unchanged                      │
//!                                      └────────────────────────────────────────┘
//!   every tick: boost.expires_at <= now  →  boost := none   (no pulse)
//! ```
//!
//! The machine is pure: it decides the new state and returns the pulse
//! train to run, but never touches hardware or the clock itself.  The
//! caller supplies `now` (seconds, monotonic) and drives the returned
//! [`Actuation`] through an [`ActuatorPort`](crate::app::ports::ActuatorPort).
//!
//! Reverting from a boost needs no pulse: the persistent relay selection on
//! the unit was never released, the Max line only overlays it.

pub mod context;
pub mod states;

pub use context::{Boost, ControllerState};
pub use states::{Actuation, Mode, OutputLine};

use log::info;

use crate::app::commands::ModeCommand;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Deployment-specific transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModePolicy {
    /// Reject boost commands while the persistent mode is `High`.
    pub ignore_boost_while_high: bool,
}

// ---------------------------------------------------------------------------
// Transition results
// ---------------------------------------------------------------------------

/// Why a valid command produced no transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Boost requested while `High` is the persistent mode and the guard
    /// policy is enabled.
    BoostWhileHigh,
}

impl IgnoreReason {
    pub const fn describe(self) -> &'static str {
        match self {
            Self::BoostWhileHigh => "boost ignored while in High",
        }
    }
}

/// Outcome of applying one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A persistent mode was selected; any boost was cancelled.
    Persistent {
        from: Mode,
        to: Mode,
        actuation: Option<Actuation>,
    },
    /// A boost was started (or restarted) on top of the persistent mode.
    Boost {
        from: Mode,
        boost: Boost,
        actuation: Option<Actuation>,
    },
    /// The command was valid but policy rejected it; state is unchanged.
    Ignored {
        command: ModeCommand,
        reason: IgnoreReason,
    },
}

impl Transition {
    /// Pulse train to run, if the command was accepted.
    pub fn actuation(&self) -> Option<Actuation> {
        match self {
            Self::Persistent { actuation, .. } | Self::Boost { actuation, .. } => *actuation,
            Self::Ignored { .. } => None,
        }
    }
}

/// A boost that lapsed and the persistent mode now back in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    pub boost: Boost,
    pub reverted_to: Mode,
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ModeMachine {
    state: ControllerState,
    policy: ModePolicy,
}

impl ModeMachine {
    pub const fn new(policy: ModePolicy) -> Self {
        Self {
            state: ControllerState::new(),
            policy,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn policy(&self) -> ModePolicy {
        self.policy
    }

    /// Mode in effect at `now`.
    pub fn effective_mode(&self, now: u64) -> Mode {
        self.state.effective_mode(now)
    }

    /// Apply `command` at clock reading `now`.
    ///
    /// State is updated before this returns, so a concurrent query already
    /// reports the new mode while the returned pulse train is still running.
    pub fn apply(&mut self, command: ModeCommand, now: u64) -> Transition {
        let from = self.state.effective_mode(now);
        let target = command.target();
        let actuation = command.actuation();

        match target.boost_secs() {
            None => {
                self.state.set_persistent(target);
                info!("Mode: {} -> {}", from, target);
                Transition::Persistent {
                    from,
                    to: target,
                    actuation,
                }
            }
            Some(secs) => {
                if self.policy.ignore_boost_while_high && self.state.current_mode() == Mode::High {
                    return Transition::Ignored {
                        command,
                        reason: IgnoreReason::BoostWhileHigh,
                    };
                }
                let boost = Boost {
                    mode: target,
                    started_at: now,
                    expires_at: now.saturating_add(secs),
                };
                self.state.set_boost(boost);
                info!(
                    "Mode: {} -> {} (until t={}s, over {})",
                    from,
                    target,
                    boost.expires_at,
                    self.state.current_mode()
                );
                Transition::Boost {
                    from,
                    boost,
                    actuation,
                }
            }
        }
    }

    /// Parse and apply a raw token.  Unknown tokens are a silent no-op.
    pub fn apply_token(&mut self, token: &str, now: u64) -> Option<Transition> {
        let command = ModeCommand::parse(token).ok()?;
        Some(self.apply(command, now))
    }

    /// Clear the boost if it has lapsed at `now`.  Never pulses.
    pub fn expire(&mut self, now: u64) -> Option<Expiry> {
        let boost = self.state.boost()?;
        if !boost.is_lapsed(now) {
            return None;
        }
        self.state.clear_boost();
        let reverted_to = self.state.current_mode();
        info!("Mode: {} lapsed, back to {}", boost.mode, reverted_to);
        Some(Expiry { boost, reverted_to })
    }
}
