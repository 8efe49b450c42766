//! Controller state shared between the state machine and the mode query.

use super::states::Mode;

/// An active temporary mode and the window it is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boost {
    pub mode: Mode,
    /// Clock reading (seconds) when the boost was accepted.
    pub started_at: u64,
    /// Clock reading (seconds) at which the boost lapses.
    pub expires_at: u64,
}

impl Boost {
    /// Whether the boost has lapsed at `now`.
    ///
    /// The upper bound is closed: `now == expires_at` is lapsed.  A clock
    /// reading earlier than `started_at` means time went backwards; the boost
    /// is treated as lapsed so it can never stick.
    pub fn is_lapsed(&self, now: u64) -> bool {
        now >= self.expires_at || now < self.started_at
    }

    /// Seconds left before the boost lapses (0 once lapsed).
    pub fn remaining_secs(&self, now: u64) -> u64 {
        if self.is_lapsed(now) {
            0
        } else {
            self.expires_at - now
        }
    }
}

/// Persistent mode plus an optional boost overlay.
///
/// The boost's mode and expiry travel together, so one can never be set
/// without the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    current: Mode,
    boost: Option<Boost>,
}

impl ControllerState {
    pub const fn new() -> Self {
        Self {
            current: Mode::Unknown,
            boost: None,
        }
    }

    /// Last persistent mode set (`Unknown` before any).
    pub fn current_mode(&self) -> Mode {
        self.current
    }

    pub fn boost(&self) -> Option<Boost> {
        self.boost
    }

    pub fn temporary_mode(&self) -> Option<Mode> {
        self.boost.map(|b| b.mode)
    }

    pub fn temporary_expiry(&self) -> Option<u64> {
        self.boost.map(|b| b.expires_at)
    }

    /// Mode in effect at `now`: the boost if it has not lapsed, else the
    /// persistent mode.  Does not mutate; a lapsed boost is cleared by
    /// [`ModeMachine::expire`](super::ModeMachine::expire).
    pub fn effective_mode(&self, now: u64) -> Mode {
        match self.boost {
            Some(b) if !b.is_lapsed(now) => b.mode,
            _ => self.current,
        }
    }

    pub(super) fn set_persistent(&mut self, mode: Mode) {
        self.current = mode;
        self.boost = None;
    }

    pub(super) fn set_boost(&mut self, boost: Boost) {
        self.boost = Some(boost);
    }

    pub(super) fn clear_boost(&mut self) -> Option<Boost> {
        self.boost.take()
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new()
    }
}
