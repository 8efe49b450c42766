//! Controller handle shared between the control loop and ingress.
//!
//! ```text
//!   HTTP task ──submit()──▶ [ pending: Cell<Option<ModeCommand>> ] ──take_pending()──▶ tick
//!   HTTP task ──query────▶ [ machine: RefCell<ModeMachine>      ] ◀──with_machine()── tick
//! ```
//!
//! Both cells sit behind `embassy-sync` blocking mutexes over a
//! critical-section raw mutex.  Critical sections are held only for the
//! few instructions it takes to read or swap a value; the control loop
//! releases the machine before it starts pulsing relays.

use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::debug;
use serde::Serialize;

use crate::fsm::{ControllerState, Mode, ModeMachine, ModePolicy};

use super::commands::{ModeCommand, UnknownCommand};

/// JSON body served on `/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Label of the mode in effect.
    pub mode: &'static str,
    /// Label of the persistent mode underneath any boost.
    pub persistent: &'static str,
    pub boost: Option<&'static str>,
    pub boost_remaining_secs: Option<u64>,
    /// A command is waiting for the next tick.
    pub command_pending: bool,
}

pub struct SharedController {
    pending: Mutex<CriticalSectionRawMutex, Cell<Option<ModeCommand>>>,
    machine: Mutex<CriticalSectionRawMutex, RefCell<ModeMachine>>,
}

impl SharedController {
    pub const fn new(policy: ModePolicy) -> Self {
        Self {
            pending: Mutex::new(Cell::new(None)),
            machine: Mutex::new(RefCell::new(ModeMachine::new(policy))),
        }
    }

    // ── Ingress ───────────────────────────────────────────────

    /// Parse `token` and make it the pending command.
    ///
    /// Returns the command it overwrote, if one was still waiting.
    /// Unknown tokens leave the slot untouched.
    pub fn submit(&self, token: &str) -> Result<Option<ModeCommand>, UnknownCommand> {
        let command = ModeCommand::parse(token)?;
        Ok(self.submit_command(command))
    }

    /// Make `command` the pending command; last write wins.
    pub fn submit_command(&self, command: ModeCommand) -> Option<ModeCommand> {
        let superseded = self.pending.lock(|slot| slot.replace(Some(command)));
        if let Some(old) = superseded {
            debug!("Command '{}' superseded by '{}'", old, command);
        }
        superseded
    }

    /// Label of the mode in effect at `now`.
    pub fn query_mode(&self, now: u64) -> &'static str {
        self.effective_mode(now).label()
    }

    pub fn effective_mode(&self, now: u64) -> Mode {
        self.machine.lock(|m| m.borrow().effective_mode(now))
    }

    /// Snapshot for diagnostics and the status endpoint.
    pub fn status(&self, now: u64) -> StatusReport {
        let state = self.state();
        let live = state.boost().filter(|b| !b.is_lapsed(now));
        StatusReport {
            mode: state.effective_mode(now).label(),
            persistent: state.current_mode().label(),
            boost: live.map(|b| b.mode.label()),
            boost_remaining_secs: live.map(|b| b.remaining_secs(now)),
            command_pending: self.has_pending(),
        }
    }

    // ── Control loop side ─────────────────────────────────────

    /// Remove and return the pending command.
    pub fn take_pending(&self) -> Option<ModeCommand> {
        self.pending.lock(|slot| slot.take())
    }

    pub fn has_pending(&self) -> bool {
        self.pending.lock(|slot| slot.get().is_some())
    }

    /// Copy of the controller state.
    pub fn state(&self) -> ControllerState {
        self.machine.lock(|m| *m.borrow().state())
    }

    /// Run `f` with exclusive access to the state machine.
    ///
    /// `f` must not block: ingress queries wait on the same lock.
    pub fn with_machine<R>(&self, f: impl FnOnce(&mut ModeMachine) -> R) -> R {
        self.machine.lock(|m| f(&mut m.borrow_mut()))
    }
}

impl Default for SharedController {
    fn default() -> Self {
        Self::new(ModePolicy::default())
    }
}
