//! Relay output lines.
//!
//! Each line drives one input of the ventilation unit's controller through
//! a relay.  The boards disagree on polarity, so every write goes through
//! [`Polarity`] rather than a raw level.
//!
//! Pin errors are logged and swallowed: a failed assert must never prevent
//! the matching release.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

use crate::config::Polarity;
use crate::fsm::OutputLine;

pub struct RelayLine<P> {
    pin: P,
    polarity: Polarity,
    line: OutputLine,
    energised: bool,
}

impl<P: OutputPin> RelayLine<P> {
    pub fn new(pin: P, polarity: Polarity, line: OutputLine) -> Self {
        Self {
            pin,
            polarity,
            line,
            energised: false,
        }
    }

    /// Energise the relay.  Returns `false` if the pin write failed.
    pub fn assert(&mut self) -> bool {
        self.drive(true)
    }

    /// De-energise the relay.  Returns `false` if the pin write failed.
    pub fn release(&mut self) -> bool {
        self.drive(false)
    }

    pub fn is_energised(&self) -> bool {
        self.energised
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    fn drive(&mut self, active: bool) -> bool {
        let level = if active {
            self.polarity.active_level()
        } else {
            self.polarity.idle_level()
        };
        match self.pin.set_state(PinState::from(level)) {
            Ok(()) => {
                self.energised = active;
                true
            }
            Err(e) => {
                warn!(
                    "Relay {}: failed to {} ({:?})",
                    self.line.name(),
                    if active { "assert" } else { "release" },
                    embedded_hal::digital::Error::kind(&e)
                );
                false
            }
        }
    }
}

/// One relay per [`OutputLine`], indexed in `OutputLine::ALL` order.
pub struct RelayBank<P> {
    lines: [RelayLine<P>; OutputLine::COUNT],
}

impl<P: OutputPin> RelayBank<P> {
    pub fn new(pins: [P; OutputLine::COUNT], polarity: Polarity) -> Self {
        let [default, auto, low, medium, high, max] = pins;
        Self {
            lines: [
                RelayLine::new(default, polarity, OutputLine::Default),
                RelayLine::new(auto, polarity, OutputLine::Auto),
                RelayLine::new(low, polarity, OutputLine::Low),
                RelayLine::new(medium, polarity, OutputLine::Medium),
                RelayLine::new(high, polarity, OutputLine::High),
                RelayLine::new(max, polarity, OutputLine::Max),
            ],
        }
    }

    pub fn line_mut(&mut self, line: OutputLine) -> &mut RelayLine<P> {
        &mut self.lines[line.index()]
    }

    pub fn pin(&self, line: OutputLine) -> &P {
        self.lines[line.index()].pin()
    }

    /// Drive every line to its idle level.
    pub fn release_all(&mut self) {
        for line in &mut self.lines {
            line.release();
        }
    }

    pub fn any_energised(&self) -> bool {
        self.lines.iter().any(RelayLine::is_energised)
    }
}
