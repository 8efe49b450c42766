//! Single-colour status LED.
//!
//! Lit while a command's pulse train is running, dark otherwise.  On the
//! active-low board the LED sinks current, so it shares the relay
//! [`Polarity`] handling.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

use crate::config::Polarity;

pub struct StatusLed<P> {
    pin: P,
    polarity: Polarity,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P, polarity: Polarity) -> Self {
        Self {
            pin,
            polarity,
            lit: false,
        }
    }

    pub fn set(&mut self, on: bool) {
        let level = if on {
            self.polarity.active_level()
        } else {
            self.polarity.idle_level()
        };
        if self.pin.set_state(PinState::from(level)).is_err() {
            warn!("Status LED write failed");
            return;
        }
        self.lit = on;
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }
}
