//! Hardware adapter: bridges the relay bank to the domain's [`ActuatorPort`].
//!
//! Generic over `embedded-hal` output pins and a blocking delay, so the
//! same pulse timing runs against ESP-IDF GPIOs in production and against
//! recording pins in tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::ActuatorPort;
use crate::config::ControllerConfig;
use crate::drivers::relay::RelayBank;
use crate::drivers::status_led::StatusLed;
use crate::fsm::OutputLine;

pub struct HardwareAdapter<P, D> {
    relays: RelayBank<P>,
    led: Option<StatusLed<P>>,
    delay: D,
    pulse_ms: u32,
    inter_pulse_delay_ms: u32,
}

impl<P: OutputPin, D: DelayNs> HardwareAdapter<P, D> {
    pub fn new(
        relays: RelayBank<P>,
        led: Option<StatusLed<P>>,
        delay: D,
        config: &ControllerConfig,
    ) -> Self {
        Self {
            relays,
            led,
            delay,
            pulse_ms: config.pulse_ms,
            inter_pulse_delay_ms: config.inter_pulse_delay_ms,
        }
    }

    pub fn relays(&self) -> &RelayBank<P> {
        &self.relays
    }

    pub fn led(&self) -> Option<&StatusLed<P>> {
        self.led.as_ref()
    }
}

impl<P: OutputPin, D: DelayNs> ActuatorPort for HardwareAdapter<P, D> {
    fn pulse(&mut self, line: OutputLine) {
        let relay = self.relays.line_mut(line);
        relay.assert();
        self.delay.delay_ms(self.pulse_ms);
        // Released unconditionally, even if the assert failed.
        self.relays.line_mut(line).release();
    }

    fn pause(&mut self) {
        self.delay.delay_ms(self.inter_pulse_delay_ms);
    }

    /// Drives the LED.  Leaving busy also sweeps the bank: a line whose
    /// release failed mid-train is released again before the LED goes dark.
    fn set_busy(&mut self, busy: bool) {
        if !busy && self.relays.any_energised() {
            warn!("Relay left energised after pulse train, releasing all lines");
            self.relays.release_all();
        }
        if let Some(led) = &mut self.led {
            led.set(busy);
        }
    }
}
