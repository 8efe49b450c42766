//! One-shot hardware peripheral initialization.
//!
//! Configures the relay and status LED pins as push-pull outputs using raw
//! ESP-IDF sys calls and hands them back as `embedded-hal` pins.  Called
//! once from `main()` before the control loop starts.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: `gpio_config` / `gpio_set_level`, FreeRTOS delays.
//! On host/test: pin levels are kept in memory and delays sleep the thread.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use log::info;

use crate::config::ControllerConfig;
use crate::drivers::relay::RelayBank;
use crate::drivers::status_led::StatusLed;
use crate::error::{ActuatorError, Result};
use crate::fsm::OutputLine;

// ── Outputs ───────────────────────────────────────────────────

/// Relay bank and optional status LED, idle and ready to pulse.
pub struct Outputs {
    pub relays: RelayBank<GpioOutput>,
    pub status_led: Option<StatusLed<GpioOutput>>,
}

/// Configure every output named in `config` and drive it to its idle level.
pub fn init_outputs(config: &ControllerConfig) -> Result<Outputs> {
    let pins = config.relay_pins;
    let relay_pins = [
        GpioOutput::configure(pins.pin(OutputLine::Default))?,
        GpioOutput::configure(pins.pin(OutputLine::Auto))?,
        GpioOutput::configure(pins.pin(OutputLine::Low))?,
        GpioOutput::configure(pins.pin(OutputLine::Medium))?,
        GpioOutput::configure(pins.pin(OutputLine::High))?,
        GpioOutput::configure(pins.pin(OutputLine::Max))?,
    ];
    let mut relays = RelayBank::new(relay_pins, config.relay_polarity);
    relays.release_all();

    let status_led = match config.status_led_pin {
        Some(pin) => {
            let mut led = StatusLed::new(GpioOutput::configure(pin)?, config.status_led_polarity);
            led.set(false);
            Some(led)
        }
        None => None,
    };

    info!(
        "hw_init: relays on GPIO {:?} ({:?}), status LED {:?}",
        pins.as_array(),
        config.relay_polarity,
        config.status_led_pin
    );
    Ok(Outputs { relays, status_led })
}

// ── GPIO output pin ───────────────────────────────────────────

/// A push-pull output pin addressed by GPIO number.
pub struct GpioOutput {
    pin: i32,
    level: bool,
}

impl GpioOutput {
    /// Configure `pin` as an output.  The level is left untouched until
    /// the first write.
    #[cfg(target_os = "espidf")]
    pub fn configure(pin: i32) -> core::result::Result<Self, ActuatorError> {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: called from the single-threaded init path in main().
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(ActuatorError::GpioConfigFailed(ret));
        }
        Ok(Self { pin, level: false })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn configure(pin: i32) -> core::result::Result<Self, ActuatorError> {
        log::debug!("hw_init(sim): GPIO{} as output", pin);
        Ok(Self { pin, level: false })
    }

    /// Last level written (`true` = high).
    pub fn level(&self) -> bool {
        self.level
    }

    fn write(&mut self, high: bool) -> core::result::Result<(), ActuatorError> {
        gpio_write(self.pin, high)?;
        self.level = high;
        Ok(())
    }
}

impl ErrorType for GpioOutput {
    type Error = ActuatorError;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.write(true)
    }
}

#[cfg(target_os = "espidf")]
fn gpio_write(pin: i32, high: bool) -> core::result::Result<(), ActuatorError> {
    // SAFETY: gpio_set_level writes to a pin configured in
    // GpioOutput::configure(); only the control loop owns it.
    let ret = unsafe { gpio_set_level(pin, u32::from(high)) };
    if ret != ESP_OK as i32 {
        return Err(ActuatorError::GpioWriteFailed(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn gpio_write(_pin: i32, _high: bool) -> core::result::Result<(), ActuatorError> {
    Ok(())
}

// ── Blocking delay ────────────────────────────────────────────

/// Blocking delay for pulse timing.  Yields to FreeRTOS on target so the
/// HTTP task keeps running while a relay is held.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingDelay;

impl DelayNs for BlockingDelay {
    #[cfg(target_os = "espidf")]
    fn delay_ns(&mut self, ns: u32) {
        esp_idf_hal::delay::Ets::delay_us(ns.div_ceil(1_000));
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
