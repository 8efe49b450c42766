//! Controller configuration
//!
//! Everything that differs between deployments: relay pin mapping and
//! polarity, pulse timing, the High-guard policy and the startup command.
//! Resolved once at boot from NVS, falling back to a [`DeploymentProfile`].

use core::fmt;
use core::str::FromStr;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::commands::ModeCommand;
use crate::app::ports::{ConfigError, ConfigPort};
use crate::fsm::{ModePolicy, OutputLine};
use crate::pins;

/// Electrical level that energises a relay (or lights the LED).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    ActiveLow,
    ActiveHigh,
}

impl Polarity {
    /// Pin level (`true` = high) that asserts the output.
    pub const fn active_level(self) -> bool {
        matches!(self, Polarity::ActiveHigh)
    }

    /// Pin level that releases the output.
    pub const fn idle_level(self) -> bool {
        !self.active_level()
    }
}

/// GPIO number for each relay line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePins {
    pub default: i32,
    pub auto: i32,
    pub low: i32,
    pub medium: i32,
    pub high: i32,
    pub max: i32,
}

impl LinePins {
    pub const fn pin(&self, line: OutputLine) -> i32 {
        match line {
            OutputLine::Default => self.default,
            OutputLine::Auto => self.auto,
            OutputLine::Low => self.low,
            OutputLine::Medium => self.medium,
            OutputLine::High => self.high,
            OutputLine::Max => self.max,
        }
    }

    /// Pins in `OutputLine::ALL` order.
    pub fn as_array(&self) -> [i32; OutputLine::COUNT] {
        OutputLine::ALL.map(|line| self.pin(line))
    }
}

/// Station-mode network settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub hostname: heapless::String<32>,
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
    pub http_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hostname: bounded("vmc"),
            ssid: bounded(option_env!("VMC_WIFI_SSID").unwrap_or("")),
            password: bounded(option_env!("VMC_WIFI_PASSWORD").unwrap_or("")),
            http_port: 80,
        }
    }
}

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Relays ---
    pub relay_pins: LinePins,
    pub relay_polarity: Polarity,

    // --- Status LED ---
    /// LED lit while a command is being sent; `None` if the board has none.
    pub status_led_pin: Option<i32>,
    pub status_led_polarity: Polarity,

    // --- Pulse timing ---
    /// How long a relay is held asserted per pulse (milliseconds)
    pub pulse_ms: u32,
    /// Gap between consecutive pulses of one boost train (milliseconds)
    pub inter_pulse_delay_ms: u32,

    // --- Policy ---
    /// Drop boost commands while the persistent mode is High
    pub ignore_boost_while_high: bool,
    /// Command submitted once at startup to put the unit in a known mode
    pub startup_command: Option<ModeCommand>,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub tick_interval_ms: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,

    // --- Network ---
    pub network: NetworkConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        DeploymentProfile::default().config()
    }
}

impl ControllerConfig {
    pub fn mode_policy(&self) -> ModePolicy {
        ModePolicy {
            ignore_boost_while_high: self.ignore_boost_while_high,
        }
    }

    /// Wall time of the longest pulse train (a 3-pulse boost).
    pub fn longest_train_ms(&self) -> u32 {
        let pulses = ModeCommand::Max3.target().pulse_count() as u32;
        self.pulse_ms * pulses + self.inter_pulse_delay_ms * (pulses - 1)
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let relays = self.relay_pins.as_array();
        if relays.iter().any(|p| !pins::is_output_capable(*p)) {
            return Err(ConfigError::ValidationFailed("relay pin cannot drive an output"));
        }
        for (i, a) in relays.iter().enumerate() {
            if relays[i + 1..].contains(a) {
                return Err(ConfigError::ValidationFailed(
                    "relay pins must be distinct",
                ));
            }
        }
        if let Some(led) = self.status_led_pin {
            if !pins::is_output_capable(led) {
                return Err(ConfigError::ValidationFailed("status LED pin cannot drive an output"));
            }
            if relays.contains(&led) {
                return Err(ConfigError::ValidationFailed(
                    "status LED pin collides with a relay pin",
                ));
            }
        }
        if !(50..=5_000).contains(&self.pulse_ms) {
            return Err(ConfigError::ValidationFailed("pulse_ms must be 50–5000"));
        }
        if !(50..=5_000).contains(&self.inter_pulse_delay_ms) {
            return Err(ConfigError::ValidationFailed(
                "inter_pulse_delay_ms must be 50–5000",
            ));
        }
        if !(10..=10_000).contains(&self.tick_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "tick_interval_ms must be 10–10000",
            ));
        }
        if self.watchdog_timeout_ms <= self.longest_train_ms() + self.tick_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_ms must exceed the longest pulse train plus one tick",
            ));
        }
        if self.network.hostname.is_empty() {
            return Err(ConfigError::ValidationFailed("hostname must not be empty"));
        }
        if self.network.http_port == 0 {
            return Err(ConfigError::ValidationFailed("http_port must be non-zero"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Deployment profiles
// ---------------------------------------------------------------------------

/// Known hardware variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentProfile {
    /// Original box: active-low relay board, High guard on, starts in Medium.
    #[default]
    ActiveLowBoard,
    /// Active-high relay board, no guard, mode unknown until commanded.
    ActiveHighBoard,
}

impl DeploymentProfile {
    pub fn config(self) -> ControllerConfig {
        match self {
            Self::ActiveLowBoard => ControllerConfig {
                relay_pins: LinePins {
                    default: pins::ACTIVE_LOW_DEFAULT_GPIO,
                    auto: pins::ACTIVE_LOW_AUTO_GPIO,
                    low: pins::ACTIVE_LOW_LOW_GPIO,
                    medium: pins::ACTIVE_LOW_MEDIUM_GPIO,
                    high: pins::ACTIVE_LOW_HIGH_GPIO,
                    max: pins::ACTIVE_LOW_MAX_GPIO,
                },
                relay_polarity: Polarity::ActiveLow,
                status_led_pin: Some(pins::ACTIVE_LOW_STATUS_LED_GPIO),
                status_led_polarity: Polarity::ActiveLow,
                pulse_ms: 500,
                inter_pulse_delay_ms: 600,
                ignore_boost_while_high: true,
                startup_command: Some(ModeCommand::Medium),
                tick_interval_ms: 100,
                watchdog_timeout_ms: 10_000,
                network: NetworkConfig::default(),
            },
            Self::ActiveHighBoard => ControllerConfig {
                relay_pins: LinePins {
                    default: pins::ACTIVE_HIGH_DEFAULT_GPIO,
                    auto: pins::ACTIVE_HIGH_AUTO_GPIO,
                    low: pins::ACTIVE_HIGH_LOW_GPIO,
                    medium: pins::ACTIVE_HIGH_MEDIUM_GPIO,
                    high: pins::ACTIVE_HIGH_HIGH_GPIO,
                    max: pins::ACTIVE_HIGH_MAX_GPIO,
                },
                relay_polarity: Polarity::ActiveHigh,
                status_led_pin: None,
                status_led_polarity: Polarity::ActiveHigh,
                pulse_ms: 700,
                inter_pulse_delay_ms: 700,
                ignore_boost_while_high: false,
                startup_command: None,
                tick_interval_ms: 100,
                watchdog_timeout_ms: 10_000,
                network: NetworkConfig::default(),
            },
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::ActiveLowBoard => "active-low",
            Self::ActiveHighBoard => "active-high",
        }
    }
}

impl FromStr for DeploymentProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active-low" => Ok(Self::ActiveLowBoard),
            "active-high" => Ok(Self::ActiveHighBoard),
            _ => Err(ConfigError::ValidationFailed("unknown deployment profile")),
        }
    }
}

impl fmt::Display for DeploymentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve the configuration to boot with.
///
/// A stored config wins.  On first boot the profile config is written to
/// the store so later boots read it back; after that the store is the
/// device's source of truth until it is erased.  A missing store or an
/// unusable blob falls back to the profile without touching storage.
pub fn boot_config<S: ConfigPort>(store: Option<&S>, fallback: ControllerConfig) -> ControllerConfig {
    let Some(store) = store else {
        warn!("Config: no persistent store, using profile defaults");
        return fallback;
    };
    match store.load() {
        Ok(cfg) => cfg,
        Err(ConfigError::NotFound) => {
            info!("Config: first boot, seeding store with profile defaults");
            if let Err(e) = store.save(&fallback) {
                warn!("Config: seeding store failed ({})", e);
            }
            fallback
        }
        Err(e) => {
            warn!("Config: stored config rejected ({}), using profile defaults", e);
            fallback
        }
    }
}

/// Copy `s` into a fixed-capacity string, truncating at capacity.
fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
