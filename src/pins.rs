//! GPIO assignments for the supported controller boards.
//!
//! Single source of truth for the profile defaults in [`crate::config`].
//! A stored configuration may override any of these at runtime.

// ---------------------------------------------------------------------------
// Active-low relay board (the first VMC box)
// ---------------------------------------------------------------------------

/// Relay 4 on the board: "default" input of the unit's controller.
pub const ACTIVE_LOW_DEFAULT_GPIO: i32 = 12;
/// Relay 5: automatic (humidity-driven) mode.
pub const ACTIVE_LOW_AUTO_GPIO: i32 = 5;
/// Relay 1: low speed.
pub const ACTIVE_LOW_LOW_GPIO: i32 = 2;
/// Relay 2: medium speed.
pub const ACTIVE_LOW_MEDIUM_GPIO: i32 = 15;
/// Relay 3: high speed.
pub const ACTIVE_LOW_HIGH_GPIO: i32 = 4;
/// Relay 6: shared boost input, pulsed 1–3 times.
pub const ACTIVE_LOW_MAX_GPIO: i32 = 14;
/// On-board LED, lit (LOW) while a command is being sent.
pub const ACTIVE_LOW_STATUS_LED_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// Active-high relay board
// ---------------------------------------------------------------------------

pub const ACTIVE_HIGH_DEFAULT_GPIO: i32 = 25;
pub const ACTIVE_HIGH_AUTO_GPIO: i32 = 26;
pub const ACTIVE_HIGH_LOW_GPIO: i32 = 27;
pub const ACTIVE_HIGH_MEDIUM_GPIO: i32 = 32;
pub const ACTIVE_HIGH_HIGH_GPIO: i32 = 33;
pub const ACTIVE_HIGH_MAX_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Output capability (classic ESP32)
// ---------------------------------------------------------------------------

/// Whether `gpio` can drive a relay or LED.
///
/// GPIO 6–11 are wired to the SPI flash, 34–39 are input-only, and 20, 24
/// and 28–31 are not bonded out.
pub const fn is_output_capable(gpio: i32) -> bool {
    matches!(gpio, 0..=5 | 12..=19 | 21..=23 | 25..=27 | 32 | 33)
}
