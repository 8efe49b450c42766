//! WiFi station-mode adapter.
//!
//! Joins the configured access point so the HTTP adapter is reachable,
//! and keeps the link up.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::EspWifi`, driven without
//!   the blocking wrapper.
//! - **all other targets**: a simulated link for host-side tests.
//!
//! ## Never blocks
//!
//! The station runs on the control-loop task, next to the watchdog.
//! [`WifiStation::connect`] only issues the association request;
//! [`WifiStation::poll`] checks whether the interface came up and gives the
//! attempt [`CONNECT_TIMEOUT_SECS`] before abandoning it.
//!
//! ## Reconnection policy
//!
//! After a failed or timed-out attempt, or a dropped link, the adapter
//! waits an exponential backoff (2 s → 4 s → 8 s … capped at 60 s) before
//! retrying.

use core::fmt;
use log::{error, info, warn};

use crate::config::NetworkConfig;

#[cfg(target_os = "espidf")]
use esp_idf_svc::eventloop::EspSystemEventLoop;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::modem::Modem;
#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    InvalidHostname,
    DriverInitFailed,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::InvalidHostname => write!(f, "hostname invalid (letters, digits and '-' only)"),
            Self::DriverInitFailed => write!(f, "WiFi driver init failed"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    /// Association requested; abandoned if the link is not up by `deadline`.
    Connecting { attempt: u32, deadline: u64 },
    Connected,
    /// Waiting for `retry_at` (uptime seconds) before the next attempt.
    Reconnecting { attempt: u32, retry_at: u64 },
}

const INITIAL_BACKOFF_SECS: u32 = 2;
const MAX_BACKOFF_SECS: u32 = 60;
/// How long one association attempt may take, DHCP included.
pub const CONNECT_TIMEOUT_SECS: u64 = 15;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() {
        return Err(ConnectivityError::NoCredentials);
    }
    if ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

fn validate_hostname(hostname: &str) -> Result<(), ConnectivityError> {
    let ok = !hostname.is_empty()
        && !hostname.starts_with('-')
        && hostname.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-');
    if ok {
        Ok(())
    } else {
        Err(ConnectivityError::InvalidHostname)
    }
}

// ───────────────────────────────────────────────────────────────
// Station
// ───────────────────────────────────────────────────────────────

pub struct WifiStation {
    state: WifiState,
    network: NetworkConfig,
    backoff_secs: u32,
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
    /// Accept association requests but never bring the link up.
    #[cfg(not(target_os = "espidf"))]
    sim_stalled: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_failures_left: u32,
}

impl WifiStation {
    /// Bring up the WiFi driver in station mode with `network`'s
    /// credentials.  Does not connect yet.
    #[cfg(target_os = "espidf")]
    pub fn new(
        network: &NetworkConfig,
        modem: Modem,
        sysloop: EspSystemEventLoop,
    ) -> Result<Self, ConnectivityError> {
        Self::validate(network)?;

        let mut wifi =
            EspWifi::new(modem, sysloop, None).map_err(|_| ConnectivityError::DriverInitFailed)?;

        wifi.sta_netif_mut()
            .set_hostname(&network.hostname)
            .map_err(|_| ConnectivityError::InvalidHostname)?;

        let auth_method = if network.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: network
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: network
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        }))
        .map_err(|_| ConnectivityError::DriverInitFailed)?;
        wifi.start().map_err(|_| ConnectivityError::DriverInitFailed)?;

        info!("WiFi: station '{}' ready for SSID '{}'", network.hostname, network.ssid);
        Ok(Self {
            state: WifiState::Disconnected,
            network: network.clone(),
            backoff_secs: INITIAL_BACKOFF_SECS,
            wifi,
        })
    }

    /// Simulated station for host builds.
    #[cfg(not(target_os = "espidf"))]
    pub fn new(network: &NetworkConfig) -> Result<Self, ConnectivityError> {
        Self::validate(network)?;
        info!("WiFi(sim): station '{}' for SSID '{}'", network.hostname, network.ssid);
        Ok(Self {
            state: WifiState::Disconnected,
            network: network.clone(),
            backoff_secs: INITIAL_BACKOFF_SECS,
            sim_link_up: false,
            sim_stalled: false,
            sim_failures_left: 0,
        })
    }

    fn validate(network: &NetworkConfig) -> Result<(), ConnectivityError> {
        validate_ssid(&network.ssid)?;
        validate_password(&network.password)?;
        validate_hostname(&network.hostname)
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.platform_is_connected()
    }

    pub fn backoff_secs(&self) -> u32 {
        self.backoff_secs
    }

    /// Request association and return at once.  [`poll`](Self::poll)
    /// reports the outcome.  If the request itself is refused the station
    /// enters `Reconnecting`.
    pub fn connect(&mut self, now: u64) -> Result<(), ConnectivityError> {
        info!("WiFi: connecting to '{}'", self.network.ssid);
        self.begin_attempt(0, now).inspect_err(|e| {
            error!("WiFi: connection request failed: {}", e);
        })
    }

    /// Supervise the link.  Call once per control tick; never blocks.
    pub fn poll(&mut self, now: u64) {
        match self.state {
            WifiState::Connecting { attempt, deadline } => {
                if self.platform_is_connected() {
                    self.state = WifiState::Connected;
                    self.backoff_secs = INITIAL_BACKOFF_SECS;
                    info!("WiFi: connected as '{}'", self.network.hostname);
                } else if now >= deadline {
                    warn!("WiFi: no link after {}s, giving up on this attempt", CONNECT_TIMEOUT_SECS);
                    self.platform_abort();
                    self.fail_attempt(attempt, now);
                }
            }
            WifiState::Reconnecting { attempt, retry_at } if now >= retry_at => {
                info!("WiFi: reconnect attempt {} (backoff {}s)", attempt + 1, self.backoff_secs);
                // A refused request has already rescheduled itself.
                let _ = self.begin_attempt(attempt + 1, now);
            }
            WifiState::Connected if !self.platform_is_connected() => {
                warn!("WiFi: connection lost, entering reconnect");
                self.schedule_retry(0, now);
            }
            _ => {}
        }
    }

    fn begin_attempt(&mut self, attempt: u32, now: u64) -> Result<(), ConnectivityError> {
        match self.platform_request_connect() {
            Ok(()) => {
                self.state = WifiState::Connecting {
                    attempt,
                    deadline: now + CONNECT_TIMEOUT_SECS,
                };
                Ok(())
            }
            Err(e) => {
                self.fail_attempt(attempt, now);
                Err(e)
            }
        }
    }

    fn fail_attempt(&mut self, attempt: u32, now: u64) {
        if attempt > 0 {
            self.backoff_secs = (self.backoff_secs * 2).min(MAX_BACKOFF_SECS);
        }
        self.schedule_retry(attempt, now);
    }

    fn schedule_retry(&mut self, attempt: u32, now: u64) {
        self.state = WifiState::Reconnecting {
            attempt,
            retry_at: now + u64::from(self.backoff_secs),
        };
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_request_connect(&mut self) -> Result<(), ConnectivityError> {
        self.wifi
            .connect()
            .map_err(|_| ConnectivityError::ConnectionFailed)
    }

    #[cfg(target_os = "espidf")]
    fn platform_abort(&mut self) {
        if let Err(e) = self.wifi.disconnect() {
            warn!("WiFi: disconnect failed: {}", e);
        }
    }

    /// Associated and the station interface has an address.
    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_request_connect(&mut self) -> Result<(), ConnectivityError> {
        if self.sim_failures_left > 0 {
            self.sim_failures_left -= 1;
            warn!("WiFi(sim): simulated association failure");
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.sim_link_up = !self.sim_stalled;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_abort(&mut self) {
        self.sim_link_up = false;
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_link_up
    }

    /// Make association requests succeed without the link ever coming up,
    /// as when the access point is down.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_stall_link(&mut self, stalled: bool) {
        self.sim_stalled = stalled;
    }

    /// Drop the simulated link and fail the next `failures` attempts.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_link(&mut self, failures: u32) {
        self.sim_link_up = false;
        self.sim_failures_left = failures;
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
