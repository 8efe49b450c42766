//! VMC Controller Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32Time       │
//! │  (ActuatorPort)    (EventSink)    (ConfigPort) (ClockPort)     │
//! │  WifiStation       HttpAdapter ──submit / query──┐             │
//! │                                                  │             │
//! │  ──────────────── Port Trait Boundary ───────────┼───────      │
//! │                                                  ▼             │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  AppService (control loop) ◀── Arc<SharedController>   │    │
//! │  │  expire · take pending · ModeMachine · pulse train     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use log::{error, info, warn};

use vmc::adapters::hardware::HardwareAdapter;
use vmc::adapters::http::HttpAdapter;
use vmc::adapters::log_sink::LogEventSink;
use vmc::adapters::nvs::NvsAdapter;
use vmc::adapters::time::Esp32TimeAdapter;
use vmc::adapters::wifi::WifiStation;
use vmc::app::ports::ClockPort;
use vmc::app::service::AppService;
use vmc::app::shared::SharedController;
use vmc::config::{boot_config, DeploymentProfile};
use vmc::drivers::hw_init::{self, BlockingDelay};
use vmc::drivers::watchdog::Watchdog;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  VMC controller v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config: NVS, seeded from the profile on first boot ─
    let profile = match option_env!("VMC_PROFILE") {
        Some(name) => name.parse().unwrap_or_else(|e| {
            warn!("VMC_PROFILE '{}' rejected ({}), using default profile", name, e);
            DeploymentProfile::default()
        }),
        None => DeploymentProfile::default(),
    };
    info!("Profile: {}", profile);

    let nvs = match NvsAdapter::new() {
        Ok(nvs) => Some(nvs),
        Err(e) => {
            warn!("NVS unavailable ({}), config will not persist", e);
            None
        }
    };
    let config = boot_config(nvs.as_ref(), profile.config());

    // ── 3. Outputs ────────────────────────────────────────────
    let outputs = hw_init::init_outputs(&config)?;
    let mut hw = HardwareAdapter::new(outputs.relays, outputs.status_led, BlockingDelay, &config);

    // ── 4. Shared controller + app service ────────────────────
    let clock = Esp32TimeAdapter::new();
    let controller = Arc::new(SharedController::new(config.mode_policy()));
    let mut log_sink = LogEventSink::new();
    let mut app = AppService::new(&config, Arc::clone(&controller));
    app.start(&clock, &mut log_sink);

    // ── 5. Network ingress ────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;

    let mut wifi = match WifiStation::new(&config.network, peripherals.modem, sysloop) {
        Ok(mut station) => {
            if let Err(e) = station.connect(clock.now_secs()) {
                warn!("WiFi: initial connect request refused ({}), will retry", e);
            }
            Some(station)
        }
        Err(e) => {
            error!("WiFi disabled: {}", e);
            None
        }
    };

    let _http = match HttpAdapter::start(
        config.network.http_port,
        Arc::clone(&controller),
        Esp32TimeAdapter::new(),
    ) {
        Ok(server) => Some(server),
        Err(e) => {
            error!("HTTP server not started: {}", e);
            None
        }
    };

    // ── 6. Watchdog ───────────────────────────────────────────
    // Subscribed only once bring-up is done; nothing in the loop blocks
    // longer than one pulse train.
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        watchdog.feed();
        app.tick(&mut hw, &clock, &mut log_sink);
        if let Some(station) = wifi.as_mut() {
            station.poll(clock.now_secs());
        }
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(config.tick_interval_ms);
    }
}
