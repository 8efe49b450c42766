//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `hardware`     | ActuatorPort       | Relay bank, status LED   |
//! | `http`         | (ingress)          | EspHttpServer            |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `nvs`          | ConfigPort         | NVS / in-memory store    |
//! | `time`         | ClockPort          | ESP32 system timer       |
//! | `wifi`         | —                  | ESP-IDF WiFi STA         |

pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod nvs;
pub mod time;
pub mod wifi;
