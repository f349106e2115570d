//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter           | Implements       | Connects to                  |
//! |-------------------|------------------|------------------------------|
//! | `hardware`        | PwmPort          | ESP32 LEDC                   |
//! |                   | PulseSourcePort  | ESP32 PCNT + esp_timer       |
//! | `log_sink`        | EventSink        | Serial log output            |

pub mod hardware;
pub mod log_sink;
