//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).  Telemetry is also
//! rendered as one compact JSON line so it can be scraped off the console.

use log::{info, warn};

use crate::app::events::{AppEvent, TelemetryData};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// Telemetry as a single JSON object.
pub fn telemetry_json(t: &TelemetryData) -> Result<String, serde_json::Error> {
    serde_json::to_string(t)
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                let duties = t
                    .duties
                    .iter()
                    .map(|(id, duty)| format!("{}={:.0}%", id.name(), duty))
                    .collect::<Vec<_>>()
                    .join(" ");
                info!(
                    "TELEM | up={}s | {} | tank={:.0}mL @ {} | maint={:?}",
                    t.uptime_secs,
                    duties,
                    t.tank_level_ml,
                    t.tank_frequency_hz
                        .map_or_else(|| "--".to_string(), |hz| format!("{hz}Hz")),
                    t.maintenance,
                );
                match telemetry_json(t) {
                    Ok(json) => info!("TELEM-JSON | {}", json),
                    Err(e) => warn!("TELEM-JSON | encode failed: {}", e),
                }
            }
            AppEvent::Started => {
                info!("START | all actuators at 0%");
            }
            AppEvent::DutyApplied { actuator, percent } => {
                info!("DUTY  | {} -> {:.1}%", actuator.name(), percent);
            }
            AppEvent::CommandRejected(e) => {
                warn!("REJECT | {} (exit code {})", e, e.exit_code());
            }
            AppEvent::MaintenanceStarted { run_cycles } => {
                info!("MAINT | watering pump forced run, {} cycles", run_cycles);
            }
            AppEvent::MaintenanceFinished { restored_duty } => {
                info!("MAINT | done, watering pump back to {:.1}%", restored_duty);
            }
            AppEvent::LevelEndpointDefined { endpoint, level_ml } => {
                info!("CALIB | {:?} level = {:.1} mL", endpoint, level_ml);
            }
            AppEvent::FrequencyEndpointCaptured { endpoint, frequency_hz } => {
                info!("CALIB | {:?} frequency = {} Hz", endpoint, frequency_hz);
            }
        }
    }
}
