//! Outbound application events.
//!
//! The [`ClimateController`](super::service::ClimateController) and the
//! periodic tasks emit these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them.

use heapless::Vec;
use serde::Serialize;

use crate::drivers::actuator::ActuatorId;
use crate::drivers::watering_pump::MaintenanceState;
use crate::error::Error;
use crate::sensors::water_level::Endpoint;

/// Structured events emitted by the control core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// All actuators initialised and at 0%.
    Started,

    /// An operator duty request was applied.
    DutyApplied { actuator: ActuatorId, percent: f32 },

    /// An operator command was refused; prior state is untouched.
    CommandRejected(Error),

    MaintenanceStarted { run_cycles: u32 },

    MaintenanceFinished { restored_duty: f32 },

    LevelEndpointDefined { endpoint: Endpoint, level_ml: f32 },

    FrequencyEndpointCaptured { endpoint: Endpoint, frequency_hz: u32 },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryData {
    pub uptime_secs: u64,
    pub duties: Vec<(ActuatorId, f32), 5>,
    pub maintenance: MaintenanceState,
    pub tank_frequency_hz: Option<u32>,
    pub tank_level_ml: f32,
    pub tank_calibrated: bool,
}
