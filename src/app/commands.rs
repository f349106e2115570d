//! Operator commands accepted by the control core.
//!
//! Every console-reachable operation is one variant here.  Text parsing
//! lives in whatever shell sits in front; the
//! [`ClimateController`](super::service::ClimateController) only sees
//! already-typed commands.

use serde::Serialize;

use crate::drivers::actuator::ActuatorId;
use crate::drivers::watering_pump::MaintenanceState;
use crate::sensors::water_tank::TankSnapshot;

/// Commands that an operator interface can send into the control core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    /// Set an actuator duty cycle (percent).
    SetSpeed { actuator: ActuatorId, percent: f32 },

    /// Read back the duty currently applied to an actuator.
    GetSpeed(ActuatorId),

    /// Drive an actuator to 0% unconditionally.
    Stop(ActuatorId),

    /// Last computed tank level (mL).
    GetLevel,

    /// Last measured probe frequency (Hz).
    GetFrequency,

    /// Frequency, level and calibration in one consistent read.
    GetTankInfo,

    /// Record the physical level of the full-tank endpoint (mL).
    DefineMaxLevel(f32),

    /// Record the physical level of the empty-tank endpoint (mL).
    DefineMinLevel(f32),

    /// Pair the full-tank endpoint with the frequency measured now.
    CalibrateMax,

    /// Pair the empty-tank endpoint with the frequency measured now.
    CalibrateMin,

    GetMaxFreq,
    GetMinFreq,

    /// Watering-pump maintenance state and desired duty.
    GetMaintenance,
}

/// Successful result of a [`ControlCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CommandReply {
    /// Setter accepted, nothing to report.
    Done,
    Speed(f32),
    Level(f32),
    /// `None` before the first valid measurement.
    Frequency(Option<u32>),
    /// `None` while the endpoint has not been captured.
    CalibratedFrequency(Option<u32>),
    TankInfo(TankSnapshot),
    Maintenance {
        state: MaintenanceState,
        desired_duty: f32,
    },
}
