//! Climate controller, the hexagonal core.
//!
//! [`ClimateController`] owns every actuator channel, the watering-pump
//! maintenance overseer and the water tank.  It exposes a hardware-agnostic
//! API; PWM writes go through the injected [`PwmPort`] and events leave via
//! an [`EventSink`] passed at the call site.
//!
//! ```text
//!                 ┌────────────────────────────────┐
//!  operator ────▶ │       ClimateController        │ ──▶ EventSink
//!                 │  4 × ActuatorChannel           │
//!   PwmPort  ◀────│  WateringPumpController (Arc)  │
//!                 │  WaterTank (Arc)               │
//!                 └────────────────────────────────┘
//!                          ▲               ▲
//!               watering-pump task   water-meter task
//! ```
//!
//! Every method takes `&self`: shared state sits behind atomics or
//! critical-section mutexes, so the command thread and the periodic tasks
//! never contend for an exclusive borrow.

use std::sync::Arc;

use log::{info, warn};

use crate::config::ControlConfig;
use crate::drivers::actuator::{ActuatorChannel, ActuatorId};
use crate::drivers::watering_pump::WateringPumpController;
use crate::error::Result;
use crate::sensors::water_level::Endpoint;
use crate::sensors::water_tank::WaterTank;

use super::commands::{CommandReply, ControlCommand};
use super::events::{AppEvent, TelemetryData};
use super::ports::{EventSink, PwmPort};

// ───────────────────────────────────────────────────────────────
// ClimateController
// ───────────────────────────────────────────────────────────────

pub struct ClimateController<P: PwmPort> {
    cooling_pump: ActuatorChannel<P>,
    cooling_fan: ActuatorChannel<P>,
    dehumidifier_fan: ActuatorChannel<P>,
    thermoelectric: ActuatorChannel<P>,
    watering_pump: Arc<WateringPumpController<P>>,
    tank: Arc<WaterTank>,
}

impl<P: PwmPort + Clone> ClimateController<P> {
    /// Validate `config`, initialise every PWM output at 0% and build the
    /// water tank.  Any peripheral failure aborts construction.
    pub fn new(pwm: P, config: &ControlConfig) -> Result<Self> {
        config.validate()?;
        let hz = config.climate_pwm_hz;
        let controller = Self {
            cooling_pump: ActuatorChannel::new(ActuatorId::CoolingPump, pwm.clone(), hz)?,
            cooling_fan: ActuatorChannel::new(ActuatorId::CoolingFan, pwm.clone(), hz)?,
            dehumidifier_fan: ActuatorChannel::new(ActuatorId::DehumidifierFan, pwm.clone(), hz)?,
            thermoelectric: ActuatorChannel::new(ActuatorId::Thermoelectric, pwm.clone(), hz)?,
            watering_pump: Arc::new(WateringPumpController::new(pwm, config)?),
            tank: Arc::new(WaterTank::new(config)),
        };
        info!(
            "ClimateController ready: climate PWM {} Hz, watering pump {} Hz",
            hz, config.watering_pump_pwm_hz
        );
        Ok(controller)
    }
}

impl<P: PwmPort> ClimateController<P> {
    /// Announce that the controller is live.
    pub fn start(&self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
    }

    // ── Actuators ─────────────────────────────────────────────

    /// Apply an operator duty.  The watering pump routes through its
    /// maintenance overseer; the others write straight to their channel.
    pub fn set_speed(&self, actuator: ActuatorId, percent: f32) -> Result<()> {
        match self.climate_channel(actuator) {
            Some(channel) => channel.set_duty(percent),
            None => self.watering_pump.set_desired_duty(percent),
        }
    }

    /// Duty currently applied to `actuator`.
    pub fn get_speed(&self, actuator: ActuatorId) -> f32 {
        match self.climate_channel(actuator) {
            Some(channel) => channel.get_duty(),
            None => self.watering_pump.get_duty(),
        }
    }

    pub fn stop(&self, actuator: ActuatorId) {
        match self.climate_channel(actuator) {
            Some(channel) => channel.stop(),
            None => self.watering_pump.stop(),
        }
    }

    pub fn watering_pump(&self) -> &Arc<WateringPumpController<P>> {
        &self.watering_pump
    }

    pub fn water_tank(&self) -> &Arc<WaterTank> {
        &self.tank
    }

    // ── Command handling ──────────────────────────────────────

    /// Execute one operator command.  A rejected command is logged,
    /// emitted as [`AppEvent::CommandRejected`] and returned as the error;
    /// the operator is expected to resend a corrected value.
    pub fn handle_command(&self, cmd: ControlCommand, sink: &mut impl EventSink) -> Result<CommandReply> {
        let result = self.dispatch(cmd, sink);
        if let Err(e) = &result {
            warn!("command {:?} rejected: {}", cmd, e);
            sink.emit(&AppEvent::CommandRejected(*e));
        }
        result
    }

    fn dispatch(&self, cmd: ControlCommand, sink: &mut impl EventSink) -> Result<CommandReply> {
        let reply = match cmd {
            ControlCommand::SetSpeed { actuator, percent } => {
                self.set_speed(actuator, percent)?;
                sink.emit(&AppEvent::DutyApplied {
                    actuator,
                    percent: self.get_speed(actuator),
                });
                CommandReply::Done
            }
            ControlCommand::GetSpeed(actuator) => CommandReply::Speed(self.get_speed(actuator)),
            ControlCommand::Stop(actuator) => {
                self.stop(actuator);
                sink.emit(&AppEvent::DutyApplied { actuator, percent: 0.0 });
                CommandReply::Done
            }
            ControlCommand::GetLevel => CommandReply::Level(self.tank.get_level()),
            ControlCommand::GetFrequency => CommandReply::Frequency(self.tank.get_frequency()),
            ControlCommand::GetTankInfo => CommandReply::TankInfo(self.tank.snapshot()),
            ControlCommand::DefineMaxLevel(level_ml) => {
                self.tank.define_max_level(level_ml)?;
                sink.emit(&AppEvent::LevelEndpointDefined {
                    endpoint: Endpoint::Max,
                    level_ml,
                });
                CommandReply::Done
            }
            ControlCommand::DefineMinLevel(level_ml) => {
                self.tank.define_min_level(level_ml)?;
                sink.emit(&AppEvent::LevelEndpointDefined {
                    endpoint: Endpoint::Min,
                    level_ml,
                });
                CommandReply::Done
            }
            ControlCommand::CalibrateMax => {
                let frequency_hz = self.tank.calibrate_max()?;
                sink.emit(&AppEvent::FrequencyEndpointCaptured {
                    endpoint: Endpoint::Max,
                    frequency_hz,
                });
                CommandReply::Done
            }
            ControlCommand::CalibrateMin => {
                let frequency_hz = self.tank.calibrate_min()?;
                sink.emit(&AppEvent::FrequencyEndpointCaptured {
                    endpoint: Endpoint::Min,
                    frequency_hz,
                });
                CommandReply::Done
            }
            ControlCommand::GetMaxFreq => CommandReply::CalibratedFrequency(self.tank.get_max_freq()),
            ControlCommand::GetMinFreq => CommandReply::CalibratedFrequency(self.tank.get_min_freq()),
            ControlCommand::GetMaintenance => CommandReply::Maintenance {
                state: self.watering_pump.maintenance_state(),
                desired_duty: self.watering_pump.desired_duty(),
            },
        };
        Ok(reply)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot of every actuator and the tank.
    pub fn telemetry(&self, uptime_secs: u64) -> TelemetryData {
        let tank = self.tank.snapshot();
        TelemetryData {
            uptime_secs,
            duties: ActuatorId::ALL
                .iter()
                .map(|&id| (id, self.get_speed(id)))
                .collect(),
            maintenance: self.watering_pump.maintenance_state(),
            tank_frequency_hz: tank.frequency_hz,
            tank_level_ml: tank.level_ml,
            tank_calibrated: tank.mapping.is_some(),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// The four climate actuators; `None` for the watering pump.
    fn climate_channel(&self, actuator: ActuatorId) -> Option<&ActuatorChannel<P>> {
        match actuator {
            ActuatorId::CoolingPump => Some(&self.cooling_pump),
            ActuatorId::CoolingFan => Some(&self.cooling_fan),
            ActuatorId::DehumidifierFan => Some(&self.dehumidifier_fan),
            ActuatorId::Thermoelectric => Some(&self.thermoelectric),
            ActuatorId::WateringPump => None,
        }
    }
}
