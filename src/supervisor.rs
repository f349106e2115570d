//! Control supervisor: wires components to their periodic tasks.
//!
//! | Task            | Period | Work                                        |
//! |-----------------|--------|---------------------------------------------|
//! | `water-meter`   | 100 ms | capture window → frequency → mapping → mL   |
//! | `watering-pump` | 50 ms  | maintenance overseer, emits run start/end   |
//!
//! The four climate actuators hold their last duty in hardware and need no
//! periodic work.  Tasks talk to the rest of the system only through the
//! guarded entities they are handed.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, PulseSourcePort, PwmPort};
use crate::app::service::ClimateController;
use crate::config::ControlConfig;
use crate::drivers::watering_pump::{MaintenanceTransition, WateringPumpController};
use crate::scheduler::{PeriodicTask, TaskSpec, spawn_periodic};
use crate::sensors::water_tank::WaterTank;

const TASK_PRIORITY: u8 = 5;
const TASK_STACK_KB: usize = 8;

// ── Tasks ─────────────────────────────────────────────────────

/// Samples the tank probe once per period.
pub struct WaterMeterTask<S: PulseSourcePort> {
    tank: Arc<WaterTank>,
    source: S,
}

impl<S: PulseSourcePort> WaterMeterTask<S> {
    pub fn new(tank: Arc<WaterTank>, source: S) -> Self {
        Self { tank, source }
    }
}

impl<S: PulseSourcePort + 'static> PeriodicTask for WaterMeterTask<S> {
    fn label(&self) -> &'static str {
        "water-meter"
    }

    fn run_period(&mut self) {
        self.tank.sample(&mut self.source);
    }
}

/// Runs the watering-pump maintenance overseer once per period.
pub struct WateringPumpTask<P: PwmPort, E: EventSink> {
    pump: Arc<WateringPumpController<P>>,
    sink: E,
}

impl<P: PwmPort, E: EventSink> WateringPumpTask<P, E> {
    pub fn new(pump: Arc<WateringPumpController<P>>, sink: E) -> Self {
        Self { pump, sink }
    }
}

impl<P: PwmPort + 'static, E: EventSink + Send + 'static> PeriodicTask for WateringPumpTask<P, E> {
    fn label(&self) -> &'static str {
        "watering-pump"
    }

    fn run_period(&mut self) {
        match self.pump.process() {
            Some(MaintenanceTransition::Started { run_cycles }) => {
                self.sink.emit(&AppEvent::MaintenanceStarted { run_cycles });
            }
            Some(MaintenanceTransition::Finished { restored_duty }) => {
                self.sink.emit(&AppEvent::MaintenanceFinished { restored_duty });
            }
            None => {}
        }
    }
}

// ── Supervisor ────────────────────────────────────────────────

/// Handles of the running periodic tasks.  They run for the process
/// lifetime; there is no stop.
pub struct ControlSupervisor {
    water_meter: JoinHandle<()>,
    watering_pump: JoinHandle<()>,
}

impl ControlSupervisor {
    /// Spawn the water-meter and watering-pump tasks.
    pub fn start<P, S, E>(
        controller: &ClimateController<P>,
        pulse_source: S,
        sink: E,
        config: &ControlConfig,
    ) -> Result<Self>
    where
        P: PwmPort + 'static,
        S: PulseSourcePort + 'static,
        E: EventSink + Send + 'static,
    {
        let water_meter = spawn_periodic(
            WaterMeterTask::new(Arc::clone(controller.water_tank()), pulse_source),
            spec(config.water_meter_period_ms),
        )
        .context("spawning water-meter task")?;

        let watering_pump = spawn_periodic(
            WateringPumpTask::new(Arc::clone(controller.watering_pump()), sink),
            spec(config.watering_pump_period_ms),
        )
        .context("spawning watering-pump task")?;

        Ok(Self {
            water_meter,
            watering_pump,
        })
    }

    /// `false` once either task has exited (it can only do so by panicking).
    pub fn is_alive(&self) -> bool {
        !self.water_meter.is_finished() && !self.watering_pump.is_finished()
    }
}

fn spec(period_ms: u32) -> TaskSpec {
    TaskSpec {
        period: Duration::from_millis(u64::from(period_ms)),
        priority: TASK_PRIORITY,
        stack_kb: TASK_STACK_KB,
    }
}
