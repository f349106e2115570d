//! Watering pump with anti-seize maintenance runs.
//!
//! A pump left at 0% for too long can seize.  The controller counts idle
//! process periods and, once the maintenance interval elapses, forces a
//! short full-speed run before restoring whatever duty the operator last
//! asked for.
//!
//! ```text
//!            idle_cycles_remaining hits 0 (while at 0%)
//!   ┌──────┐ ─────────────────────────────────────────▶ ┌─────────┐
//!   │ Idle │                                            │ Running │ 100%
//!   └──────┘ ◀───────────────────────────────────────── └─────────┘
//!            run_cycles_remaining hits 0 → desired duty
//!            or non-zero operator command (cancel)
//! ```
//!
//! The maintenance state, counters and desired duty form one unit guarded by
//! a critical section; the periodic task and the command thread both go
//! through it.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{info, warn};
use serde::Serialize;

use crate::app::ports::PwmPort;
use crate::config::ControlConfig;
use crate::drivers::actuator::{ActuatorChannel, ActuatorId, DUTY_MAX, check_duty};
use crate::error::Result;

/// Maintenance state, with the counter that is live in each state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MaintenanceState {
    Idle { idle_cycles_remaining: u32 },
    Running { run_cycles_remaining: u32 },
}

impl MaintenanceState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Reported by [`WateringPumpController::process`] when a period changed state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaintenanceTransition {
    Started { run_cycles: u32 },
    Finished { restored_duty: f32 },
}

/// Interval and run length, in process periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceSchedule {
    pub period_cycles: u32,
    pub run_cycles: u32,
}

impl MaintenanceSchedule {
    pub fn from_config(config: &ControlConfig) -> Self {
        Self {
            period_cycles: config.maintenance_period_cycles(),
            run_cycles: config.maintenance_run_cycles(),
        }
    }
}

#[derive(Debug)]
struct Overseer {
    schedule: MaintenanceSchedule,
    desired_duty: f32,
    state: MaintenanceState,
}

impl Overseer {
    fn idle(&self) -> MaintenanceState {
        MaintenanceState::Idle {
            idle_cycles_remaining: self.schedule.period_cycles,
        }
    }
}

pub struct WateringPumpController<P: PwmPort> {
    channel: ActuatorChannel<P>,
    overseer: Mutex<CriticalSectionRawMutex, RefCell<Overseer>>,
}

impl<P: PwmPort> WateringPumpController<P> {
    pub fn new(pwm: P, config: &ControlConfig) -> Result<Self> {
        let channel = ActuatorChannel::new(ActuatorId::WateringPump, pwm, config.watering_pump_pwm_hz)?;
        Ok(Self::with_channel(channel, MaintenanceSchedule::from_config(config)))
    }

    pub fn with_channel(channel: ActuatorChannel<P>, schedule: MaintenanceSchedule) -> Self {
        let overseer = Overseer {
            schedule,
            desired_duty: channel.get_duty(),
            state: MaintenanceState::Idle {
                idle_cycles_remaining: schedule.period_cycles,
            },
        };
        Self {
            channel,
            overseer: Mutex::new(RefCell::new(overseer)),
        }
    }

    /// Operator request.  Validated first; a rejected value changes nothing.
    ///
    /// While a maintenance run is in progress a 0% request is only recorded
    /// (the forced run keeps going); any non-zero request is applied at once
    /// and ends the run.
    pub fn set_desired_duty(&self, percent: f32) -> Result<()> {
        let percent = check_duty(percent)?;
        self.overseer.lock(|cell| {
            let mut o = cell.borrow_mut();
            o.desired_duty = percent;

            if percent == 0.0 {
                if !o.state.is_running() {
                    self.channel.stop();
                }
                return;
            }

            self.drive(percent);
            if o.state.is_running() {
                info!("watering pump: maintenance run cancelled by operator ({:.1}%)", percent);
            }
            o.state = o.idle();
        });
        Ok(())
    }

    /// Stop the pump now, ending any maintenance run.
    pub fn stop(&self) {
        self.overseer.lock(|cell| {
            let mut o = cell.borrow_mut();
            o.desired_duty = 0.0;
            if o.state.is_running() {
                info!("watering pump: maintenance run cancelled by stop");
                o.state = o.idle();
            }
            self.channel.stop();
        });
    }

    /// One maintenance process period.
    pub fn process(&self) -> Option<MaintenanceTransition> {
        self.overseer.lock(|cell| {
            let mut o = cell.borrow_mut();
            match o.state {
                MaintenanceState::Idle { idle_cycles_remaining } => {
                    if self.channel.get_duty() != 0.0 {
                        o.state = o.idle();
                        return None;
                    }
                    let remaining = idle_cycles_remaining.saturating_sub(1);
                    if remaining > 0 {
                        o.state = MaintenanceState::Idle {
                            idle_cycles_remaining: remaining,
                        };
                        return None;
                    }
                    let run_cycles = o.schedule.run_cycles;
                    o.state = MaintenanceState::Running {
                        run_cycles_remaining: run_cycles,
                    };
                    self.drive(DUTY_MAX);
                    info!("watering pump: maintenance run started ({} cycles)", run_cycles);
                    Some(MaintenanceTransition::Started { run_cycles })
                }
                MaintenanceState::Running { run_cycles_remaining } => {
                    let remaining = run_cycles_remaining.saturating_sub(1);
                    if remaining > 0 {
                        o.state = MaintenanceState::Running {
                            run_cycles_remaining: remaining,
                        };
                        self.drive(DUTY_MAX);
                        return None;
                    }
                    let restored = o.desired_duty;
                    self.drive(restored);
                    o.state = o.idle();
                    info!("watering pump: maintenance run finished, back to {:.1}%", restored);
                    Some(MaintenanceTransition::Finished {
                        restored_duty: restored,
                    })
                }
            }
        })
    }

    /// Duty currently applied to the pump.
    pub fn get_duty(&self) -> f32 {
        self.channel.get_duty()
    }

    /// Duty most recently requested by the operator.
    pub fn desired_duty(&self) -> f32 {
        self.overseer.lock(|cell| cell.borrow().desired_duty)
    }

    pub fn maintenance_state(&self) -> MaintenanceState {
        self.overseer.lock(|cell| cell.borrow().state)
    }

    /// Apply a duty that has already passed `check_duty`.
    fn drive(&self, percent: f32) {
        if let Err(e) = self.channel.set_duty(percent) {
            warn!("watering pump: {}", e);
        }
    }
}
