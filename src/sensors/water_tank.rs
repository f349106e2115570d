//! Water tank: frequency meter and calibrated level behind one lock.
//!
//! ```text
//!   PulseSourcePort ──▶ PulseWindow ──▶ PulseFrequencyMeter ──▶ Hz
//!                                                              │
//!   operator ──▶ define_*_level / calibrate_* ──▶ WaterLevelEstimator ──▶ mL
//! ```
//!
//! The sampling task and the operator share every field here.  All of them
//! sit in a single critical section, so a reader never sees a level
//! computed from half of a calibration update, and the counter and timer
//! are always consumed as a pair.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::info;
use serde::Serialize;

use crate::app::ports::PulseSourcePort;
use crate::config::ControlConfig;
use crate::error::{Error, Result};
use crate::sensors::pulse_meter::{MeterConstants, PulseFrequencyMeter, PulseWindow};
use crate::sensors::water_level::{CalibrationPoint, Endpoint, LinearMapping, WaterLevelEstimator};

/// Consistent copy of the tank state, as printed by `water_tank_get_info`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TankSnapshot {
    pub frequency_hz: Option<u32>,
    pub level_ml: f32,
    pub min: CalibrationPoint,
    pub max: CalibrationPoint,
    pub mapping: Option<LinearMapping>,
    pub samples: u64,
    pub skipped_windows: u64,
}

struct TankState {
    meter: PulseFrequencyMeter,
    estimator: WaterLevelEstimator,
}

pub struct WaterTank {
    state: Mutex<CriticalSectionRawMutex, RefCell<TankState>>,
}

impl WaterTank {
    pub fn new(config: &ControlConfig) -> Self {
        let state = TankState {
            meter: PulseFrequencyMeter::new(MeterConstants::from_config(config)),
            estimator: WaterLevelEstimator::new(config.tank_min_ml, config.tank_max_ml),
        };
        Self {
            state: Mutex::new(RefCell::new(state)),
        }
    }

    /// One sampling period: consume the counting window, refresh the
    /// frequency, then the mapping and level.  Returns the new level.
    pub fn sample(&self, source: &mut impl PulseSourcePort) -> f32 {
        self.state.lock(|cell| {
            let mut s = cell.borrow_mut();
            let window = PulseWindow::capture(source);
            let frequency = s.meter.update(window);
            s.estimator.recompute(frequency)
        })
    }

    /// Last computed level (mL); 0 until both endpoints are calibrated.
    pub fn get_level(&self) -> f32 {
        self.state.lock(|cell| cell.borrow().estimator.level())
    }

    /// Last measured probe frequency, `None` before the first window.
    pub fn get_frequency(&self) -> Option<u32> {
        self.state.lock(|cell| cell.borrow().meter.last_frequency())
    }

    pub fn define_max_level(&self, level_ml: f32) -> Result<()> {
        self.define_level(Endpoint::Max, level_ml)
    }

    pub fn define_min_level(&self, level_ml: f32) -> Result<()> {
        self.define_level(Endpoint::Min, level_ml)
    }

    /// Pair the max endpoint with the current frequency.
    pub fn calibrate_max(&self) -> Result<u32> {
        self.capture(Endpoint::Max)
    }

    /// Pair the min endpoint with the current frequency.
    pub fn calibrate_min(&self) -> Result<u32> {
        self.capture(Endpoint::Min)
    }

    pub fn get_max_freq(&self) -> Option<u32> {
        self.point(Endpoint::Max).frequency_hz
    }

    pub fn get_min_freq(&self) -> Option<u32> {
        self.point(Endpoint::Min).frequency_hz
    }

    pub fn point(&self, endpoint: Endpoint) -> CalibrationPoint {
        self.state.lock(|cell| cell.borrow().estimator.point(endpoint))
    }

    pub fn mapping(&self) -> Option<LinearMapping> {
        self.state.lock(|cell| cell.borrow().estimator.mapping())
    }

    pub fn snapshot(&self) -> TankSnapshot {
        self.state.lock(|cell| {
            let s = cell.borrow();
            TankSnapshot {
                frequency_hz: s.meter.last_frequency(),
                level_ml: s.estimator.level(),
                min: s.estimator.point(Endpoint::Min),
                max: s.estimator.point(Endpoint::Max),
                mapping: s.estimator.mapping(),
                samples: s.meter.samples(),
                skipped_windows: s.meter.skipped_windows(),
            }
        })
    }

    fn define_level(&self, endpoint: Endpoint, level_ml: f32) -> Result<()> {
        self.state
            .lock(|cell| cell.borrow_mut().estimator.define_level(endpoint, level_ml))?;
        info!("water tank: {:?} level set to {:.1} mL", endpoint, level_ml);
        Ok(())
    }

    fn capture(&self, endpoint: Endpoint) -> Result<u32> {
        let hz = self.state.lock(|cell| {
            let mut s = cell.borrow_mut();
            let hz = s.meter.last_frequency().ok_or(Error::NoMeasurement)?;
            s.estimator.capture_frequency(endpoint, hz);
            Ok::<u32, Error>(hz)
        })?;
        info!("water tank: {:?} frequency captured at {} Hz", endpoint, hz);
        Ok(hz)
    }
}
