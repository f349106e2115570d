//! Two-point calibrated water level.
//!
//! The operator calibrates each end of the tank in two independent steps:
//! `define_*_level` records the physical level (mL) and `capture_frequency`
//! records the probe frequency measured at that level.  Once both endpoints
//! carry both values, every sampling period recomputes the straight line
//! through them and maps the latest frequency onto it.  The result is not
//! clamped, so a drifting probe can report outside the calibrated span.

use serde::Serialize;

use crate::error::{RangeError, Result};

/// End of the calibration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Endpoint {
    Min,
    Max,
}

/// One calibration endpoint.  Each half is set by a separate operator
/// action; `None` means "not yet set", so 0 mL and 0 Hz are legal values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CalibrationPoint {
    pub level_ml: Option<f32>,
    pub frequency_hz: Option<u32>,
}

impl CalibrationPoint {
    fn complete(&self) -> Option<(f32, f32)> {
        Some((self.frequency_hz? as f32, self.level_ml?))
    }
}

/// `level = slope * frequency + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearMapping {
    pub slope: f32,
    pub intercept: f32,
}

impl LinearMapping {
    /// Line through two `(frequency, level)` points.  `None` when both
    /// frequencies coincide.
    pub fn through(min: (f32, f32), max: (f32, f32)) -> Option<Self> {
        let (f_min, l_min) = min;
        let (f_max, l_max) = max;
        if f_max == f_min {
            return None;
        }
        let slope = (l_max - l_min) / (f_max - f_min);
        let intercept = l_max - slope * f_max;
        Some(Self { slope, intercept })
    }

    pub fn level_at(&self, frequency_hz: u32) -> f32 {
        self.slope * frequency_hz as f32 + self.intercept
    }
}

#[derive(Debug)]
pub struct WaterLevelEstimator {
    range_ml: (f32, f32),
    min: CalibrationPoint,
    max: CalibrationPoint,
    mapping: Option<LinearMapping>,
    last_level: f32,
}

impl WaterLevelEstimator {
    /// `min_ml..=max_ml` is the physical range the probe can cover.
    pub fn new(min_ml: f32, max_ml: f32) -> Self {
        Self {
            range_ml: (min_ml, max_ml),
            min: CalibrationPoint::default(),
            max: CalibrationPoint::default(),
            mapping: None,
            last_level: 0.0,
        }
    }

    /// Record the physical level of an endpoint.
    pub fn define_level(&mut self, endpoint: Endpoint, level_ml: f32) -> Result<()> {
        let (min, max) = self.range_ml;
        if !(min..=max).contains(&level_ml) {
            return Err(RangeError::Level { value: level_ml, min, max }.into());
        }
        self.point_mut(endpoint).level_ml = Some(level_ml);
        Ok(())
    }

    /// Pair an endpoint with the frequency measured right now.
    pub fn capture_frequency(&mut self, endpoint: Endpoint, frequency_hz: u32) {
        self.point_mut(endpoint).frequency_hz = Some(frequency_hz);
    }

    /// Per-period update: rebuild the mapping from the current calibration
    /// and, if it is usable, map `frequency_hz` to a level.
    pub fn recompute(&mut self, frequency_hz: Option<u32>) -> f32 {
        if let (Some(min), Some(max)) = (self.min.complete(), self.max.complete()) {
            self.mapping = LinearMapping::through(min, max);
            if let (Some(mapping), Some(hz)) = (self.mapping, frequency_hz) {
                self.last_level = mapping.level_at(hz);
            }
        }
        self.last_level
    }

    /// Last computed level (mL); 0 until calibrated.
    pub fn level(&self) -> f32 {
        self.last_level
    }

    pub fn mapping(&self) -> Option<LinearMapping> {
        self.mapping
    }

    pub fn point(&self, endpoint: Endpoint) -> CalibrationPoint {
        match endpoint {
            Endpoint::Min => self.min,
            Endpoint::Max => self.max,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.min.complete().is_some() && self.max.complete().is_some()
    }

    fn point_mut(&mut self, endpoint: Endpoint) -> &mut CalibrationPoint {
        match endpoint {
            Endpoint::Min => &mut self.min,
            Endpoint::Max => &mut self.max,
        }
    }
}
