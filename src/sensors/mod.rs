//! Sensor subsystem: the tank-probe frequency meter, the calibrated level
//! estimator and the [`WaterTank`](water_tank::WaterTank) that guards both.

pub mod pulse_meter;
pub mod water_level;
pub mod water_tank;
