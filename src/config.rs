//! Control-core configuration parameters
//!
//! All tunable periods, PWM frequencies and water-meter constants for the
//! Climabox controller.  Invalid values are rejected by [`ControlConfig::validate`],
//! never clamped.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core control configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    // --- Periods ---
    /// Water-meter sampling period (milliseconds)
    pub water_meter_period_ms: u32,
    /// Watering-pump maintenance process period (milliseconds)
    pub watering_pump_period_ms: u32,

    // --- Watering pump maintenance ---
    /// Idle time at 0% before a forced maintenance run (milliseconds)
    pub maintenance_interval_ms: u64,
    /// Length of a forced full-speed run (milliseconds)
    pub maintenance_run_ms: u32,

    // --- PWM ---
    /// Watering pump PWM base frequency (Hz)
    pub watering_pump_pwm_hz: u32,
    /// PWM base frequency for cooling pump, fans and thermoelectric element (Hz)
    pub climate_pwm_hz: u32,

    // --- Water tank ---
    /// Lowest level the tank sensor can physically report (mL)
    pub tank_min_ml: f32,
    /// Highest level the tank sensor can physically report (mL)
    pub tank_max_ml: f32,
    /// Meter constant K: timer ticks in one nominal sampling window
    pub meter_ticks_per_window: u32,
    /// Meter constant C: sampling windows per second
    pub meter_windows_per_second: u32,

    // --- Reporting ---
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            water_meter_period_ms: 100,
            watering_pump_period_ms: 50,

            maintenance_interval_ms: 24 * 60 * 60 * 1000, // once a day
            maintenance_run_ms: 500,

            watering_pump_pwm_hz: 100,
            climate_pwm_hz: 10_000,

            tank_min_ml: 0.0,
            tank_max_ml: 2000.0,
            // esp_timer runs at 1 MHz: a 100 ms window is 100 000 ticks.
            meter_ticks_per_window: 100_000,
            meter_windows_per_second: 10,

            telemetry_interval_secs: 60,
        }
    }
}

impl ControlConfig {
    /// Watering-pump periods spent at 0% before a maintenance run fires.
    pub fn maintenance_period_cycles(&self) -> u32 {
        let cycles = self.maintenance_interval_ms / u64::from(self.watering_pump_period_ms.max(1));
        u32::try_from(cycles).unwrap_or(u32::MAX)
    }

    /// Watering-pump periods a maintenance run lasts.
    pub fn maintenance_run_cycles(&self) -> u32 {
        self.maintenance_run_ms / self.watering_pump_period_ms.max(1)
    }

    /// Reject any configuration the control core cannot run safely.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.water_meter_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("water_meter_period_ms must be > 0"));
        }
        if self.watering_pump_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("watering_pump_period_ms must be > 0"));
        }
        if self.maintenance_run_cycles() == 0 {
            return Err(ConfigError::ValidationFailed(
                "maintenance_run_ms must cover at least one pump period",
            ));
        }
        if u64::from(self.maintenance_run_ms) >= self.maintenance_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "maintenance_run_ms must be shorter than maintenance_interval_ms",
            ));
        }
        if self.watering_pump_pwm_hz == 0 || self.climate_pwm_hz == 0 {
            return Err(ConfigError::ValidationFailed("PWM frequencies must be > 0"));
        }
        if !self.tank_min_ml.is_finite()
            || !self.tank_max_ml.is_finite()
            || self.tank_min_ml >= self.tank_max_ml
        {
            return Err(ConfigError::ValidationFailed("tank range must be finite and non-empty"));
        }
        if self.meter_ticks_per_window == 0 || self.meter_windows_per_second == 0 {
            return Err(ConfigError::ValidationFailed("meter constants must be > 0"));
        }
        if self.telemetry_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed("telemetry_interval_secs must be > 0"));
        }
        Ok(())
    }

    /// Parse a JSON override and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }
}
