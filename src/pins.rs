//! GPIO / peripheral assignments for the Climabox controller board.
//!
//! Single source of truth; every driver references this module rather than
//! hard-coding pin or channel numbers.  Each actuator owns exactly one LEDC
//! channel; channels sharing a frequency share an LEDC timer.

/// One LEDC PWM output: the channel it drives, the timer that clocks it and
/// the GPIO it is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PwmChannel {
    pub ledc_channel: u32,
    pub ledc_timer: u32,
    pub gpio: i32,
}

// ---------------------------------------------------------------------------
// Climate actuators (10 kHz, LEDC timer 0)
// ---------------------------------------------------------------------------

/// Coolant circulation pump.
pub const COOLING_PUMP_PWM: PwmChannel = PwmChannel { ledc_channel: 0, ledc_timer: 0, gpio: 25 };
/// Heatsink fan on the cooling loop.
pub const COOLING_FAN_PWM: PwmChannel = PwmChannel { ledc_channel: 1, ledc_timer: 0, gpio: 26 };
/// Condenser fan of the dehumidifier.
pub const DEHUMIDIFIER_FAN_PWM: PwmChannel = PwmChannel { ledc_channel: 2, ledc_timer: 0, gpio: 27 };
/// Peltier (thermoelectric) element driver.
pub const THERMOELECTRIC_PWM: PwmChannel = PwmChannel { ledc_channel: 3, ledc_timer: 0, gpio: 14 };

// ---------------------------------------------------------------------------
// Watering pump (100 Hz, LEDC timer 1)
// ---------------------------------------------------------------------------

pub const WATERING_PUMP_PWM: PwmChannel = PwmChannel { ledc_channel: 4, ledc_timer: 1, gpio: 13 };

// ---------------------------------------------------------------------------
// Water tank level probe, frequency output, counted by PCNT
// ---------------------------------------------------------------------------

/// Oscillator output of the capacitive tank probe.
pub const TANK_FREQ_GPIO: i32 = 34;

/// PCNT counter limit; the probe never produces this many edges in one window.
pub const PCNT_HIGH_LIMIT: i32 = i16::MAX as i32;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC duty resolution (bits).  10-bit gives 0 – 1023 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 10;
