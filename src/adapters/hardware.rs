//! Hardware adapters: bridge real peripherals to the domain port traits.
//!
//! [`LedcPwm`] implements [`PwmPort`] over the LEDC peripheral and
//! [`PcntPulseSource`] implements [`PulseSourcePort`] over a PCNT unit plus
//! the `esp_timer` microsecond clock.  These are the only types in the
//! system that reach [`hw_init`]; on non-espidf targets the calls land in
//! its simulation stubs.

use crate::app::ports::{PulseSourcePort, PwmPort};
use crate::drivers::hw_init::{self, HwInitError, PcntHandle};
use crate::pins::{self, PwmChannel};

// ── PWM ───────────────────────────────────────────────────────

/// LEDC-backed PWM output.  Stateless: every channel's configuration
/// lives in the peripheral, so one copy can be shared by all actuators.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedcPwm;

impl LedcPwm {
    pub fn new() -> Self {
        Self
    }
}

impl PwmPort for LedcPwm {
    fn pwm_init(&self, channel: PwmChannel, frequency_hz: u32) -> Result<(), HwInitError> {
        hw_init::pwm_configure(channel, frequency_hz)
    }

    fn pwm_set_duty(&self, channel: PwmChannel, percent: f32) {
        hw_init::pwm_write(channel, hw_init::duty_to_raw(percent));
    }
}

// ── Pulse source ──────────────────────────────────────────────

/// Tank-probe edge counter with its elapsed-time reference.
pub struct PcntPulseSource {
    unit: PcntHandle,
    /// Timer value at the previous read.
    last_ticks: u64,
}

impl PcntPulseSource {
    /// Start counting on the tank-probe input and open the first window.
    pub fn new() -> Result<Self, HwInitError> {
        let unit = hw_init::pulse_counter_init(pins::TANK_FREQ_GPIO)?;
        Ok(Self {
            unit,
            last_ticks: hw_init::timer_now_ticks(),
        })
    }
}

impl PulseSourcePort for PcntPulseSource {
    fn counter_read_and_reset(&mut self) -> u32 {
        hw_init::pulse_counter_take(&self.unit)
    }

    fn timer_read_and_reset(&mut self) -> u64 {
        let now = hw_init::timer_now_ticks();
        let elapsed = now.saturating_sub(self.last_ticks);
        self.last_ticks = now;
        elapsed
    }
}
