//! Percentage-controlled actuator channel.
//!
//! One instance per physical output (cooling pump, cooling fan,
//! dehumidifier fan, thermoelectric element, watering pump).  The channel
//! validates the requested duty, programs the PWM comparator and records
//! the applied value; a rejected value never reaches the hardware.
//!
//! The duty is a single value, so it lives in an atomic rather than behind
//! a critical section; readers on any thread see the last applied duty.

use core::sync::atomic::{AtomicU32, Ordering};

use log::debug;
use serde::Serialize;

use crate::app::ports::PwmPort;
use crate::error::{RangeError, Result};
use crate::pins::{self, PwmChannel};

/// Lowest legal duty cycle (percent).
pub const DUTY_MIN: f32 = 0.0;
/// Highest legal duty cycle (percent).
pub const DUTY_MAX: f32 = 100.0;

/// Physical outputs of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActuatorId {
    CoolingPump,
    CoolingFan,
    DehumidifierFan,
    Thermoelectric,
    WateringPump,
}

impl ActuatorId {
    pub const ALL: [Self; 5] = [
        Self::CoolingPump,
        Self::CoolingFan,
        Self::DehumidifierFan,
        Self::Thermoelectric,
        Self::WateringPump,
    ];

    /// Fixed hardware binding of this actuator.
    pub const fn pwm_channel(self) -> PwmChannel {
        match self {
            Self::CoolingPump => pins::COOLING_PUMP_PWM,
            Self::CoolingFan => pins::COOLING_FAN_PWM,
            Self::DehumidifierFan => pins::DEHUMIDIFIER_FAN_PWM,
            Self::Thermoelectric => pins::THERMOELECTRIC_PWM,
            Self::WateringPump => pins::WATERING_PUMP_PWM,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::CoolingPump => "cooling_pump",
            Self::CoolingFan => "cooling_fan",
            Self::DehumidifierFan => "dehumidifier_fan",
            Self::Thermoelectric => "thermoelectric",
            Self::WateringPump => "watering_pump",
        }
    }
}

/// Validate a requested duty cycle.  NaN is out of range.
pub fn check_duty(percent: f32) -> Result<f32> {
    if (DUTY_MIN..=DUTY_MAX).contains(&percent) {
        Ok(percent)
    } else {
        Err(RangeError::Duty { value: percent }.into())
    }
}

pub struct ActuatorChannel<P: PwmPort> {
    id: ActuatorId,
    channel: PwmChannel,
    pwm: P,
    /// `f32::to_bits` of the last applied duty.
    duty_bits: AtomicU32,
}

impl<P: PwmPort> ActuatorChannel<P> {
    /// Initialise the PWM output for `id` and drive it to 0%.
    pub fn new(id: ActuatorId, pwm: P, frequency_hz: u32) -> Result<Self> {
        let channel = id.pwm_channel();
        pwm.pwm_init(channel, frequency_hz)?;
        pwm.pwm_set_duty(channel, 0.0);
        Ok(Self {
            id,
            channel,
            pwm,
            duty_bits: AtomicU32::new(0.0f32.to_bits()),
        })
    }

    /// Apply `percent` if it lies within `[0, 100]`.  On error nothing is
    /// written and the previous duty stays in effect.
    pub fn set_duty(&self, percent: f32) -> Result<()> {
        let percent = check_duty(percent)?;
        self.apply(percent);
        Ok(())
    }

    /// Force the output to 0%.
    pub fn stop(&self) {
        self.apply(0.0);
    }

    /// Last successfully applied duty (percent).
    pub fn get_duty(&self) -> f32 {
        f32::from_bits(self.duty_bits.load(Ordering::Acquire))
    }

    pub fn id(&self) -> ActuatorId {
        self.id
    }

    fn apply(&self, percent: f32) {
        self.pwm.pwm_set_duty(self.channel, percent);
        self.duty_bits.store(percent.to_bits(), Ordering::Release);
        debug!("{}: duty {:.1}%", self.id.name(), percent);
    }
}
