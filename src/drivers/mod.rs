//! Actuator drivers and hardware initialisation.

pub mod actuator;
pub mod hw_init;
pub mod watering_pump;
