//! Application core: control logic behind port traits.
//!
//! The climate controller, its operator command set and its outbound events
//! live here.  All interaction with hardware happens through the **port
//! traits** defined in [`ports`], keeping this layer testable without real
//! peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
