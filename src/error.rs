//! Unified error types for the Climabox firmware.
//!
//! Every fallible control-core operation funnels into [`Error`].  All
//! variants are `Copy` so a rejected command can be logged, emitted as an
//! event and returned to the console without allocation.

use core::fmt;

use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// An operator value fell outside its legal range.  Prior state is
    /// left untouched.
    Range(RangeError),
    /// A calibration capture was requested before the water meter produced
    /// its first valid frequency.
    NoMeasurement,
    /// Peripheral initialisation failed.
    Init(HwInitError),
    /// Configuration is invalid or could not be parsed.
    Config(ConfigError),
}

impl Error {
    /// Console exit code for this error.  Success is 0 (see [`exit_code_of`]).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Range(_) => 1,
            Self::NoMeasurement => 2,
            Self::Init(_) | Self::Config(_) => 3,
        }
    }
}

/// Map any control-core result onto a console exit code.
pub fn exit_code_of<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => e.exit_code(),
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range(e) => write!(f, "range: {e}"),
            Self::NoMeasurement => write!(f, "no frequency measured yet"),
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Range errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeError {
    /// PWM duty outside `[0, 100]` percent (or not a number).
    Duty { value: f32 },
    /// Calibration level outside the physical sensor range.
    Level { value: f32, min: f32, max: f32 },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duty { value } => write!(f, "duty {value}% outside 0-100%"),
            Self::Level { value, min, max } => {
                write!(f, "level {value} ml outside {min}-{max} ml")
            }
        }
    }
}

impl From<RangeError> for Error {
    fn from(e: RangeError) -> Self {
        Self::Range(e)
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Serialized config could not be parsed.
    Malformed,
    /// A field failed range validation.  The message names the field.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "config malformed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
