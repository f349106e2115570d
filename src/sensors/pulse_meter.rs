//! Tank-probe frequency meter.
//!
//! The capacitive tank probe is an oscillator whose frequency falls as the
//! water rises.  A hardware counter accumulates its rising edges while a
//! free-running timer measures how long it counted.  Once per sampling
//! period both are read and reset together, giving
//!
//! ```text
//! frequency_hz = (K * pulse_count / elapsed_ticks) * C
//! ```
//!
//! where K is the nominal number of timer ticks in one window and C the
//! number of windows per second.  The arithmetic is integer, so the result
//! is truncated to whole pulses per nominal window before scaling.

use log::debug;

use crate::app::ports::PulseSourcePort;
use crate::config::ControlConfig;

/// One counting window: edges seen and ticks elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseWindow {
    pub pulse_count: u32,
    pub elapsed_ticks: u64,
}

impl PulseWindow {
    /// Read and reset counter and timer back to back.
    ///
    /// Must be called inside the critical section that also consumes the
    /// window, so the count and the elapsed time always describe the same
    /// interval.
    pub fn capture(source: &mut impl PulseSourcePort) -> Self {
        let elapsed_ticks = source.timer_read_and_reset();
        let pulse_count = source.counter_read_and_reset();
        Self {
            pulse_count,
            elapsed_ticks,
        }
    }
}

/// Fixed timebase constants K and C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterConstants {
    pub ticks_per_window: u32,
    pub windows_per_second: u32,
}

impl MeterConstants {
    pub fn from_config(config: &ControlConfig) -> Self {
        Self {
            ticks_per_window: config.meter_ticks_per_window,
            windows_per_second: config.meter_windows_per_second,
        }
    }

    /// Frequency for one window, or `None` for a zero-length window.
    pub fn frequency_of(&self, window: PulseWindow) -> Option<u32> {
        if window.elapsed_ticks == 0 {
            return None;
        }
        let per_window =
            u64::from(self.ticks_per_window) * u64::from(window.pulse_count) / window.elapsed_ticks;
        let hz = per_window.saturating_mul(u64::from(self.windows_per_second));
        Some(u32::try_from(hz).unwrap_or(u32::MAX))
    }
}

#[derive(Debug)]
pub struct PulseFrequencyMeter {
    constants: MeterConstants,
    last_frequency: Option<u32>,
    samples: u64,
    skipped_windows: u64,
}

impl PulseFrequencyMeter {
    pub fn new(constants: MeterConstants) -> Self {
        Self {
            constants,
            last_frequency: None,
            samples: 0,
            skipped_windows: 0,
        }
    }

    /// Fold one window into the meter.  A zero-length window is skipped
    /// and the previous frequency is kept.
    pub fn update(&mut self, window: PulseWindow) -> Option<u32> {
        match self.constants.frequency_of(window) {
            Some(hz) => {
                self.last_frequency = Some(hz);
                self.samples += 1;
            }
            None => {
                self.skipped_windows += 1;
                debug!("water meter: zero-length window skipped");
            }
        }
        self.last_frequency
    }

    /// Last valid frequency, `None` until the first non-empty window.
    pub fn last_frequency(&self) -> Option<u32> {
        self.last_frequency
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn skipped_windows(&self) -> u64 {
        self.skipped_windows
    }
}
