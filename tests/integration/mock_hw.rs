//! Mock adapters for integration tests.
//!
//! [`MockPwm`] records every PWM call so tests can assert on the full
//! output history without touching LEDC registers.  The pulse sources
//! stand in for the PCNT unit and its timer.

use std::sync::{Arc, Mutex};

use climabox::app::events::AppEvent;
use climabox::app::ports::{EventSink, PulseSourcePort, PwmPort};
use climabox::drivers::hw_init::HwInitError;
use climabox::pins::PwmChannel;

// ── PWM call record ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PwmCall {
    Init { channel: PwmChannel, frequency_hz: u32 },
    Duty { channel: PwmChannel, percent: f32 },
}

// ── MockPwm ───────────────────────────────────────────────────

/// Cloneable; every clone appends to the same history.
#[derive(Clone, Default)]
pub struct MockPwm {
    calls: Arc<Mutex<Vec<PwmCall>>>,
}

#[allow(dead_code)]
impl MockPwm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PwmCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn duty_writes(&self, channel: PwmChannel) -> Vec<f32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PwmCall::Duty { channel: ch, percent } if ch == channel => Some(percent),
                _ => None,
            })
            .collect()
    }

    pub fn last_duty(&self, channel: PwmChannel) -> Option<f32> {
        self.duty_writes(channel).last().copied()
    }

    pub fn init_frequency(&self, channel: PwmChannel) -> Option<u32> {
        self.calls().into_iter().find_map(|c| match c {
            PwmCall::Init { channel: ch, frequency_hz } if ch == channel => Some(frequency_hz),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl PwmPort for MockPwm {
    fn pwm_init(&self, channel: PwmChannel, frequency_hz: u32) -> Result<(), HwInitError> {
        self.calls
            .lock()
            .unwrap()
            .push(PwmCall::Init { channel, frequency_hz });
        Ok(())
    }

    fn pwm_set_duty(&self, channel: PwmChannel, percent: f32) {
        self.calls
            .lock()
            .unwrap()
            .push(PwmCall::Duty { channel, percent });
    }
}

// ── Pulse sources ─────────────────────────────────────────────

/// Every window is `pulses` edges over `ticks` timer ticks.
#[allow(dead_code)]
pub struct SteadyPulses {
    pub pulses: u32,
    pub ticks: u64,
}

impl PulseSourcePort for SteadyPulses {
    fn counter_read_and_reset(&mut self) -> u32 {
        self.pulses
    }

    fn timer_read_and_reset(&mut self) -> u64 {
        self.ticks
    }
}

/// Accumulator fed from the test thread, drained by the water-meter task.
///
/// The timer read latches both halves under one lock (the meter reads the
/// timer first), so an injection can never be split across two windows.
#[derive(Clone, Default)]
pub struct SharedPulses {
    pending: Arc<Mutex<(u32, u64)>>,
    latched: u32,
}

#[allow(dead_code)]
impl SharedPulses {
    pub fn inject(&self, pulses: u32, ticks: u64) {
        let mut p = self.pending.lock().unwrap();
        p.0 += pulses;
        p.1 += ticks;
    }
}

impl PulseSourcePort for SharedPulses {
    fn counter_read_and_reset(&mut self) -> u32 {
        std::mem::take(&mut self.latched)
    }

    fn timer_read_and_reset(&mut self) -> u64 {
        let (pulses, ticks) = std::mem::take(&mut *self.pending.lock().unwrap());
        self.latched = pulses;
        ticks
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<AppEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
