//! Port traits: the boundary between the control core and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ActuatorChannel / WaterTank / ClimateController
//! ```
//!
//! Driven adapters (LEDC, PCNT, event sinks) implement these traits.  The
//! control core consumes them via generics, so it never touches registers
//! directly and runs against mocks on the host.

use std::sync::Arc;

use crate::drivers::hw_init::HwInitError;
use crate::pins::PwmChannel;

// ───────────────────────────────────────────────────────────────
// PWM port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for percentage-controlled outputs.
///
/// Shared by every [`ActuatorChannel`](crate::drivers::actuator::ActuatorChannel)
/// and called from both the periodic tasks and the command thread, hence
/// `Send + Sync` and `&self` receivers.
pub trait PwmPort: Send + Sync {
    /// Configure `channel` to run at `frequency_hz` with 0% duty.
    fn pwm_init(&self, channel: PwmChannel, frequency_hz: u32) -> Result<(), HwInitError>;

    /// Program the compare value for an already-validated percentage.
    fn pwm_set_duty(&self, channel: PwmChannel, percent: f32);
}

impl<T: PwmPort + ?Sized> PwmPort for Arc<T> {
    fn pwm_init(&self, channel: PwmChannel, frequency_hz: u32) -> Result<(), HwInitError> {
        (**self).pwm_init(channel, frequency_hz)
    }

    fn pwm_set_duty(&self, channel: PwmChannel, percent: f32) {
        (**self).pwm_set_duty(channel, percent);
    }
}

// ───────────────────────────────────────────────────────────────
// Pulse source port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the tank probe: a pulse counter plus the timer that
/// measures how long it counted.  Both halves reset on read.
///
/// Callers must read both halves inside one critical section; see
/// [`PulseWindow::capture`](crate::sensors::pulse_meter::PulseWindow::capture).
pub trait PulseSourcePort: Send {
    /// Pulses counted since the previous call.
    fn counter_read_and_reset(&mut self) -> u32;

    /// Timer ticks elapsed since the previous call.
    fn timer_read_and_reset(&mut self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The control core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
