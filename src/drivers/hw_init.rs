//! Raw peripheral access: LEDC PWM, PCNT pulse counting and the
//! free-running microsecond timer.
//!
//! Every function has an ESP-IDF implementation built on raw sys calls
//! and a host simulation backed by atomics, so the control core runs
//! unchanged in tests.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

use crate::pins::{self, PwmChannel};

// ── Error type ────────────────────────────────────────────────

/// Errors during peripheral initialisation.  Fatal at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    PwmInitFailed(i32),
    PulseCounterInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PwmInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::PulseCounterInitFailed(rc) => write!(f, "PCNT unit config failed (rc={})", rc),
        }
    }
}

// ── Duty conversion ───────────────────────────────────────────

/// Convert a validated percentage to an LEDC duty register value.
pub fn duty_to_raw(percent: f32) -> u32 {
    let max = (1u32 << pins::PWM_RESOLUTION_BITS) - 1;
    let raw = (percent.clamp(0.0, 100.0) / 100.0 * max as f32).round() as u32;
    raw.min(max)
}

// ── LEDC PWM ─────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn pwm_configure(channel: PwmChannel, frequency_hz: u32) -> Result<(), HwInitError> {
    // Re-configuring a shared timer with the same frequency is harmless, so
    // each channel configures its own timer.
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: channel.ledc_timer,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_10_BIT,
        freq_hz: frequency_hz,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    // SAFETY: plain configuration call with a fully initialised struct;
    // made from the single startup context before any task runs.
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::PwmInitFailed(ret));
    }

    let chan = ledc_channel_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel: channel.ledc_channel,
        timer_sel: channel.ledc_timer,
        gpio_num: channel.gpio,
        duty: 0,
        hpoint: 0,
        ..Default::default()
    };
    // SAFETY: as above.
    let ret = unsafe { ledc_channel_config(&chan) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::PwmInitFailed(ret));
    }

    info!(
        "hw_init: LEDC ch{} on GPIO{} @ {} Hz (timer {})",
        channel.ledc_channel, channel.gpio, frequency_hz, channel.ledc_timer
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn pwm_configure(channel: PwmChannel, frequency_hz: u32) -> Result<(), HwInitError> {
    log::info!(
        "hw_init(sim): LEDC ch{} @ {} Hz",
        channel.ledc_channel, frequency_hz
    );
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn pwm_write(channel: PwmChannel, raw: u32) {
    // SAFETY: the channel was configured by pwm_configure(); a duty write
    // is two register updates on a channel owned by one ActuatorChannel.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel.ledc_channel, raw);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel.ledc_channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn pwm_write(channel: PwmChannel, raw: u32) {
    if let Some(slot) = sim::DUTY_RAW.get(channel.ledc_channel as usize) {
        slot.store(raw, core::sync::atomic::Ordering::Relaxed);
    }
}

// ── PCNT pulse counter ───────────────────────────────────────

/// Owned handle of an initialised pulse-counter unit.
#[cfg(target_os = "espidf")]
pub struct PcntHandle(pcnt_unit_handle_t);

// SAFETY: the PCNT driver serialises access to a unit internally; the
// handle is moved to, and then only used by, the water-meter task.
#[cfg(target_os = "espidf")]
unsafe impl Send for PcntHandle {}

#[cfg(not(target_os = "espidf"))]
pub struct PcntHandle;

/// Count rising edges on `gpio` with a dedicated PCNT unit.
#[cfg(target_os = "espidf")]
pub fn pulse_counter_init(gpio: i32) -> Result<PcntHandle, HwInitError> {
    let unit_cfg = pcnt_unit_config_t {
        low_limit: -1,
        high_limit: pins::PCNT_HIGH_LIMIT,
        ..Default::default()
    };
    let mut unit: pcnt_unit_handle_t = core::ptr::null_mut();
    // SAFETY: out-pointer is a valid local; startup context only.
    let ret = unsafe { pcnt_new_unit(&unit_cfg, &mut unit) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::PulseCounterInitFailed(ret));
    }

    let chan_cfg = pcnt_chan_config_t {
        edge_gpio_num: gpio,
        level_gpio_num: -1,
        ..Default::default()
    };
    let mut chan: pcnt_channel_handle_t = core::ptr::null_mut();
    // SAFETY: `unit` was just created above; out-pointer is a valid local.
    unsafe {
        let ret = pcnt_new_channel(unit, &chan_cfg, &mut chan);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::PulseCounterInitFailed(ret));
        }
        let ret = pcnt_channel_set_edge_action(
            chan,
            pcnt_channel_edge_action_t_PCNT_CHANNEL_EDGE_ACTION_INCREASE,
            pcnt_channel_edge_action_t_PCNT_CHANNEL_EDGE_ACTION_HOLD,
        );
        if ret != ESP_OK as i32 {
            return Err(HwInitError::PulseCounterInitFailed(ret));
        }
        let ret = pcnt_unit_enable(unit);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::PulseCounterInitFailed(ret));
        }
        let ret = pcnt_unit_clear_count(unit);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::PulseCounterInitFailed(ret));
        }
        let ret = pcnt_unit_start(unit);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::PulseCounterInitFailed(ret));
        }
    }

    info!("hw_init: PCNT counting rising edges on GPIO{}", gpio);
    Ok(PcntHandle(unit))
}

#[cfg(not(target_os = "espidf"))]
pub fn pulse_counter_init(gpio: i32) -> Result<PcntHandle, HwInitError> {
    log::info!("hw_init(sim): PCNT on GPIO{}", gpio);
    Ok(PcntHandle)
}

/// Read the accumulated edge count and clear it.
#[cfg(target_os = "espidf")]
pub fn pulse_counter_take(handle: &PcntHandle) -> u32 {
    let mut count: i32 = 0;
    // SAFETY: handle is a started PCNT unit owned by the caller.
    unsafe {
        if pcnt_unit_get_count(handle.0, &mut count) != ESP_OK as i32 {
            return 0;
        }
        pcnt_unit_clear_count(handle.0);
    }
    count.max(0) as u32
}

#[cfg(not(target_os = "espidf"))]
pub fn pulse_counter_take(_handle: &PcntHandle) -> u32 {
    sim::PULSES.swap(0, core::sync::atomic::Ordering::Relaxed)
}

// ── Free-running timer ────────────────────────────────────────

/// Microseconds since boot.
#[cfg(target_os = "espidf")]
pub fn timer_now_ticks() -> u64 {
    // SAFETY: esp_timer_get_time reads a monotonic hardware counter.
    (unsafe { esp_timer_get_time() }).max(0) as u64
}

#[cfg(not(target_os = "espidf"))]
pub fn timer_now_ticks() -> u64 {
    sim::TICKS.load(core::sync::atomic::Ordering::Relaxed)
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicU32, AtomicU64};

    pub static PULSES: AtomicU32 = AtomicU32::new(0);
    pub static TICKS: AtomicU64 = AtomicU64::new(0);
    pub static DUTY_RAW: [AtomicU32; 8] = [const { AtomicU32::new(0) }; 8];
}

/// Simulate `count` rising edges on the tank probe input.
#[cfg(not(target_os = "espidf"))]
pub fn sim_inject_pulses(count: u32) {
    sim::PULSES.fetch_add(count, core::sync::atomic::Ordering::Relaxed);
}

/// Advance the simulated free-running timer.
#[cfg(not(target_os = "espidf"))]
pub fn sim_advance_ticks(ticks: u64) {
    sim::TICKS.fetch_add(ticks, core::sync::atomic::Ordering::Relaxed);
}

/// Last raw duty written to an LEDC channel.
#[cfg(not(target_os = "espidf"))]
pub fn sim_duty_raw(ledc_channel: u32) -> u32 {
    sim::DUTY_RAW
        .get(ledc_channel as usize)
        .map_or(0, |slot| slot.load(core::sync::atomic::Ordering::Relaxed))
}
