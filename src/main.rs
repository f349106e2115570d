//! Climabox Firmware: Main Entry Point
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                    │
//! │   LedcPwm (PwmPort)   PcntPulseSource (PulseSourcePort)   │
//! │   LogEventSink (EventSink)                                │
//! │                                                           │
//! │  ─────────────── Port Trait Boundary ───────────────      │
//! │                                                           │
//! │  ┌─────────────────────────────────────────────────────┐  │
//! │  │ ClimateController                                   │  │
//! │  │ 4 × ActuatorChannel · WateringPumpController ·      │  │
//! │  │ WaterTank                                           │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! │                                                           │
//! │  ControlSupervisor: water-meter 100 ms · pump 50 ms       │
//! └───────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::fmt::Display;
use std::time::Instant;

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use log::{error, info, warn};

use climabox::adapters::hardware::{LedcPwm, PcntPulseSource};
use climabox::adapters::log_sink::LogEventSink;
use climabox::app::events::AppEvent;
use climabox::app::ports::EventSink;
use climabox::app::service::ClimateController;
use climabox::config::ControlConfig;
use climabox::supervisor::ControlSupervisor;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    let boot = Instant::now();

    info!("╔══════════════════════════════════════╗");
    info!("║  Climabox v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = ControlConfig::default();

    // ── 2. Actuators (all driven to 0%) ───────────────────────
    let controller = match ClimateController::new(LedcPwm::new(), &config) {
        Ok(c) => c,
        Err(e) => halt("actuator init", e),
    };

    // ── 3. Tank probe ─────────────────────────────────────────
    let pulse_source = match PcntPulseSource::new() {
        Ok(s) => s,
        Err(e) => halt("tank probe init", e),
    };

    let mut log_sink = LogEventSink::new();
    controller.start(&mut log_sink);

    // ── 4. Periodic tasks ─────────────────────────────────────
    let supervisor = ControlSupervisor::start(&controller, pulse_source, LogEventSink::new(), &config)?;
    info!("System ready. Entering telemetry loop.");

    // ── 5. Telemetry loop ─────────────────────────────────────
    let mut reported_dead = false;
    loop {
        FreeRtos::delay_ms(config.telemetry_interval_secs.saturating_mul(1000));

        let t = controller.telemetry(boot.elapsed().as_secs());
        log_sink.emit(&AppEvent::Telemetry(t));

        if !supervisor.is_alive() && !reported_dead {
            warn!("a periodic control task has stopped");
            reported_dead = true;
        }
    }
}

/// Peripheral init failure is fatal: log and park the main task with no
/// actuator driven.
fn halt(what: &str, e: impl Display) -> ! {
    error!("{} failed: {}, halting", what, e);
    loop {
        FreeRtos::delay_ms(1000);
    }
}
