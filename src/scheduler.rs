//! Fixed-rate periodic tasks.
//!
//! Each control component runs on its own thread at its own period.  The
//! threads share nothing but the guarded entities they were handed, and
//! never wait on each other or on the command thread.
//!
//! ```text
//!   spawn_periodic(task, spec) ──▶ ┌──────── thread "<name>" ────────┐
//!                                  │ loop {                          │
//!                                  │     task.run_period();          │
//!                                  │     sleep(ticker.next_wait());  │
//!                                  │ }                               │
//!                                  └─────────────────────────────────┘
//! ```
//!
//! On ESP-IDF, `std::thread` is a pthread over a FreeRTOS task;
//! `esp_pthread_set_cfg()` sets priority and stack for the *next* thread
//! created from the calling thread, so config and spawn must stay paired.

use std::io;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{info, warn};

// ═══════════════════════════════════════════════════════════════
//  Ticker
// ═══════════════════════════════════════════════════════════════

/// Fixed-rate deadline tracker: deadlines advance by exactly one period
/// regardless of how long the work took, so the rate does not drift.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    next: Instant,
    overruns: u32,
}

impl Ticker {
    /// First deadline is one period after `start`.
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next: start + period,
            overruns: 0,
        }
    }

    /// Time to sleep until the next deadline, advancing it by one period.
    ///
    /// A late period runs immediately.  Falling more than a full period
    /// behind drops the missed deadlines and re-anchors at `now`.
    pub fn next_wait(&mut self, now: Instant) -> Duration {
        if now >= self.next + self.period {
            self.overruns = self.overruns.saturating_add(1);
            self.next = now + self.period;
            return Duration::ZERO;
        }
        let wait = self.next.saturating_duration_since(now);
        self.next += self.period;
        wait
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Times the deadline had to be re-anchored.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}

// ═══════════════════════════════════════════════════════════════
//  Periodic tasks
// ═══════════════════════════════════════════════════════════════

/// One schedulable unit of periodic work.
pub trait PeriodicTask: Send + 'static {
    fn label(&self) -> &'static str;

    /// Do one period's work.  Must be bounded and must not block on I/O.
    fn run_period(&mut self);
}

/// Thread parameters for a periodic task.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    pub period: Duration,
    /// FreeRTOS priority and stack; ignored on the host.
    pub priority: u8,
    pub stack_kb: usize,
}

/// Run `task` every `spec.period` on a dedicated thread for the process
/// lifetime.
pub fn spawn_periodic<T: PeriodicTask>(mut task: T, spec: TaskSpec) -> io::Result<JoinHandle<()>> {
    let name = task.label();
    configure_next_thread(&spec)?;
    info!(
        "Spawning periodic '{}' every {} ms (pri={}, stack={}KB)",
        name,
        spec.period.as_millis(),
        spec.priority,
        spec.stack_kb
    );

    std::thread::Builder::new()
        .name(name.into())
        .spawn(move || {
            let mut ticker = Ticker::new(spec.period, Instant::now());
            loop {
                task.run_period();
                let overruns = ticker.overruns();
                let wait = ticker.next_wait(Instant::now());
                if ticker.overruns() != overruns {
                    warn!("{}: fell behind, deadline re-anchored ({} total)", name, ticker.overruns());
                }
                if !wait.is_zero() {
                    std::thread::sleep(wait);
                }
            }
        })
}

#[cfg(target_os = "espidf")]
fn configure_next_thread(spec: &TaskSpec) -> io::Result<()> {
    // SAFETY: plain FFI calls on a config struct owned by this frame.
    let ret = unsafe {
        let mut cfg = esp_idf_svc::sys::esp_create_default_pthread_config();
        cfg.prio = i32::from(spec.priority);
        cfg.stack_size = (spec.stack_kb * 1024) as i32;
        esp_idf_svc::sys::esp_pthread_set_cfg(&cfg)
    };
    if ret == esp_idf_svc::sys::ESP_OK as i32 {
        Ok(())
    } else {
        Err(io::Error::other(format!("esp_pthread_set_cfg failed: {ret}")))
    }
}

#[cfg(not(target_os = "espidf"))]
fn configure_next_thread(_spec: &TaskSpec) -> io::Result<()> {
    Ok(())
}
