//! ControlSupervisor running real periodic threads against mocks.

use std::time::{Duration, Instant};

use climabox::app::events::AppEvent;
use climabox::app::service::ClimateController;
use climabox::config::ControlConfig;
use climabox::supervisor::ControlSupervisor;

use crate::mock_hw::{MockPwm, RecordingSink, SharedPulses};

fn fast_config() -> ControlConfig {
    ControlConfig {
        water_meter_period_ms: 5,
        watering_pump_period_ms: 5,
        maintenance_interval_ms: 50,
        maintenance_run_ms: 15,
        ..ControlConfig::default()
    }
}

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

#[test]
fn water_meter_task_picks_up_pulses() {
    let config = fast_config();
    let c = ClimateController::new(MockPwm::new(), &config).unwrap();
    let probe = SharedPulses::default();
    let supervisor =
        ControlSupervisor::start(&c, probe.clone(), RecordingSink::default(), &config).unwrap();

    // 30 edges over one nominal window: 300 Hz.
    probe.inject(30, 100_000);
    assert!(wait_until(|| c.water_tank().get_frequency() == Some(300)));

    // Empty windows are skipped, so the reading holds.
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(c.water_tank().get_frequency(), Some(300));
    assert!(c.water_tank().snapshot().skipped_windows > 0);
    assert!(supervisor.is_alive());
}

#[test]
fn watering_pump_task_runs_maintenance() {
    let config = fast_config();
    let c = ClimateController::new(MockPwm::new(), &config).unwrap();
    let sink = RecordingSink::default();
    let _supervisor =
        ControlSupervisor::start(&c, SharedPulses::default(), sink.clone(), &config).unwrap();

    assert!(wait_until(|| {
        let events = sink.events();
        events
            .iter()
            .any(|e| matches!(e, AppEvent::MaintenanceStarted { run_cycles: 3 }))
            && events
                .iter()
                .any(|e| matches!(e, AppEvent::MaintenanceFinished { .. }))
    }));
}
