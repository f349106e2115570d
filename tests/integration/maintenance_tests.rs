//! Watering-pump maintenance runs driven through the controller.

use climabox::app::commands::{CommandReply, ControlCommand};
use climabox::app::service::ClimateController;
use climabox::config::ControlConfig;
use climabox::drivers::actuator::ActuatorId;
use climabox::drivers::watering_pump::{MaintenanceState, MaintenanceTransition};

use crate::mock_hw::{MockPwm, RecordingSink};

const PUMP: ActuatorId = ActuatorId::WateringPump;

/// N = 250 / 50 = 5 idle periods, M = 150 / 50 = 3 run periods.
fn short_schedule() -> ControlConfig {
    ControlConfig {
        watering_pump_period_ms: 50,
        maintenance_interval_ms: 250,
        maintenance_run_ms: 150,
        ..ControlConfig::default()
    }
}

fn setup() -> (ClimateController<MockPwm>, MockPwm) {
    let pwm = MockPwm::new();
    let c = ClimateController::new(pwm.clone(), &short_schedule()).unwrap();
    (c, pwm)
}

#[test]
fn idle_pump_runs_after_n_periods_for_m_periods() {
    let (c, pwm) = setup();
    let pump = c.watering_pump();

    for _ in 0..4 {
        assert_eq!(pump.process(), None);
        assert_eq!(c.get_speed(PUMP), 0.0);
    }

    assert_eq!(pump.process(), Some(MaintenanceTransition::Started { run_cycles: 3 }));
    assert_eq!(c.get_speed(PUMP), 100.0);
    assert_eq!(pwm.last_duty(PUMP.pwm_channel()), Some(100.0));

    for _ in 0..2 {
        assert_eq!(pump.process(), None);
        assert_eq!(c.get_speed(PUMP), 100.0);
    }

    assert_eq!(
        pump.process(),
        Some(MaintenanceTransition::Finished { restored_duty: 0.0 })
    );
    assert_eq!(c.get_speed(PUMP), 0.0);
    assert_eq!(pump.maintenance_state(), MaintenanceState::Idle { idle_cycles_remaining: 5 });
}

#[test]
fn non_zero_request_while_idle_resets_counter() {
    let (c, _pwm) = setup();
    let pump = c.watering_pump();
    pump.process();
    pump.process();

    c.set_speed(PUMP, 35.0).unwrap();
    assert_eq!(c.get_speed(PUMP), 35.0);
    assert_eq!(pump.maintenance_state(), MaintenanceState::Idle { idle_cycles_remaining: 5 });

    // Running pump never triggers maintenance.
    for _ in 0..20 {
        assert_eq!(pump.process(), None);
    }
    assert_eq!(c.get_speed(PUMP), 35.0);
}

#[test]
fn operator_speed_cancels_run() {
    let (c, _pwm) = setup();
    let pump = c.watering_pump();
    for _ in 0..5 {
        pump.process();
    }
    assert!(pump.maintenance_state().is_running());

    c.set_speed(PUMP, 60.0).unwrap();
    assert_eq!(c.get_speed(PUMP), 60.0);
    assert_eq!(pump.maintenance_state(), MaintenanceState::Idle { idle_cycles_remaining: 5 });
}

#[test]
fn zero_request_during_run_waits_for_run_end() {
    let (c, _pwm) = setup();
    let pump = c.watering_pump();
    for _ in 0..5 {
        pump.process();
    }

    c.set_speed(PUMP, 0.0).unwrap();
    assert_eq!(c.get_speed(PUMP), 100.0);

    pump.process();
    pump.process();
    assert_eq!(
        pump.process(),
        Some(MaintenanceTransition::Finished { restored_duty: 0.0 })
    );
    assert_eq!(c.get_speed(PUMP), 0.0);
}

#[test]
fn maintenance_visible_through_command() {
    let (c, _pwm) = setup();
    let mut sink = RecordingSink::default();
    for _ in 0..5 {
        c.watering_pump().process();
    }
    assert_eq!(
        c.handle_command(ControlCommand::GetMaintenance, &mut sink),
        Ok(CommandReply::Maintenance {
            state: MaintenanceState::Running { run_cycles_remaining: 3 },
            desired_duty: 0.0,
        })
    );
}
