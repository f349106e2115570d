//! ClimateController → ActuatorChannel → PwmPort.

use climabox::app::commands::{CommandReply, ControlCommand};
use climabox::app::service::ClimateController;
use climabox::config::ControlConfig;
use climabox::drivers::actuator::ActuatorId;
use climabox::error::{Error, RangeError};

use crate::mock_hw::{MockPwm, RecordingSink};

fn setup() -> (ClimateController<MockPwm>, MockPwm) {
    let pwm = MockPwm::new();
    let controller = ClimateController::new(pwm.clone(), &ControlConfig::default()).unwrap();
    (controller, pwm)
}

#[test]
fn every_output_initialised_at_its_frequency_and_zero() {
    let (_c, pwm) = setup();
    for id in ActuatorId::ALL {
        let expected = if id == ActuatorId::WateringPump { 100 } else { 10_000 };
        assert_eq!(pwm.init_frequency(id.pwm_channel()), Some(expected), "{}", id.name());
        assert_eq!(pwm.last_duty(id.pwm_channel()), Some(0.0), "{}", id.name());
    }
}

#[test]
fn set_and_get_speed_per_actuator() {
    let (c, pwm) = setup();
    let mut sink = RecordingSink::default();
    for (i, id) in ActuatorId::ALL.into_iter().enumerate() {
        let percent = 10.0 * (i as f32 + 1.0);
        c.handle_command(ControlCommand::SetSpeed { actuator: id, percent }, &mut sink)
            .unwrap();
        assert_eq!(
            c.handle_command(ControlCommand::GetSpeed(id), &mut sink),
            Ok(CommandReply::Speed(percent))
        );
        assert_eq!(pwm.last_duty(id.pwm_channel()), Some(percent));
    }
    // Setting one never disturbed another.
    assert_eq!(c.get_speed(ActuatorId::CoolingPump), 10.0);
}

#[test]
fn out_of_range_speed_writes_nothing() {
    let (c, pwm) = setup();
    c.set_speed(ActuatorId::CoolingPump, 55.0).unwrap();
    pwm.clear();

    for bad in [-1.0, 100.01, f32::NAN, f32::NEG_INFINITY] {
        let err = c.set_speed(ActuatorId::CoolingPump, bad).unwrap_err();
        assert!(matches!(err, Error::Range(RangeError::Duty { .. })));
    }

    assert!(pwm.calls().is_empty());
    assert_eq!(c.get_speed(ActuatorId::CoolingPump), 55.0);
}

#[test]
fn stop_command_zeroes_output() {
    let (c, pwm) = setup();
    let mut sink = RecordingSink::default();
    c.set_speed(ActuatorId::Thermoelectric, 90.0).unwrap();
    c.handle_command(ControlCommand::Stop(ActuatorId::Thermoelectric), &mut sink)
        .unwrap();
    assert_eq!(c.get_speed(ActuatorId::Thermoelectric), 0.0);
    assert_eq!(pwm.last_duty(ActuatorId::Thermoelectric.pwm_channel()), Some(0.0));
}

#[test]
fn boundaries_are_accepted() {
    let (c, _pwm) = setup();
    for id in ActuatorId::ALL {
        c.set_speed(id, 0.0).unwrap();
        c.set_speed(id, 100.0).unwrap();
        assert_eq!(c.get_speed(id), 100.0);
    }
}
