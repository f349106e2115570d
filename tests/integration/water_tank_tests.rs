//! Water tank calibration through the command surface, plus the
//! cross-thread consistency of the level mapping.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use climabox::app::commands::{CommandReply, ControlCommand};
use climabox::app::events::AppEvent;
use climabox::app::service::ClimateController;
use climabox::config::ControlConfig;
use climabox::error::{Error, exit_code_of};
use climabox::sensors::water_level::{Endpoint, LinearMapping};
use climabox::sensors::water_tank::WaterTank;

use crate::mock_hw::{MockPwm, RecordingSink, SteadyPulses};

/// `hz` expressed as one nominal window at the default K = 100 000, C = 10.
fn probe_at(hz: u32) -> SteadyPulses {
    SteadyPulses {
        pulses: hz / 10,
        ticks: 100_000,
    }
}

#[test]
fn operator_calibration_sequence() {
    let c = ClimateController::new(MockPwm::new(), &ControlConfig::default()).unwrap();
    let tank = c.water_tank();
    let mut sink = RecordingSink::default();

    // Empty tank.
    tank.sample(&mut probe_at(100));
    c.handle_command(ControlCommand::DefineMinLevel(0.0), &mut sink).unwrap();
    c.handle_command(ControlCommand::CalibrateMin, &mut sink).unwrap();

    // Full tank.
    tank.sample(&mut probe_at(1000));
    c.handle_command(ControlCommand::DefineMaxLevel(2000.0), &mut sink).unwrap();
    assert_eq!(
        c.handle_command(ControlCommand::GetLevel, &mut sink),
        Ok(CommandReply::Level(0.0)),
        "no level until the max frequency is captured"
    );
    c.handle_command(ControlCommand::CalibrateMax, &mut sink).unwrap();

    // Half full.
    tank.sample(&mut probe_at(550));
    match c.handle_command(ControlCommand::GetLevel, &mut sink) {
        Ok(CommandReply::Level(ml)) => assert!((ml - 1000.0).abs() < 0.01, "got {ml}"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        c.handle_command(ControlCommand::GetFrequency, &mut sink),
        Ok(CommandReply::Frequency(Some(550)))
    );
    assert_eq!(
        c.handle_command(ControlCommand::GetMaxFreq, &mut sink),
        Ok(CommandReply::CalibratedFrequency(Some(1000)))
    );
    assert_eq!(
        c.handle_command(ControlCommand::GetMinFreq, &mut sink),
        Ok(CommandReply::CalibratedFrequency(Some(100)))
    );

    let events = sink.events();
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::FrequencyEndpointCaptured { endpoint: Endpoint::Max, frequency_hz: 1000 }
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::LevelEndpointDefined { endpoint: Endpoint::Min, .. }
    )));
}

#[test]
fn rejected_max_level_keeps_previous() {
    let c = ClimateController::new(MockPwm::new(), &ControlConfig::default()).unwrap();
    let mut sink = RecordingSink::default();
    c.handle_command(ControlCommand::DefineMaxLevel(1800.0), &mut sink).unwrap();

    let result = c.handle_command(ControlCommand::DefineMaxLevel(2100.0), &mut sink);
    assert_eq!(exit_code_of(&result), 1);
    assert_eq!(c.water_tank().point(Endpoint::Max).level_ml, Some(1800.0));
    assert!(matches!(sink.events().last(), Some(AppEvent::CommandRejected(_))));
}

#[test]
fn calibrate_before_first_sample_reports_no_measurement() {
    let c = ClimateController::new(MockPwm::new(), &ControlConfig::default()).unwrap();
    let mut sink = RecordingSink::default();
    let result = c.handle_command(ControlCommand::CalibrateMax, &mut sink);
    assert_eq!(result, Err(Error::NoMeasurement));
    assert_eq!(exit_code_of(&result), 2);
}

#[test]
fn tank_info_is_one_consistent_read() {
    let c = ClimateController::new(MockPwm::new(), &ControlConfig::default()).unwrap();
    let mut sink = RecordingSink::default();
    c.water_tank().sample(&mut probe_at(420));
    match c.handle_command(ControlCommand::GetTankInfo, &mut sink) {
        Ok(CommandReply::TankInfo(info)) => {
            assert_eq!(info.frequency_hz, Some(420));
            assert_eq!(info.level_ml, 0.0);
            assert_eq!(info.samples, 1);
            assert!(info.mapping.is_none());
        }
        other => panic!("unexpected {other:?}"),
    }
}

/// The operator flips the max endpoint between two levels while the
/// sampler recomputes the mapping and a reader polls it.  Every observed
/// mapping and level must belong to exactly one calibration state.
#[test]
fn mapping_never_mixes_calibration_states() {
    let tank = Arc::new(WaterTank::new(&ControlConfig::default()));

    tank.sample(&mut probe_at(100));
    tank.define_min_level(0.0).unwrap();
    tank.calibrate_min().unwrap();
    tank.sample(&mut probe_at(1000));
    tank.define_max_level(2000.0).unwrap();
    tank.calibrate_max().unwrap();
    tank.sample(&mut probe_at(550));

    let map_a = LinearMapping::through((100.0, 0.0), (1000.0, 2000.0)).unwrap();
    let map_b = LinearMapping::through((100.0, 0.0), (1000.0, 1000.0)).unwrap();
    assert_eq!(tank.mapping(), Some(map_a));

    let done = Arc::new(AtomicBool::new(false));

    let sampler = {
        let tank = Arc::clone(&tank);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut probe = probe_at(550);
            while !done.load(Ordering::Relaxed) {
                tank.sample(&mut probe);
                thread::yield_now();
            }
        })
    };

    let operator = {
        let tank = Arc::clone(&tank);
        thread::spawn(move || {
            for i in 0..2_000 {
                let ml = if i % 2 == 0 { 1000.0 } else { 2000.0 };
                tank.define_max_level(ml).unwrap();
                thread::yield_now();
            }
        })
    };

    let levels = [map_a.level_at(550), map_b.level_at(550)];
    for _ in 0..20_000 {
        let snap = tank.snapshot();
        let mapping = snap.mapping.unwrap();
        assert!(mapping == map_a || mapping == map_b, "mixed mapping {mapping:?}");
        let expected = if mapping == map_a { levels[0] } else { levels[1] };
        assert_eq!(snap.level_ml, expected);
        assert!(levels.contains(&tank.get_level()));
    }

    operator.join().unwrap();
    done.store(true, Ordering::Relaxed);
    sampler.join().unwrap();
}
