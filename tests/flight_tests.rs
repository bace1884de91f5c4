//! End-to-end flight scenarios through the manager.

mod common;

use common::{airborne_input, assert_telemetry_valid, run_until, DT};
use helidyn::data::{Crash, DataOut, Recording, StateOut};
use helidyn::manager::Manager;
use pretty_assertions::assert_eq;

#[test]
fn test_high_collective_climbs() {
    let mut manager = Manager::new();
    let mut out = DataOut::default();
    let mut inp = airborne_input(500.0, 0.0);
    inp.controls.collective = 0.9;

    run_until(&mut manager, &inp, &mut out, StateOut::Working, 20);
    let alt0 = out.flight.altitude_asl;
    for _ in 0..300 {
        manager.step(DT, &inp, &mut out);
    }
    assert_eq!(out.state_out, StateOut::Working);
    assert!(out.flight.altitude_asl > alt0);
    assert!(out.flight.climb_rate > 0.0);
    assert_telemetry_valid(&out);
}

#[test]
fn test_overspeed_ends_the_flight() {
    let mut manager = Manager::new();
    let mut out = DataOut::default();
    // Well past the trainer's never-exceed speed.
    let inp = airborne_input(500.0, 100.0);

    run_until(&mut manager, &inp, &mut out, StateOut::Stopped, 50);
    assert_eq!(out.crash, Crash::Overspeed);
}

#[test]
fn test_replay_reports_crash_without_stopping() {
    let mut manager = Manager::new();
    let mut out = DataOut::default();
    let mut inp = airborne_input(500.0, 100.0);
    inp.recording = Recording::Replay;

    run_until(&mut manager, &inp, &mut out, StateOut::Working, 50);
    for _ in 0..20 {
        manager.step(DT, &inp, &mut out);
        assert_eq!(out.state_out, StateOut::Working);
    }
    assert_eq!(out.crash, Crash::Overspeed);
}

#[test]
fn test_unpowered_descent_ends_on_the_ground() {
    let mut manager = Manager::new();
    let mut out = DataOut::default();
    let mut inp = airborne_input(40.0, 0.0);
    inp.controls.collective = 0.0;

    // At flat pitch the machine sinks; forty meters is not survivable.
    run_until(&mut manager, &inp, &mut out, StateOut::Stopped, 2000);
    assert!(out.crash != Crash::NoCrash);
}

#[test]
fn test_attitude_stays_normalized_over_a_long_run() {
    let mut manager = Manager::new();
    let mut out = DataOut::default();
    let mut inp = airborne_input(800.0, 10.0);
    inp.controls.collective = 0.55;
    inp.controls.pitch = 0.1;

    run_until(&mut manager, &inp, &mut out, StateOut::Working, 20);
    for _ in 0..500 {
        manager.step(DT, &inp, &mut out);
        if out.state_out != StateOut::Working {
            break;
        }
    }
    let state = manager.aircraft().unwrap().state_vector();
    assert!((state.att_wgs.norm() - 1.0).abs() < 1.0e-9);
    assert_telemetry_valid(&out);
}

#[test]
fn test_utility_airframe_flies_too() {
    let mut manager = Manager::new();
    let mut out = DataOut::default();
    let mut inp = airborne_input(500.0, 0.0);
    inp.aircraft_type = helidyn::data::AircraftType::Utility;
    inp.controls.collective = 0.6;

    run_until(&mut manager, &inp, &mut out, StateOut::Working, 20);
    for _ in 0..100 {
        manager.step(DT, &inp, &mut out);
    }
    assert_eq!(out.state_out, StateOut::Working);
    assert_eq!(out.rotor.blade_count, 5);
    assert_telemetry_valid(&out);
}
