//! Lifecycle state machine behavior seen through the public buffers.

mod common;

use common::{airborne_input, parked_input, run_until, DT};
use helidyn::data::{Crash, DataOut, StateInp, StateOut};
use helidyn::manager::{reconcile, Manager};
use pretty_assertions::assert_eq;

#[test]
fn test_reconciliation_table_is_total_and_legal() {
    let requested = [
        StateInp::Idle,
        StateInp::Init,
        StateInp::Work,
        StateInp::Pause,
        StateInp::Stop,
    ];
    let achieved = [
        StateOut::Idle,
        StateOut::Initializing,
        StateOut::Ready,
        StateOut::Working,
        StateOut::Paused,
        StateOut::Stopped,
    ];

    for req in requested {
        for ach in achieved {
            let resolved = reconcile(req, ach);
            // A stopped machine only leaves through Idle.
            if ach == StateOut::Stopped && req != StateInp::Idle {
                assert_eq!(resolved, StateInp::Stop, "{:?} from {:?}", req, ach);
            }
            // Work and Pause never run without initialization first.
            if matches!(req, StateInp::Work | StateInp::Pause)
                && matches!(ach, StateOut::Idle | StateOut::Initializing)
            {
                assert_eq!(resolved, StateInp::Init, "{:?} from {:?}", req, ach);
            }
        }
    }
}

#[test]
fn test_idle_previews_initial_conditions() {
    let mut manager = Manager::new();
    let mut out = DataOut::default();
    let mut inp = airborne_input(500.0, 20.0);
    inp.state_inp = StateInp::Idle;

    manager.step(DT, &inp, &mut out);
    assert_eq!(out.state_out, StateOut::Idle);
    assert_eq!(out.flight.latitude, inp.initial_conditions.latitude);
    assert_eq!(out.flight.altitude_agl, 500.0);
    assert_eq!(out.flight.airspeed, 20.0);
    assert!(!out.flight.on_ground);
}

#[test]
fn test_idle_preview_below_threshold_reports_on_ground() {
    let mut manager = Manager::new();
    let mut out = DataOut::default();
    let mut inp = airborne_input(10.0, 25.0);
    inp.state_inp = StateInp::Idle;

    manager.step(DT, &inp, &mut out);
    assert!(out.flight.on_ground);
    assert_eq!(out.flight.airspeed, 0.0);
}

#[test]
fn test_work_request_initializes_then_flies() {
    let mut manager = Manager::new();
    let mut out = DataOut::default();
    let inp = airborne_input(500.0, 0.0);

    run_until(&mut manager, &inp, &mut out, StateOut::Working, 20);
    assert_eq!(out.crash, Crash::NoCrash);
    assert!(out.engines[0].rpm_norm > 0.9);
    common::assert_telemetry_valid(&out);
}

#[test]
fn test_pause_freezes_the_state_vector() {
    let mut manager = Manager::new();
    let mut out = DataOut::default();
    let mut inp = airborne_input(500.0, 0.0);

    run_until(&mut manager, &inp, &mut out, StateOut::Working, 20);
    for _ in 0..50 {
        manager.step(DT, &inp, &mut out);
    }

    inp.state_inp = StateInp::Pause;
    manager.step(DT, &inp, &mut out);
    assert_eq!(out.state_out, StateOut::Paused);

    let frozen = manager.aircraft().unwrap().state_vector();
    for _ in 0..10 {
        manager.step(DT, &inp, &mut out);
    }
    assert_eq!(manager.aircraft().unwrap().state_vector(), frozen);

    // Resuming picks the flight back up.
    inp.state_inp = StateInp::Work;
    manager.step(DT, &inp, &mut out);
    assert_eq!(out.state_out, StateOut::Working);
}

#[test]
fn test_stop_drops_the_model() {
    let mut manager = Manager::new();
    let mut out = DataOut::default();
    let mut inp = airborne_input(500.0, 0.0);

    run_until(&mut manager, &inp, &mut out, StateOut::Working, 20);
    inp.state_inp = StateInp::Stop;
    manager.step(DT, &inp, &mut out);
    assert_eq!(out.state_out, StateOut::Stopped);
    assert!(manager.aircraft().is_none());
}

#[test]
fn test_stop_before_first_step_ends_cleanly() {
    let mut manager = Manager::new();
    let mut out = DataOut::default();
    let mut inp = airborne_input(500.0, 0.0);
    inp.state_inp = StateInp::Init;

    // Stop straight out of Ready, with no work step ever recorded.
    run_until(&mut manager, &inp, &mut out, StateOut::Ready, 20);
    inp.state_inp = StateInp::Stop;
    manager.step(DT, &inp, &mut out);
    assert_eq!(out.state_out, StateOut::Stopped);
    assert!(manager.aircraft().is_none());
}

#[test]
fn test_idle_resets_after_stop() {
    let mut manager = Manager::new();
    let mut out = DataOut::default();
    let mut inp = airborne_input(500.0, 0.0);

    run_until(&mut manager, &inp, &mut out, StateOut::Working, 20);
    inp.state_inp = StateInp::Stop;
    manager.step(DT, &inp, &mut out);

    // Work from Stopped stays stopped; only Idle releases the latch.
    inp.state_inp = StateInp::Work;
    manager.step(DT, &inp, &mut out);
    assert_eq!(out.state_out, StateOut::Stopped);

    inp.state_inp = StateInp::Idle;
    manager.step(DT, &inp, &mut out);
    assert_eq!(out.state_out, StateOut::Idle);
    assert_eq!(out.crash, Crash::NoCrash);

    // And a fresh flight can start.
    inp.state_inp = StateInp::Work;
    run_until(&mut manager, &inp, &mut out, StateOut::Working, 20);
}

#[test]
fn test_parked_flight_is_stable() {
    let mut manager = Manager::new();
    let mut out = DataOut::default();
    let inp = parked_input();

    run_until(&mut manager, &inp, &mut out, StateOut::Working, 20);
    // Five simulated seconds sitting on the gear.
    for _ in 0..500 {
        manager.step(DT, &inp, &mut out);
        assert_eq!(out.state_out, StateOut::Working);
        assert_eq!(out.crash, Crash::NoCrash);
    }
    assert!(out.flight.on_ground);
    assert!(out.flight.altitude_agl < 2.0);
    common::assert_telemetry_valid(&out);
}
