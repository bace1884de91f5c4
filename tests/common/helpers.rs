use helidyn::data::{
    ControlsInp, DataInp, DataOut, GroundInp, InitialConditions, StateInp, StateOut,
};
use helidyn::manager::Manager;

pub const DT: f64 = 0.01;

/// Input for a flight starting in the air over flat ground at sea level.
pub fn airborne_input(altitude_agl: f64, airspeed: f64) -> DataInp {
    DataInp {
        state_inp: StateInp::Work,
        initial_conditions: InitialConditions {
            latitude: 0.92,
            longitude: -0.12,
            heading: 0.5,
            altitude_agl,
            airspeed,
            offset_x: 0.0,
            offset_y: 0.0,
        },
        controls: ControlsInp {
            collective: 0.5,
            ..Default::default()
        },
        ground: GroundInp { elevation: 0.0 },
        ..Default::default()
    }
}

/// Input for a cold start parked on the ground.
pub fn parked_input() -> DataInp {
    let mut inp = airborne_input(0.0, 0.0);
    inp.controls.collective = 0.0;
    inp
}

/// Step the manager until it reports `target` or `max_ticks` runs out.
/// Returns the number of ticks taken.
pub fn run_until(
    manager: &mut Manager,
    inp: &DataInp,
    out: &mut DataOut,
    target: StateOut,
    max_ticks: usize,
) -> usize {
    for tick in 0..max_ticks {
        manager.step(DT, inp, out);
        if out.state_out == target {
            return tick + 1;
        }
    }
    panic!(
        "manager never reached {:?}, still {:?} after {} ticks",
        target, out.state_out, max_ticks
    );
}
