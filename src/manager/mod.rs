//! Simulation lifecycle manager.
//!
//! The embedding application writes a requested lifecycle state into
//! `DataInp` every tick; the manager reconciles it against the achieved
//! state, drives the flight model, and reports the achieved state back
//! through `DataOut`. Model failures never cross this boundary as
//! errors: they are logged and collapsed into the `Stopped` state.

pub mod statistics;

use crate::aircraft::{ModelSetup, Registry};
use crate::aircraft::model::FlightModel;
use crate::data::{Crash, DataInp, DataOut, Recording, StateInp, StateOut};
use crate::utils::MIN_INIT_ALTITUDE;
use log::{error, info, warn};
use statistics::StepStatistics;
use std::time::Instant;

/// The lifecycle state machine around one flight model.
pub struct Manager {
    state: StateOut,
    aircraft: Option<Box<dyn FlightModel>>,
    registry: Registry,
    stats: StepStatistics,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    pub fn new() -> Self {
        Self::with_registry(Registry::standard())
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self {
            state: StateOut::Idle,
            aircraft: None,
            registry,
            stats: StepStatistics::new(0.0),
        }
    }

    pub fn state(&self) -> StateOut {
        self.state
    }

    pub fn aircraft(&self) -> Option<&dyn FlightModel> {
        self.aircraft.as_deref()
    }

    /// One simulation tick: reconcile the requested state, run the
    /// matching phase, publish the achieved state.
    pub fn step(&mut self, dt: f64, inp: &DataInp, out: &mut DataOut) {
        match reconcile(inp.state_inp, self.state) {
            StateInp::Idle => self.update_state_idle(dt, inp, out),
            StateInp::Init => self.update_state_init(dt, inp, out),
            StateInp::Work => self.update_state_work(dt, inp, out),
            StateInp::Pause => self.update_state_pause(inp, out),
            StateInp::Stop => self.update_state_stop(out),
        }
        out.state_out = self.state;
    }

    /// Idle: no model exists; telemetry previews the initial conditions.
    fn update_state_idle(&mut self, dt: f64, inp: &DataInp, out: &mut DataOut) {
        if self.state != StateOut::Idle {
            info!("entering idle");
        }
        self.state = StateOut::Idle;
        self.aircraft = None;
        self.stats.reset(dt);

        let ic = inp.initial_conditions;
        let on_ground = ic.altitude_agl < MIN_INIT_ALTITUDE;
        let agl = if on_ground { 0.0 } else { ic.altitude_agl };

        *out = DataOut::default();
        out.crash = Crash::NoCrash;
        out.flight.latitude = ic.latitude;
        out.flight.longitude = ic.longitude;
        out.flight.altitude_agl = agl;
        out.flight.altitude_asl = inp.ground.elevation + agl;
        out.flight.heading = ic.heading;
        out.flight.airspeed = if on_ground { 0.0 } else { ic.airspeed };
        out.flight.on_ground = on_ground;
    }

    fn update_state_init(&mut self, dt: f64, inp: &DataInp, out: &mut DataOut) {
        self.state = StateOut::Initializing;

        if self.aircraft.is_none() {
            let setup = ModelSetup {
                ground_elevation: inp.ground.elevation,
            };
            match self.registry.build(inp.aircraft_type, &setup) {
                Ok(aircraft) => {
                    info!("building {:?} airframe", inp.aircraft_type);
                    self.aircraft = Some(aircraft);
                    self.stats.reset(dt);
                }
                Err(err) => {
                    error!("model construction failed: {}", err.chain());
                    self.state = StateOut::Stopped;
                    return;
                }
            }
        }

        let aircraft = self.aircraft.as_mut().unwrap();
        aircraft.set_input(inp);
        let replay = inp.recording == Recording::Replay;
        if let Err(err) = aircraft.initialize(replay) {
            error!("initialization failed: {}", err.chain());
            self.aircraft = None;
            self.state = StateOut::Stopped;
            return;
        }

        if aircraft.is_ready() {
            info!("ready: {}", aircraft.describe_state());
            self.state = StateOut::Ready;
        }
        self.aircraft.as_ref().unwrap().update_data_out(out);
    }

    fn update_state_work(&mut self, dt: f64, inp: &DataInp, out: &mut DataOut) {
        let aircraft = match self.aircraft.as_mut() {
            Some(aircraft) => aircraft,
            None => {
                warn!("work requested without a model");
                self.state = StateOut::Stopped;
                return;
            }
        };
        self.state = StateOut::Working;

        aircraft.set_input(inp);
        let started = Instant::now();
        if let Err(err) = aircraft.step(dt) {
            error!("simulation step failed: {}", err.chain());
            self.aircraft = None;
            self.state = StateOut::Stopped;
            return;
        }
        self.stats.record(started.elapsed().as_secs_f64(), dt);
        aircraft.update_data_out(out);

        let crash = aircraft.crash();
        if crash != Crash::NoCrash && inp.recording != Recording::Replay {
            warn!(
                "flight ended in {}: {}",
                crash_description(crash),
                aircraft.describe_state()
            );
            if self.stats.count() > 0 {
                info!("step timing: {}", self.stats.summary());
            }
            self.aircraft = None;
            self.state = StateOut::Stopped;
        }
    }

    fn update_state_pause(&mut self, inp: &DataInp, out: &mut DataOut) {
        self.state = StateOut::Paused;
        if let Some(aircraft) = self.aircraft.as_mut() {
            aircraft.set_input(inp);
            aircraft.update_data_out(out);
        }
    }

    fn update_state_stop(&mut self, out: &mut DataOut) {
        if let Some(aircraft) = self.aircraft.take() {
            info!("end of flight: {}", aircraft.describe_state());
            // A flight stopped before its first step has no timings.
            if self.stats.count() > 0 {
                info!("step timing: {}", self.stats.summary());
            }
            aircraft.update_data_out(out);
        }
        self.state = StateOut::Stopped;
    }
}

/// Reconcile the requested lifecycle state with the achieved one. A
/// request that skips a legal transition is redirected to the nearest
/// state on the way; irrecoverable combinations collapse to `Stop`.
pub fn reconcile(requested: StateInp, achieved: StateOut) -> StateInp {
    match requested {
        StateInp::Idle => match achieved {
            StateOut::Idle | StateOut::Stopped => StateInp::Idle,
            _ => StateInp::Stop,
        },
        StateInp::Init => match achieved {
            StateOut::Idle | StateOut::Initializing | StateOut::Ready => StateInp::Init,
            _ => StateInp::Stop,
        },
        StateInp::Work => match achieved {
            StateOut::Idle | StateOut::Initializing => StateInp::Init,
            StateOut::Ready | StateOut::Working | StateOut::Paused => StateInp::Work,
            StateOut::Stopped => StateInp::Stop,
        },
        StateInp::Pause => match achieved {
            StateOut::Idle | StateOut::Initializing => StateInp::Init,
            StateOut::Ready | StateOut::Working | StateOut::Paused => StateInp::Pause,
            StateOut::Stopped => StateInp::Stop,
        },
        StateInp::Stop => StateInp::Stop,
    }
}

fn crash_description(crash: Crash) -> &'static str {
    match crash {
        Crash::NoCrash => "no crash",
        Crash::Collision => "a terrain collision",
        Crash::Overspeed => "an overspeed",
        Crash::Overstressed => "an airframe overstress",
    }
}
