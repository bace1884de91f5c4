//! The composed helicopter model: five force/moment components around a
//! quaternion-based six-degree-of-freedom rigid-body integrator.
//!
//! One `step` is three phases. `ante_integration` rebuilds the derived
//! kinematic variables and lets every component update its internal
//! state. `integrate` advances internal sub-model lags and then the
//! 13-element state vector with a fixed-step fourth-order Runge-Kutta
//! scheme. `post_integration` renormalizes the attitude quaternion,
//! refreshes the derived variables and runs crash detection.

use crate::aircraft::aero::Aerodynamics;
use crate::aircraft::controls::Controls;
use crate::aircraft::gear::LandingGear;
use crate::aircraft::mass::Mass;
use crate::aircraft::model::{
    def_node, Component, FlightModel, MassProperties, StepContext,
};
use crate::aircraft::propulsion::Propulsion;
use crate::data::{BladeDataOut, Crash, DataInp, DataOut, MAX_BLADES};
use crate::environment::{Atmosphere, TerrainModel};
use crate::frames::{wgs84, Geo, Wgs84};
use crate::state::{DerivVector, StateVector};
use crate::utils::{
    normalize_angle, rad_to_deg, solve_gauss_jordan, FdmError, ForceMoment, GRAVITY,
    MIN_INIT_ALTITUDE,
};
use nalgebra::{Matrix3, Matrix6, UnitQuaternion, Vector3, Vector6};
use serde::Deserialize;

/// Structural and performance limits beyond which a flight ends in a
/// crash classification.
#[derive(Debug, Clone, Copy, Deserialize)]
struct Limits {
    /// Never-exceed airspeed [m/s]
    airspeed_max: f64,
    /// Allowed total load-factor band [-]
    load_min: f64,
    load_max: f64,
    /// Largest single-strut load factor [-]
    load_gear_max: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct AirframeDef {
    limits: Limits,
    /// Fuselage hard points checked against terrain [m, body axes]
    collision_points: Vec<[f64; 3]>,
    /// Pilot station in body axes [m]
    pilot_position: [f64; 3],
}

/// Derived kinematic variables, a pure function of the state vector and
/// the environment, recomputed whenever the state changes.
#[derive(Debug, Clone, Copy)]
pub struct Kinematics {
    pub geo: Geo,
    /// Rotation taking body vectors to local NED vectors
    pub att_ned_bas: UnitQuaternion<f64>,
    pub roll: f64,
    pub pitch: f64,
    pub heading: f64,
    pub angle_of_attack: f64,
    pub sideslip_angle: f64,
    pub airspeed: f64,
    pub mach: f64,
    pub climb_rate: f64,
    pub ground_speed: f64,
    pub course: f64,
    pub altitude_asl: f64,
    pub altitude_agl: f64,
    /// Gravity acceleration in body axes [m/s^2]
    pub grav_bas: Vector3<f64>,
    pub rho: f64,
    pub speed_of_sound: f64,
}

impl Default for Kinematics {
    fn default() -> Self {
        Self {
            geo: Geo::default(),
            att_ned_bas: UnitQuaternion::identity(),
            roll: 0.0,
            pitch: 0.0,
            heading: 0.0,
            angle_of_attack: 0.0,
            sideslip_angle: 0.0,
            airspeed: 0.0,
            mach: 0.0,
            climb_rate: 0.0,
            ground_speed: 0.0,
            course: 0.0,
            altitude_asl: 0.0,
            altitude_agl: 0.0,
            grav_bas: Vector3::new(0.0, 0.0, GRAVITY),
            rho: 1.225,
            speed_of_sound: 340.0,
        }
    }
}

impl Kinematics {
    fn derive(
        state: &StateVector,
        terrain: &dyn TerrainModel,
        atmosphere: &mut Atmosphere,
    ) -> Self {
        let wgs = Wgs84::from_cartesian(state.pos_wgs);
        let geo = wgs.geo();
        let att_wgs_bas = state.attitude();
        let att_ned_bas = wgs.wgs_from_ned().inverse() * att_wgs_bas;
        let (roll, pitch, yaw) = att_ned_bas.euler_angles();

        let altitude_asl = geo.alt;
        let altitude_agl = altitude_asl - terrain.elevation(geo.lat, geo.lon);
        atmosphere.update(altitude_asl);

        let grav_bas = att_ned_bas
            .inverse_transform_vector(&Vector3::new(0.0, 0.0, wgs.gravity()));

        // Still air; the air-relative velocity is the inertial one.
        let v = state.vel_bas;
        let airspeed = v.norm();
        let angle_of_attack = if v.x.abs() > 1.0e-9 || v.z.abs() > 1.0e-9 {
            v.z.atan2(v.x)
        } else {
            0.0
        };
        let sideslip_angle = if airspeed > 1.0e-6 {
            (v.y / airspeed).asin()
        } else {
            0.0
        };

        let vel_ned = att_ned_bas * v;
        let ground_speed = (vel_ned.x * vel_ned.x + vel_ned.y * vel_ned.y).sqrt();
        let course = if ground_speed > 1.0e-6 {
            normalize_angle(vel_ned.y.atan2(vel_ned.x))
        } else {
            0.0
        };

        Self {
            geo,
            att_ned_bas,
            roll,
            pitch,
            heading: normalize_angle(yaw),
            angle_of_attack,
            sideslip_angle,
            airspeed,
            mach: airspeed / atmosphere.speed_of_sound(),
            climb_rate: -vel_ned.z,
            ground_speed,
            course,
            altitude_asl,
            altitude_agl,
            grav_bas,
            rho: atmosphere.density(),
            speed_of_sound: atmosphere.speed_of_sound(),
        }
    }
}

/// One helicopter instance.
pub struct Aircraft {
    state: StateVector,
    deriv: DerivVector,
    kin: Kinematics,

    atmosphere: Atmosphere,
    terrain: Box<dyn TerrainModel>,

    mass: Mass,
    aero: Aerodynamics,
    controls: Controls,
    gear: LandingGear,
    propulsion: Propulsion,

    limits: Limits,
    collision_points: Vec<Vector3<f64>>,
    pilot_position: Vector3<f64>,

    input: DataInp,
    crash: Crash,
    /// Collision-point positions of the previous step, for segment tests.
    prev_points_geo: Vec<Geo>,

    init_ticks: u32,
    ready: bool,
}

impl Aircraft {
    /// Build an aircraft from a YAML definition document.
    pub fn from_yaml(doc: &str, terrain: Box<dyn TerrainModel>) -> Result<Self, FdmError> {
        let doc: serde_yaml::Value = serde_yaml::from_str(doc)?;

        let airframe: AirframeDef =
            serde_yaml::from_value(def_node(&doc, "airframe")?.clone())?;
        if airframe.collision_points.is_empty() {
            return Err(FdmError::Config(
                "airframe.collision_points: at least one point required".into(),
            ));
        }
        if airframe.limits.airspeed_max <= 0.0 {
            return Err(FdmError::Config(
                "airframe.limits.airspeed_max: must be positive".into(),
            ));
        }
        if airframe.limits.load_min >= airframe.limits.load_max {
            return Err(FdmError::Config(
                "airframe.limits: load_min must be below load_max".into(),
            ));
        }

        let mut mass = Mass::default();
        let mut aero = Aerodynamics::default();
        let mut controls = Controls::default();
        let mut gear = LandingGear::default();
        let mut propulsion = Propulsion::default();

        mass.read_data(def_node(&doc, "mass")?)
            .map_err(|e| e.context("reading the mass section failed"))?;
        aero.read_data(def_node(&doc, "aerodynamics")?)
            .map_err(|e| e.context("reading the aerodynamics section failed"))?;
        controls
            .read_data(def_node(&doc, "controls")?)
            .map_err(|e| e.context("reading the controls section failed"))?;
        gear.read_data(def_node(&doc, "landing_gear")?)
            .map_err(|e| e.context("reading the landing_gear section failed"))?;
        propulsion
            .read_data(def_node(&doc, "propulsion")?)
            .map_err(|e| e.context("reading the propulsion section failed"))?;

        Ok(Self {
            state: StateVector::default(),
            deriv: DerivVector::default(),
            kin: Kinematics::default(),
            atmosphere: Atmosphere::default(),
            terrain,
            mass,
            aero,
            controls,
            gear,
            propulsion,
            limits: airframe.limits,
            collision_points: airframe
                .collision_points
                .iter()
                .map(|&p| Vector3::from(p))
                .collect(),
            pilot_position: Vector3::from(airframe.pilot_position),
            input: DataInp::default(),
            crash: Crash::NoCrash,
            prev_points_geo: Vec::new(),
            init_ticks: 0,
            ready: false,
        })
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.kin
    }

    pub fn on_ground(&self) -> bool {
        self.gear.on_ground()
    }

    fn step_context(&self, state: &StateVector, kin: &Kinematics) -> StepContext {
        StepContext {
            vel_bas: state.vel_bas,
            omg_bas: state.omg_bas,
            vel_air_bas: state.vel_bas,
            omg_air_bas: state.omg_bas,
            grav_bas: kin.grav_bas,
            att_ned_bas: kin.att_ned_bas,
            altitude_agl: kin.altitude_agl,
            rho: kin.rho,
            speed_of_sound: kin.speed_of_sound,
            controls: self.controls.positions(),
        }
    }

    fn ante_integration(&mut self) -> Result<(), FdmError> {
        self.kin = Kinematics::derive(&self.state, self.terrain.as_ref(), &mut self.atmosphere);

        let ctx = self.step_context(&self.state, &self.kin);
        self.controls.update(&ctx)?;
        let ctx = self.step_context(&self.state, &self.kin);
        self.mass.update(&ctx)?;
        self.aero.update(&ctx)?;
        self.gear.update(&ctx)?;
        self.propulsion.update(&ctx)?;
        Ok(())
    }

    fn integrate(&mut self, dt: f64) -> Result<(), FdmError> {
        // Sub-models with their own time constants go first.
        self.controls.integrate(dt);
        self.propulsion.integrate(dt);

        let s0 = self.state;
        let k1 = self.compute_state_deriv(&s0)?;
        let k2 = self.compute_state_deriv(&(s0 + k1 * (0.5 * dt)))?;
        let k3 = self.compute_state_deriv(&(s0 + k2 * (0.5 * dt)))?;
        let k4 = self.compute_state_deriv(&(s0 + k3 * dt))?;

        self.state = s0 + (k1 + (k2 + k3) * 2.0 + k4) * (dt / 6.0);

        // Report body-axes accelerations from the step itself.
        self.deriv = DerivVector {
            vel_wgs: (self.state.pos_wgs - s0.pos_wgs) / dt,
            att_dot: (self.state.att_wgs - s0.att_wgs) * (1.0 / dt),
            acc_bas: (self.state.vel_bas - s0.vel_bas) / dt,
            eps_bas: (self.state.omg_bas - s0.omg_bas) / dt,
        };
        Ok(())
    }

    fn post_integration(&mut self) -> Result<(), FdmError> {
        self.state.normalize_attitude();
        if !self.state.is_finite() || !self.deriv.is_finite() {
            return Err(FdmError::UnexpectedNaN("the state vector".into()));
        }
        self.kin = Kinematics::derive(&self.state, self.terrain.as_ref(), &mut self.atmosphere);
        self.detect_crash();
        Ok(())
    }

    /// Full state derivative at `state`: kinematics plus the coupled
    /// translational/rotational dynamics with a center of mass offset
    /// from the body origin.
    fn compute_state_deriv(&mut self, state: &StateVector) -> Result<DerivVector, FdmError> {
        let kin = Kinematics::derive(state, self.terrain.as_ref(), &mut self.atmosphere);
        let ctx = self.step_context(state, &kin);

        let mut fm = ForceMoment::default();
        fm = fm + self.mass.compute_force_and_moment(&ctx)?;
        fm = fm + self.aero.compute_force_and_moment(&ctx)?;
        fm = fm + self.gear.compute_force_and_moment(&ctx)?;
        fm = fm + self.propulsion.compute_force_and_moment(&ctx)?;

        let m = self.mass.mass();
        let inertia = self.mass.inertia_matrix();
        let s = self.mass.first_moment();
        let s_skew = skew(&s);

        let v = state.vel_bas;
        let w = state.omg_bas;

        // Momenta about the body origin.
        let p = m * v + w.cross(&s);
        let h = inertia * w + s.cross(&v);

        // [ mI  -S(s) ] [vdot]   [ F - w x p         ]
        // [ S(s)   I  ] [wdot] = [ M - w x h - v x p ]
        let mut a = Matrix6::<f64>::zeros();
        a.fixed_slice_mut::<3, 3>(0, 0)
            .copy_from(&(Matrix3::identity() * m));
        a.fixed_slice_mut::<3, 3>(0, 3).copy_from(&(-s_skew));
        a.fixed_slice_mut::<3, 3>(3, 0).copy_from(&s_skew);
        a.fixed_slice_mut::<3, 3>(3, 3).copy_from(&inertia);

        let rhs_f = fm.force - w.cross(&p);
        let rhs_m = fm.moment - w.cross(&h) - v.cross(&p);
        let mut b = Vector6::<f64>::zeros();
        b.fixed_rows_mut::<3>(0).copy_from(&rhs_f);
        b.fixed_rows_mut::<3>(3).copy_from(&rhs_m);

        let sol = solve_gauss_jordan(&a, &b).ok_or_else(|| FdmError::Model {
            context: "the mass matrix is singular".into(),
            source: None,
        })?;
        let mut acc_bas = Vector3::new(sol[0], sol[1], sol[2]);
        let eps_bas = Vector3::new(sol[3], sol[4], sol[5]);

        // Coriolis correction for the rotating Earth-fixed frame.
        let omega_e_bas = state
            .attitude()
            .inverse_transform_vector(&Wgs84::earth_rate());
        acc_bas -= 2.0 * omega_e_bas.cross(&v);

        let (vel_wgs, att_dot) = state.kinematic_deriv();
        let deriv = DerivVector {
            vel_wgs,
            att_dot,
            acc_bas,
            eps_bas,
        };
        if !deriv.is_finite() {
            return Err(FdmError::UnexpectedNaN("the state derivative".into()));
        }
        Ok(deriv)
    }

    fn detect_crash(&mut self) {
        if self.crash != Crash::NoCrash {
            return;
        }

        let att = self.state.attitude();
        let points_geo: Vec<Geo> = self
            .collision_points
            .iter()
            .map(|p| wgs84::cartesian_to_geo(&(self.state.pos_wgs + att * p)))
            .collect();

        let mut collision = false;
        if self.prev_points_geo.len() == points_geo.len() {
            for (prev, curr) in self.prev_points_geo.iter().zip(&points_geo) {
                if self.terrain.intersect(prev, curr) {
                    collision = true;
                    break;
                }
            }
        }
        self.prev_points_geo = points_geo;

        let overspeed = self.kin.airspeed > self.limits.airspeed_max;

        // Aerodynamic load factor carried by the airframe, plus the
        // single-strut load. Ground reactions and gravity stay out of
        // the airframe stress check.
        let weight = self.mass.mass() * GRAVITY;
        let lift = self.aero.last_force() + self.propulsion.last_force();
        let load = -lift.z / weight;
        let overstressed = load < self.limits.load_min
            || load > self.limits.load_max
            || self.gear.max_strut_force() > self.limits.load_gear_max * weight;

        self.crash = classify_crash(collision, overspeed, overstressed);
    }

    /// Place the aircraft at the latched initial conditions. Below
    /// `MIN_INIT_ALTITUDE` the flight starts parked, struts settled
    /// under static load.
    fn setup_initial_state(&mut self) -> Result<(), FdmError> {
        let ic = self.input.initial_conditions;
        let ground_elev = self.input.ground.elevation;
        let on_ground = ic.altitude_agl < MIN_INIT_ALTITUDE;

        let agl = if on_ground {
            self.gear.settled_height(self.mass.mass() * GRAVITY)
        } else {
            ic.altitude_agl
        };

        let base = Wgs84::from_geo(Geo {
            lat: ic.latitude,
            lon: ic.longitude,
            alt: ground_elev + agl,
        });
        let offset_ned = Vector3::new(ic.offset_x, ic.offset_y, 0.0);
        let pos_wgs = base.pos() + base.wgs_from_ned() * offset_ned;
        let wgs = Wgs84::from_cartesian(pos_wgs);

        let att_ned_bas = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), ic.heading);
        let att_wgs = wgs.wgs_from_ned() * att_ned_bas;

        let vel_bas = if on_ground {
            Vector3::zeros()
        } else {
            Vector3::new(ic.airspeed, 0.0, 0.0)
        };

        self.state = StateVector::new(pos_wgs, att_wgs, vel_bas, Vector3::zeros());
        self.deriv = DerivVector::default();
        self.crash = Crash::NoCrash;
        self.prev_points_geo.clear();
        Ok(())
    }
}

/// Crash classification with a fixed priority: a terrain collision
/// outranks overspeed, which outranks overstress.
pub fn classify_crash(collision: bool, overspeed: bool, overstressed: bool) -> Crash {
    if collision {
        Crash::Collision
    } else if overspeed {
        Crash::Overspeed
    } else if overstressed {
        Crash::Overstressed
    } else {
        Crash::NoCrash
    }
}

fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    #[rustfmt::skip]
    let m = Matrix3::new(
        0.0,  -v.z,  v.y,
        v.z,   0.0, -v.x,
       -v.y,   v.x,  0.0,
    );
    m
}

impl FlightModel for Aircraft {
    fn initialize(&mut self, replay: bool) -> Result<(), FdmError> {
        self.init_ticks += 1;
        if self.init_ticks == 1 {
            self.setup_initial_state()
                .map_err(|e| e.context("initial state setup failed"))?;
            if !replay {
                self.propulsion.spool_up();
            }
        }

        self.ante_integration()
            .map_err(|e| e.context("initialization update failed"))?;
        // The actuators start a flight at the commanded positions, not
        // at the bottom of their travel.
        self.controls.snap_to_target();

        if replay {
            self.ready = true;
        } else if self.init_ticks >= 2 {
            // Warm the rotor trim once before declaring readiness.
            let ctx = self.step_context(&self.state, &self.kin);
            self.propulsion
                .compute_force_and_moment(&ctx)
                .map_err(|e| e.context("rotor trim warm-up failed"))?;
            self.ready = true;
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn set_input(&mut self, inp: &DataInp) {
        self.input = *inp;
        self.controls.set_input(&inp.controls);
    }

    fn step(&mut self, dt: f64) -> Result<(), FdmError> {
        self.ante_integration()
            .map_err(|e| e.context("pre-integration update failed"))?;
        self.integrate(dt)
            .map_err(|e| e.context("state integration failed"))?;
        self.post_integration()
            .map_err(|e| e.context("post-integration update failed"))?;
        Ok(())
    }

    fn set_state_vector(&mut self, state: StateVector) -> Result<(), FdmError> {
        self.state = state;
        self.state.normalize_attitude();
        if !self.state.is_finite() {
            return Err(FdmError::UnexpectedNaN("the state vector".into()));
        }
        self.deriv = DerivVector::default();
        self.crash = Crash::NoCrash;
        self.prev_points_geo.clear();
        self.kin = Kinematics::derive(&self.state, self.terrain.as_ref(), &mut self.atmosphere);
        Ok(())
    }

    fn state_vector(&self) -> StateVector {
        self.state
    }

    fn crash(&self) -> Crash {
        self.crash
    }

    fn describe_state(&self) -> String {
        format!(
            "lat {:.5} deg, lon {:.5} deg, alt {:.1} m, hdg {:.0} deg, tas {:.1} m/s",
            rad_to_deg(self.kin.geo.lat),
            rad_to_deg(self.kin.geo.lon),
            self.kin.altitude_asl,
            rad_to_deg(self.kin.heading),
            self.kin.airspeed,
        )
    }

    fn update_data_out(&self, out: &mut DataOut) {
        out.crash = self.crash;

        let f = &mut out.flight;
        f.latitude = self.kin.geo.lat;
        f.longitude = self.kin.geo.lon;
        f.altitude_asl = self.kin.altitude_asl;
        f.altitude_agl = self.kin.altitude_agl;
        f.roll = self.kin.roll;
        f.pitch = self.kin.pitch;
        f.heading = self.kin.heading;
        f.angle_of_attack = self.kin.angle_of_attack;
        f.sideslip_angle = self.kin.sideslip_angle;
        f.course = self.kin.course;
        f.roll_rate = self.state.omg_bas.x;
        f.pitch_rate = self.state.omg_bas.y;
        f.yaw_rate = self.state.omg_bas.z;
        f.airspeed = self.kin.airspeed;
        f.mach = self.kin.mach;
        f.climb_rate = self.kin.climb_rate;
        f.ground_speed = self.kin.ground_speed;
        f.accel_x = self.deriv.acc_bas.x;
        f.accel_y = self.deriv.acc_bas.y;
        f.accel_z = self.deriv.acc_bas.z;

        // Load factors felt at the pilot station.
        let r = self.pilot_position;
        let w = self.state.omg_bas;
        let acc_pilot =
            self.deriv.acc_bas + self.deriv.eps_bas.cross(&r) + w.cross(&w.cross(&r));
        f.g_force_x = (self.kin.grav_bas.x - acc_pilot.x) / GRAVITY;
        f.g_force_y = (self.kin.grav_bas.y - acc_pilot.y) / GRAVITY;
        f.g_force_z = (self.kin.grav_bas.z - acc_pilot.z) / GRAVITY;
        f.on_ground = self.gear.on_ground();

        out.engine_count = 1;
        out.engines[0].rpm_norm = self.propulsion.rpm_norm();

        if let Some(rotor) = self.propulsion.rotor() {
            out.engines[0].torque = rotor.torque();

            let controls = self.controls.positions();
            let blade_count = rotor.blade_count().min(MAX_BLADES);
            let r = &mut out.rotor;
            r.azimuth = rotor.azimuth();
            r.omega = rotor.omega();
            r.coning_angle = rotor.coning_angle();
            r.disk_roll = rotor.disk_roll();
            r.disk_pitch = rotor.disk_pitch();
            r.collective = controls.collective;
            r.cyclic_lat = controls.cyclic_lat;
            r.cyclic_lon = controls.cyclic_lon;
            r.blade_count = blade_count;

            // Per-blade angles reconstructed from the disk solution.
            let n = rotor.blade_count() as f64;
            for (i, blade) in r.blades.iter_mut().take(blade_count).enumerate() {
                let psi = rotor.azimuth() + i as f64 * 2.0 * std::f64::consts::PI / n;
                *blade = BladeDataOut {
                    flapping: rotor.coning_angle()
                        + rotor.disk_pitch() * psi.cos()
                        + rotor.disk_roll() * psi.sin(),
                    feathering: controls.collective
                        + controls.cyclic_lat * psi.cos()
                        + controls.cyclic_lon * psi.sin(),
                };
            }
        }
    }
}
