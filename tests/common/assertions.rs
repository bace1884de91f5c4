use helidyn::data::DataOut;

/// Every published telemetry value must be finite and inside its
/// physical range.
pub fn assert_telemetry_valid(out: &DataOut) {
    let f = &out.flight;
    for (name, value) in [
        ("latitude", f.latitude),
        ("longitude", f.longitude),
        ("altitude_asl", f.altitude_asl),
        ("altitude_agl", f.altitude_agl),
        ("roll", f.roll),
        ("pitch", f.pitch),
        ("heading", f.heading),
        ("airspeed", f.airspeed),
        ("mach", f.mach),
        ("climb_rate", f.climb_rate),
        ("ground_speed", f.ground_speed),
        ("g_force_z", f.g_force_z),
    ] {
        assert!(value.is_finite(), "{} is not finite: {}", name, value);
    }
    assert!(f.airspeed >= 0.0);
    assert!(f.ground_speed >= 0.0);
    assert!(f.latitude.abs() <= std::f64::consts::FRAC_PI_2 + 1e-9);

    assert!(out.engine_count <= helidyn::data::MAX_ENGINES);
    assert!(out.rotor.blade_count <= helidyn::data::MAX_BLADES);
}
