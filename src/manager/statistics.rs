//! Step-time accounting for one flight.

/// Running min/max/mean/variance over one series of samples, Welford's
/// online algorithm.
#[derive(Debug, Clone, Copy)]
struct Series {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Series {
    fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: 0.0,
        }
    }

    fn record(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);

        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// Per-flight step accounting: wall-clock step durations, the raw
/// integration time steps the embedder asked for, how the durations
/// split around the nominal step, and the accumulated flight time.
#[derive(Debug, Clone, Copy)]
pub struct StepStatistics {
    /// Nominal step duration [s]
    nominal: f64,
    /// Wall-clock duration of each step
    wall: Series,
    /// Requested integration time step of each step
    timestep: Series,
    /// Steps that finished under the nominal duration
    under_budget: u64,
    /// Steps that took longer than the nominal duration
    over_budget: u64,
    /// Accumulated simulated flight time [s]
    flight_time: f64,
}

impl StepStatistics {
    pub fn new(nominal: f64) -> Self {
        Self {
            nominal,
            wall: Series::new(),
            timestep: Series::new(),
            under_budget: 0,
            over_budget: 0,
            flight_time: 0.0,
        }
    }

    pub fn reset(&mut self, nominal: f64) {
        *self = Self::new(nominal);
    }

    /// Record one step: its wall-clock `duration` and the integration
    /// time step `dt` it advanced the model by.
    pub fn record(&mut self, duration: f64, dt: f64) {
        self.wall.record(duration);
        self.timestep.record(dt);
        self.flight_time += dt;
        if duration > self.nominal {
            self.over_budget += 1;
        } else {
            self.under_budget += 1;
        }
    }

    pub fn count(&self) -> u64 {
        self.wall.count
    }

    pub fn mean(&self) -> f64 {
        self.wall.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.wall.std_dev()
    }

    pub fn timestep_mean(&self) -> f64 {
        self.timestep.mean
    }

    pub fn timestep_variance(&self) -> f64 {
        self.timestep.variance()
    }

    pub fn flight_time(&self) -> f64 {
        self.flight_time
    }

    /// One-line summary for the end-of-flight log.
    pub fn summary(&self) -> String {
        if self.wall.count == 0 {
            return "no steps recorded".to_string();
        }
        format!(
            "{} steps over {:.1} s of flight, wall mean {:.3} ms, sd {:.3} ms, \
             min {:.3} ms, max {:.3} ms, {} under / {} over the {:.1} ms budget, \
             dt mean {:.1} ms, min {:.1} ms, max {:.1} ms",
            self.wall.count,
            self.flight_time,
            self.wall.mean * 1.0e3,
            self.wall.std_dev() * 1.0e3,
            self.wall.min * 1.0e3,
            self.wall.max * 1.0e3,
            self.under_budget,
            self.over_budget,
            self.nominal * 1.0e3,
            self.timestep.mean * 1.0e3,
            self.timestep.min * 1.0e3,
            self.timestep.max * 1.0e3,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_extremes() {
        let mut stats = StepStatistics::new(0.01);
        for d in [0.002, 0.004, 0.012] {
            stats.record(d, 0.01);
        }
        assert_eq!(stats.count(), 3);
        assert_relative_eq!(stats.mean(), 0.006, epsilon = 1e-12);
        assert_relative_eq!(stats.std_dev(), 0.0052915026, epsilon = 1e-9);
        assert_eq!(stats.under_budget, 2);
        assert_eq!(stats.over_budget, 1);
        assert!(stats.summary().contains("3 steps"));
    }

    #[test]
    fn test_timestep_series_and_flight_time() {
        let mut stats = StepStatistics::new(0.01);
        for dt in [0.01, 0.01, 0.02] {
            stats.record(0.001, dt);
        }
        assert_relative_eq!(stats.flight_time(), 0.04, epsilon = 1e-12);
        assert_relative_eq!(stats.timestep_mean(), 0.04 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(
            stats.timestep_variance(),
            (2.0 * (0.01 / 3.0_f64).powi(2) + (0.02 / 3.0_f64).powi(2)) / 2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_empty_summary() {
        let stats = StepStatistics::new(0.01);
        assert_eq!(stats.summary(), "no steps recorded");
    }
}
