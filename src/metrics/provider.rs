// Metrics providers

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Values measured by a metrics provider on each tick
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSample {
    /// Incoming bitrate (Mbps), only reported while the camera is publishing
    pub bitrate: f64,

    pub dropped_frames: u32,

    /// CPU usage (%)
    pub cpu: f64,

    /// Memory usage (MB)
    pub memory: u64,
}

/// Source of performance measurements
pub trait MetricsProvider: Send {
    /// Takes a new sample
    fn sample(&mut self) -> MetricsSample;
}

/// Provider that makes up plausible values
pub struct SyntheticMetricsProvider {
    rng: StdRng,
}

impl SyntheticMetricsProvider {
    /// Creates new SyntheticMetricsProvider seeded from the OS
    pub fn new() -> SyntheticMetricsProvider {
        SyntheticMetricsProvider {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates new SyntheticMetricsProvider with a fixed seed
    pub fn with_seed(seed: u64) -> SyntheticMetricsProvider {
        SyntheticMetricsProvider {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl MetricsProvider for SyntheticMetricsProvider {
    fn sample(&mut self) -> MetricsSample {
        MetricsSample {
            bitrate: round_to(self.rng.random_range(3.5..5.0), 2),
            dropped_frames: self.rng.random_range(0..5),
            cpu: round_to(self.rng.random_range(20.0..60.0), 1),
            memory: self.rng.random_range(800..1200),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_ranges() {
        let mut provider = SyntheticMetricsProvider::with_seed(7);

        for _ in 0..200 {
            let s = provider.sample();

            assert!(s.bitrate >= 3.5 && s.bitrate <= 5.0);
            assert!(s.dropped_frames < 5);
            assert!(s.cpu >= 20.0 && s.cpu <= 60.0);
            assert!(s.memory >= 800 && s.memory < 1200);
            assert_eq!(s.bitrate, round_to(s.bitrate, 2));
            assert_eq!(s.cpu, round_to(s.cpu, 1));
        }
    }
}
