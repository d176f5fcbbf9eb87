//! Render statistics shared with the application
//!
//! The driver refreshes these after every pass; the application reads them
//! through the shared handle whenever it wants to update status displays.
//! Statistics for an iteration are written no earlier than the frame-ready
//! notification for that iteration.

use crate::render::request::RenderMethod;
use std::time::Duration;

/// Snapshot of iteration progress and photon accounting
#[derive(Debug, Clone, Default)]
pub struct RenderStatistics {
    /// Number of passes completed in the current sequence
    pub iterations_completed: u64,

    /// Current PPM search radius, after the latest shrink
    pub current_radius: f64,

    /// Photons emitted per iteration; zero unless the method is PPM
    pub photons_per_iteration: u64,

    /// Total photons emitted this sequence; zero unless the method is PPM
    pub total_photons: u64,

    /// Mean steady-state pass duration, excluding the first pass
    pub mean_iteration_time: Option<Duration>,
}

impl RenderStatistics {
    /// Refresh after a completed pass
    pub fn fill(
        &mut self,
        iterations_completed: u64,
        current_radius: f64,
        method: RenderMethod,
        photons_per_iteration: u64,
        mean_iteration_time: Option<Duration>,
    ) {
        self.iterations_completed = iterations_completed;
        self.current_radius = current_radius;
        if method == RenderMethod::ProgressivePhotonMapping {
            self.photons_per_iteration = photons_per_iteration;
            self.total_photons = photons_per_iteration * iterations_completed;
        } else {
            self.photons_per_iteration = 0;
            self.total_photons = 0;
        }
        self.mean_iteration_time = mean_iteration_time;
    }
}

/// Steady-state pass timing for the current sequence
///
/// The first pass after a sequence restart pays one-time initialization and
/// device sync cost, so it is excluded from the mean.
#[derive(Debug, Default)]
pub struct IterationTiming {
    samples: u32,
    total: Duration,
    first_seen: bool,
}

impl IterationTiming {
    /// Record the duration of a completed pass
    pub fn record(&mut self, elapsed: Duration) {
        if !self.first_seen {
            self.first_seen = true;
            return;
        }
        self.samples += 1;
        self.total += elapsed;
    }

    /// Mean steady-state pass duration, if any steady-state pass completed
    pub fn mean(&self) -> Option<Duration> {
        (self.samples > 0).then(|| self.total / self.samples)
    }

    /// Forget all samples (sequence restart)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ppm_photon_accounting() {
        let mut stats = RenderStatistics::default();
        stats.fill(10, 50.0, RenderMethod::ProgressivePhotonMapping, 512 * 512, None);
        assert_eq!(stats.photons_per_iteration, 512 * 512);
        assert_eq!(stats.total_photons, 512 * 512 * 10);
    }

    #[test]
    fn test_vcm_reports_zero_photons() {
        let mut stats = RenderStatistics::default();
        stats.fill(10, 50.0, RenderMethod::VertexConnectionMerging, 512 * 512, None);
        assert_eq!(stats.photons_per_iteration, 0);
        assert_eq!(stats.total_photons, 0);
    }

    #[test]
    fn test_timing_excludes_first_pass() {
        let mut timing = IterationTiming::default();
        timing.record(Duration::from_secs(10)); // slow first pass
        assert_eq!(timing.mean(), None);
        timing.record(Duration::from_millis(100));
        timing.record(Duration::from_millis(300));
        assert_eq!(timing.mean(), Some(Duration::from_millis(200)));
    }

    #[test]
    fn test_timing_reset_forgets_samples() {
        let mut timing = IterationTiming::default();
        timing.record(Duration::from_millis(50));
        timing.record(Duration::from_millis(50));
        timing.reset();
        assert_eq!(timing.mean(), None);
    }
}
