//! Progressive photon mapping radius estimator
//!
//! The PPM search radius shrinks once per completed iteration following
//! `r'² = r² · (i + α) / (i + 1)` with the 0-based index of the iteration
//! that just finished. The resulting sequence is monotonically non-increasing
//! and converges toward zero variance at the cost of bias, which is the whole
//! point of the progressive estimator.

/// Apply one radius shrink step and return the new radius
///
/// `iteration` is the 0-based index of the completed iteration, read before
/// the iteration counter is incremented. `radius_squared` must be positive.
pub fn shrink(radius_squared: f64, iteration: u64, alpha: f64) -> f64 {
    debug_assert!(radius_squared > 0.0);
    #[allow(clippy::cast_precision_loss)]
    let index = iteration as f64;
    (radius_squared * (index + alpha) / (index + 1.0)).sqrt()
}

/// Running radius state for the current render sequence
#[derive(Debug, Clone)]
pub struct RadiusEstimator {
    initial: f64,
    current: f64,
}

impl RadiusEstimator {
    /// Create an estimator starting at `initial_radius`
    pub fn new(initial_radius: f64) -> Self {
        Self {
            initial: initial_radius,
            current: initial_radius,
        }
    }

    /// Radius to use for the next render pass
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Shrink the radius after the iteration at `iteration` completed
    pub fn shrink_after(&mut self, iteration: u64, alpha: f64) {
        self.current = shrink(self.current * self.current, iteration, alpha);
    }

    /// Restore the configured initial radius (sequence restart)
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALPHA: f64 = 2.0 / 3.0;

    #[test]
    fn test_first_shrink_from_initial_radius() {
        // r0 = 100, i = 0: sqrt(10000 * (0 + 2/3) / 1) = 81.6496...
        let new_radius = shrink(100.0 * 100.0, 0, ALPHA);
        assert_relative_eq!(new_radius, 81.649_658_092_772_6, epsilon = 1e-9);
    }

    #[test]
    fn test_shrink_is_monotonically_non_increasing() {
        let mut radius = 100.0_f64;
        for iteration in 0..10_000 {
            let next = shrink(radius * radius, iteration, ALPHA);
            assert!(next <= radius, "radius grew at iteration {iteration}");
            assert!(next > 0.0);
            radius = next;
        }
    }

    #[test]
    fn test_shrink_ratio_approaches_one() {
        // As i grows the per-step ratio (i + alpha) / (i + 1) tends to 1, so
        // late iterations barely move the radius.
        let late = shrink(1.0, 1_000_000, ALPHA);
        assert_relative_eq!(late, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_estimator_tracks_running_radius() {
        let mut estimator = RadiusEstimator::new(100.0);
        estimator.shrink_after(0, ALPHA);
        assert_relative_eq!(estimator.current(), 81.649_658_092_772_6, epsilon = 1e-9);
        estimator.shrink_after(1, ALPHA);
        assert!(estimator.current() < 81.65);
    }

    #[test]
    fn test_reset_restores_initial_radius() {
        let mut estimator = RadiusEstimator::new(42.0);
        estimator.shrink_after(0, ALPHA);
        estimator.shrink_after(1, ALPHA);
        estimator.reset();
        assert_relative_eq!(estimator.current(), 42.0);
    }
}
