//! Adaptive per-tick draw budget
//!
//! A deliberately simple hysteretic controller: the target moves by exactly
//! one millisecond per tick toward the configured goal and never leaves the
//! [min, max] bounds. The slow reaction is intentional; single-frame GPU
//! latency spikes must not swing the budget. Do not replace this with a
//! PID-style controller: downstream pacing guarantees depend on the
//! 1 ms/tick bound.

use crate::config::FrameBudgetConfig;

/// Budget adjustment step per tick, in milliseconds
const ADJUST_STEP_MS: f64 = 1.0;

/// Adaptive frame-budget controller
#[derive(Debug, Clone)]
pub struct FrameBudget {
    target_ms: f64,
    min_ms: f64,
    max_ms: f64,
}

impl FrameBudget {
    /// Create a controller from configured bounds (low-power doubling
    /// already applied by the config)
    pub fn new(config: &FrameBudgetConfig) -> Self {
        let (target_ms, min_ms, max_ms) = config.effective_bounds();
        Self {
            target_ms,
            min_ms,
            max_ms,
        }
    }

    /// Current per-tick draw budget in milliseconds
    pub fn target_ms(&self) -> f64 {
        self.target_ms
    }

    /// Configured floor
    pub fn min_ms(&self) -> f64 {
        self.min_ms
    }

    /// Configured ceiling
    pub fn max_ms(&self) -> f64 {
        self.max_ms
    }

    /// Fold in the measured full-redraw interval and nudge the target
    ///
    /// Frames arriving faster than the target mean there is headroom, so
    /// the budget grows (more draws per tick); slower frames shrink it.
    /// Movement is at most [`ADJUST_STEP_MS`] per call.
    pub fn adjust(&mut self, measured_interval_ms: f64) {
        if measured_interval_ms < self.target_ms && self.target_ms < self.max_ms {
            self.target_ms = (self.target_ms + ADJUST_STEP_MS).min(self.max_ms);
        } else if measured_interval_ms > self.target_ms && self.target_ms > self.min_ms {
            self.target_ms = (self.target_ms - ADJUST_STEP_MS).max(self.min_ms);
        }
    }

    /// Budget handed to the queue driver this tick
    ///
    /// Non-progressive mode draws everything in one tick, expressed as an
    /// unbounded budget.
    pub fn budget_for_tick(&self, progressive: bool) -> f64 {
        if progressive {
            self.target_ms
        } else {
            f64::INFINITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller() -> FrameBudget {
        FrameBudget::new(&FrameBudgetConfig::default())
    }

    #[test]
    fn test_target_stays_within_bounds() {
        let mut budget = controller();
        for _ in 0..200 {
            budget.adjust(0.0);
            assert!(budget.target_ms() >= budget.min_ms());
            assert!(budget.target_ms() <= budget.max_ms());
        }
        for _ in 0..200 {
            budget.adjust(1000.0);
            assert!(budget.target_ms() >= budget.min_ms());
            assert!(budget.target_ms() <= budget.max_ms());
        }
    }

    #[test]
    fn test_fast_frames_grow_budget_one_ms_per_tick() {
        let mut budget = controller();
        let start = budget.target_ms();
        for tick in 1..=10 {
            budget.adjust(10.0);
            assert_relative_eq!(budget.target_ms(), start + tick as f64, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_growth_stops_at_ceiling() {
        let mut budget = controller();
        // 1000/15 - 1000/30 ≈ 33.3 steps to the ceiling
        for _ in 0..100 {
            budget.adjust(1.0);
        }
        assert_relative_eq!(budget.target_ms(), budget.max_ms(), epsilon = 1e-9);
        budget.adjust(1.0);
        assert_relative_eq!(budget.target_ms(), budget.max_ms(), epsilon = 1e-9);
    }

    #[test]
    fn test_slow_frames_shrink_to_floor() {
        let mut budget = controller();
        for _ in 0..100 {
            budget.adjust(500.0);
        }
        assert_relative_eq!(budget.target_ms(), budget.min_ms(), epsilon = 1e-9);
    }

    #[test]
    fn test_measured_equal_to_target_holds_steady() {
        let mut budget = controller();
        let target = budget.target_ms();
        budget.adjust(target);
        assert_relative_eq!(budget.target_ms(), target, epsilon = 1e-9);
    }

    #[test]
    fn test_non_progressive_budget_unbounded() {
        let budget = controller();
        assert!(budget.budget_for_tick(false).is_infinite());
        assert_relative_eq!(budget.budget_for_tick(true), budget.target_ms());
    }

    #[test]
    fn test_low_power_bounds_doubled() {
        let config = FrameBudgetConfig::default().with_low_power(true);
        let budget = FrameBudget::new(&config);
        assert_relative_eq!(budget.target_ms(), 2000.0 / 30.0, epsilon = 1e-9);
        assert_relative_eq!(budget.max_ms(), 2000.0 / 15.0, epsilon = 1e-9);
    }
}
