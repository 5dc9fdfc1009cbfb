//! Time management utilities
//!
//! The viewer is driven by display-refresh callbacks that pass a monotonic
//! timestamp in milliseconds, so the clock here works on caller-supplied
//! timestamps rather than sampling `Instant` itself. That keeps redraw
//! pacing deterministic under test; only [`Stopwatch`] reads real time.

use std::time::{Duration, Instant};

/// Weight given to the previous average when folding in a new redraw interval
const INTERVAL_EMA_OLD_WEIGHT: f64 = 0.75;

/// Per-tick frame clock
///
/// Tracks the per-tick delta and an exponential moving average of the
/// wall-clock interval between successive full-redraw starts. The budget
/// controller feeds on the redraw interval, not the raw tick delta, because
/// only full redraws reflect the true cost of repainting the scene.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_tick_ms: Option<f64>,
    last_redraw_start_ms: Option<f64>,
    avg_redraw_interval_ms: Option<f64>,
    delta_ms: f64,
    total_ms: f64,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock with no history
    pub fn new() -> Self {
        Self {
            last_tick_ms: None,
            last_redraw_start_ms: None,
            avg_redraw_interval_ms: None,
            delta_ms: 0.0,
            total_ms: 0.0,
            frame_count: 0,
        }
    }

    /// Advance the clock (call once per display-refresh tick)
    pub fn tick(&mut self, now_ms: f64) {
        if let Some(last) = self.last_tick_ms {
            self.delta_ms = (now_ms - last).max(0.0);
            self.total_ms += self.delta_ms;
        }
        self.last_tick_ms = Some(now_ms);
        self.frame_count += 1;
    }

    /// Record that a full redraw cycle starts at `now_ms`
    ///
    /// Folds the interval since the previous redraw start into the moving
    /// average with weight 0.75 old / 0.25 new.
    pub fn begin_redraw(&mut self, now_ms: f64) {
        if let Some(last_start) = self.last_redraw_start_ms {
            let interval = (now_ms - last_start).max(0.0);
            self.avg_redraw_interval_ms = Some(match self.avg_redraw_interval_ms {
                Some(avg) => {
                    avg * INTERVAL_EMA_OLD_WEIGHT + interval * (1.0 - INTERVAL_EMA_OLD_WEIGHT)
                }
                None => interval,
            });
        }
        self.last_redraw_start_ms = Some(now_ms);
    }

    /// Smoothed interval between full-redraw starts, if at least two redraws
    /// have been observed
    pub fn avg_redraw_interval_ms(&self) -> Option<f64> {
        self.avg_redraw_interval_ms
    }

    /// Time since the previous tick in milliseconds
    pub fn delta_ms(&self) -> f64 {
        self.delta_ms
    }

    /// Number of ticks observed
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average tick rate since the clock was created
    pub fn average_fps(&self) -> f64 {
        if self.total_ms > 0.0 {
            (self.frame_count.saturating_sub(1)) as f64 * 1000.0 / self.total_ms
        } else {
            0.0
        }
    }

    /// Instantaneous rate based on the last tick delta
    pub fn current_fps(&self) -> f64 {
        if self.delta_ms > 0.0 {
            1000.0 / self.delta_ms
        } else {
            0.0
        }
    }
}

/// Simple stopwatch for measuring elapsed wall-clock time
///
/// The orchestrator times the ground-pass work with it and charges the
/// measured cost against the tick's draw budget.
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed += start.elapsed();
            self.start_time = None;
        }
    }

    /// Reset the stopwatch to zero
    pub fn reset(&mut self) {
        self.start_time = None;
        self.elapsed = Duration::ZERO;
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let current_elapsed = if let Some(start) = self.start_time {
            start.elapsed()
        } else {
            Duration::ZERO
        };
        self.elapsed + current_elapsed
    }

    /// Get the elapsed time in milliseconds
    pub fn elapsed_millis(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }

    /// Check if the stopwatch is currently running
    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_tick_has_zero_delta() {
        let mut clock = FrameClock::new();
        clock.tick(100.0);
        assert_relative_eq!(clock.delta_ms(), 0.0);
        assert_eq!(clock.frame_count(), 1);
    }

    #[test]
    fn test_delta_between_ticks() {
        let mut clock = FrameClock::new();
        clock.tick(100.0);
        clock.tick(116.7);
        assert_relative_eq!(clock.delta_ms(), 16.7, epsilon = 1e-9);
        assert_relative_eq!(clock.current_fps(), 1000.0 / 16.7, epsilon = 1e-6);
    }

    #[test]
    fn test_redraw_interval_ema_weights() {
        let mut clock = FrameClock::new();
        clock.begin_redraw(0.0);
        assert_eq!(clock.avg_redraw_interval_ms(), None);

        clock.begin_redraw(40.0);
        assert_relative_eq!(clock.avg_redraw_interval_ms().unwrap(), 40.0);

        // 0.75 * 40 + 0.25 * 20 = 35
        clock.begin_redraw(60.0);
        assert_relative_eq!(clock.avg_redraw_interval_ms().unwrap(), 35.0);
    }

    #[test]
    fn test_non_monotonic_timestamp_clamped() {
        let mut clock = FrameClock::new();
        clock.tick(100.0);
        clock.tick(90.0);
        assert_relative_eq!(clock.delta_ms(), 0.0);
    }

    #[test]
    fn test_stopwatch_accumulates() {
        let mut stopwatch = Stopwatch::start_new();
        assert!(stopwatch.is_running());
        stopwatch.stop();
        let first = stopwatch.elapsed();
        stopwatch.start();
        stopwatch.stop();
        assert!(stopwatch.elapsed() >= first);
    }
}
