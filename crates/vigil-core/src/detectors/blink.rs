//! Blink detection with smoothing, hysteresis and a duration filter.

use std::collections::VecDeque;

use tracing::trace;

/// Blink detector configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinkConfig {
    /// Number of raw EAR samples averaged for the smoothed EAR.
    pub smoothing_window: usize,
    /// EAR threshold used before eye calibration.
    pub default_threshold: f64,
    /// Shortest closure counted as a blink (seconds).
    pub min_duration: f64,
    /// Longest closure counted as a blink (seconds).
    pub max_duration: f64,
    /// Trailing window for the blink rate (seconds).
    pub window_seconds: f64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 5,
            default_threshold: 0.21,
            min_duration: 0.03,
            max_duration: 0.6,
            window_seconds: 60.0,
        }
    }
}

/// Result of one blink update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinkUpdate {
    /// Mean of the smoothing buffer after this sample.
    pub smoothed_ear: f64,
    /// True while the smoothed EAR is below threshold.
    pub closed: bool,
    /// True if this frame committed a blink.
    pub blink_committed: bool,
}

/// Open/closed state machine over smoothed EAR.
#[derive(Debug, Clone)]
pub struct BlinkStateMachine {
    config: BlinkConfig,
    smoothing: VecDeque<f64>,
    /// Set while the eye is closed.
    closure_start: Option<f64>,
    ledger: VecDeque<f64>,
    blink_count: u64,
}

impl BlinkStateMachine {
    #[must_use]
    pub fn new(config: BlinkConfig) -> Self {
        let window = config.smoothing_window.max(1);
        Self {
            config: BlinkConfig {
                smoothing_window: window,
                ..config
            },
            smoothing: VecDeque::with_capacity(window),
            closure_start: None,
            ledger: VecDeque::new(),
            blink_count: 0,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &BlinkConfig {
        &self.config
    }

    /// Pushes a raw EAR sample and advances the state machine.
    pub fn update(&mut self, raw_ear: f64, threshold: f64, now: f64) -> BlinkUpdate {
        let smoothed_ear = self.smooth(raw_ear);
        let mut blink_committed = false;

        if smoothed_ear < threshold {
            if self.closure_start.is_none() {
                self.closure_start = Some(now);
            }
        } else if let Some(start) = self.closure_start.take() {
            let duration = now - start;
            if (self.config.min_duration..=self.config.max_duration).contains(&duration) {
                self.ledger.push_back(now);
                self.blink_count += 1;
                blink_committed = true;
                trace!("blink committed after {duration:.3}s");
            } else {
                trace!("closure of {duration:.3}s discarded");
            }
        }

        self.prune(now);

        BlinkUpdate {
            smoothed_ear,
            closed: self.closure_start.is_some(),
            blink_committed,
        }
    }

    /// Blinks per minute over the trailing window.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn blink_rate(&self) -> f64 {
        self.ledger.len() as f64 / self.config.window_seconds.max(1.0) * 60.0
    }

    /// Total blinks committed.
    #[must_use]
    pub const fn blink_count(&self) -> u64 {
        self.blink_count
    }

    /// Current smoothed EAR, or `None` before the first sample.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn smoothed_ear(&self) -> Option<f64> {
        if self.smoothing.is_empty() {
            return None;
        }
        Some(self.smoothing.iter().sum::<f64>() / self.smoothing.len() as f64)
    }

    /// Drops buffered EAR samples (used after calibration completes).
    pub fn clear_smoothing(&mut self) {
        self.smoothing.clear();
    }

    fn smooth(&mut self, raw_ear: f64) -> f64 {
        if self.smoothing.len() == self.config.smoothing_window {
            self.smoothing.pop_front();
        }
        self.smoothing.push_back(raw_ear);
        self.smoothed_ear().unwrap_or(raw_ear)
    }

    fn prune(&mut self, now: f64) {
        let cutoff = now - self.config.window_seconds;
        while self.ledger.front().is_some_and(|&t| t < cutoff) {
            self.ledger.pop_front();
        }
    }
}

impl Default for BlinkStateMachine {
    fn default() -> Self {
        Self::new(BlinkConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN: f64 = 0.30;
    const SHUT: f64 = 0.05;
    const THRESHOLD: f64 = 0.21;

    fn unsmoothed() -> BlinkStateMachine {
        BlinkStateMachine::new(BlinkConfig {
            smoothing_window: 1,
            ..BlinkConfig::default()
        })
    }

    /// Closes the eye at `start` and reopens it `duration` later.
    fn closure(sm: &mut BlinkStateMachine, start: f64, duration: f64) -> bool {
        sm.update(OPEN, THRESHOLD, start - 0.01);
        sm.update(SHUT, THRESHOLD, start);
        sm.update(OPEN, THRESHOLD, start + duration).blink_committed
    }

    #[test]
    fn test_duration_filter() {
        let mut sm = unsmoothed();
        assert!(!closure(&mut sm, 1.0, 0.02));
        assert!(closure(&mut sm, 2.0, 0.3));
        assert!(!closure(&mut sm, 3.0, 0.8));
        assert_eq!(sm.blink_count(), 1);
    }

    #[test]
    fn test_duration_bounds_inclusive() {
        let mut sm = BlinkStateMachine::new(BlinkConfig {
            smoothing_window: 1,
            min_duration: 0.25,
            max_duration: 0.5,
            ..BlinkConfig::default()
        });
        assert!(closure(&mut sm, 1.0, 0.25));
        assert!(closure(&mut sm, 2.0, 0.5));
        assert!(!closure(&mut sm, 3.0, 0.125));
    }

    #[test]
    fn test_smoothing_mean() {
        let mut sm = BlinkStateMachine::default();
        sm.update(0.3, THRESHOLD, 0.0);
        let update = sm.update(0.1, THRESHOLD, 0.1);
        assert!((update.smoothed_ear - 0.2).abs() < 1e-12);
        assert!(update.closed);
    }

    #[test]
    fn test_smoothing_window_is_bounded() {
        let mut sm = BlinkStateMachine::default();
        for i in 0..5 {
            sm.update(0.0, THRESHOLD, f64::from(i));
        }
        for i in 5..10 {
            sm.update(0.5, THRESHOLD, f64::from(i));
        }
        assert!((sm.smoothed_ear().unwrap_or_default() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rate_counts_window() {
        let mut sm = unsmoothed();
        for i in 0..6 {
            assert!(closure(&mut sm, f64::from(i) * 2.0 + 1.0, 0.1));
        }
        assert!((sm.blink_rate() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_rate_decays_to_zero() {
        let mut sm = unsmoothed();
        assert!(closure(&mut sm, 1.0, 0.1));
        assert!(closure(&mut sm, 2.0, 0.1));
        assert!(sm.blink_rate() > 0.0);

        sm.update(OPEN, THRESHOLD, 40.0);
        assert!((sm.blink_rate() - 2.0).abs() < 1e-12);

        sm.update(OPEN, THRESHOLD, 62.5);
        assert!(sm.blink_rate().abs() < f64::EPSILON);
        assert_eq!(sm.blink_count(), 2);
    }

    #[test]
    fn test_threshold_boundary_counts_as_open() {
        let mut sm = unsmoothed();
        sm.update(SHUT, THRESHOLD, 0.0);
        let update = sm.update(THRESHOLD, THRESHOLD, 0.2);
        assert!(!update.closed);
        assert!(update.blink_committed);
    }

    #[test]
    fn test_clear_smoothing() {
        let mut sm = BlinkStateMachine::default();
        sm.update(0.3, THRESHOLD, 0.0);
        sm.clear_smoothing();
        assert!(sm.smoothed_ear().is_none());
    }
}
