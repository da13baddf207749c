//! Yawn detection over mouth aspect ratio.

/// Yawn detector configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YawnConfig {
    /// MAR above this counts as an open mouth.
    pub mar_threshold: f64,
    /// Seconds the mouth must stay open before it counts as a yawn.
    pub yawn_time: f64,
}

impl Default for YawnConfig {
    fn default() -> Self {
        Self {
            mar_threshold: 0.65,
            yawn_time: 0.6,
        }
    }
}

/// Debounced open-mouth tracker.
#[derive(Debug, Clone, Default)]
pub struct YawnDetector {
    config: YawnConfig,
    above_since: Option<f64>,
}

impl YawnDetector {
    #[must_use]
    pub const fn new(config: YawnConfig) -> Self {
        Self {
            config,
            above_since: None,
        }
    }

    /// Returns true while a yawn is in progress.
    pub fn update(&mut self, mar: f64, now: f64) -> bool {
        if mar <= self.config.mar_threshold {
            self.above_since = None;
            return false;
        }
        let start = *self.above_since.get_or_insert(now);
        now - start >= self.config.yawn_time
    }
}
