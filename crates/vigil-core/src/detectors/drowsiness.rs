//! Sustained eye-closure tracking.

/// Drowsiness state for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrowsinessState {
    /// Seconds the smoothed EAR has stayed below the drowsiness threshold.
    pub closure_duration: f64,
    /// True once the closure lasts at least `drowsy_time`.
    pub drowsy: bool,
}

/// Tracks how long the eyes have stayed nearly shut.
#[derive(Debug, Clone)]
pub struct DrowsinessMonitor {
    drowsy_time: f64,
    below_since: Option<f64>,
}

impl DrowsinessMonitor {
    /// Creates a monitor that flags closures of at least `drowsy_time` seconds.
    #[must_use]
    pub const fn new(drowsy_time: f64) -> Self {
        Self {
            drowsy_time,
            below_since: None,
        }
    }

    pub fn update(&mut self, smoothed_ear: f64, threshold: f64, now: f64) -> DrowsinessState {
        if smoothed_ear >= threshold {
            self.below_since = None;
            return DrowsinessState::default();
        }

        let start = *self.below_since.get_or_insert(now);
        let closure_duration = (now - start).max(0.0);
        DrowsinessState {
            closure_duration,
            drowsy: closure_duration >= self.drowsy_time,
        }
    }
}

impl Default for DrowsinessMonitor {
    fn default() -> Self {
        Self::new(0.8)
    }
}
