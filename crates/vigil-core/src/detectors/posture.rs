//! Baseline-relative posture classification.

use crate::domain::{Baseline, PostureMetrics, PostureState};

/// Deviation limits for posture rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureThresholds {
    /// Relative drop of the eye-shoulder ratio that indicates hunching.
    pub ratio_drop: f64,
    /// Shoulder angle change (degrees) that indicates uneven shoulders.
    pub shoulder_tilt: f64,
    /// Nose offset change (normalized) that indicates forward head posture.
    pub head_shift: f64,
}

impl Default for PostureThresholds {
    fn default() -> Self {
        Self {
            ratio_drop: 0.15,
            shoulder_tilt: 10.0,
            head_shift: 0.05,
        }
    }
}

/// Stateless classifier; rules are checked in priority order and the first
/// match wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostureClassifier {
    thresholds: PostureThresholds,
}

impl PostureClassifier {
    #[must_use]
    pub const fn new(thresholds: PostureThresholds) -> Self {
        Self { thresholds }
    }

    #[must_use]
    pub fn classify(&self, current: &PostureMetrics, baseline: Option<&Baseline>) -> PostureState {
        let Some(reference) = baseline.and_then(|b| PostureMetrics::from_metric_set(b.metrics()))
        else {
            return PostureState::NotCalibrated;
        };

        // A zero baseline ratio cannot express a relative drop.
        let ratio_drop = if reference.eye_shoulder_ratio == 0.0 {
            0.0
        } else {
            (reference.eye_shoulder_ratio - current.eye_shoulder_ratio)
                / reference.eye_shoulder_ratio
        };
        let shoulder_tilt = (current.shoulder_angle - reference.shoulder_angle).abs();
        let head_shift = (current.head_forward - reference.head_forward).abs();

        if ratio_drop > self.thresholds.ratio_drop {
            PostureState::Hunchback
        } else if shoulder_tilt > self.thresholds.shoulder_tilt {
            PostureState::UnevenShoulders
        } else if head_shift > self.thresholds.head_shift {
            PostureState::ForwardHead
        } else {
            PostureState::Good
        }
    }
}
