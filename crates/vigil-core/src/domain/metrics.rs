//! Scalar metrics derived from landmark frames.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Well-known metric names.
pub mod metric {
    pub const LEFT_EAR: &str = "left_ear";
    pub const RIGHT_EAR: &str = "right_ear";
    pub const AVG_EAR: &str = "avg_ear";
    pub const MAR: &str = "mar";
    pub const EYE_SHOULDER_RATIO: &str = "eye_shoulder_ratio";
    pub const SHOULDER_ANGLE: &str = "shoulder_angle";
    pub const HEAD_FORWARD: &str = "head_forward";
    pub const BLINK_THRESHOLD: &str = "blink_threshold";
    pub const DROWSY_THRESHOLD: &str = "drowsy_threshold";

    /// Keys that make up a posture baseline.
    pub const POSTURE_KEYS: [&str; 3] = [EYE_SHOULDER_RATIO, SHOULDER_ANGLE, HEAD_FORWARD];
}

/// Mapping from metric name to value.
///
/// Serializes as a flat JSON object, which is also the persisted baseline format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet(BTreeMap<String, f64>);

impl MetricSet {
    /// Creates an empty metric set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the value for a metric.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Sets a metric value.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    /// Copies every metric from `other` into this set, overwriting duplicates.
    pub fn extend(&mut self, other: &Self) {
        self.0.extend(other.iter().map(|(k, v)| (k.to_string(), v)));
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns true if the set contains the metric.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for MetricSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Eye and mouth ratios for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeMetrics {
    /// Left eye aspect ratio.
    pub left_ear: f64,
    /// Right eye aspect ratio.
    pub right_ear: f64,
    /// Mean of both eyes.
    pub avg_ear: f64,
    /// Mouth aspect ratio (0.0 when the mouth landmarks are missing).
    pub mar: f64,
}

impl EyeMetrics {
    /// Converts to a metric set.
    #[must_use]
    pub fn to_metric_set(&self) -> MetricSet {
        MetricSet::new()
            .with(metric::LEFT_EAR, self.left_ear)
            .with(metric::RIGHT_EAR, self.right_ear)
            .with(metric::AVG_EAR, self.avg_ear)
            .with(metric::MAR, self.mar)
    }

    /// The subset fed to eye calibration.
    #[must_use]
    pub fn calibration_sample(&self) -> MetricSet {
        MetricSet::new().with(metric::AVG_EAR, self.avg_ear)
    }
}

/// Baseline-comparable posture measurements in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureMetrics {
    /// Vertical eye-to-shoulder distance divided by shoulder width.
    pub eye_shoulder_ratio: f64,
    /// Angle of the shoulder line in degrees.
    pub shoulder_angle: f64,
    /// Horizontal offset of the nose from the shoulder midpoint.
    pub head_forward: f64,
}

impl PostureMetrics {
    /// Converts to a metric set.
    #[must_use]
    pub fn to_metric_set(&self) -> MetricSet {
        MetricSet::new()
            .with(metric::EYE_SHOULDER_RATIO, self.eye_shoulder_ratio)
            .with(metric::SHOULDER_ANGLE, self.shoulder_angle)
            .with(metric::HEAD_FORWARD, self.head_forward)
    }

    /// Reads posture metrics back out of a metric set.
    #[must_use]
    pub fn from_metric_set(set: &MetricSet) -> Option<Self> {
        Some(Self {
            eye_shoulder_ratio: set.get(metric::EYE_SHOULDER_RATIO)?,
            shoulder_angle: set.get(metric::SHOULDER_ANGLE)?,
            head_forward: set.get(metric::HEAD_FORWARD)?,
        })
    }
}
