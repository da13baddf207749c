//! Per-user reference values captured during calibration.

use super::metrics::{metric, MetricSet};

/// Lower bound for a calibrated blink threshold.
const MIN_BLINK_THRESHOLD: f64 = 0.12;
/// Lower bound for a calibrated drowsiness threshold.
const MIN_DROWSY_THRESHOLD: f64 = 0.08;

/// EAR thresholds derived from a calibrated baseline EAR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeThresholds {
    /// Smoothed EAR below this counts as a closed eye.
    pub blink: f64,
    /// Smoothed EAR below this counts towards drowsiness.
    pub drowsy: f64,
}

impl EyeThresholds {
    /// Derives thresholds from a baseline (open-eye) EAR.
    #[must_use]
    pub fn from_baseline_ear(ear: f64) -> Self {
        Self {
            blink: (ear * 0.75).max(MIN_BLINK_THRESHOLD),
            drowsy: (ear * 0.45).max(MIN_DROWSY_THRESHOLD),
        }
    }

    /// Fixed thresholds used before calibration.
    #[must_use]
    pub fn uncalibrated(default_ear_threshold: f64) -> Self {
        Self {
            blink: default_ear_threshold,
            drowsy: default_ear_threshold * 0.5,
        }
    }
}

/// Averaged calibration samples, plus derived thresholds for eye baselines.
///
/// Immutable once produced; re-calibration replaces it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    metrics: MetricSet,
    thresholds: Option<EyeThresholds>,
}

impl Baseline {
    /// Creates a baseline without derived thresholds.
    #[must_use]
    pub const fn new(metrics: MetricSet) -> Self {
        Self {
            metrics,
            thresholds: None,
        }
    }

    /// Creates an eye baseline, deriving thresholds from `avg_ear`.
    ///
    /// Returns `None` if the metrics carry no `avg_ear`.
    #[must_use]
    pub fn for_eyes(metrics: MetricSet) -> Option<Self> {
        let ear = metrics.get(metric::AVG_EAR)?;
        Some(Self {
            metrics,
            thresholds: Some(EyeThresholds::from_baseline_ear(ear)),
        })
    }

    /// Rebuilds an eye baseline from its persisted flat form.
    ///
    /// Stored thresholds are kept when both are present; otherwise they are
    /// re-derived from `avg_ear`.
    #[must_use]
    pub fn eyes_from_flat(flat: &MetricSet) -> Option<Self> {
        let ear = flat.get(metric::AVG_EAR)?;
        let thresholds = match (
            flat.get(metric::BLINK_THRESHOLD),
            flat.get(metric::DROWSY_THRESHOLD),
        ) {
            (Some(blink), Some(drowsy)) => EyeThresholds { blink, drowsy },
            _ => EyeThresholds::from_baseline_ear(ear),
        };
        Some(Self {
            metrics: MetricSet::new().with(metric::AVG_EAR, ear),
            thresholds: Some(thresholds),
        })
    }

    /// Rebuilds a posture baseline from its persisted flat form.
    #[must_use]
    pub fn posture_from_flat(flat: &MetricSet) -> Option<Self> {
        let metrics = metric::POSTURE_KEYS
            .iter()
            .map(|key| flat.get(key).map(|v| ((*key).to_string(), v)))
            .collect::<Option<MetricSet>>()?;
        Some(Self::new(metrics))
    }

    /// Returns the averaged value of a metric.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.metrics.get(key)
    }

    #[must_use]
    pub const fn metrics(&self) -> &MetricSet {
        &self.metrics
    }

    /// Derived EAR thresholds (eye baselines only).
    #[must_use]
    pub const fn thresholds(&self) -> Option<EyeThresholds> {
        self.thresholds
    }

    /// Flat form for persistence: metric means plus threshold keys.
    #[must_use]
    pub fn to_flat(&self) -> MetricSet {
        let mut flat = self.metrics.clone();
        if let Some(t) = self.thresholds {
            flat.insert(metric::BLINK_THRESHOLD, t.blink);
            flat.insert(metric::DROWSY_THRESHOLD, t.drowsy);
        }
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_scale_with_baseline() {
        let t = EyeThresholds::from_baseline_ear(0.32);
        assert!((t.blink - 0.24).abs() < 1e-12);
        assert!((t.drowsy - 0.144).abs() < 1e-12);
    }

    #[test]
    fn test_thresholds_clamped_for_narrow_eyes() {
        let t = EyeThresholds::from_baseline_ear(0.1);
        assert!((t.blink - 0.12).abs() < f64::EPSILON);
        assert!((t.drowsy - 0.08).abs() < f64::EPSILON);
    }

    #[test]
    fn test_uncalibrated_thresholds() {
        let t = EyeThresholds::uncalibrated(0.21);
        assert!((t.blink - 0.21).abs() < f64::EPSILON);
        assert!((t.drowsy - 0.105).abs() < 1e-12);
    }

    #[test]
    fn test_eye_baseline_requires_avg_ear() {
        assert!(Baseline::for_eyes(MetricSet::new().with("mar", 0.2)).is_none());
        let baseline = Baseline::for_eyes(MetricSet::new().with(metric::AVG_EAR, 0.3));
        assert!(baseline.is_some_and(|b| b.thresholds().is_some()));
    }

    #[test]
    fn test_to_flat_includes_thresholds() {
        let baseline = Baseline::for_eyes(MetricSet::new().with(metric::AVG_EAR, 0.3));
        let flat = baseline.map(|b| b.to_flat()).unwrap_or_default();
        assert!(flat.contains(metric::AVG_EAR));
        assert!(flat.contains(metric::BLINK_THRESHOLD));
        assert!(flat.contains(metric::DROWSY_THRESHOLD));

        let posture = Baseline::new(MetricSet::new().with(metric::HEAD_FORWARD, 0.01));
        assert_eq!(posture.to_flat().len(), 1);
    }

    #[test]
    fn test_eyes_from_flat_keeps_stored_thresholds() {
        let flat = MetricSet::new()
            .with(metric::AVG_EAR, 0.3)
            .with(metric::BLINK_THRESHOLD, 0.2)
            .with(metric::DROWSY_THRESHOLD, 0.1);
        let t = Baseline::eyes_from_flat(&flat).and_then(|b| b.thresholds());
        assert_eq!(t, Some(EyeThresholds { blink: 0.2, drowsy: 0.1 }));
    }

    #[test]
    fn test_eyes_from_flat_derives_missing_thresholds() {
        let flat = MetricSet::new().with(metric::AVG_EAR, 0.32);
        let t = Baseline::eyes_from_flat(&flat).and_then(|b| b.thresholds());
        assert_eq!(t, Some(EyeThresholds::from_baseline_ear(0.32)));
    }

    #[test]
    fn test_posture_from_flat_needs_all_keys() {
        let partial = MetricSet::new()
            .with(metric::EYE_SHOULDER_RATIO, 0.9)
            .with(metric::SHOULDER_ANGLE, 180.0);
        assert!(Baseline::posture_from_flat(&partial).is_none());

        let full = partial.with(metric::HEAD_FORWARD, 0.02).with(metric::AVG_EAR, 0.3);
        let baseline = Baseline::posture_from_flat(&full);
        assert_eq!(baseline.map(|b| b.metrics().len()), Some(3));
    }
}
