//! Two-phase baseline calibration.
//!
//! A [`Calibrator`] buffers metric samples after [`Calibrator::start`] until
//! the target count is reached, then averages them per key into a
//! [`Baseline`]. Eye calibrators additionally derive blink and drowsiness
//! thresholds from the averaged EAR.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::domain::{Baseline, CalibrationProgress, MetricSet};

/// Which subsystem a calibrator serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationKind {
    /// Eye signals; completion derives EAR thresholds.
    Eye,
    /// Posture signals; completion keeps raw averages only.
    Posture,
}

impl CalibrationKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Eye => "eye",
            Self::Posture => "posture",
        }
    }
}

/// Outcome of feeding one sample.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationStatus {
    /// Not calibrating; the sample was ignored.
    Idle,
    /// Still collecting.
    Collecting { current: usize, target: usize },
    /// Target reached; the new baseline is in effect.
    Completed(Baseline),
    /// Target reached without any valid samples; prior baseline kept.
    Failed,
}

/// Generic sample-and-average calibrator.
#[derive(Debug, Clone)]
pub struct Calibrator {
    kind: CalibrationKind,
    target: usize,
    samples: Vec<MetricSet>,
    active: bool,
    baseline: Option<Baseline>,
}

impl Calibrator {
    /// Creates an idle, uncalibrated calibrator.
    #[must_use]
    pub const fn new(kind: CalibrationKind) -> Self {
        Self {
            kind,
            target: 0,
            samples: Vec::new(),
            active: false,
            baseline: None,
        }
    }

    /// Starts (or restarts) collecting `target` samples.
    ///
    /// Any partially filled buffer is discarded. An existing baseline stays in
    /// effect until the new calibration completes.
    pub fn start(&mut self, target: usize) {
        info!("{} calibration started ({target} samples)", self.kind.label());
        self.target = target;
        self.samples = Vec::with_capacity(target);
        self.active = true;
    }

    /// Feeds one sample. `None` (unavailable metrics) is skipped but still
    /// triggers the completion check.
    pub fn feed(&mut self, sample: Option<&MetricSet>) -> CalibrationStatus {
        if !self.active {
            return CalibrationStatus::Idle;
        }

        match sample {
            Some(sample) if is_valid(sample) => {
                if self.samples.len() < self.target {
                    self.samples.push(sample.clone());
                }
            }
            Some(_) => debug!("{} calibration: dropped invalid sample", self.kind.label()),
            None => {}
        }

        if self.samples.len() < self.target {
            return CalibrationStatus::Collecting {
                current: self.samples.len(),
                target: self.target,
            };
        }

        self.finish()
    }

    fn finish(&mut self) -> CalibrationStatus {
        self.active = false;

        let Some(means) = average(&self.samples) else {
            warn!(
                "{} calibration finished without valid samples; keeping previous baseline",
                self.kind.label()
            );
            return CalibrationStatus::Failed;
        };

        let baseline = match self.kind {
            CalibrationKind::Eye => Baseline::for_eyes(means),
            CalibrationKind::Posture => Some(Baseline::new(means)),
        };

        let Some(baseline) = baseline else {
            warn!(
                "{} calibration samples lack required metrics; keeping previous baseline",
                self.kind.label()
            );
            return CalibrationStatus::Failed;
        };

        info!(
            "{} calibration complete from {} samples: {:?}",
            self.kind.label(),
            self.samples.len(),
            baseline.to_flat()
        );
        self.baseline = Some(baseline.clone());
        CalibrationStatus::Completed(baseline)
    }

    /// Installs a baseline obtained elsewhere (e.g. loaded from disk).
    pub fn restore(&mut self, baseline: Baseline) {
        debug!("{} baseline restored", self.kind.label());
        self.baseline = Some(baseline);
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.baseline.is_some()
    }

    #[must_use]
    pub const fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    /// Progress snapshot for display.
    ///
    /// The buffer is kept after completion, so a finished calibration keeps
    /// reporting `current == target` until the next `start`.
    #[must_use]
    pub fn progress(&self) -> CalibrationProgress {
        CalibrationProgress {
            current: self.samples.len(),
            target: self.target,
            active: self.active,
            calibrated: self.is_calibrated(),
        }
    }
}

fn is_valid(sample: &MetricSet) -> bool {
    !sample.is_empty() && sample.iter().all(|(_, v)| v.is_finite())
}

/// Per-key arithmetic mean over the samples carrying each key.
#[allow(clippy::cast_precision_loss)]
fn average(samples: &[MetricSet]) -> Option<MetricSet> {
    if samples.is_empty() {
        return None;
    }

    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for sample in samples {
        for (key, value) in sample.iter() {
            let entry = sums.entry(key).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    Some(
        sums.into_iter()
            .map(|(key, (sum, n))| (key.to_string(), sum / n as f64))
            .collect(),
    )
}
