//! Per-frame wellness monitor.
//!
//! [`WellnessMonitor`] owns every stateful component and turns one
//! [`LandmarkFrame`] plus a timestamp into a [`FrameResult`]. The driving loop
//! (camera, replay, tests) lives outside.

use tracing::debug;

use crate::alerts::{AlertConfig, AlertEngine, AlertInputs};
use crate::calibration::{CalibrationKind, CalibrationStatus, Calibrator};
use crate::detectors::{
    BlinkConfig, BlinkStateMachine, DrowsinessMonitor, PostureClassifier, PostureThresholds,
    YawnConfig, YawnDetector,
};
use crate::domain::{
    Alert, Baseline, CalibrationTarget, EyeMetrics, EyeReport, EyeStatus, EyeThresholds,
    FrameResult, LandmarkFrame, MetricSet, PostureMetrics, PostureState,
};
use crate::signals;

/// Which signal pipelines are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subsystems {
    pub eyes: bool,
    pub posture: bool,
}

impl Default for Subsystems {
    fn default() -> Self {
        Self {
            eyes: true,
            posture: true,
        }
    }
}

/// Full monitor configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorConfig {
    pub subsystems: Subsystems,
    pub blink: BlinkConfig,
    /// Closure duration (seconds) that counts as drowsy.
    pub drowsy_time: f64,
    pub yawn: YawnConfig,
    pub posture: PostureThresholds,
    pub alerts: AlertConfig,
    /// Blink rate under which a calibrated user is shown a low-blink status.
    pub status_low_blink_rate: f64,
    pub eye_calibration_frames: usize,
    pub posture_calibration_frames: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            subsystems: Subsystems::default(),
            blink: BlinkConfig::default(),
            drowsy_time: 0.8,
            yawn: YawnConfig::default(),
            posture: PostureThresholds::default(),
            alerts: AlertConfig::default(),
            status_low_blink_rate: 10.0,
            eye_calibration_frames: 60,
            posture_calibration_frames: 50,
        }
    }
}

/// Stateful eye, posture and alert pipeline for one user session.
#[derive(Debug, Clone)]
pub struct WellnessMonitor {
    config: MonitorConfig,
    eye_calibrator: Calibrator,
    posture_calibrator: Calibrator,
    blink: BlinkStateMachine,
    drowsiness: DrowsinessMonitor,
    yawn: YawnDetector,
    classifier: PostureClassifier,
    alerts: AlertEngine,
    /// Blink count seen on the previous frame.
    last_blink_count: u64,
    /// Time of the most recent blink; starts at session start.
    last_blink_at: f64,
}

impl WellnessMonitor {
    /// Creates a monitor whose session clock starts at `start`.
    #[must_use]
    pub fn new(config: MonitorConfig, start: f64) -> Self {
        Self {
            config,
            eye_calibrator: Calibrator::new(CalibrationKind::Eye),
            posture_calibrator: Calibrator::new(CalibrationKind::Posture),
            blink: BlinkStateMachine::new(config.blink),
            drowsiness: DrowsinessMonitor::new(config.drowsy_time),
            yawn: YawnDetector::new(config.yawn),
            classifier: PostureClassifier::new(config.posture),
            alerts: AlertEngine::new(config.alerts, start),
            last_blink_count: 0,
            last_blink_at: start,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Starts eye calibration with the configured frame count.
    pub fn start_eye_calibration(&mut self) {
        self.eye_calibrator.start(self.config.eye_calibration_frames);
    }

    /// Starts posture calibration with the configured frame count.
    pub fn start_posture_calibration(&mut self) {
        self.posture_calibrator
            .start(self.config.posture_calibration_frames);
    }

    /// Starts calibration for the targeted subsystems that are enabled.
    pub fn start_calibration(&mut self, target: CalibrationTarget) {
        if target.includes_eyes() && self.config.subsystems.eyes {
            self.start_eye_calibration();
        }
        if target.includes_posture() && self.config.subsystems.posture {
            self.start_posture_calibration();
        }
    }

    #[must_use]
    pub const fn eye_baseline(&self) -> Option<&Baseline> {
        self.eye_calibrator.baseline()
    }

    #[must_use]
    pub const fn posture_baseline(&self) -> Option<&Baseline> {
        self.posture_calibrator.baseline()
    }

    /// Total blinks committed this session.
    #[must_use]
    pub const fn blink_count(&self) -> u64 {
        self.blink.blink_count()
    }

    /// Installs baselines from their persisted flat form.
    ///
    /// Returns which subsystems received a baseline.
    pub fn restore_baseline(&mut self, flat: &MetricSet) -> Option<CalibrationTarget> {
        let eyes = Baseline::eyes_from_flat(flat);
        let posture = Baseline::posture_from_flat(flat);
        let restored = (eyes.is_some(), posture.is_some());
        if let Some(baseline) = eyes {
            self.eye_calibrator.restore(baseline);
        }
        if let Some(baseline) = posture {
            self.posture_calibrator.restore(baseline);
        }
        match restored {
            (true, true) => Some(CalibrationTarget::Both),
            (true, false) => Some(CalibrationTarget::Eyes),
            (false, true) => Some(CalibrationTarget::Posture),
            (false, false) => None,
        }
    }

    /// Flat form of every baseline in effect, for persistence.
    #[must_use]
    pub fn baseline_snapshot(&self) -> Option<MetricSet> {
        let mut flat = MetricSet::new();
        for baseline in [self.eye_baseline(), self.posture_baseline()]
            .into_iter()
            .flatten()
        {
            flat.extend(&baseline.to_flat());
        }
        (!flat.is_empty()).then_some(flat)
    }

    /// Processes one frame.
    pub fn update(&mut self, frame: &LandmarkFrame, now: f64) -> FrameResult {
        let mut metrics = MetricSet::new();

        let eye_metrics = self
            .config
            .subsystems
            .eyes
            .then(|| signals::eye_metrics(frame))
            .flatten();
        let posture_metrics = self
            .config
            .subsystems
            .posture
            .then(|| signals::posture_metrics(frame))
            .flatten();

        let eyes = eye_metrics.map(|m| {
            metrics.extend(&m.to_metric_set());
            self.update_eyes(&m, now)
        });

        let posture = self.update_posture(posture_metrics.as_ref());
        if let Some(m) = posture_metrics {
            metrics.extend(&m.to_metric_set());
        }

        let (alert, break_remaining) = match eyes {
            Some(report) => self.update_alerts(&report, now),
            None => (None, None),
        };

        FrameResult {
            timestamp: now,
            metrics,
            eyes,
            posture,
            eye_calibration: self.eye_calibrator.progress(),
            posture_calibration: self.posture_calibrator.progress(),
            alert,
            break_remaining,
        }
    }

    fn thresholds(&self) -> EyeThresholds {
        self.eye_calibrator
            .baseline()
            .and_then(Baseline::thresholds)
            .unwrap_or_else(|| EyeThresholds::uncalibrated(self.config.blink.default_threshold))
    }

    fn update_eyes(&mut self, m: &EyeMetrics, now: f64) -> EyeReport {
        let sample = m.calibration_sample();
        if let CalibrationStatus::Completed(_) = self.eye_calibrator.feed(Some(&sample)) {
            self.blink.clear_smoothing();
        }

        let thresholds = self.thresholds();
        let blink = self.blink.update(m.avg_ear, thresholds.blink, now);
        let drowsiness = self
            .drowsiness
            .update(blink.smoothed_ear, thresholds.drowsy, now);
        let yawning = self.yawn.update(m.mar, now);

        let blink_count = self.blink.blink_count();
        if blink_count > self.last_blink_count {
            self.last_blink_count = blink_count;
            self.last_blink_at = now;
        }

        let blink_rate = self.blink.blink_rate();
        let status = if drowsiness.drowsy {
            EyeStatus::Drowsy
        } else if self.eye_calibrator.is_calibrated()
            && blink_rate < self.config.status_low_blink_rate
        {
            EyeStatus::LowBlinkRate
        } else {
            EyeStatus::Normal
        };

        EyeReport {
            smoothed_ear: blink.smoothed_ear,
            blink_count,
            blink_rate,
            blink_detected: blink.blink_committed,
            closure_duration: drowsiness.closure_duration,
            drowsy: drowsiness.drowsy,
            yawning,
            status,
        }
    }

    /// Feeds posture calibration, or classifies when not calibrating.
    fn update_posture(&mut self, m: Option<&PostureMetrics>) -> Option<PostureState> {
        if self.posture_calibrator.is_active() {
            let sample = m.map(PostureMetrics::to_metric_set);
            if let CalibrationStatus::Collecting { current, target } =
                self.posture_calibrator.feed(sample.as_ref())
            {
                debug!("posture calibration {current}/{target}");
            }
            return None;
        }
        m.map(|m| self.classifier.classify(m, self.posture_calibrator.baseline()))
    }

    fn update_alerts(&mut self, report: &EyeReport, now: f64) -> (Option<Alert>, Option<f64>) {
        let inputs = AlertInputs {
            eyes_calibrated: self.eye_calibrator.is_calibrated(),
            blink_rate: report.blink_rate,
            since_last_blink: now - self.last_blink_at,
            drowsy: report.drowsy,
            yawning: report.yawning,
        };
        let decision = self.alerts.evaluate(&inputs, now);
        (decision.surfaced.map(Alert::from), decision.break_remaining)
    }
}
