//! Per-frame and per-session result records.

use serde::{Deserialize, Serialize};

use super::{AlertReason, EyeStatus, MetricSet, PostureState};

/// Everything the rendering collaborator needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    /// Frame timestamp in seconds.
    pub timestamp: f64,
    /// All metrics computed for this frame.
    pub metrics: MetricSet,
    /// Eye detector state; absent when eye landmarks were unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eyes: Option<EyeReport>,
    /// Posture verdict; absent when posture was not evaluated this frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posture: Option<PostureState>,
    /// Eye calibration progress.
    pub eye_calibration: CalibrationProgress,
    /// Posture calibration progress.
    pub posture_calibration: CalibrationProgress,
    /// Alert surfaced on this frame, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
    /// Seconds left in the current 20-20-20 break.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_remaining: Option<f64>,
}

/// Eye detector outputs for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeReport {
    /// Moving-average EAR.
    pub smoothed_ear: f64,
    /// Blinks committed since the monitor was created.
    pub blink_count: u64,
    /// Blinks per minute over the trailing window.
    pub blink_rate: f64,
    /// True on the frame a blink was committed.
    pub blink_detected: bool,
    /// Seconds spent below the drowsiness threshold.
    pub closure_duration: f64,
    pub drowsy: bool,
    pub yawning: bool,
    pub status: EyeStatus,
}

/// Calibration progress for one subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationProgress {
    /// Samples buffered so far.
    pub current: usize,
    /// Samples required.
    pub target: usize,
    /// True while collecting.
    pub active: bool,
    /// True once a baseline exists.
    pub calibrated: bool,
}

/// A surfaced alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub reason: AlertReason,
    pub message: String,
}

impl From<AlertReason> for Alert {
    fn from(reason: AlertReason) -> Self {
        Self {
            reason,
            message: reason.message().to_string(),
        }
    }
}

/// Aggregate outcome of replaying one recorded session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Source name (usually a file path).
    pub source: String,
    /// When the replay finished (RFC 3339). Filled in by the driver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<String>,
    /// Frames processed.
    pub frames: usize,
    /// Records that could not be read.
    pub skipped_records: usize,
    /// Session duration in seconds (last minus first timestamp).
    pub duration: f64,
    /// Total blinks committed.
    pub blink_count: u64,
    /// Alerts surfaced, in order.
    pub alerts: Vec<TimedAlert>,
    /// Eye calibration state at the end of the session.
    pub eyes_calibrated: bool,
    /// Posture calibration state at the end of the session.
    pub posture_calibrated: bool,
    /// Frames per posture verdict, excluding frames without a verdict.
    pub posture_frames: PostureTally,
}

/// An alert with the timestamp it surfaced at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedAlert {
    pub timestamp: f64,
    pub reason: AlertReason,
}

/// Frame counts per posture verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostureTally {
    pub good: usize,
    pub hunchback: usize,
    pub uneven_shoulders: usize,
    pub forward_head: usize,
    pub not_calibrated: usize,
}

impl PostureTally {
    /// Counts one verdict.
    pub fn record(&mut self, state: PostureState) {
        let slot = match state {
            PostureState::Good => &mut self.good,
            PostureState::Hunchback => &mut self.hunchback,
            PostureState::UnevenShoulders => &mut self.uneven_shoulders,
            PostureState::ForwardHead => &mut self.forward_head,
            PostureState::NotCalibrated => &mut self.not_calibrated,
        };
        *slot += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_from_reason() {
        let alert = Alert::from(AlertReason::Tired);
        assert_eq!(alert.reason, AlertReason::Tired);
        assert_eq!(alert.message, AlertReason::Tired.message());
    }

    #[test]
    fn test_posture_tally() {
        let mut tally = PostureTally::default();
        tally.record(PostureState::Good);
        tally.record(PostureState::Good);
        tally.record(PostureState::ForwardHead);
        assert_eq!(tally.good, 2);
        assert_eq!(tally.forward_head, 1);
        assert_eq!(tally.hunchback, 0);
    }

    #[test]
    fn test_frame_result_skips_empty_fields() {
        let result = FrameResult {
            timestamp: 1.0,
            metrics: MetricSet::new(),
            eyes: None,
            posture: None,
            eye_calibration: CalibrationProgress::default(),
            posture_calibration: CalibrationProgress::default(),
            alert: None,
            break_remaining: None,
        };
        let json = serde_json::to_value(&result).unwrap_or_default();
        assert!(json.get("alert").is_none());
        assert!(json.get("eyes").is_none());
        assert!(json.get("eye_calibration").is_some());
    }
}
