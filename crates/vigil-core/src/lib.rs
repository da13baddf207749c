//! Vigil Core - Landmark-driven wellness monitoring
//!
//! This crate turns per-frame facial and body landmarks into eye, fatigue and
//! posture signals and decides, frame by frame, whether to surface an alert.
//! It contains the domain types, signal extraction, calibration, the stateful
//! detectors, the alert engine and the ports adapters plug into.

pub mod alerts;
pub mod calibration;
pub mod detectors;
pub mod domain;
pub mod monitor;
pub mod pipeline;
pub mod ports;
pub mod signals;

pub use alerts::{AlertConfig, AlertDecision, AlertEngine, AlertInputs, SessionClock};
pub use calibration::{CalibrationKind, CalibrationStatus, Calibrator};
pub use detectors::{
    BlinkConfig, BlinkStateMachine, BlinkUpdate, DrowsinessMonitor, DrowsinessState,
    PostureClassifier, PostureThresholds, YawnConfig, YawnDetector,
};
pub use domain::{
    Alert, AlertReason, Baseline, CalibrationProgress, CalibrationTarget, EyeMetrics, EyeReport,
    EyeStatus, EyeThresholds, FrameResult, LandmarkFrame, MetricSet, Point, PostureMetrics,
    PostureState, PostureTally, SessionRecord, SessionSummary, TimedAlert,
};
pub use monitor::{MonitorConfig, Subsystems, WellnessMonitor};
pub use pipeline::{replay_session, FrameOutput, ReplayOptions, ReplayOutcome};
pub use ports::{BaselineStore, LandmarkSource, ProgressEvent, ProgressSink, ResultOutput};
