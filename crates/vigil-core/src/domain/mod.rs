//! Core domain types for landmark-based wellness monitoring.

mod baseline;
mod landmark;
mod metrics;
mod record;
mod result;
mod verdict;

pub use baseline::{Baseline, EyeThresholds};
pub use landmark::{canonical_name, names, LandmarkFrame, Point};
pub use metrics::{metric, EyeMetrics, MetricSet, PostureMetrics};
pub use record::SessionRecord;
pub use result::{
    Alert, CalibrationProgress, EyeReport, FrameResult, PostureTally, SessionSummary, TimedAlert,
};
pub use verdict::{AlertReason, CalibrationTarget, EyeStatus, PostureState};
