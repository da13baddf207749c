//! Session replay driver.
//!
//! Feeds every record of a [`LandmarkSource`] through a fresh
//! [`WellnessMonitor`], forwards frame results to a [`ResultOutput`], and
//! condenses the session into a [`SessionSummary`].

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::domain::{
    CalibrationTarget, MetricSet, PostureTally, SessionRecord, SessionSummary, TimedAlert,
};
use crate::monitor::{MonitorConfig, WellnessMonitor};
use crate::ports::{LandmarkSource, ResultOutput};

/// Which frame results are written to the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrameOutput {
    /// Every frame.
    #[default]
    All,
    /// Only frames that surfaced an alert.
    AlertsOnly,
    /// No frames; the caller only wants the summary.
    SummaryOnly,
}

/// Replay settings shared by every session in a batch.
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    pub monitor: MonitorConfig,
    /// Flat baseline restored before the first frame.
    pub baseline: Option<MetricSet>,
    /// Start eye and posture calibration at the first record.
    pub calibrate: bool,
    pub frames: FrameOutput,
}

/// Result of replaying one session.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub summary: SessionSummary,
    /// Baselines in effect when the session ended, in flat form.
    pub baseline: Option<MetricSet>,
}

/// Replays one recorded session.
///
/// The monitor's session clock starts at the first record's timestamp.
/// Unreadable records, non-finite timestamps and timestamps that go
/// backwards are skipped and counted in `skipped_records`.
///
/// # Errors
///
/// Returns an error if writing a frame result fails.
pub fn replay_session(
    source: &dyn LandmarkSource,
    output: &dyn ResultOutput,
    options: &ReplayOptions,
) -> Result<ReplayOutcome> {
    let name = source.name();
    info!("Replaying session {name}");

    let mut monitor: Option<WellnessMonitor> = None;
    let mut summary = SessionSummary {
        source: name.to_string(),
        analyzed_at: None,
        frames: 0,
        skipped_records: 0,
        duration: 0.0,
        blink_count: 0,
        alerts: Vec::new(),
        eyes_calibrated: false,
        posture_calibrated: false,
        posture_frames: PostureTally::default(),
    };
    let mut first: Option<f64> = None;
    let mut last: Option<f64> = None;

    for (index, record) in source.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("{name}: skipping record {}: {e:#}", index + 1);
                summary.skipped_records += 1;
                continue;
            }
        };

        let timestamp = record.timestamp();
        if !timestamp.is_finite() || last.is_some_and(|prev| timestamp < prev) {
            warn!("{name}: skipping record {} with timestamp {timestamp}", index + 1);
            summary.skipped_records += 1;
            continue;
        }
        first.get_or_insert(timestamp);
        last = Some(timestamp);

        let monitor = monitor.get_or_insert_with(|| start_monitor(options, timestamp));

        let frame = match record {
            SessionRecord::Calibrate { target, .. } => {
                debug!("{name}: calibration requested at {timestamp:.3}s ({target:?})");
                monitor.start_calibration(target);
                continue;
            }
            frame @ SessionRecord::Frame { .. } => frame.into_frame(),
        };
        let Some(frame) = frame else {
            continue;
        };

        let result = monitor.update(&frame, timestamp);
        summary.frames += 1;
        if let Some(alert) = &result.alert {
            summary.alerts.push(TimedAlert {
                timestamp,
                reason: alert.reason,
            });
        }
        if let Some(posture) = result.posture {
            summary.posture_frames.record(posture);
        }

        let emit = match options.frames {
            FrameOutput::All => true,
            FrameOutput::AlertsOnly => result.alert.is_some(),
            FrameOutput::SummaryOnly => false,
        };
        if emit {
            output
                .write_frame(name, &result)
                .with_context(|| format!("Failed to write result for {name}"))?;
        }
    }

    if let (Some(first), Some(last)) = (first, last) {
        summary.duration = last - first;
    }

    let baseline = match &monitor {
        Some(monitor) => {
            summary.blink_count = monitor.blink_count();
            summary.eyes_calibrated = monitor.eye_baseline().is_some();
            summary.posture_calibrated = monitor.posture_baseline().is_some();
            monitor.baseline_snapshot()
        }
        None => options.baseline.clone(),
    };

    info!(
        "{name}: {} frames, {} blinks, {} alerts",
        summary.frames,
        summary.blink_count,
        summary.alerts.len()
    );

    Ok(ReplayOutcome { summary, baseline })
}

fn start_monitor(options: &ReplayOptions, start: f64) -> WellnessMonitor {
    let mut monitor = WellnessMonitor::new(options.monitor, start);
    if let Some(flat) = &options.baseline {
        match monitor.restore_baseline(flat) {
            Some(target) => debug!("Restored {target:?} baseline"),
            None => warn!("Stored baseline has no usable metrics; ignoring it"),
        }
    }
    if options.calibrate {
        monitor.start_calibration(CalibrationTarget::Both);
    }
    monitor
}
