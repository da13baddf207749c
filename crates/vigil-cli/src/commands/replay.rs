//! Replay command - run recorded landmark sessions through the monitor.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::{debug, info, warn};
use vigil_adapters::{discover_sessions, JsonBaselineStore, JsonlSessionSource};
use vigil_core::{
    replay_session, AlertConfig, BaselineStore, BlinkConfig, FrameOutput, MetricSet,
    MonitorConfig, PostureThresholds, ProgressEvent, ProgressSink, ReplayOptions, ResultOutput,
    Subsystems, YawnConfig,
};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Hardcoded default values for CLI-tunable settings.
mod defaults {
    pub const EAR_THRESHOLD: f64 = 0.21;
    pub const MAR_THRESHOLD: f64 = 0.65;
    pub const COOLDOWN: f64 = 30.0;
    pub const SESSION_LIMIT: f64 = 1200.0;
}

/// Parse and validate a ratio threshold (0.0-1.0).
fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Parse and validate a non-negative number (seconds or a ratio without upper bound).
fn parse_non_negative(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} must be a non-negative number"))
    }
}

/// Shared arguments for session replay.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct ReplayArgs {
    /// Session files (.jsonl) or directories to replay
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Disable blink, drowsiness and yawn monitoring
    #[arg(long)]
    pub no_eyes: bool,

    /// Disable posture monitoring
    #[arg(long)]
    pub no_posture: bool,

    /// Start eye and posture calibration at the first frame of each session
    #[arg(long)]
    pub calibrate: bool,

    /// Blink threshold used before eye calibration (0.0-1.0)
    #[arg(long, value_parser = parse_threshold)]
    pub ear_threshold: Option<f64>,

    /// Mouth aspect ratio above which the mouth counts as open
    #[arg(long, value_parser = parse_non_negative)]
    pub mar_threshold: Option<f64>,

    /// Minimum seconds between surfaced alerts
    #[arg(long, value_parser = parse_non_negative, value_name = "SECONDS")]
    pub cooldown: Option<f64>,

    /// Seconds of work before a 20-20-20 break reminder
    #[arg(long, value_parser = parse_non_negative, value_name = "SECONDS")]
    pub session_limit: Option<f64>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Only write frames that surfaced an alert
    #[arg(long)]
    pub alerts_only: bool,

    /// Write one summary per session instead of per-frame results
    #[arg(long, conflicts_with = "alerts_only")]
    pub summary: bool,

    /// Baseline file (overrides config and the default location)
    #[arg(long, value_name = "FILE")]
    pub baseline: Option<PathBuf>,

    /// Save the calibrated baseline after the replay
    #[arg(long)]
    pub save_baseline: bool,

    /// Do not restore the stored baseline
    #[arg(long)]
    pub no_baseline: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl ReplayArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods and core `Default` impls)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    ///
    /// For boolean flags: CLI `--no-*` always wins. Config can enable/disable
    /// only when CLI flag wasn't explicitly set.
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        // Subsystems: CLI --no-* takes precedence, then config, then default (enabled)
        if !args.no_eyes {
            if let Some(enabled) = config.general.eyes {
                args.no_eyes = !enabled;
            }
        }
        if !args.no_posture {
            if let Some(enabled) = config.general.posture {
                args.no_posture = !enabled;
            }
        }

        // Thresholds: CLI > config (accessor provides hardcoded fallback)
        args.ear_threshold = args.ear_threshold.or(config.eyes.ear_threshold);
        args.mar_threshold = args.mar_threshold.or(config.eyes.mar_threshold);
        args.cooldown = args.cooldown.or(config.alerts.cooldown_seconds);
        args.session_limit = args.session_limit.or(config.alerts.session_limit_seconds);

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }

        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        if args.baseline.is_none() {
            args.baseline.clone_from(&config.baseline.path);
        }

        // Store config for monitor_config to access advanced settings
        args.config = Some(config.clone());

        args
    }

    fn ear_threshold(&self) -> f64 {
        self.ear_threshold.unwrap_or(defaults::EAR_THRESHOLD)
    }

    fn mar_threshold(&self) -> f64 {
        self.mar_threshold.unwrap_or(defaults::MAR_THRESHOLD)
    }

    fn cooldown(&self) -> f64 {
        self.cooldown.unwrap_or(defaults::COOLDOWN)
    }

    fn session_limit(&self) -> f64 {
        self.session_limit.unwrap_or(defaults::SESSION_LIMIT)
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }

    fn baseline_path(&self) -> PathBuf {
        self.baseline
            .clone()
            .unwrap_or_else(vigil_adapters::default_baseline_path)
    }

    const fn frame_output(&self) -> FrameOutput {
        if self.summary {
            FrameOutput::SummaryOnly
        } else if self.alerts_only {
            FrameOutput::AlertsOnly
        } else {
            FrameOutput::All
        }
    }

    /// Build the monitor configuration from merged args (CLI + config).
    fn monitor_config(&self) -> MonitorConfig {
        let config = self.config.as_ref();
        let base = MonitorConfig::default();
        let blink = BlinkConfig::default();
        let yawn = YawnConfig::default();
        let posture = PostureThresholds::default();
        let alerts = AlertConfig::default();

        MonitorConfig {
            subsystems: Subsystems {
                eyes: !self.no_eyes,
                posture: !self.no_posture,
            },
            blink: BlinkConfig {
                smoothing_window: config
                    .and_then(|c| c.eyes.smoothing_window)
                    .unwrap_or(blink.smoothing_window),
                default_threshold: self.ear_threshold(),
                window_seconds: config
                    .and_then(|c| c.eyes.blink_window_seconds)
                    .unwrap_or(blink.window_seconds),
                ..blink
            },
            drowsy_time: config
                .and_then(|c| c.eyes.drowsy_time_seconds)
                .unwrap_or(base.drowsy_time),
            yawn: YawnConfig {
                mar_threshold: self.mar_threshold(),
                yawn_time: config
                    .and_then(|c| c.eyes.yawn_time_seconds)
                    .unwrap_or(yawn.yawn_time),
            },
            posture: PostureThresholds {
                ratio_drop: config
                    .and_then(|c| c.posture.ratio_drop)
                    .unwrap_or(posture.ratio_drop),
                shoulder_tilt: config
                    .and_then(|c| c.posture.shoulder_tilt_degrees)
                    .unwrap_or(posture.shoulder_tilt),
                head_shift: config
                    .and_then(|c| c.posture.head_shift)
                    .unwrap_or(posture.head_shift),
            },
            alerts: AlertConfig {
                focus_limit: config
                    .and_then(|c| c.alerts.focus_limit_seconds)
                    .unwrap_or(alerts.focus_limit),
                low_blink_rate: config
                    .and_then(|c| c.alerts.low_blink_rate)
                    .unwrap_or(alerts.low_blink_rate),
                low_blink_sustain: config
                    .and_then(|c| c.alerts.low_blink_sustain_seconds)
                    .unwrap_or(alerts.low_blink_sustain),
                session_limit: self.session_limit(),
                break_duration: config
                    .and_then(|c| c.alerts.break_duration_seconds)
                    .unwrap_or(alerts.break_duration),
                cooldown: self.cooldown(),
            },
            status_low_blink_rate: config
                .and_then(|c| c.eyes.status_low_blink_rate)
                .unwrap_or(base.status_low_blink_rate),
            eye_calibration_frames: config
                .and_then(|c| c.eyes.calibration_frames)
                .unwrap_or(base.eye_calibration_frames),
            posture_calibration_frames: config
                .and_then(|c| c.posture.calibration_frames)
                .unwrap_or(base.posture_calibration_frames),
        }
    }
}

/// Result of running the replay command.
pub struct ReplayReport {
    /// Sessions replayed.
    pub processed: usize,
    /// Sessions with no readable records.
    pub skipped: usize,
    /// Alerts surfaced across all sessions.
    pub alerts: usize,
}

impl ReplayReport {
    pub const fn exit_code(&self) -> ExitCode {
        if self.alerts > 0 {
            ExitCode::AlertsRaised
        } else {
            ExitCode::Success
        }
    }
}

/// Run the replay command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &ReplayArgs) -> Result<ReplayReport> {
    info!("Running replay command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    if args.no_eyes && args.no_posture {
        warn!("All subsystems disabled, nothing to monitor");
        return Ok(ReplayReport {
            processed: 0,
            skipped: 0,
            alerts: 0,
        });
    }

    let files = discover_sessions(&args.paths, args.recursive);
    if files.is_empty() {
        anyhow::bail!("No session files found");
    }

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress = ProgressBar::new(files.len() as u64, args.quiet, show_progress);

    let output = match args.format() {
        OutputFormat::Jsonl => JsonOutput::stdout(),
        OutputFormat::Json => JsonOutput::stdout().into_array(args.pretty),
    };

    let store = JsonBaselineStore::new(args.baseline_path());
    let baseline = if args.no_baseline {
        None
    } else {
        load_baseline(&store)
    };

    let options = ReplayOptions {
        monitor: args.monitor_config(),
        baseline,
        calibrate: args.calibrate,
        frames: args.frame_output(),
    };

    let (report, baseline) = replay_files(&files, &output, &progress, options, args.summary)?;

    output.finish()?;
    output.flush()?;

    progress.on_event(ProgressEvent::Finished {
        processed: report.processed,
        skipped: report.skipped,
    });

    if args.save_baseline {
        match baseline {
            Some(baseline) => store.save(&baseline)?,
            None => warn!("No calibrated baseline to save; use --calibrate or calibrate records"),
        }
    }

    Ok(report)
}

/// Restores the stored baseline, treating an unreadable file as absent.
fn load_baseline(store: &JsonBaselineStore) -> Option<MetricSet> {
    match store.load() {
        Ok(baseline) => {
            if baseline.is_some() {
                info!("Restoring baseline from {}", store.path().display());
            }
            baseline
        }
        Err(e) => {
            warn!("Ignoring baseline: {e:#}");
            None
        }
    }
}

/// Replays each file with a fresh monitor.
///
/// A baseline calibrated in one session carries over to the next.
fn replay_files(
    files: &[PathBuf],
    output: &JsonOutput,
    progress: &ProgressBar,
    mut options: ReplayOptions,
    write_summaries: bool,
) -> Result<(ReplayReport, Option<MetricSet>)> {
    let mut report = ReplayReport {
        processed: 0,
        skipped: 0,
        alerts: 0,
    };

    for (index, path) in files.iter().enumerate() {
        let source = JsonlSessionSource::new(path.clone());
        progress.on_event(ProgressEvent::Started {
            source: source.path().display().to_string(),
            index,
            total: files.len(),
        });

        let outcome = replay_session(&source, output, &options)
            .with_context(|| format!("Failed to replay {}", path.display()))?;
        let mut summary = outcome.summary;

        if summary.frames == 0 && summary.skipped_records > 0 {
            progress.on_event(ProgressEvent::Skipped {
                source: summary.source,
                reason: format!("{} unreadable records", summary.skipped_records),
            });
            report.skipped += 1;
            continue;
        }

        summary.analyzed_at = Some(iso_timestamp());
        if write_summaries {
            output.write_summary(&summary)?;
        }

        report.alerts += summary.alerts.len();
        report.processed += 1;
        if outcome.baseline.is_some() {
            options.baseline = outcome.baseline;
        }

        progress.on_event(ProgressEvent::Completed { summary });
    }

    debug!(
        "Replayed {} sessions, {} skipped, {} alerts",
        report.processed, report.skipped, report.alerts
    );
    Ok((report, options.baseline))
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
