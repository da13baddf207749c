//! Configuration file support for vigil.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/vigil/config.toml` (lowest priority)
//! - Project-local: `.vigil.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Blink, drowsiness and yawn settings.
    pub eyes: EyesConfig,
    /// Posture classification settings.
    pub posture: PostureConfig,
    /// Alert rule and break timer settings.
    pub alerts: AlertsConfig,
    /// Baseline persistence settings.
    pub baseline: BaselineConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable/disable the eye subsystem.
    pub eyes: Option<bool>,
    /// Enable/disable the posture subsystem.
    pub posture: Option<bool>,
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Eye subsystem configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct EyesConfig {
    /// Blink threshold used before calibration.
    pub ear_threshold: Option<f64>,
    /// Raw EAR samples averaged per frame.
    pub smoothing_window: Option<usize>,
    /// Trailing window for the blink rate.
    pub blink_window_seconds: Option<f64>,
    /// Closure duration that counts as drowsy.
    pub drowsy_time_seconds: Option<f64>,
    /// Mouth aspect ratio above which the mouth counts as open.
    pub mar_threshold: Option<f64>,
    /// How long the mouth must stay open to count as a yawn.
    pub yawn_time_seconds: Option<f64>,
    /// Blinks per minute under which a calibrated user sees a low-blink status.
    pub status_low_blink_rate: Option<f64>,
    /// Frames sampled by eye calibration.
    pub calibration_frames: Option<usize>,
}

/// Posture subsystem configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PostureConfig {
    /// Relative eye-shoulder ratio drop that counts as hunching.
    pub ratio_drop: Option<f64>,
    /// Shoulder angle change (degrees) that counts as uneven.
    pub shoulder_tilt_degrees: Option<f64>,
    /// Nose offset change that counts as forward head posture.
    pub head_shift: Option<f64>,
    /// Frames sampled by posture calibration.
    pub calibration_frames: Option<usize>,
}

/// Alert configuration, all durations in seconds.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub focus_limit_seconds: Option<f64>,
    pub low_blink_rate: Option<f64>,
    pub low_blink_sustain_seconds: Option<f64>,
    pub session_limit_seconds: Option<f64>,
    pub break_duration_seconds: Option<f64>,
    pub cooldown_seconds: Option<f64>,
}

/// Baseline persistence configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// Baseline file path.
    pub path: Option<PathBuf>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/vigil/config.toml`
    /// 2. Project-local: `.vigil.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Out-of-range values are reported as
    /// warnings and dropped.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        for warning in config.sanitize() {
            eprintln!("warning: {warning}");
        }

        config
    }

    /// Drop values outside their acceptable ranges.
    ///
    /// Returns one warning per dropped key; dropped keys fall back to the
    /// built-in defaults.
    fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        for (key, slot) in [
            ("eyes.ear_threshold", &mut self.eyes.ear_threshold),
            ("posture.ratio_drop", &mut self.posture.ratio_drop),
        ] {
            reject_unless(
                key,
                slot,
                |v| (0.0..=1.0).contains(&v),
                "must be 0.0-1.0",
                &mut warnings,
            );
        }

        for (key, slot) in [
            ("eyes.blink_window_seconds", &mut self.eyes.blink_window_seconds),
            ("eyes.drowsy_time_seconds", &mut self.eyes.drowsy_time_seconds),
            ("eyes.mar_threshold", &mut self.eyes.mar_threshold),
            ("eyes.yawn_time_seconds", &mut self.eyes.yawn_time_seconds),
            ("eyes.status_low_blink_rate", &mut self.eyes.status_low_blink_rate),
            ("posture.shoulder_tilt_degrees", &mut self.posture.shoulder_tilt_degrees),
            ("posture.head_shift", &mut self.posture.head_shift),
            ("alerts.focus_limit_seconds", &mut self.alerts.focus_limit_seconds),
            ("alerts.low_blink_rate", &mut self.alerts.low_blink_rate),
            (
                "alerts.low_blink_sustain_seconds",
                &mut self.alerts.low_blink_sustain_seconds,
            ),
            ("alerts.session_limit_seconds", &mut self.alerts.session_limit_seconds),
            (
                "alerts.break_duration_seconds",
                &mut self.alerts.break_duration_seconds,
            ),
            ("alerts.cooldown_seconds", &mut self.alerts.cooldown_seconds),
        ] {
            reject_unless(
                key,
                slot,
                |v| v.is_finite() && v >= 0.0,
                "must be a non-negative number",
                &mut warnings,
            );
        }

        for (key, slot) in [
            ("eyes.smoothing_window", &mut self.eyes.smoothing_window),
            ("eyes.calibration_frames", &mut self.eyes.calibration_frames),
            ("posture.calibration_frames", &mut self.posture.calibration_frames),
        ] {
            reject_unless(key, slot, |v| v >= 1, "must be at least 1", &mut warnings);
        }

        if let Some(f) = self.output.format.take() {
            if f == "json" || f == "jsonl" {
                self.output.format = Some(f);
            } else {
                warnings.push(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'; ignoring it"
                ));
            }
        }

        warnings
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // General
        self.general.eyes = other.general.eyes.or(self.general.eyes);
        self.general.posture = other.general.posture.or(self.general.posture);
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        // Eyes
        self.eyes.ear_threshold = other.eyes.ear_threshold.or(self.eyes.ear_threshold);
        self.eyes.smoothing_window = other.eyes.smoothing_window.or(self.eyes.smoothing_window);
        self.eyes.blink_window_seconds = other
            .eyes
            .blink_window_seconds
            .or(self.eyes.blink_window_seconds);
        self.eyes.drowsy_time_seconds = other
            .eyes
            .drowsy_time_seconds
            .or(self.eyes.drowsy_time_seconds);
        self.eyes.mar_threshold = other.eyes.mar_threshold.or(self.eyes.mar_threshold);
        self.eyes.yawn_time_seconds = other
            .eyes
            .yawn_time_seconds
            .or(self.eyes.yawn_time_seconds);
        self.eyes.status_low_blink_rate = other
            .eyes
            .status_low_blink_rate
            .or(self.eyes.status_low_blink_rate);
        self.eyes.calibration_frames = other
            .eyes
            .calibration_frames
            .or(self.eyes.calibration_frames);

        // Posture
        self.posture.ratio_drop = other.posture.ratio_drop.or(self.posture.ratio_drop);
        self.posture.shoulder_tilt_degrees = other
            .posture
            .shoulder_tilt_degrees
            .or(self.posture.shoulder_tilt_degrees);
        self.posture.head_shift = other.posture.head_shift.or(self.posture.head_shift);
        self.posture.calibration_frames = other
            .posture
            .calibration_frames
            .or(self.posture.calibration_frames);

        // Alerts
        self.alerts.focus_limit_seconds = other
            .alerts
            .focus_limit_seconds
            .or(self.alerts.focus_limit_seconds);
        self.alerts.low_blink_rate = other.alerts.low_blink_rate.or(self.alerts.low_blink_rate);
        self.alerts.low_blink_sustain_seconds = other
            .alerts
            .low_blink_sustain_seconds
            .or(self.alerts.low_blink_sustain_seconds);
        self.alerts.session_limit_seconds = other
            .alerts
            .session_limit_seconds
            .or(self.alerts.session_limit_seconds);
        self.alerts.break_duration_seconds = other
            .alerts
            .break_duration_seconds
            .or(self.alerts.break_duration_seconds);
        self.alerts.cooldown_seconds = other
            .alerts
            .cooldown_seconds
            .or(self.alerts.cooldown_seconds);

        // Baseline
        self.baseline.path = other.baseline.path.or_else(|| self.baseline.path.take());

        // Output
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Clear `slot` and record a warning when its value fails `valid`.
fn reject_unless<T: Copy + std::fmt::Display>(
    key: &str,
    slot: &mut Option<T>,
    valid: impl Fn(T) -> bool,
    rule: &str,
    warnings: &mut Vec<String>,
) {
    if let Some(v) = *slot {
        if !valid(v) {
            warnings.push(format!("{key} {rule}, got {v}; ignoring it"));
            *slot = None;
        }
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vigil").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.vigil.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".vigil.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
