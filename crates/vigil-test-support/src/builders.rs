//! Synthetic landmark frame and session builders for testing.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use vigil_core::domain::names;
use vigil_core::{CalibrationTarget, LandmarkFrame, SessionRecord};

/// Default synthetic frame width in pixels.
pub const WIDTH: u32 = 640;
/// Default synthetic frame height in pixels.
pub const HEIGHT: u32 = 480;

/// Eye width in normalized x units.
const EYE_WIDTH: f64 = 0.1;
/// Mouth width in normalized x units.
const MOUTH_WIDTH: f64 = 0.1;

/// Builder for synthetic landmark frames.
///
/// Eye and mouth geometry is laid out so the pixel-space EAR and MAR come
/// out exactly as requested, regardless of the frame's aspect ratio.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    frame: LandmarkFrame,
}

impl FrameBuilder {
    /// Starts an empty 640x480 frame.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dimensions(WIDTH, HEIGHT)
    }

    /// Starts an empty frame with the given pixel dimensions.
    #[must_use]
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            frame: LandmarkFrame::new(width, height),
        }
    }

    /// Adds both eye contours with the given eye aspect ratio.
    #[must_use]
    pub fn eyes(mut self, ear: f64) -> Self {
        // Vertical gaps are `ear * EYE_WIDTH` in pixel space.
        let dy = self.y_units(ear * EYE_WIDTH / 2.0);
        for (keys, cx) in [(names::LEFT_EYE, 0.35), (names::RIGHT_EYE, 0.65)] {
            let half = EYE_WIDTH / 2.0;
            let contour = [
                (cx - half, 0.4),
                (cx - 0.02, 0.4 - dy),
                (cx + 0.02, 0.4 - dy),
                (cx + half, 0.4),
                (cx + 0.02, 0.4 + dy),
                (cx - 0.02, 0.4 + dy),
            ];
            for (name, (x, y)) in keys.iter().zip(contour) {
                self.frame = self.frame.with_point(name, x, y);
            }
        }
        self
    }

    /// Adds mouth landmarks with the given mouth aspect ratio.
    #[must_use]
    pub fn mouth(mut self, mar: f64) -> Self {
        let dy = self.y_units(mar * MOUTH_WIDTH / 2.0);
        self.frame = self
            .frame
            .with_point(names::MOUTH_TOP, 0.5, 0.6 - dy)
            .with_point(names::MOUTH_BOTTOM, 0.5, 0.6 + dy)
            .with_point(names::MOUTH_LEFT, 0.5 - MOUTH_WIDTH / 2.0, 0.6)
            .with_point(names::MOUTH_RIGHT, 0.5 + MOUTH_WIDTH / 2.0, 0.6);
        self
    }

    /// Adds pose landmarks: eyes at `eye_y`, shoulders at `shoulder_y`
    /// (x = 0.3 and 0.7) and the nose at `nose_x`.
    #[must_use]
    pub fn pose(mut self, eye_y: f64, shoulder_y: f64, nose_x: f64) -> Self {
        self.frame = self
            .frame
            .with_point(names::NOSE, nose_x, eye_y + 0.05)
            .with_point(names::POSE_LEFT_EYE, 0.55, eye_y)
            .with_point(names::POSE_RIGHT_EYE, 0.45, eye_y)
            .with_point(names::LEFT_SHOULDER, 0.7, shoulder_y)
            .with_point(names::RIGHT_SHOULDER, 0.3, shoulder_y);
        self
    }

    /// Upright reference pose (eye-shoulder ratio 0.625).
    #[must_use]
    pub fn upright(self) -> Self {
        self.pose(0.25, 0.5, 0.5)
    }

    /// Shoulders raised towards the eyes (ratio 0.375).
    #[must_use]
    pub fn hunched(self) -> Self {
        self.pose(0.25, 0.4, 0.5)
    }

    /// Raises the left shoulder by `dy`, tilting the shoulder line.
    #[must_use]
    pub fn tilt_shoulders(mut self, dy: f64) -> Self {
        if let Some(p) = self.frame.get(names::LEFT_SHOULDER) {
            self.frame = self.frame.with_point(names::LEFT_SHOULDER, p.x, p.y - dy);
        }
        self
    }

    /// A face with open eyes, a closed mouth and an upright pose.
    #[must_use]
    pub fn attentive() -> LandmarkFrame {
        Self::new().eyes(0.3).mouth(0.05).upright().build()
    }

    #[must_use]
    pub fn build(self) -> LandmarkFrame {
        self.frame
    }

    /// Converts a pixel-space span measured in x pixels into normalized y units.
    fn y_units(&self, x_units: f64) -> f64 {
        if self.frame.height == 0 {
            return x_units;
        }
        x_units * f64::from(self.frame.width) / f64::from(self.frame.height)
    }
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for recorded sessions at a fixed frame rate.
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    records: Vec<SessionRecord>,
    clock: f64,
    frame_interval: f64,
}

impl SessionBuilder {
    /// Starts a session at t = 0 with the given frames per second.
    #[must_use]
    pub fn new(fps: f64) -> Self {
        Self {
            records: Vec::new(),
            clock: 0.0,
            frame_interval: 1.0 / fps,
        }
    }

    /// Appends one frame at the current time and advances the clock.
    #[must_use]
    pub fn frame(mut self, frame: &LandmarkFrame) -> Self {
        self.records
            .push(SessionRecord::frame(self.clock, frame.clone()));
        self.clock += self.frame_interval;
        self
    }

    /// Appends `count` copies of a frame.
    #[must_use]
    pub fn frames(self, count: usize, frame: &LandmarkFrame) -> Self {
        (0..count).fold(self, |builder, _| builder.frame(frame))
    }

    /// Appends frames for `seconds` of wall time.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn hold(self, seconds: f64, frame: &LandmarkFrame) -> Self {
        let count = (seconds / self.frame_interval).round().max(0.0) as usize;
        self.frames(count, frame)
    }

    /// Appends a calibration control record at the current time.
    #[must_use]
    pub fn calibrate(mut self, target: CalibrationTarget) -> Self {
        self.records.push(SessionRecord::Calibrate {
            timestamp: self.clock,
            target,
        });
        self
    }

    /// Advances the clock without recording frames.
    #[must_use]
    pub fn idle(mut self, seconds: f64) -> Self {
        self.clock += seconds;
        self
    }

    /// Current session time.
    #[must_use]
    pub const fn now(&self) -> f64 {
        self.clock
    }

    #[must_use]
    pub fn build(self) -> Vec<SessionRecord> {
        self.records
    }

    /// Serializes the session as JSON Lines.
    ///
    /// # Errors
    ///
    /// Returns an error if a record fails to serialize.
    pub fn to_jsonl(&self) -> Result<String> {
        let mut out = String::new();
        for record in &self.records {
            let line = serde_json::to_string(record)?;
            writeln!(out, "{line}")?;
        }
        Ok(out)
    }

    /// Writes the session to a JSON Lines file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_jsonl(&self, path: &Path) -> Result<()> {
        let content = self.to_jsonl()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write session: {}", path.display()))
    }
}
