//! Signal extraction: pure functions from landmarks to scalar metrics.
//!
//! - EAR (eye aspect ratio) per eye, from six contour points
//! - MAR (mouth aspect ratio), from four lip points
//! - Posture ratios, from pose eyes, shoulders and nose
//!
//! Degenerate geometry yields 0.0 (ratios) or `None` (posture) instead of a
//! division error. Missing landmarks yield `None`.

use crate::domain::{names, EyeMetrics, LandmarkFrame, Point, PostureMetrics};

/// Shoulder widths below this (normalized units) are treated as unusable.
pub const MIN_SHOULDER_WIDTH: f64 = 0.01;

/// Eye aspect ratio: `(|p2-p6| + |p3-p5|) / (2 * |p1-p4|)`.
///
/// Points are ordered outer corner, two upper lid points, inner corner,
/// two lower lid points. Returns 0.0 when the eye has no width.
#[must_use]
pub fn compute_ear(points: &[Point; 6]) -> f64 {
    let [p1, p2, p3, p4, p5, p6] = points;
    let horizontal = p1.distance(p4);
    if horizontal == 0.0 {
        return 0.0;
    }
    (p2.distance(p6) + p3.distance(p5)) / (2.0 * horizontal)
}

/// Mouth aspect ratio: vertical lip gap over mouth width.
///
/// Returns 0.0 when the mouth has no width.
#[must_use]
pub fn compute_mar(top: Point, bottom: Point, left: Point, right: Point) -> f64 {
    let horizontal = left.distance(&right);
    if horizontal == 0.0 {
        return 0.0;
    }
    top.distance(&bottom) / horizontal
}

/// Posture metrics from pose landmarks in normalized coordinates.
///
/// Returns `None` when the shoulders are closer than [`MIN_SHOULDER_WIDTH`].
#[must_use]
pub fn compute_posture_metrics(
    left_eye: Point,
    right_eye: Point,
    left_shoulder: Point,
    right_shoulder: Point,
    nose: Point,
) -> Option<PostureMetrics> {
    let shoulder_width = (left_shoulder.x - right_shoulder.x).abs();
    if shoulder_width < MIN_SHOULDER_WIDTH {
        return None;
    }

    let eye_center_y = (left_eye.y + right_eye.y) / 2.0;
    let shoulder_center_y = (left_shoulder.y + right_shoulder.y) / 2.0;
    let shoulder_center_x = (left_shoulder.x + right_shoulder.x) / 2.0;

    let shoulder_angle = (left_shoulder.y - right_shoulder.y)
        .atan2(left_shoulder.x - right_shoulder.x)
        .to_degrees();

    Some(PostureMetrics {
        eye_shoulder_ratio: (eye_center_y - shoulder_center_y).abs() / shoulder_width,
        shoulder_angle,
        head_forward: (nose.x - shoulder_center_x).abs(),
    })
}

/// Extracts eye and mouth ratios from a frame.
///
/// Ratios are computed in pixel space. Returns `None` if the frame has no
/// pixel dimensions or any eye contour point is missing. Missing mouth
/// landmarks report a MAR of 0.0.
#[must_use]
pub fn eye_metrics(frame: &LandmarkFrame) -> Option<EyeMetrics> {
    if !frame.has_dimensions() {
        return None;
    }

    let left_ear = compute_ear(&eye_contour(frame, &names::LEFT_EYE)?);
    let right_ear = compute_ear(&eye_contour(frame, &names::RIGHT_EYE)?);

    let mar = match (
        frame.pixel(names::MOUTH_TOP),
        frame.pixel(names::MOUTH_BOTTOM),
        frame.pixel(names::MOUTH_LEFT),
        frame.pixel(names::MOUTH_RIGHT),
    ) {
        (Some(top), Some(bottom), Some(left), Some(right)) => compute_mar(top, bottom, left, right),
        _ => 0.0,
    };

    Some(EyeMetrics {
        left_ear,
        right_ear,
        avg_ear: (left_ear + right_ear) / 2.0,
        mar,
    })
}

/// Extracts posture metrics from a frame.
#[must_use]
pub fn posture_metrics(frame: &LandmarkFrame) -> Option<PostureMetrics> {
    compute_posture_metrics(
        frame.get(names::POSE_LEFT_EYE)?,
        frame.get(names::POSE_RIGHT_EYE)?,
        frame.get(names::LEFT_SHOULDER)?,
        frame.get(names::RIGHT_SHOULDER)?,
        frame.get(names::NOSE)?,
    )
}

fn eye_contour(frame: &LandmarkFrame, keys: &[&str; 6]) -> Option<[Point; 6]> {
    let mut points = [Point::new(0.0, 0.0); 6];
    for (slot, key) in points.iter_mut().zip(keys) {
        *slot = frame.pixel(key)?;
    }
    Some(points)
}
