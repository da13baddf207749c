//! Landmark frames and canonical landmark names.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A 2D point in normalized image coordinates (0.0-1.0 on both axes).
///
/// Serialized as a two-element array `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Scales a normalized point into pixel space.
    #[must_use]
    pub fn scaled(&self, width: f64, height: f64) -> Self {
        Self::new(self.x * width, self.y * height)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// A single frame of named landmarks produced by an external pose/face model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Landmarks keyed by canonical name.
    pub points: BTreeMap<String, Point>,
}

impl LandmarkFrame {
    /// Creates an empty frame with the given pixel dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            points: BTreeMap::new(),
        }
    }

    /// Adds a landmark, translating MediaPipe index keys to canonical names.
    #[must_use]
    pub fn with_point(mut self, name: &str, x: f64, y: f64) -> Self {
        self.insert(name, Point::new(x, y));
        self
    }

    /// Inserts a landmark, translating MediaPipe index keys to canonical names.
    pub fn insert(&mut self, name: &str, point: Point) {
        self.points.insert(canonical_name(name).into_owned(), point);
    }

    /// Returns the landmark with the given canonical name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Point> {
        self.points.get(name).copied()
    }

    /// Returns the landmark scaled into pixel coordinates.
    #[must_use]
    pub fn pixel(&self, name: &str) -> Option<Point> {
        self.get(name)
            .map(|p| p.scaled(f64::from(self.width), f64::from(self.height)))
    }

    /// Returns true if the frame has non-zero pixel dimensions.
    #[must_use]
    pub const fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Canonical landmark names consumed by the signal extractor.
pub mod names {
    /// Left eye contour in EAR order: outer corner, two upper lid points,
    /// inner corner, two lower lid points.
    pub const LEFT_EYE: [&str; 6] = [
        "left_eye_outer",
        "left_eye_upper_outer",
        "left_eye_upper_inner",
        "left_eye_inner",
        "left_eye_lower_inner",
        "left_eye_lower_outer",
    ];

    /// Right eye contour in EAR order.
    pub const RIGHT_EYE: [&str; 6] = [
        "right_eye_inner",
        "right_eye_upper_inner",
        "right_eye_upper_outer",
        "right_eye_outer",
        "right_eye_lower_outer",
        "right_eye_lower_inner",
    ];

    pub const MOUTH_TOP: &str = "mouth_top";
    pub const MOUTH_BOTTOM: &str = "mouth_bottom";
    pub const MOUTH_LEFT: &str = "mouth_left";
    pub const MOUTH_RIGHT: &str = "mouth_right";

    pub const NOSE: &str = "nose";
    pub const POSE_LEFT_EYE: &str = "pose_left_eye";
    pub const POSE_RIGHT_EYE: &str = "pose_right_eye";
    pub const LEFT_SHOULDER: &str = "left_shoulder";
    pub const RIGHT_SHOULDER: &str = "right_shoulder";
}

/// FaceMesh indices for the landmarks the extractor reads.
const FACE_MESH: &[(u32, &str)] = &[
    (33, names::LEFT_EYE[0]),
    (160, names::LEFT_EYE[1]),
    (158, names::LEFT_EYE[2]),
    (133, names::LEFT_EYE[3]),
    (153, names::LEFT_EYE[4]),
    (144, names::LEFT_EYE[5]),
    (362, names::RIGHT_EYE[0]),
    (385, names::RIGHT_EYE[1]),
    (387, names::RIGHT_EYE[2]),
    (263, names::RIGHT_EYE[3]),
    (373, names::RIGHT_EYE[4]),
    (380, names::RIGHT_EYE[5]),
    (13, names::MOUTH_TOP),
    (14, names::MOUTH_BOTTOM),
    (78, names::MOUTH_LEFT),
    (308, names::MOUTH_RIGHT),
];

/// Pose model indices for the landmarks the extractor reads.
const POSE: &[(u32, &str)] = &[
    (0, names::NOSE),
    (2, names::POSE_LEFT_EYE),
    (5, names::POSE_RIGHT_EYE),
    (11, names::LEFT_SHOULDER),
    (12, names::RIGHT_SHOULDER),
];

/// Maps `face:<index>` / `pose:<index>` keys onto canonical names.
///
/// Keys that are already canonical, or indices the extractor does not use,
/// are returned unchanged.
#[must_use]
pub fn canonical_name(key: &str) -> Cow<'_, str> {
    let lookup = |table: &[(u32, &'static str)], index: &str| {
        let index: u32 = index.parse().ok()?;
        table.iter().find(|(i, _)| *i == index).map(|(_, n)| *n)
    };

    let mapped = if let Some(index) = key.strip_prefix("face:") {
        lookup(FACE_MESH, index)
    } else if let Some(index) = key.strip_prefix("pose:") {
        lookup(POSE, index)
    } else {
        None
    };

    mapped.map_or(Cow::Borrowed(key), Cow::Borrowed)
}
