//! # hand_pose
//!
//! The 21-point hand skeleton reported by hand trackers such as MediaPipe
//! Hands, in normalized image coordinates.
//!
//! ## Index convention
//!
//! | Index | Joint | Index | Joint |
//! |---|---|---|---|
//! | 0 | wrist | | |
//! | 1–4 | thumb CMC, MCP, IP, tip | 5–8 | index MCP, PIP, DIP, tip |
//! | 9–12 | middle MCP, PIP, DIP, tip | 13–16 | ring MCP, PIP, DIP, tip |
//! | 17–20 | pinky MCP, PIP, DIP, tip | | |
//!
//! `x` grows to the right and `y` grows downward, both in `[0, 1]`.
//! `z` is carried through but never interpreted.
//!
//! ## Quick start
//!
//! ```rust
//! use hand_pose::{parse_frame, presets::Preset, Finger};
//!
//! let pose = Preset::OpenPalm.pose();
//! assert!(pose.tip(Finger::Index).y < pose.joint(Finger::Index).y);
//!
//! // A tracker frame with no hand in view
//! assert!(parse_frame("null").unwrap().is_none());
//! ```

use std::ops::Index;

use serde::{Deserialize, Serialize};

pub mod presets;
pub mod report;

pub use report::parse_frame;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

/// Number of landmarks in one hand report.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Skeleton edges for overlay drawing: four bones per digit plus the
/// index–middle knuckle bar.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC),   (THUMB_CMC, THUMB_MCP),   (THUMB_MCP, THUMB_IP),    (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP),   (INDEX_MCP, INDEX_PIP),   (INDEX_PIP, INDEX_DIP),   (INDEX_DIP, INDEX_TIP),
    (WRIST, MIDDLE_MCP),  (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (WRIST, RING_MCP),    (RING_MCP, RING_PIP),     (RING_PIP, RING_DIP),     (RING_DIP, RING_TIP),
    (WRIST, PINKY_MCP),   (PINKY_MCP, PINKY_PIP),   (PINKY_PIP, PINKY_DIP),   (PINKY_DIP, PINKY_TIP),
    (INDEX_MCP, MIDDLE_MCP),
];

// ════════════════════════════════════════════════════════════════════════════
// Finger
// ════════════════════════════════════════════════════════════════════════════

/// One of the five digits, thumb first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb, Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky,
    ];

    /// Index of the first landmark of this digit's group of four.
    pub fn base(self) -> usize {
        match self {
            Finger::Thumb  => THUMB_CMC,
            Finger::Index  => INDEX_MCP,
            Finger::Middle => MIDDLE_MCP,
            Finger::Ring   => RING_MCP,
            Finger::Pinky  => PINKY_MCP,
        }
    }

    /// Landmark index of the fingertip.
    pub fn tip(self) -> usize { self.base() + 3 }

    /// Landmark index of the joint the tip is compared against when
    /// deciding extension: IP for the thumb, PIP for the others.
    pub fn joint(self) -> usize {
        match self {
            Finger::Thumb => THUMB_IP,
            other         => other.base() + 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Finger::Thumb  => "thumb",
            Finger::Index  => "index",
            Finger::Middle => "middle",
            Finger::Ring   => "ring",
            Finger::Pinky  => "pinky",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// A single tracked point in normalized image space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Relative depth; some trackers omit it.
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Landmark { x, y, z: 0.0 }
    }

    /// Planar Euclidean distance; `z` is ignored.
    pub fn distance_2d(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PoseError
// ════════════════════════════════════════════════════════════════════════════

/// Why a landmark report could not be turned into a [`HandPose`].
#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("expected {LANDMARK_COUNT} landmarks, found {found}")]
    WrongLandmarkCount { found: usize },

    #[error("landmark {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },

    #[error("landmark {index} needs 2 or 3 coordinates, found {found}")]
    MissingCoordinate { index: usize, found: usize },

    #[error("no landmark {index}; indices run 0..{LANDMARK_COUNT}")]
    NoSuchLandmark { index: usize },

    #[error("frame report is not valid UTF-8")]
    NotUtf8(#[from] std::string::FromUtf8Error),

    #[error("malformed frame report: {0}")]
    Json(#[from] serde_json::Error),
}

// ════════════════════════════════════════════════════════════════════════════
// HandPose
// ════════════════════════════════════════════════════════════════════════════

/// Exactly 21 finite landmarks for one hand in one frame.
///
/// Construction is the only validation point: every `HandPose` in
/// circulation is well-formed, so consumers never re-check the count.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct HandPose {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl HandPose {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Result<Self, PoseError> {
        if let Some(index) = landmarks.iter().position(|l| !l.is_finite()) {
            return Err(PoseError::NonFiniteCoordinate { index });
        }
        Ok(HandPose { landmarks })
    }

    pub fn from_slice(points: &[Landmark]) -> Result<Self, PoseError> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| PoseError::WrongLandmarkCount { found: points.len() })?;
        HandPose::new(landmarks)
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] { &self.landmarks }

    pub fn tip(&self, finger: Finger) -> Landmark { self.landmarks[finger.tip()] }

    pub fn joint(&self, finger: Finger) -> Landmark { self.landmarks[finger.joint()] }

    /// The same hand seen through a horizontally flipped camera.
    pub fn mirrored(&self) -> HandPose {
        let mut landmarks = self.landmarks;
        for l in &mut landmarks {
            l.x = 1.0 - l.x;
        }
        HandPose { landmarks }
    }

    /// Shift every landmark by `(dx, dy)`.
    pub fn translated(&self, dx: f32, dy: f32) -> HandPose {
        let mut landmarks = self.landmarks;
        for l in &mut landmarks {
            l.x += dx;
            l.y += dy;
        }
        HandPose { landmarks }
    }

    /// Replace one landmark, keeping the pose well-formed.
    pub fn with_landmark(&self, index: usize, landmark: Landmark) -> Result<HandPose, PoseError> {
        let mut landmarks = self.landmarks;
        let slot = landmarks.get_mut(index).ok_or(PoseError::NoSuchLandmark { index })?;
        *slot = landmark;
        HandPose::new(landmarks)
    }
}

impl Index<usize> for HandPose {
    type Output = Landmark;
    fn index(&self, index: usize) -> &Landmark { &self.landmarks[index] }
}

impl TryFrom<Vec<Landmark>> for HandPose {
    type Error = PoseError;
    fn try_from(points: Vec<Landmark>) -> Result<Self, PoseError> {
        HandPose::from_slice(&points)
    }
}

impl From<HandPose> for Vec<Landmark> {
    fn from(pose: HandPose) -> Self { pose.landmarks.to_vec() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::Preset;

    #[test]
    fn finger_indices_follow_convention() {
        assert_eq!(Finger::Thumb.tip(), THUMB_TIP);
        assert_eq!(Finger::Thumb.joint(), THUMB_IP);
        assert_eq!(Finger::Index.joint(), INDEX_PIP);
        assert_eq!(Finger::Middle.tip(), MIDDLE_TIP);
        assert_eq!(Finger::Ring.joint(), RING_PIP);
        assert_eq!(Finger::Pinky.tip(), PINKY_TIP);
    }

    #[test]
    fn connections_stay_in_range() {
        for (a, b) in HAND_CONNECTIONS {
            assert!(a < LANDMARK_COUNT && b < LANDMARK_COUNT);
        }
    }

    #[test]
    fn short_slice_rejected() {
        let points = vec![Landmark::new(0.5, 0.5); 15];
        let err = HandPose::from_slice(&points).unwrap_err();
        assert!(matches!(err, PoseError::WrongLandmarkCount { found: 15 }));
    }

    #[test]
    fn long_slice_rejected() {
        let points = vec![Landmark::new(0.5, 0.5); 22];
        assert!(matches!(
            HandPose::from_slice(&points),
            Err(PoseError::WrongLandmarkCount { found: 22 })
        ));
    }

    #[test]
    fn nan_coordinate_rejected() {
        let mut points = vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        points[7].y = f32::NAN;
        assert!(matches!(
            HandPose::from_slice(&points),
            Err(PoseError::NonFiniteCoordinate { index: 7 })
        ));
    }

    #[test]
    fn with_landmark_replaces_one_point() {
        let pose = Preset::Fist.pose();
        let moved = pose.with_landmark(INDEX_TIP, Landmark::new(0.1, 0.2)).unwrap();
        assert_eq!(moved[INDEX_TIP], Landmark::new(0.1, 0.2));
        assert_eq!(moved[WRIST], pose[WRIST]);
    }

    #[test]
    fn with_landmark_out_of_range_is_an_error() {
        let pose = Preset::Fist.pose();
        assert!(matches!(
            pose.with_landmark(LANDMARK_COUNT, Landmark::new(0.5, 0.5)),
            Err(PoseError::NoSuchLandmark { index: 21 })
        ));
    }

    #[test]
    fn with_landmark_rejects_non_finite() {
        let pose = Preset::Fist.pose();
        assert!(matches!(
            pose.with_landmark(THUMB_TIP, Landmark::new(f32::INFINITY, 0.5)),
            Err(PoseError::NonFiniteCoordinate { index: 4 })
        ));
    }

    #[test]
    fn mirror_twice_is_identity() {
        let pose = Preset::ThumbUp.pose();
        let back = pose.mirrored().mirrored();
        for (a, b) in pose.landmarks().iter().zip(back.landmarks()) {
            assert!((a.x - b.x).abs() < 1e-6);
            assert_eq!(a.y, b.y);
        }
    }

    #[test]
    fn translate_moves_every_point() {
        let pose = Preset::Fist.pose();
        let moved = pose.translated(0.1, -0.05);
        assert!((moved[WRIST].x - (pose[WRIST].x + 0.1)).abs() < 1e-6);
        assert!((moved[PINKY_TIP].y - (pose[PINKY_TIP].y - 0.05)).abs() < 1e-6);
    }

    #[test]
    fn serde_as_plain_array() {
        let pose = Preset::VSign.pose();
        let json = serde_json::to_string(&pose).unwrap();
        assert!(json.starts_with('['));
        let back: HandPose = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pose);
    }

    #[test]
    fn serde_rejects_wrong_count() {
        let json = r#"[{"x":0.1,"y":0.2},{"x":0.3,"y":0.4}]"#;
        assert!(serde_json::from_str::<HandPose>(json).is_err());
    }

    #[test]
    fn distance_ignores_depth() {
        let a = Landmark { x: 0.0, y: 0.0, z: 5.0 };
        let b = Landmark::new(0.3, 0.4);
        assert!((a.distance_2d(&b) - 0.5).abs() < 1e-6);
    }
}
