//! # gesture_classifier
//!
//! Maps one [`HandPose`] to one [`GestureLabel`].
//!
//! Classification is a pure function of the current pose: no state is kept
//! between frames, nothing is allocated, and the same pose always yields
//! the same label. A [`GestureClassifier`] is `Copy + Send + Sync` and can be
//! shared freely between frame pipelines.
//!
//! ## Decision order
//!
//! | Step | Condition | Label |
//! |---|---|---|
//! | 1 | thumb-tip ↔ index-tip distance `< 0.05` | `PINCH` |
//! | 2 | all five digits extended | `OPEN_PALM` |
//! | 3 | no digit extended | `FIST` |
//! | 4 | index + middle only | `V_SIGN` |
//! | 5 | thumb only | `THUMB_UP` |
//! | 6 | anything else | `UNKNOWN` |
//!
//! A digit other than the thumb is extended when its tip sits above its PIP
//! joint in the image. The thumb is extended when its tip lies past the IP
//! joint along the hand's own lateral axis (pinky knuckle → index knuckle),
//! so the test holds for either hand and either camera mirroring. See
//! [`ThumbRule`].
//!
//! ```rust
//! use gesture_classifier::{classify, GestureLabel};
//! use hand_pose::presets::Preset;
//!
//! assert_eq!(classify(Some(&Preset::VSign.pose())), GestureLabel::VSign);
//! assert_eq!(classify(None), GestureLabel::Unknown);
//! ```

use std::fmt;
use std::str::FromStr;

use hand_pose::{Finger, HandPose, Landmark, PoseError, INDEX_MCP, PINKY_MCP};
use serde::{Deserialize, Serialize};

/// Thumb-tip to index-tip distance, in normalized image units, below which
/// a pose is a pinch.
pub const PINCH_THRESHOLD: f32 = 0.05;

/// Below this knuckle spread the lateral axis is treated as degenerate.
const AXIS_EPSILON: f32 = 1e-6;

// ════════════════════════════════════════════════════════════════════════════
// GestureLabel
// ════════════════════════════════════════════════════════════════════════════

/// The closed set of recognised hand shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureLabel {
    OpenPalm,
    Fist,
    VSign,
    ThumbUp,
    Pinch,
    /// No hand, or a hand shape outside the set above.
    Unknown,
}

impl GestureLabel {
    pub const ALL: [GestureLabel; 6] = [
        GestureLabel::OpenPalm, GestureLabel::Fist, GestureLabel::VSign,
        GestureLabel::ThumbUp,  GestureLabel::Pinch, GestureLabel::Unknown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GestureLabel::OpenPalm => "OPEN_PALM",
            GestureLabel::Fist     => "FIST",
            GestureLabel::VSign    => "V_SIGN",
            GestureLabel::ThumbUp  => "THUMB_UP",
            GestureLabel::Pinch    => "PINCH",
            GestureLabel::Unknown  => "UNKNOWN",
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gesture label `{0}`")]
pub struct UnknownLabel(pub String);

impl FromStr for GestureLabel {
    type Err = UnknownLabel;
    fn from_str(s: &str) -> Result<Self, UnknownLabel> {
        GestureLabel::ALL
            .into_iter()
            .find(|l| l.name() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ThumbRule
// ════════════════════════════════════════════════════════════════════════════

/// How thumb extension is judged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThumbRule {
    /// Tip beyond the IP joint along the pinky-MCP → index-MCP direction.
    #[default]
    HandLateral,
    /// Tip left of the IP joint on screen. Only right for one hand under one
    /// mirroring convention.
    ScreenX,
}

impl ThumbRule {
    pub fn name(self) -> &'static str {
        match self {
            ThumbRule::HandLateral => "lateral",
            ThumbRule::ScreenX     => "screen-x",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown thumb rule `{0}` (expected `lateral` or `screen-x`)")]
pub struct UnknownThumbRule(pub String);

impl FromStr for ThumbRule {
    type Err = UnknownThumbRule;
    fn from_str(s: &str) -> Result<Self, UnknownThumbRule> {
        match s {
            "lateral"  => Ok(ThumbRule::HandLateral),
            "screen-x" => Ok(ThumbRule::ScreenX),
            other      => Err(UnknownThumbRule(other.to_string())),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerStates
// ════════════════════════════════════════════════════════════════════════════

/// Per-digit extension flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FingerStates {
    pub thumb:  bool,
    pub index:  bool,
    pub middle: bool,
    pub ring:   bool,
    pub pinky:  bool,
}

impl FingerStates {
    pub fn measure(pose: &HandPose, rule: ThumbRule) -> Self {
        let up = |f: Finger| pose.tip(f).y < pose.joint(f).y;
        FingerStates {
            thumb:  thumb_extended(pose, rule),
            index:  up(Finger::Index),
            middle: up(Finger::Middle),
            ring:   up(Finger::Ring),
            pinky:  up(Finger::Pinky),
        }
    }

    /// `[thumb, index, middle, ring, pinky]`
    pub fn as_array(&self) -> [bool; 5] {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        match finger {
            Finger::Thumb  => self.thumb,
            Finger::Index  => self.index,
            Finger::Middle => self.middle,
            Finger::Ring   => self.ring,
            Finger::Pinky  => self.pinky,
        }
    }

    pub fn extended_count(&self) -> usize {
        self.as_array().iter().filter(|e| **e).count()
    }
}

fn thumb_extended(pose: &HandPose, rule: ThumbRule) -> bool {
    let tip = pose.tip(Finger::Thumb);
    let ip  = pose.joint(Finger::Thumb);
    match rule {
        ThumbRule::ScreenX => tip.x < ip.x,
        ThumbRule::HandLateral => {
            let (ax, ay) = lateral_axis(pose);
            (tip.x - ip.x) * ax + (tip.y - ip.y) * ay > 0.0
        }
    }
}

/// Direction from the pinky knuckle to the index knuckle; screen-left when
/// the two coincide.
fn lateral_axis(pose: &HandPose) -> (f32, f32) {
    let index = pose[INDEX_MCP];
    let pinky = pose[PINKY_MCP];
    let (dx, dy) = (index.x - pinky.x, index.y - pinky.y);
    if dx.hypot(dy) < AXIS_EPSILON {
        (-1.0, 0.0)
    } else {
        (dx, dy)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier
// ════════════════════════════════════════════════════════════════════════════

/// Full result of classifying one pose, for overlays and diagnostics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub label:          GestureLabel,
    pub fingers:        FingerStates,
    /// Thumb-tip ↔ index-tip distance.
    pub pinch_distance: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GestureClassifier {
    thumb_rule: ThumbRule,
}

impl GestureClassifier {
    pub fn new(thumb_rule: ThumbRule) -> Self {
        GestureClassifier { thumb_rule }
    }

    pub fn thumb_rule(&self) -> ThumbRule { self.thumb_rule }

    /// Classify this frame's pose; a frame without a hand is `Unknown`.
    pub fn classify(&self, pose: Option<&HandPose>) -> GestureLabel {
        pose.map_or(GestureLabel::Unknown, |p| self.explain(p).label)
    }

    /// Classify raw, unvalidated landmarks.
    pub fn classify_landmarks(&self, points: &[Landmark]) -> Result<GestureLabel, PoseError> {
        let pose = HandPose::from_slice(points)?;
        Ok(self.explain(&pose).label)
    }

    pub fn explain(&self, pose: &HandPose) -> Classification {
        let fingers = FingerStates::measure(pose, self.thumb_rule);
        let pinch_distance = pose.tip(Finger::Thumb).distance_2d(&pose.tip(Finger::Index));

        // A pinch blurs both thumb and index extension, so it is decided
        // before the extension pattern is looked at.
        let label = if pinch_distance < PINCH_THRESHOLD {
            GestureLabel::Pinch
        } else {
            match fingers.as_array() {
                [true,  true,  true,  true,  true ] => GestureLabel::OpenPalm,
                [false, false, false, false, false] => GestureLabel::Fist,
                [false, true,  true,  false, false] => GestureLabel::VSign,
                [true,  false, false, false, false] => GestureLabel::ThumbUp,
                _                                   => GestureLabel::Unknown,
            }
        };

        Classification { label, fingers, pinch_distance }
    }
}

/// Classify with the default [`ThumbRule::HandLateral`].
pub fn classify(pose: Option<&HandPose>) -> GestureLabel {
    GestureClassifier::default().classify(pose)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
