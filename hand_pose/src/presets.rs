//! Synthetic hand shapes.
//!
//! A right hand seen palm-on through an unmirrored camera: the index MCP
//! lies left of the pinky MCP on screen, fingers point up. Used by the
//! keyboard simulator and by tests across the workspace.

use crate::{HandPose, Landmark, LANDMARK_COUNT};

// Knuckle row and wrist.
const WRIST:      (f32, f32) = (0.50, 0.85);
const MCP_Y:      f32 = 0.60;
const FINGER_X:   [f32; 4] = [0.42, 0.48, 0.54, 0.60];

// y of PIP, DIP, tip for a straight vs curled finger.
const STRAIGHT:   [f32; 3] = [0.50, 0.43, 0.37];
const CURLED:     [f32; 3] = [0.52, 0.58, 0.62];

// Thumb CMC, MCP, IP, tip.
const THUMB_OUT:  [(f32, f32); 4] = [(0.40, 0.78), (0.35, 0.72), (0.30, 0.66), (0.24, 0.62)];
const THUMB_IN:   [(f32, f32); 4] = [(0.40, 0.78), (0.38, 0.74), (0.40, 0.70), (0.47, 0.70)];

/// Named synthetic poses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preset {
    /// All five digits extended.
    OpenPalm,
    /// All five digits curled.
    Fist,
    /// Index and middle extended.
    VSign,
    /// Thumb out, everything else curled.
    ThumbUp,
    /// Open palm with the thumb and index tips touching.
    Pinch,
    /// Index extended alone; matches none of the named gestures.
    Pointing,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::OpenPalm, Preset::Fist, Preset::VSign,
        Preset::ThumbUp, Preset::Pinch, Preset::Pointing,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::OpenPalm => "open palm",
            Preset::Fist     => "fist",
            Preset::VSign    => "v sign",
            Preset::ThumbUp  => "thumb up",
            Preset::Pinch    => "pinch",
            Preset::Pointing => "pointing",
        }
    }

    pub fn pose(self) -> HandPose {
        match self {
            Preset::OpenPalm => build(true,  [true,  true,  true,  true ]),
            Preset::Fist     => build(false, [false, false, false, false]),
            Preset::VSign    => build(false, [true,  true,  false, false]),
            Preset::ThumbUp  => build(true,  [false, false, false, false]),
            Preset::Pointing => build(false, [true,  false, false, false]),
            Preset::Pinch    => {
                // Bend the index over so its tip meets the thumb tip while
                // both still pass their own extension tests.
                let mut landmarks = *build(true, [true, true, true, true]).landmarks();
                landmarks[7] = Landmark::new(0.32, 0.45);
                landmarks[8] = Landmark::new(0.27, 0.46);
                landmarks[4] = Landmark::new(0.26, 0.47);
                HandPose { landmarks }
            }
        }
    }
}

/// Lay out a hand from per-digit straight/curled flags (index..pinky).
fn build(thumb_out: bool, fingers: [bool; 4]) -> HandPose {
    let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
    landmarks[0] = Landmark::new(WRIST.0, WRIST.1);

    let thumb = if thumb_out { THUMB_OUT } else { THUMB_IN };
    for (i, (x, y)) in thumb.iter().enumerate() {
        landmarks[1 + i] = Landmark::new(*x, *y);
    }

    for (f, straight) in fingers.iter().enumerate() {
        let base = 5 + f * 4;
        let x = FINGER_X[f];
        landmarks[base] = Landmark::new(x, MCP_Y);
        let ys = if *straight { STRAIGHT } else { CURLED };
        for (j, y) in ys.iter().enumerate() {
            landmarks[base + 1 + j] = Landmark::new(x, *y);
        }
    }

    HandPose { landmarks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Finger;

    #[test]
    fn open_palm_digits_all_pass_extension_geometry() {
        let pose = Preset::OpenPalm.pose();
        assert!(pose.tip(Finger::Thumb).x < pose.joint(Finger::Thumb).x);
        for f in &Finger::ALL[1..] {
            assert!(pose.tip(*f).y < pose.joint(*f).y, "{} should be up", f.name());
        }
    }

    #[test]
    fn fist_digits_all_fail_extension_geometry() {
        let pose = Preset::Fist.pose();
        assert!(pose.tip(Finger::Thumb).x > pose.joint(Finger::Thumb).x);
        for f in &Finger::ALL[1..] {
            assert!(pose.tip(*f).y > pose.joint(*f).y, "{} should be down", f.name());
        }
    }

    #[test]
    fn pinch_tips_touch() {
        let pose = Preset::Pinch.pose();
        let d = pose.tip(Finger::Thumb).distance_2d(&pose.tip(Finger::Index));
        assert!(d < 0.05);
    }

    #[test]
    fn non_pinch_presets_keep_tips_apart() {
        for p in Preset::ALL.iter().filter(|p| **p != Preset::Pinch) {
            let pose = p.pose();
            let d = pose.tip(Finger::Thumb).distance_2d(&pose.tip(Finger::Index));
            assert!(d >= 0.05, "{} tips too close: {}", p.name(), d);
        }
    }

    #[test]
    fn presets_are_valid_poses() {
        for p in Preset::ALL {
            let pose = p.pose();
            assert!(HandPose::from_slice(pose.landmarks()).is_ok());
        }
    }
}
