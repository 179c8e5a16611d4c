//! Overlay geometry and animation state.
//!
//! Everything here is plain data computed from a pose and its
//! classification; the visualizer only rasterises it.

use gesture_classifier::{FingerStates, GestureLabel};
use hand_pose::{Finger, HandPose, Landmark, HAND_CONNECTIONS, WRIST};

// ════════════════════════════════════════════════════════════════════════════
// Colors
// ════════════════════════════════════════════════════════════════════════════

pub const EXTENDED_COLOR: u32 = 0xFF33DD66;
pub const CURLED_COLOR:   u32 = 0xFF0096FF;
pub const PALM_COLOR:     u32 = 0xFFB0B0C0;
pub const JOINT_COLOR:    u32 = 0xFFFF3030;
pub const TIP_COLOR:      u32 = 0xFFFFD700;

/// Accent color for a gesture label.
pub fn label_color(label: GestureLabel) -> u32 {
    match label {
        GestureLabel::OpenPalm => 0xFF33DD66,
        GestureLabel::Fist     => 0xFFFF6B35,
        GestureLabel::VSign    => 0xFF9B5DE5,
        GestureLabel::ThumbUp  => 0xFF00BBF9,
        GestureLabel::Pinch    => 0xFFFFD700,
        GestureLabel::Unknown  => 0xFF888888,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Viewport — normalized image space → window pixels
// ════════════════════════════════════════════════════════════════════════════

/// The on-screen rectangle standing in for the camera image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
    /// Flip horizontally, like a selfie preview.
    pub mirror: bool,
}

impl Viewport {
    pub fn project(&self, l: &Landmark) -> (isize, isize) {
        let nx = if self.mirror { 1.0 - l.x } else { l.x };
        let px = self.x as f32 + nx * self.w as f32;
        let py = self.y as f32 + l.y * self.h as f32;
        (px.round() as isize, py.round() as isize)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandOverlay
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dot {
    pub at:     (isize, isize),
    pub radius: usize,
    pub color:  u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bone {
    pub from:  (isize, isize),
    pub to:    (isize, isize),
    pub color: u32,
}

/// Which digit a landmark belongs to; the wrist belongs to none.
pub fn finger_of(index: usize) -> Option<Finger> {
    if index == WRIST {
        return None;
    }
    Finger::ALL.get((index - 1) / 4).copied()
}

/// Skeleton and joint markers for one hand, colored by finger extension.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandOverlay {
    pub bones: Vec<Bone>,
    pub dots:  Vec<Dot>,
}

impl HandOverlay {
    pub fn build(pose: &HandPose, fingers: &FingerStates, view: &Viewport) -> Self {
        let finger_color = |f: Finger| {
            if fingers.is_extended(f) { EXTENDED_COLOR } else { CURLED_COLOR }
        };

        let bones = HAND_CONNECTIONS
            .iter()
            .map(|&(a, b)| {
                // Wrist spokes take the digit's color; the knuckle bar is palm.
                let color = match (finger_of(a), finger_of(b)) {
                    (None, Some(f))                => finger_color(f),
                    (Some(fa), Some(fb)) if fa == fb => finger_color(fa),
                    _                              => PALM_COLOR,
                };
                Bone { from: view.project(&pose[a]), to: view.project(&pose[b]), color }
            })
            .collect();

        let dots = pose
            .landmarks()
            .iter()
            .enumerate()
            .map(|(i, l)| {
                let is_tip = Finger::ALL.iter().any(|f| f.tip() == i);
                Dot {
                    at:     view.project(l),
                    radius: if is_tip { 5 } else { 3 },
                    color:  if is_tip { TIP_COLOR } else { JOINT_COLOR },
                }
            })
            .collect();

        HandOverlay { bones, dots }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LabelFlash — brief highlight when the recognised gesture changes
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct LabelFlash {
    pub label:    GestureLabel,
    /// 0.0 → 1.0 over the flash; drives the fade.
    pub progress: f32,
}

impl LabelFlash {
    pub fn new(label: GestureLabel) -> Self {
        LabelFlash { label, progress: 0.0 }
    }
    pub fn tick(&mut self) { self.progress = (self.progress + 0.06).min(1.0); }
    pub fn done(&self) -> bool { self.progress >= 1.0 }
    /// Highlight strength, strongest at the start.
    pub fn intensity(&self) -> f32 { 1.0 - self.progress }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_classifier::{GestureClassifier, ThumbRule};
    use hand_pose::presets::Preset;

    const VIEW: Viewport = Viewport { x: 10, y: 20, w: 640, h: 480, mirror: false };

    #[test]
    fn project_corners() {
        assert_eq!(VIEW.project(&Landmark::new(0.0, 0.0)), (10, 20));
        assert_eq!(VIEW.project(&Landmark::new(1.0, 1.0)), (650, 500));
    }

    #[test]
    fn mirror_flips_x_only() {
        let m = Viewport { mirror: true, ..VIEW };
        assert_eq!(m.project(&Landmark::new(0.25, 0.5)), VIEW.project(&Landmark::new(0.75, 0.5)));
    }

    #[test]
    fn finger_of_groups() {
        assert_eq!(finger_of(0), None);
        assert_eq!(finger_of(4), Some(Finger::Thumb));
        assert_eq!(finger_of(5), Some(Finger::Index));
        assert_eq!(finger_of(12), Some(Finger::Middle));
        assert_eq!(finger_of(20), Some(Finger::Pinky));
    }

    #[test]
    fn overlay_has_every_bone_and_joint() {
        let pose = Preset::OpenPalm.pose();
        let fingers = FingerStates::measure(&pose, ThumbRule::HandLateral);
        let o = HandOverlay::build(&pose, &fingers, &VIEW);
        assert_eq!(o.bones.len(), HAND_CONNECTIONS.len());
        assert_eq!(o.dots.len(), hand_pose::LANDMARK_COUNT);
        assert_eq!(o.dots.iter().filter(|d| d.color == TIP_COLOR).count(), 5);
    }

    #[test]
    fn bone_colors_follow_extension() {
        let pose = Preset::VSign.pose();
        let c = GestureClassifier::default().explain(&pose);
        let o = HandOverlay::build(&pose, &c.fingers, &VIEW);
        // Bones are listed four per digit, thumb first; last is the knuckle bar.
        assert_eq!(o.bones[0].color, CURLED_COLOR);    // wrist → thumb
        assert_eq!(o.bones[7].color, EXTENDED_COLOR);  // index tip bone
        assert_eq!(o.bones[11].color, EXTENDED_COLOR); // middle tip bone
        assert_eq!(o.bones[15].color, CURLED_COLOR);   // ring tip bone
        assert_eq!(o.bones[20].color, PALM_COLOR);
    }

    #[test]
    fn label_colors_distinct() {
        for a in GestureLabel::ALL {
            for b in GestureLabel::ALL {
                if a != b { assert_ne!(label_color(a), label_color(b)); }
            }
        }
    }

    #[test]
    fn flash_fades_out() {
        let mut f = LabelFlash::new(GestureLabel::Fist);
        assert_eq!(f.intensity(), 1.0);
        for _ in 0..100 { f.tick(); }
        assert!(f.done());
        assert_eq!(f.intensity(), 0.0);
    }
}
