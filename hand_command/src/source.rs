//! Hand pose sources — LeapMotion hardware, keyboard simulation, and
//! recorded JSON-lines frames.
//!
//! Every source delivers [`SourceEvent`]s over an `mpsc` channel.
//! Consumers don't need to know whether frames came from real hardware, a
//! replay file, or the keyboard simulator.

use std::io::{self, BufRead};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hand_pose::presets::Preset;
use hand_pose::{parse_frame, HandPose, PoseError};

// ════════════════════════════════════════════════════════════════════════════
// SourceEvent
// ════════════════════════════════════════════════════════════════════════════

/// What a source reports to the application thread.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// One tracker frame. `None` = no hand in view.
    Frame(Option<HandPose>),
    /// Store the current pose as a sample.
    Record,
    /// Quit the application.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// PoseSource trait — unified interface for hw, sim and replay
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`SourceEvent`]s over a channel.
pub trait PoseSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>);
}

/// Run a pose source on its own thread, sending into `tx`.
pub fn spawn_pose_source<S: PoseSource>(source: S, tx: Sender<SourceEvent>) -> JoinHandle<()> {
    thread::spawn(move || Box::new(source).run(tx))
}

// ════════════════════════════════════════════════════════════════════════════
// LeapPoseSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Pose source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// The controller looks up at the hand from below, so joints are projected
/// onto the horizontal plane: device `x` becomes image `x` and device `z`
/// (toward the user) becomes image `y`. A hand held flat above the device
/// with fingers pointing away from the user then reads as fingers up.
#[cfg(feature = "leap")]
pub struct LeapPoseSource;

/// Half-width of the tracked volume mapped onto `[0, 1]`, in millimetres.
#[cfg(feature = "leap")]
const LEAP_HALF_SPAN: f32 = 200.0;

#[cfg(feature = "leap")]
impl PoseSource for LeapPoseSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                log::error!("failed to create LeapC connection: {:?}", e);
                return;
            }
        };
        if let Err(e) = connection.open() {
            log::error!("failed to open LeapMotion device: {:?}", e);
            return;
        }
        log::info!("LeapMotion connection open");

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                // One hand only: the first the device reports.
                let pose = frame.hands().next().and_then(|hand| match leap_pose(&hand) {
                    Ok(p)  => Some(p),
                    Err(e) => {
                        log::warn!("dropping LeapMotion hand: {}", e);
                        None
                    }
                });
                if tx.send(SourceEvent::Frame(pose)).is_err() {
                    return;
                }
            }
        }
    }
}

/// Map LeapMotion digit joints onto the 21-point convention.
#[cfg(feature = "leap")]
fn leap_pose(hand: &leaprs::Hand) -> Result<HandPose, PoseError> {
    use hand_pose::Landmark;

    let digits: Vec<_> = hand.digits().collect();
    if digits.len() < 5 {
        return Err(PoseError::WrongLandmarkCount { found: 1 + digits.len() * 4 });
    }

    let project = |x: f32, y: f32, z: f32| Landmark {
        x: (x + LEAP_HALF_SPAN) / (2.0 * LEAP_HALF_SPAN),
        y: (z + LEAP_HALF_SPAN) / (2.0 * LEAP_HALF_SPAN),
        z: y / (2.0 * LEAP_HALF_SPAN),
    };

    let mut points = Vec::with_capacity(hand_pose::LANDMARK_COUNT);
    // Middle metacarpal base stands in for the wrist.
    let wrist = digits[2].metacarpal().prev_joint();
    points.push(project(wrist.x, wrist.y, wrist.z));
    for digit in &digits[..5] {
        let joints = [
            digit.proximal().prev_joint(),
            digit.intermediate().prev_joint(),
            digit.distal().prev_joint(),
            digit.distal().next_joint(),
        ];
        for j in joints {
            points.push(project(j.x, j.y, j.z));
        }
    }
    HandPose::from_slice(&points)
}

// ════════════════════════════════════════════════════════════════════════════
// JsonLinesSource — recorded frames, one JSON report per line
// ════════════════════════════════════════════════════════════════════════════

/// One parsed input line: its 1-based line number and the frame it held.
pub type FrameLine = (usize, Result<Option<HandPose>, PoseError>);

/// Parse every non-blank line of `reader` as a frame report.
///
/// A line that is not valid UTF-8 yields a [`PoseError`] like any other
/// malformed report, and reading carries on. Only a failed read ends the
/// stream, as an `Err` item.
pub fn frame_lines<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<FrameLine>> {
    reader
        .split(b'\n')
        .enumerate()
        .filter_map(|(i, line)| {
            let bytes = match line {
                Ok(b)  => b,
                Err(e) => return Some(Err(e)),
            };
            let frame = match String::from_utf8(bytes) {
                Ok(text) if text.trim().is_empty() => return None,
                Ok(text) => parse_frame(&text),
                Err(e)   => Err(PoseError::from(e)),
            };
            Some(Ok((i + 1, frame)))
        })
}

/// Replays recorded frames at a fixed interval. Malformed lines are logged
/// and skipped; they never reach the classifier.
pub struct JsonLinesSource<R> {
    reader:   R,
    interval: Duration,
}

impl<R: BufRead + Send + 'static> JsonLinesSource<R> {
    pub fn new(reader: R, interval: Duration) -> Self {
        JsonLinesSource { reader, interval }
    }
}

impl<R: BufRead + Send + 'static> PoseSource for JsonLinesSource<R> {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        let JsonLinesSource { reader, interval } = *self;
        for line in frame_lines(reader) {
            let (line_no, frame) = match line {
                Ok(l)  => l,
                Err(e) => {
                    log::error!("frame input read failed: {}", e);
                    return;
                }
            };
            let frame = match frame {
                Ok(f)  => f,
                Err(e) => {
                    log::warn!("frame line {}: {}", line_no, e);
                    continue;
                }
            };
            if tx.send(SourceEvent::Frame(frame)).is_err() {
                return;
            }
            if !interval.is_zero() {
                thread::sleep(interval);
            }
        }
        log::info!("replay finished");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimPoseSource — keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Simulated key codes (mapped from minifb Key by the visualizer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Show(Preset),   // 1–6
    HideHand,       // 0
    Mirror,         // M
    Left,           // ←
    Right,          // →
    Up,             // ↑
    Down,           // ↓
    Record,         // R
    Quit,           // Q / Escape
}

/// Distance one arrow press moves the simulated hand.
const NUDGE: f32 = 0.02;

/// The simulated hand: which preset is shown, how it is placed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimHand {
    pub preset:   Option<Preset>,
    pub mirrored: bool,
    pub offset:   (f32, f32),
}

impl SimHand {
    pub fn pose(&self) -> Option<HandPose> {
        self.preset.map(|p| {
            let pose = p.pose();
            let pose = if self.mirrored { pose.mirrored() } else { pose };
            pose.translated(self.offset.0, self.offset.1)
        })
    }

    /// Apply one key; returns the event it produces.
    pub fn press(&mut self, key: SimKey) -> SourceEvent {
        match key {
            SimKey::Show(p)  => self.preset = Some(p),
            SimKey::HideHand => self.preset = None,
            SimKey::Mirror   => self.mirrored = !self.mirrored,
            SimKey::Left     => self.offset.0 -= NUDGE,
            SimKey::Right    => self.offset.0 += NUDGE,
            SimKey::Up       => self.offset.1 -= NUDGE,
            SimKey::Down     => self.offset.1 += NUDGE,
            SimKey::Record   => return SourceEvent::Record,
            SimKey::Quit     => return SourceEvent::Quit,
        }
        SourceEvent::Frame(self.pose())
    }
}

/// Pose source driven by [`SimKey`]s from the visualizer's window.
///
/// With `poses_enabled` off (hardware or replay mode) only `Record` and
/// `Quit` are forwarded, so the keyboard never fights the real frames.
pub struct SimPoseSource {
    pub rx:            Receiver<SimKey>,
    pub poses_enabled: bool,
}

impl PoseSource for SimPoseSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        let mut hand = SimHand::default();
        for key in self.rx {
            let event = hand.press(key);
            let forward = match event {
                SourceEvent::Frame(_) => self.poses_enabled,
                _                     => true,
            };
            if !forward { continue; }
            let quit = event == SourceEvent::Quit;
            if tx.send(event).is_err() || quit { return; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc;

    fn run_sim(keys: &[SimKey], poses_enabled: bool) -> Vec<SourceEvent> {
        let (key_tx, key_rx) = mpsc::channel();
        for k in keys { key_tx.send(*k).unwrap(); }
        drop(key_tx);
        let (tx, rx) = mpsc::channel();
        Box::new(SimPoseSource { rx: key_rx, poses_enabled }).run(tx);
        rx.try_iter().collect()
    }

    #[test]
    fn preset_key_emits_preset_pose() {
        let events = run_sim(&[SimKey::Show(Preset::Fist)], true);
        assert_eq!(events, vec![SourceEvent::Frame(Some(Preset::Fist.pose()))]);
    }

    #[test]
    fn hide_hand_emits_empty_frame() {
        let events = run_sim(&[SimKey::Show(Preset::VSign), SimKey::HideHand], true);
        assert_eq!(events.last(), Some(&SourceEvent::Frame(None)));
    }

    #[test]
    fn quit_stops_the_source() {
        let events = run_sim(&[SimKey::Quit, SimKey::Show(Preset::Fist)], true);
        assert_eq!(events, vec![SourceEvent::Quit]);
    }

    #[test]
    fn disabled_poses_still_forward_record() {
        let events = run_sim(&[SimKey::Show(Preset::Fist), SimKey::Record], false);
        assert_eq!(events, vec![SourceEvent::Record]);
    }

    #[test]
    fn mirror_and_nudge_move_the_hand() {
        let mut hand = SimHand::default();
        hand.press(SimKey::Show(Preset::OpenPalm));
        hand.press(SimKey::Mirror);
        hand.press(SimKey::Right);
        let expected = Preset::OpenPalm.pose().mirrored().translated(NUDGE, 0.0);
        assert_eq!(hand.pose(), Some(expected));
    }

    #[test]
    fn no_preset_no_pose() {
        let mut hand = SimHand::default();
        assert_eq!(hand.press(SimKey::Left), SourceEvent::Frame(None));
    }

    #[test]
    fn frame_lines_numbers_and_skips_blanks() {
        let pose = serde_json_line(&Preset::ThumbUp.pose());
        let input = format!("null\n\n{}\nnot json\n", pose);
        let lines = frame_lines(Cursor::new(input)).collect::<io::Result<Vec<_>>>().unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].0, 1);
        assert!(matches!(lines[0].1, Ok(None)));
        assert_eq!(lines[1].0, 3);
        assert!(matches!(lines[1].1, Ok(Some(_))));
        assert_eq!(lines[2].0, 4);
        assert!(lines[2].1.is_err());
    }

    #[test]
    fn replay_skips_malformed_lines() {
        let pose = serde_json_line(&Preset::Pinch.pose());
        let input = format!("{}\n[[0.5]]\nnull\n", pose);
        let (tx, rx) = mpsc::channel();
        Box::new(JsonLinesSource::new(Cursor::new(input), Duration::ZERO)).run(tx);
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SourceEvent::Frame(Some(_))));
        assert_eq!(events[1], SourceEvent::Frame(None));
    }

    #[test]
    fn frame_lines_keeps_going_after_bad_utf8() {
        let pose = serde_json_line(&Preset::Fist.pose());
        let mut input = Vec::new();
        input.extend_from_slice(pose.as_bytes());
        input.extend_from_slice(b"\n\xff\xfe garbage\n");
        input.extend_from_slice(pose.as_bytes());
        input.extend_from_slice(b"\r\nnull\n");
        let lines = frame_lines(Cursor::new(input)).collect::<io::Result<Vec<_>>>().unwrap();
        assert_eq!(lines.len(), 4);
        assert!(matches!(lines[1], (2, Err(PoseError::NotUtf8(_)))));
        assert!(matches!(lines[2], (3, Ok(Some(_)))));
        assert!(matches!(lines[3], (4, Ok(None))));
    }

    fn serde_json_line(pose: &HandPose) -> String {
        let rows: Vec<String> = pose.landmarks().iter()
            .map(|l| format!("{{\"x\":{},\"y\":{}}}", l.x, l.y))
            .collect();
        format!("[{}]", rows.join(","))
    }
}
