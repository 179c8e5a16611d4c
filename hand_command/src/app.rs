//! Top-level application state.
//!
//! `AppState` owns the classifier, the injected `CommandMap`, and the
//! `SampleStore`. It processes `SourceEvent`s and feeds the visualizer each
//! frame. `run_headless` is the same pipeline without a window.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender, TryRecvError};
use std::time::Duration;

use gesture_classifier::{Classification, GestureClassifier, GestureLabel, ThumbRule};
use gesture_commands::{CommandError, CommandMap, SampleStore, NO_COMMAND};
use hand_pose::HandPose;

use crate::overlay::LabelFlash;
use crate::source::{
    frame_lines, spawn_pose_source, JsonLinesSource, SimKey, SimPoseSource, SourceEvent,
};
use crate::visualizer::Visualizer;

/// Pace of windowed replay, roughly a 30 fps camera.
const REPLAY_INTERVAL: Duration = Duration::from_millis(33);

// ════════════════════════════════════════════════════════════════════════════
// AppError
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Commands(#[from] CommandError),

    #[error("window error: {0}")]
    Window(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
pub struct AppConfig {
    pub commands:       CommandMap,
    pub thumb_rule:     ThumbRule,
    /// Where recorded samples are loaded from and saved to; `None` keeps
    /// them in memory only.
    pub samples_path:   Option<PathBuf>,
    /// Replay recorded frames instead of the keyboard simulator.
    pub replay:         Option<PathBuf>,
    /// Show the camera view flipped, like a mirror.
    pub mirror_display: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            commands:       CommandMap::default(),
            thumb_rule:     ThumbRule::default(),
            samples_path:   None,
            replay:         None,
            mirror_display: true,
        }
    }
}

/// Where the windowed app takes its frames from. Exactly one frame source
/// runs; the keyboard always runs for `Record` and `Quit`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceMode {
    /// Keyboard-selected preset poses.
    Simulation,
    /// Recorded frames from a JSON-lines file. Wins over hardware.
    Replay(PathBuf),
    /// A LeapMotion controller (`leap` feature).
    Hardware,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::Simulation   => write!(f, "Keyboard simulation  (use --features leap for hardware)"),
            SourceMode::Replay(path) => write!(f, "Replay of {}", path.display()),
            SourceMode::Hardware     => write!(f, "LeapMotion hardware"),
        }
    }
}

impl AppConfig {
    pub fn source_mode(&self) -> SourceMode {
        match &self.replay {
            Some(path)                      => SourceMode::Replay(path.clone()),
            None if cfg!(feature = "leap")  => SourceMode::Hardware,
            None                            => SourceMode::Simulation,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    classifier:     GestureClassifier,
    commands:       CommandMap,

    // ── samples ──────────────────────────────────────────────────────────
    samples:        SampleStore,
    samples_path:   Option<PathBuf>,

    // ── current frame ────────────────────────────────────────────────────
    pose:           Option<HandPose>,
    classification: Option<Classification>,
    flash:          Option<LabelFlash>,

    // ── status message ───────────────────────────────────────────────────
    pub status:     String,
}

impl AppState {
    pub fn new(cfg: AppConfig) -> Result<Self, AppError> {
        let samples = match &cfg.samples_path {
            Some(path) => SampleStore::load(path)?,
            None       => SampleStore::default(),
        };
        Ok(AppState {
            classifier:     GestureClassifier::new(cfg.thumb_rule),
            commands:       cfg.commands,
            samples,
            samples_path:   cfg.samples_path,
            pose:           None,
            classification: None,
            flash:          None,
            status:         "Ready — show a hand".to_string(),
        })
    }

    // ── process one frame ────────────────────────────────────────────────

    pub fn handle_frame(&mut self, frame: Option<HandPose>) {
        let previous = self.label();
        self.classification = frame.as_ref().map(|p| self.classifier.explain(p));
        self.pose = frame;

        let label = self.label();
        if label == previous {
            return;
        }
        log::debug!(
            "gesture {} -> {}",
            previous.map_or("none", GestureLabel::name),
            label.map_or("none", GestureLabel::name),
        );
        self.flash = label.map(LabelFlash::new);
        self.status = match label {
            Some(l) => format!("{} -> {}", l, self.command_text()),
            None    => "No hand".to_string(),
        };
    }

    /// Store the current pose under its label, saving the list if it has a
    /// file. Without a hand this only updates the status line.
    pub fn record_sample(&mut self) -> Result<(), AppError> {
        let (pose, label) = match (self.pose, self.label()) {
            (Some(p), Some(l)) => (p, l),
            _ => {
                self.status = "Nothing to record — no hand".to_string();
                return Ok(());
            }
        };
        self.samples.record(label, &pose);
        if let Some(path) = &self.samples_path {
            self.samples.save(path)?;
        }
        log::info!("recorded {} sample ({} total)", label, self.samples.len());
        self.status = format!(
            "Recorded {} — {} of {} samples",
            label,
            self.samples.count_for(label),
            self.samples.len(),
        );
        Ok(())
    }

    // ── per-frame tick ───────────────────────────────────────────────────

    pub fn tick(&mut self) {
        if let Some(ref mut f) = self.flash {
            f.tick();
            if f.done() { self.flash = None; }
        }
    }

    // ── accessors for the render loop ────────────────────────────────────

    /// `None` when no hand is in view.
    pub fn label(&self) -> Option<GestureLabel> {
        self.classification.map(|c| c.label)
    }

    pub fn command_text(&self) -> &str { self.commands.display_for(self.label()) }

    pub fn pose(&self)           -> Option<&HandPose>       { self.pose.as_ref() }
    pub fn classification(&self) -> Option<&Classification> { self.classification.as_ref() }
    pub fn flash(&self)          -> Option<&LabelFlash>     { self.flash.as_ref() }
    pub fn samples(&self)        -> &SampleStore            { &self.samples }
    pub fn thumb_rule(&self)     -> ThumbRule               { self.classifier.thumb_rule() }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the windowed application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the windowed application.
///
/// Creates the visualizer and the pose source (keyboard simulation by
/// default, a replay file when configured, hardware with `--features leap`)
/// and drives the event/render loop at ~60 fps.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let (tx, rx) = mpsc::channel::<SourceEvent>();
    let (sim_tx, sim_rx) = mpsc::channel::<SimKey>();

    let poses_enabled = match cfg.source_mode() {
        SourceMode::Replay(path) => {
            let file = File::open(&path)?;
            spawn_pose_source(JsonLinesSource::new(BufReader::new(file), REPLAY_INTERVAL), tx.clone());
            log::info!("replaying frames from {}", path.display());
            false
        }
        SourceMode::Hardware => {
            spawn_hardware_source(tx.clone());
            false
        }
        SourceMode::Simulation => true,
    };

    // Keyboard source always runs: it carries Record and Quit.
    spawn_pose_source(SimPoseSource { rx: sim_rx, poses_enabled }, tx);

    let mut vis = Visualizer::new(sim_tx, cfg.mirror_display)?;
    let mut app = AppState::new(cfg)?;

    while vis.is_open() {
        // 1. Poll window input → SimKey
        if !vis.poll_input() { break; }

        // 2. Drain source events
        loop {
            match rx.try_recv() {
                Ok(SourceEvent::Quit) => return Ok(()),
                Ok(SourceEvent::Record) => {
                    if let Err(e) = app.record_sample() {
                        log::error!("saving samples failed: {}", e);
                        app.status = format!("Save failed: {}", e);
                    }
                }
                Ok(SourceEvent::Frame(frame)) => app.handle_frame(frame),
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        // 3. Per-frame logic
        app.tick();

        // 4. Render
        vis.render(&app);
    }

    Ok(())
}

#[cfg(feature = "leap")]
fn spawn_hardware_source(tx: Sender<SourceEvent>) {
    spawn_pose_source(crate::source::LeapPoseSource, tx);
}

#[cfg(not(feature = "leap"))]
fn spawn_hardware_source(_tx: Sender<SourceEvent>) {
    log::warn!("built without the `leap` feature; no hardware source");
}

// ════════════════════════════════════════════════════════════════════════════
// run_headless() — JSON lines in, LABEL<TAB>command lines out
// ════════════════════════════════════════════════════════════════════════════

/// Counts from one headless run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeadlessSummary {
    /// Frames classified, with or without a hand.
    pub frames:   usize,
    pub no_hand:  usize,
    /// Malformed lines, logged and skipped.
    pub rejected: usize,
}

/// Classify every frame report read from `input`.
///
/// Each accepted frame produces one output line: `LABEL<TAB>command`, or
/// `-<TAB>—` when the frame had no hand. Malformed lines, including ones
/// that are not UTF-8, are counted and skipped; a failed read is an error.
pub fn run_headless<R: BufRead, W: Write>(
    input: R,
    mut out: W,
    classifier: GestureClassifier,
    commands: &CommandMap,
) -> Result<HeadlessSummary, AppError> {
    let mut summary = HeadlessSummary::default();

    for line in frame_lines(input) {
        let (line_no, frame) = line?;
        match frame {
            Err(e) => {
                log::warn!("frame line {}: {}", line_no, e);
                summary.rejected += 1;
            }
            Ok(None) => {
                summary.frames  += 1;
                summary.no_hand += 1;
                writeln!(out, "-\t{}", NO_COMMAND)?;
            }
            Ok(Some(pose)) => {
                summary.frames += 1;
                let label = classifier.classify(Some(&pose));
                writeln!(out, "{}\t{}", label, commands.display_for(Some(label)))?;
            }
        }
    }
    out.flush()?;

    log::info!(
        "classified {} frames ({} without a hand, {} rejected)",
        summary.frames, summary.no_hand, summary.rejected,
    );
    Ok(summary)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
