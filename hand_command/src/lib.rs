//! # hand_command
//!
//! Live hand gesture → text command demo. Each tracker frame is classified
//! independently and the gesture's command text is shown next to an overlay
//! of the tracked hand.
//!
//! ## Gesture → Command mapping (defaults)
//!
//! | Gesture | Shape | Command |
//! |---|---|---|
//! | `OPEN_PALM` | all five digits extended | Start |
//! | `FIST` | all digits curled | Confirm |
//! | `V_SIGN` | index + middle extended | Back |
//! | `THUMB_UP` | thumb out, others curled | Like |
//! | `PINCH` | thumb and index tips touching | OK |
//! | `UNKNOWN` | anything else | — |
//!
//! Pass `--commands table.json` to replace the table.
//!
//! ## Modes
//!
//! * (default) — **Simulation**: number keys show preset hand shapes.
//! * `--input frames.jsonl` — **Replay**: recorded tracker frames, one JSON
//!   report per line (see [`hand_pose::report`]).
//! * `--headless` — classify frames from stdin or `--input`, print
//!   `LABEL<TAB>command` per frame, no window.
//! * `leap` feature — **Hardware**: polls a real LeapMotion controller
//!   (`--input` replay takes precedence).
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Action |
//! |---|---|
//! | `1`–`6` | open palm, fist, V, thumb up, pinch, pointing |
//! | `0` | hide the hand |
//! | `M` | mirror the hand |
//! | arrows | move the hand |
//! | `R` | record the current pose as a sample |
//! | `Q` / `Escape` | quit |

pub mod source;
pub mod overlay;
pub mod visualizer;
pub mod app;

pub use app::{run, run_headless, AppConfig, AppError, AppState, HeadlessSummary, SourceMode};
