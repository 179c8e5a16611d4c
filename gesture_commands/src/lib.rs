//! # gesture_commands
//!
//! The presentation side of gesture recognition:
//!
//! * [`CommandMap`] — which text command each [`GestureLabel`] stands for.
//!   User-editable, stored as a JSON object keyed by label name.
//! * [`SampleStore`] — an ordered list of recorded poses with the label
//!   they were classified as, stored as a JSON array.
//!
//! ```rust
//! use gesture_commands::CommandMap;
//! use gesture_classifier::GestureLabel;
//!
//! let mut map = CommandMap::default();
//! assert_eq!(map.display_for(Some(GestureLabel::Fist)), "Confirm");
//! map.set(GestureLabel::Fist, "Grab");
//! assert_eq!(map.command_for(GestureLabel::Fist), Some("Grab"));
//! assert_eq!(map.display_for(None), "—");
//! ```
//!
//! [`GestureLabel`]: gesture_classifier::GestureLabel

pub mod commands;
pub mod samples;

pub use commands::{CommandMap, NO_COMMAND};
pub use samples::{Sample, SampleStore};

/// Failure loading or saving command tables and sample lists.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    UnknownLabel(#[from] gesture_classifier::UnknownLabel),
}

impl CommandError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        CommandError::Io { path: path.display().to_string(), source }
    }
}
