//! Recorded pose samples.
//!
//! An opaque, append-only list. Nothing reads the samples back into the
//! classifier; they exist so a user can collect labelled poses.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use gesture_classifier::GestureLabel;
use hand_pose::HandPose;
use serde::{Deserialize, Serialize};

use crate::CommandError;

/// One recorded pose and the label it was classified as.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub label:       GestureLabel,
    pub landmarks:   HandPose,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleStore {
    samples: Vec<Sample>,
}

impl SampleStore {
    pub fn record(&mut self, label: GestureLabel, pose: &HandPose) -> &Sample {
        self.samples.push(Sample {
            label,
            landmarks:   *pose,
            recorded_at: Utc::now(),
        });
        let idx = self.samples.len() - 1;
        &self.samples[idx]
    }

    pub fn samples(&self) -> &[Sample] { &self.samples }

    pub fn len(&self) -> usize { self.samples.len() }

    pub fn is_empty(&self) -> bool { self.samples.is_empty() }

    pub fn count_for(&self, label: GestureLabel) -> usize {
        self.samples.iter().filter(|s| s.label == label).count()
    }

    pub fn clear(&mut self) { self.samples.clear(); }

    /// Load from `path`; a missing file is an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommandError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no sample file at {}, starting empty", path.display());
            return Ok(SampleStore::default());
        }
        let text = fs::read_to_string(path).map_err(|e| CommandError::io(path, e))?;
        let samples: Vec<Sample> = serde_json::from_str(&text)?;
        log::debug!("loaded {} samples from {}", samples.len(), path.display());
        Ok(SampleStore { samples })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CommandError> {
        let path = path.as_ref();
        let text = serde_json::to_string(&self.samples)?;
        fs::write(path, text).map_err(|e| CommandError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hand_pose::presets::Preset;

    #[test]
    fn record_appends_in_order() {
        let mut store = SampleStore::default();
        store.record(GestureLabel::Fist, &Preset::Fist.pose());
        store.record(GestureLabel::VSign, &Preset::VSign.pose());
        store.record(GestureLabel::Fist, &Preset::Fist.pose());
        assert_eq!(store.len(), 3);
        assert_eq!(store.samples()[1].label, GestureLabel::VSign);
        assert_eq!(store.count_for(GestureLabel::Fist), 2);
        assert_eq!(store.count_for(GestureLabel::Pinch), 0);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SampleStore::load(dir.path().join("samples.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.json");
        let mut store = SampleStore::default();
        store.record(GestureLabel::ThumbUp, &Preset::ThumbUp.pose());
        store.record(GestureLabel::Unknown, &Preset::Pointing.pose());
        store.save(&path).unwrap();

        let back = SampleStore::load(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.samples()[0].label, GestureLabel::ThumbUp);
        assert_eq!(back.samples()[1].label, GestureLabel::Unknown);
    }

    #[test]
    fn saved_labels_use_display_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.json");
        let mut store = SampleStore::default();
        store.record(GestureLabel::VSign, &Preset::VSign.pose());
        store.save(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"V_SIGN\""));
    }

    #[test]
    fn corrupt_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.json");
        fs::write(&path, "[{\"label\": 3}]").unwrap();
        assert!(matches!(SampleStore::load(&path), Err(CommandError::Json(_))));
    }

    #[test]
    fn clear_empties() {
        let mut store = SampleStore::default();
        store.record(GestureLabel::Pinch, &Preset::Pinch.pose());
        store.clear();
        assert!(store.is_empty());
    }
}
