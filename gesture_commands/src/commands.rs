//! Gesture label → text command table.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use gesture_classifier::GestureLabel;

use crate::CommandError;

/// Shown when there is no hand or the label has no command.
pub const NO_COMMAND: &str = "—";

/// Which command text each gesture label triggers.
///
/// Passed explicitly to whatever displays commands; there is no global
/// table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandMap {
    entries: BTreeMap<GestureLabel, String>,
}

impl Default for CommandMap {
    fn default() -> Self {
        let mut map = CommandMap::empty();
        map.set(GestureLabel::OpenPalm, "Start");
        map.set(GestureLabel::Fist,     "Confirm");
        map.set(GestureLabel::VSign,    "Back");
        map.set(GestureLabel::ThumbUp,  "Like");
        map.set(GestureLabel::Pinch,    "OK");
        map
    }
}

impl CommandMap {
    pub fn empty() -> Self {
        CommandMap { entries: BTreeMap::new() }
    }

    pub fn command_for(&self, label: GestureLabel) -> Option<&str> {
        self.entries.get(&label).map(String::as_str)
    }

    /// Text to show for a frame; [`NO_COMMAND`] when there is no hand or
    /// the label is unmapped.
    pub fn display_for(&self, label: Option<GestureLabel>) -> &str {
        label
            .and_then(|l| self.command_for(l))
            .unwrap_or(NO_COMMAND)
    }

    /// Bind `label` to `text`, returning the previous binding.
    pub fn set(&mut self, label: GestureLabel, text: impl Into<String>) -> Option<String> {
        self.entries.insert(label, text.into())
    }

    pub fn remove(&mut self, label: GestureLabel) -> Option<String> {
        self.entries.remove(&label)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GestureLabel, &str)> {
        self.entries.iter().map(|(l, t)| (*l, t.as_str()))
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    // ── JSON ─────────────────────────────────────────────────────────────

    /// Parse `{"OPEN_PALM": "Start", ...}`. Unlisted labels stay unmapped.
    pub fn from_json(text: &str) -> Result<Self, CommandError> {
        let raw: BTreeMap<String, String> = serde_json::from_str(text)?;
        let mut map = CommandMap::empty();
        for (name, command) in raw {
            map.set(name.parse()?, command);
        }
        Ok(map)
    }

    pub fn to_json(&self) -> Result<String, CommandError> {
        let raw: BTreeMap<&str, &str> = self.iter().map(|(l, t)| (l.name(), t)).collect();
        Ok(serde_json::to_string_pretty(&raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CommandError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| CommandError::io(path, e))?;
        let map = CommandMap::from_json(&text)?;
        log::debug!("loaded {} command bindings from {}", map.len(), path.display());
        Ok(map)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CommandError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|e| CommandError::io(path, e))?;
        log::debug!("saved {} command bindings to {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_named_gesture() {
        let map = CommandMap::default();
        for l in GestureLabel::ALL {
            match l {
                GestureLabel::Unknown => assert!(map.command_for(l).is_none()),
                _                     => assert!(map.command_for(l).is_some(), "{} unmapped", l),
            }
        }
    }

    #[test]
    fn display_placeholder() {
        let map = CommandMap::default();
        assert_eq!(map.display_for(None), NO_COMMAND);
        assert_eq!(map.display_for(Some(GestureLabel::Unknown)), NO_COMMAND);
        assert_eq!(map.display_for(Some(GestureLabel::ThumbUp)), "Like");
    }

    #[test]
    fn set_replaces_and_remove_unmaps() {
        let mut map = CommandMap::default();
        assert_eq!(map.set(GestureLabel::Pinch, "Select").as_deref(), Some("OK"));
        assert_eq!(map.command_for(GestureLabel::Pinch), Some("Select"));
        map.remove(GestureLabel::Pinch);
        assert_eq!(map.display_for(Some(GestureLabel::Pinch)), NO_COMMAND);
    }

    #[test]
    fn json_keys_are_label_names() {
        let json = CommandMap::default().to_json().unwrap();
        assert!(json.contains("\"OPEN_PALM\""));
        assert!(json.contains("\"V_SIGN\""));
        assert_eq!(CommandMap::from_json(&json).unwrap(), CommandMap::default());
    }

    #[test]
    fn partial_json_leaves_rest_unmapped() {
        let map = CommandMap::from_json(r#"{"FIST": "Stop"}"#).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.command_for(GestureLabel::Fist), Some("Stop"));
        assert!(map.command_for(GestureLabel::OpenPalm).is_none());
    }

    #[test]
    fn unknown_key_rejected() {
        let err = CommandMap::from_json(r#"{"WAVE": "Hello"}"#).unwrap_err();
        assert!(matches!(err, CommandError::UnknownLabel(_)));
    }

    #[test]
    fn unicode_commands_survive() {
        let mut map = CommandMap::empty();
        map.set(GestureLabel::OpenPalm, "开始");
        let back = CommandMap::from_json(&map.to_json().unwrap()).unwrap();
        assert_eq!(back.command_for(GestureLabel::OpenPalm), Some("开始"));
    }

    #[test]
    fn file_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commands.json");
        let mut map = CommandMap::default();
        map.set(GestureLabel::VSign, "Undo");
        map.save(&path).unwrap();
        assert_eq!(CommandMap::load(&path).unwrap(), map);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CommandMap::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CommandError::Io { .. }));
    }
}
