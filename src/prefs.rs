//! Settings store — small string preferences that survive restarts.
//!
//! Values live at `$XDG_CONFIG_HOME/type-inspector/settings.json` (default
//! `~/.config/type-inspector/settings.json`) as one flat JSON object of
//! strings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::config_dir;

/// Last text typed into the declarations pane.
pub const TYPES_KEY: &str = "types";
/// Last platform chosen in the picker.
pub const PLATFORM_KEY: &str = "platform";

/// String key/value persistence.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

// ───────────────────────────────────────── file store ────────

/// Store backed by a file, rewritten on every `set`.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileSettings {
    /// Open the default settings file.
    pub fn open_default() -> Self {
        Self::open(config_dir().join("settings.json"))
    }

    /// Open `path`, starting empty if it is missing or unreadable.
    pub fn open(path: PathBuf) -> Self {
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed settings {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(e) => {
                if path.exists() {
                    tracing::warn!("cannot read settings {}: {e}", path.display());
                }
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json).with_context(|| format!("writing {}", self.path.display()))
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.values.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}

// ───────────────────────────────────────── memory store ──────

/// Store that forgets everything on exit.  Used by `--dump` and tests.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: BTreeMap<String, String>,
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn awkward_text_survives_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let text = "struct A {\n\tchar* s; // \"quoted\" \\ path\r\n};";

        FileSettings::open(path.clone()).set(TYPES_KEY, text).unwrap();
        assert_eq!(FileSettings::open(path).get(TYPES_KEY).as_deref(), Some(text));
    }

    #[test]
    fn malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "types = \"not json\"\n").unwrap();

        let mut store = FileSettings::open(path.clone());
        assert_eq!(store.get(TYPES_KEY), None);
        // The next write replaces the broken file.
        store.set(PLATFORM_KEY, "linux-x86").unwrap();
        let reopened = FileSettings::open(path);
        assert_eq!(reopened.get(PLATFORM_KEY).as_deref(), Some("linux-x86"));
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut store = FileSettings::open(path.clone());
        assert_eq!(store.get(TYPES_KEY), None);
        store.set(TYPES_KEY, "int a;\nint b;").unwrap();
        store.set(PLATFORM_KEY, "linux-x86").unwrap();

        let reopened = FileSettings::open(path);
        assert_eq!(reopened.get(TYPES_KEY).as_deref(), Some("int a;\nint b;"));
        assert_eq!(reopened.get(PLATFORM_KEY).as_deref(), Some("linux-x86"));
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettings::open(dir.path().join("absent"));
        assert_eq!(store.get(TYPES_KEY), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn memory_store() {
        let mut store = MemorySettings::default();
        store.set(TYPES_KEY, "x").unwrap();
        assert_eq!(store.get(TYPES_KEY).as_deref(), Some("x"));
    }
}
