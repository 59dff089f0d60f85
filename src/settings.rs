use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub queue_file: PathBuf,
    pub log_filter: String,
    pub log_json: bool,
    /// Reject intents from clients that rendered an older revision.
    pub reject_stale_writes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            queue_file: PathBuf::from("song_queue.json"),
            log_filter: "info".to_string(),
            log_json: false,
            reject_stale_writes: false,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let settings = serde_json::from_str(&content).context("Failed to parse settings JSON")?;
        Ok(settings)
    }

    /// Like `load`, but a missing or broken file just means defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!("[Settings] Using defaults: {err:#}");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings dir: {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn default_settings_have_reasonable_values() {
        let settings = Settings::default();
        assert_eq!(settings.queue_file, PathBuf::from("song_queue.json"));
        assert_eq!(settings.log_filter, "info");
        assert!(!settings.log_json);
        assert!(!settings.reject_stale_writes);
    }

    #[test]
    fn save_and_load_round_trips() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => panic!("tempdir failed: {err}"),
        };
        let path = dir.path().join("settings.json");

        let settings = Settings {
            queue_file: dir.path().join("queue.json"),
            log_filter: "song_queue=debug".to_string(),
            log_json: true,
            reject_stale_writes: true,
        };

        assert!(settings.save(&path).is_ok());
        let loaded = Settings::load(&path);
        match loaded {
            Ok(loaded) => assert_eq!(loaded, settings),
            Err(err) => panic!("load failed: {err}"),
        }
    }

    #[test]
    fn load_fills_missing_fields_with_defaults() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => panic!("tempdir failed: {err}"),
        };
        let path = dir.path().join("settings.json");
        assert!(fs::write(&path, r#"{"queue_file":"/srv/queue.json"}"#).is_ok());

        match Settings::load(&path) {
            Ok(loaded) => {
                assert_eq!(loaded.queue_file, PathBuf::from("/srv/queue.json"));
                assert_eq!(loaded.log_filter, "info");
            }
            Err(err) => panic!("load failed: {err}"),
        }
    }

    #[test]
    fn load_fails_when_file_missing() {
        let path = PathBuf::from("/tmp/nonexistent_song_queue_test/settings.json");
        assert!(Settings::load(&path).is_err());
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }

    #[test]
    fn load_fails_when_file_is_invalid_json() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => panic!("tempdir failed: {err}"),
        };
        let path = dir.path().join("settings.json");
        assert!(fs::write(&path, "not json").is_ok());

        assert!(Settings::load(&path).is_err());
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }
}
