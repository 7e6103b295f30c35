//! Persistent user settings (currently just the video player path).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_path: Option<PathBuf>,
}

/// Settings bound to the file they were read from.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Read settings from `path`. A missing file yields defaults and is not
    /// created until the first `save`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
            Err(e) => return Err(Error::io(&path, e)),
        };
        Ok(Self { path, settings })
    }

    pub fn save(&self) -> Result<()> {
        self.write(&self.settings)
    }

    fn write(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let content = toml::to_string_pretty(settings)?;
        std::fs::write(&self.path, content).map_err(|e| Error::io(&self.path, e))?;
        info!("settings saved to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn player_path(&self) -> Option<&Path> {
        self.settings.player_path.as_deref()
    }

    /// Persist a new player path. The in-memory value only changes once the
    /// file is written. No check that the player exists.
    pub fn set_player_path(&mut self, player: Option<PathBuf>) -> Result<()> {
        let mut updated = self.settings.clone();
        updated.player_path = player;
        self.write(&updated)?;
        self.settings = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_has_no_player() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let store = SettingsStore::load(&path).unwrap();
        assert!(store.player_path().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_player_path_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut store = SettingsStore::load(&path).unwrap();
        store
            .set_player_path(Some(PathBuf::from("/usr/bin/mpv")))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("player_path = \"/usr/bin/mpv\""));

        let reloaded = SettingsStore::load(&path).unwrap();
        assert_eq!(reloaded.player_path(), Some(Path::new("/usr/bin/mpv")));
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "player_path = [").unwrap();
        assert!(matches!(SettingsStore::load(&path), Err(Error::TomlDe(_))));
    }

    #[test]
    fn test_failed_write_keeps_the_old_player() {
        let dir = tempfile::tempdir().unwrap();
        let conf = dir.path().join("conf");
        let path = conf.join("settings.toml");

        let mut store = SettingsStore::load(&path).unwrap();
        store
            .set_player_path(Some(PathBuf::from("/usr/bin/vlc")))
            .unwrap();

        std::fs::remove_dir_all(&conf).unwrap();
        std::fs::write(&conf, "not a directory").unwrap();

        let result = store.set_player_path(Some(PathBuf::from("/usr/bin/mpv")));
        assert!(matches!(result, Err(Error::Io { .. })));
        assert_eq!(store.player_path(), Some(Path::new("/usr/bin/vlc")));
    }
}
