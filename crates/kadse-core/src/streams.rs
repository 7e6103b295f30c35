//! Stream list store — the saved URLs, persisted as a JSON array of strings.
//!
//! The store keeps a snapshot of what was last written so that `save` can
//! tell a real change from a no-op.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    Empty,
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Unchanged,
}

#[derive(Debug)]
pub struct StreamListStore {
    path: PathBuf,
    streams: Vec<String>,
    persisted: Vec<String>,
}

impl StreamListStore {
    /// Read the list from `path`. A missing file becomes an empty list that is
    /// written back immediately.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let streams: Vec<String> =
                    serde_json::from_str(&content).map_err(|source| Error::Json {
                        path: path.clone(),
                        source,
                    })?;
                debug!("loaded {} streams from {}", streams.len(), path.display());
                Ok(Self {
                    path,
                    persisted: streams.clone(),
                    streams,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no stream list at {}, creating an empty one", path.display());
                let store = Self {
                    path,
                    streams: Vec::new(),
                    persisted: Vec::new(),
                };
                store.write()?;
                Ok(store)
            }
            Err(e) => Err(Error::io(&path, e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn streams(&self) -> &[String] {
        &self.streams
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.streams.iter().any(|s| s == url)
    }

    pub fn is_dirty(&self) -> bool {
        self.streams != self.persisted
    }

    pub fn append(&mut self, url: &str) -> AppendOutcome {
        if url.is_empty() {
            return AppendOutcome::Empty;
        }
        if self.contains(url) {
            return AppendOutcome::Duplicate;
        }
        self.streams.push(url.to_string());
        AppendOutcome::Appended
    }

    /// Edit the entry at `index` in place. Returns false when the index is out
    /// of range or the value did not change.
    pub fn replace(&mut self, index: usize, url: &str) -> bool {
        match self.streams.get_mut(index) {
            Some(slot) if slot != url => {
                *slot = url.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.streams.len() {
            Some(self.streams.remove(index))
        } else {
            None
        }
    }

    /// Write the list if it differs from the last persisted snapshot.
    pub fn save(&mut self) -> Result<SaveOutcome> {
        if !self.is_dirty() {
            return Ok(SaveOutcome::Unchanged);
        }
        self.write()?;
        self.persisted = self.streams.clone();
        info!("saved {} streams to {}", self.streams.len(), self.path.display());
        Ok(SaveOutcome::Saved)
    }

    fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let content = serde_json::to_string(&self.streams).map_err(|source| Error::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, content).map_err(|e| Error::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, StreamListStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = StreamListStore::load(dir.path().join("streams.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_file_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("streams.json");
        let store = StreamListStore::load(&path).unwrap();
        assert!(store.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_append_adds_at_end() {
        let (_dir, mut store) = temp_store();
        assert_eq!(store.append("twitch.tv/a"), AppendOutcome::Appended);
        assert_eq!(store.append("twitch.tv/b"), AppendOutcome::Appended);
        assert_eq!(store.len(), 2);
        assert_eq!(store.streams().last().map(String::as_str), Some("twitch.tv/b"));
    }

    #[test]
    fn test_append_rejects_empty_and_duplicate() {
        let (_dir, mut store) = temp_store();
        store.append("twitch.tv/a");
        assert_eq!(store.append(""), AppendOutcome::Empty);
        assert_eq!(store.append("twitch.tv/a"), AppendOutcome::Duplicate);
        assert_eq!(store.streams(), ["twitch.tv/a".to_string()]);
    }

    #[test]
    fn test_second_save_is_noop() {
        let (_dir, mut store) = temp_store();
        store.append("twitch.tv/a");
        assert!(store.is_dirty());
        assert_eq!(store.save().unwrap(), SaveOutcome::Saved);
        assert!(!store.is_dirty());
        assert_eq!(store.save().unwrap(), SaveOutcome::Unchanged);
    }

    #[test]
    fn test_save_and_reload_keeps_order() {
        let (dir, mut store) = temp_store();
        for url in ["c", "a", "b"] {
            store.append(url);
        }
        store.save().unwrap();

        let reloaded = StreamListStore::load(dir.path().join("streams.json")).unwrap();
        assert_eq!(reloaded.streams(), store.streams());
        assert!(!reloaded.is_dirty());
    }

    #[test]
    fn test_replace_and_remove() {
        let (_dir, mut store) = temp_store();
        store.append("a");
        store.append("b");
        assert!(store.replace(1, "c"));
        assert!(!store.replace(1, "c"));
        assert!(!store.replace(5, "x"));
        assert_eq!(store.remove(0).as_deref(), Some("a"));
        assert_eq!(store.remove(3), None);
        assert_eq!(store.streams(), ["c".to_string()]);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streams.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            StreamListStore::load(&path),
            Err(Error::Json { .. })
        ));
    }
}
