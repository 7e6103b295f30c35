use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// The external streaming tool used for both quality discovery and playback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Binary name or path. Bare names are looked up beside the executable,
    /// then on PATH.
    #[serde(default = "default_tool_binary")]
    pub binary: String,
    /// Arguments inserted before the URL on every invocation.
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Seconds a quality scan may run before it is killed. 0 disables.
    #[serde(default = "default_discovery_timeout_secs")]
    pub discovery_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// JSON array of saved stream URLs.
    #[serde(default = "default_streams_file")]
    pub streams_file: PathBuf,
    /// Player path and other user settings.
    #[serde(default = "default_settings_file")]
    pub settings_file: PathBuf,
}

impl ToolConfig {
    pub fn discovery_timeout(&self) -> Option<Duration> {
        match self.discovery_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            binary: default_tool_binary(),
            extra_args: Vec::new(),
            discovery_timeout_secs: default_discovery_timeout_secs(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            streams_file: default_streams_file(),
            settings_file: default_settings_file(),
        }
    }
}

fn default_tool_binary() -> String {
    "streamlink".to_string()
}

fn default_discovery_timeout_secs() -> u64 {
    30
}

fn default_streams_file() -> PathBuf {
    platform::data_dir().join("streams.json")
}

fn default_settings_file() -> PathBuf {
    platform::config_dir().join("settings.toml")
}

impl Config {
    /// Read `path`, writing a default config there first if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| Error::io(path, e))?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tool.binary, "streamlink");
        assert!(config.tool.extra_args.is_empty());
        assert_eq!(config.tool.discovery_timeout(), Some(Duration::from_secs(30)));
        assert!(config.paths.streams_file.ends_with("kadse/streams.json"));
        assert!(config.paths.settings_file.ends_with("kadse/settings.toml"));
    }

    #[test]
    fn test_zero_timeout_disables() {
        let tool = ToolConfig {
            discovery_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(tool.discovery_timeout(), None);
    }

    #[test]
    fn test_load_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.tool.binary, "streamlink");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tool]\nbinary = \"livestreamer\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.tool.binary, "livestreamer");
        assert_eq!(config.tool.discovery_timeout_secs, 30);
        assert!(config.paths.streams_file.ends_with("streams.json"));
    }
}
