//! Main-window controller: the scan/play state machine behind the UI.
//!
//! The controller owns the stores, the log and the status line. It never
//! starts processes itself; operations that need one return an [`Effect`]
//! for the caller to hand to the `ProcessRunner`, and process output comes
//! back in through [`Controller::on_process_event`].
//!
//! ```text
//!   Idle ──query──► Scanning ──QualitiesFound──► QualitiesReady
//!                      │ ▲
//!                      │ └──────────query (from any phase)
//!                      ├──NoPluginForUrl──► NoPlugin
//!                      ├──NoStreamFound───► NoStream
//!                      └──StreamError / launch failure / timeout / exit──► StreamError
//! ```

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::log_buffer::{LogBuffer, LogSource};
use crate::process::{ProcessEvent, ProcessEventKind, Slot};
use crate::quality::{self, DiscoveryOutcome};
use crate::settings::SettingsStore;
use crate::streams::{AppendOutcome, SaveOutcome, StreamListStore};

pub const PLACEHOLDER_SCANNING: &str = "scanning…";
pub const PLACEHOLDER_NO_STREAM: &str = "no stream";
pub const PLACEHOLDER_ERROR: &str = "error";

pub const MSG_SCANNING: &str = "Scanning…";
pub const MSG_SAVING: &str = "Saving…";
pub const MSG_SAVED: &str = "Saved!";
pub const MSG_NO_CHANGES: &str = "No changes since last save.";
pub const MSG_NO_PLAYER: &str = "No video player selected!";
pub const MSG_NO_PLUGIN: &str = "Bad URL / no plugin for this host";
pub const MSG_NO_STREAM: &str = "Bad URL / stream offline";
pub const MSG_STREAM_ERROR: &str = "Oops! Something went wrong";
pub const MSG_TIMED_OUT: &str = "Quality scan timed out";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Scanning,
    QualitiesReady,
    NoPlugin,
    NoStream,
    StreamError,
}

/// Which controls accept input in the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub quality: bool,
    pub play: bool,
    pub save_url: bool,
}

impl Phase {
    pub fn controls(self) -> Controls {
        match self {
            Phase::Idle => Controls {
                quality: false,
                play: false,
                save_url: true,
            },
            Phase::Scanning => Controls {
                quality: false,
                play: false,
                save_url: false,
            },
            Phase::QualitiesReady => Controls {
                quality: true,
                play: true,
                save_url: true,
            },
            Phase::NoPlugin | Phase::NoStream | Phase::StreamError => Controls {
                quality: false,
                play: false,
                save_url: true,
            },
        }
    }
}

/// Work the caller must hand to the process runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartDiscovery {
        url: String,
        generation: u64,
    },
    StartPlayback {
        url: String,
        quality: String,
        player: PathBuf,
        generation: u64,
    },
}

pub struct Controller {
    streams: StreamListStore,
    settings: SettingsStore,
    tool_name: String,
    phase: Phase,
    qualities: Vec<String>,
    placeholder: Option<&'static str>,
    status: Option<String>,
    log: LogBuffer,
    discovery_generation: u64,
    playback_generation: u64,
}

impl Controller {
    pub fn new(streams: StreamListStore, settings: SettingsStore, tool_name: impl Into<String>) -> Self {
        Self {
            streams,
            settings,
            tool_name: tool_name.into(),
            phase: Phase::Idle,
            qualities: Vec::new(),
            placeholder: None,
            status: None,
            log: LogBuffer::default(),
            discovery_generation: 0,
            playback_generation: 0,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn controls(&self) -> Controls {
        self.phase.controls()
    }

    pub fn qualities(&self) -> &[String] {
        &self.qualities
    }

    /// Single greyed-out entry shown in place of the quality list.
    pub fn placeholder(&self) -> Option<&'static str> {
        self.placeholder
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub fn streams(&self) -> &[String] {
        self.streams.streams()
    }

    pub fn player_path(&self) -> Option<&std::path::Path> {
        self.settings.player_path()
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn push_log(&mut self, text: impl Into<String>) {
        self.log.push(LogSource::App, text);
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    // ── Quality scan ─────────────────────────────────────────────────────────

    /// Start scanning `url` for qualities. Blank URLs are ignored.
    ///
    /// A scan already in flight is superseded: its generation no longer
    /// matches and its output only reaches the log.
    pub fn query_quality(&mut self, url: &str) -> Option<Effect> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }
        self.discovery_generation += 1;
        self.phase = Phase::Scanning;
        self.qualities.clear();
        self.placeholder = Some(PLACEHOLDER_SCANNING);
        self.set_status(MSG_SCANNING);
        info!("quality scan #{} for {}", self.discovery_generation, url);
        Some(Effect::StartDiscovery {
            url: url.to_string(),
            generation: self.discovery_generation,
        })
    }

    pub fn on_process_event(&mut self, event: ProcessEvent) {
        let source = match event.slot {
            Slot::Discovery => LogSource::Discovery,
            Slot::Playback => LogSource::Playback,
        };
        let current = match event.slot {
            Slot::Discovery => event.generation == self.discovery_generation,
            Slot::Playback => event.generation == self.playback_generation,
        };

        match event.kind {
            ProcessEventKind::Line(line) => {
                let outcome = if event.slot == Slot::Discovery && current {
                    quality::classify(&line)
                } else {
                    None
                };
                self.log.push(source, line);
                if let Some(outcome) = outcome {
                    self.apply_outcome(outcome);
                }
            }
            ProcessEventKind::LaunchFailed(msg) => {
                self.log.push(source, format!("failed to start: {}", msg));
                if !current {
                    return;
                }
                let status = format!("Could not start {}", self.tool_name);
                if event.slot == Slot::Discovery {
                    self.fail_scan(Phase::StreamError, PLACEHOLDER_ERROR, status);
                } else {
                    self.set_status(status);
                }
            }
            ProcessEventKind::Exited(code) => {
                let text = match code {
                    Some(code) => format!("{} exited with status {}", self.tool_name, code),
                    None => format!("{} was terminated", self.tool_name),
                };
                debug!("{:?} gen {}: {}", event.slot, event.generation, text);
                self.log.push(source, text);
                if event.slot == Slot::Discovery && current && self.phase == Phase::Scanning {
                    let status = format!("{} exited without listing streams", self.tool_name);
                    self.fail_scan(Phase::StreamError, PLACEHOLDER_ERROR, status);
                }
            }
            ProcessEventKind::TimedOut => {
                self.log.push(source, MSG_TIMED_OUT);
                if event.slot == Slot::Discovery && current && self.phase == Phase::Scanning {
                    self.fail_scan(Phase::StreamError, PLACEHOLDER_ERROR, MSG_TIMED_OUT);
                }
            }
        }
    }

    fn apply_outcome(&mut self, outcome: DiscoveryOutcome) {
        if self.phase != Phase::Scanning {
            debug!("ignoring {:?} outside of a scan", outcome);
            return;
        }
        debug!("discovery outcome: {:?}", outcome);
        match outcome {
            DiscoveryOutcome::QualitiesFound(qualities) => {
                self.phase = Phase::QualitiesReady;
                self.qualities = qualities;
                self.placeholder = None;
                self.clear_status();
            }
            DiscoveryOutcome::NoPluginForUrl => {
                self.fail_scan(Phase::NoPlugin, PLACEHOLDER_NO_STREAM, MSG_NO_PLUGIN)
            }
            DiscoveryOutcome::NoStreamFound => {
                self.fail_scan(Phase::NoStream, PLACEHOLDER_NO_STREAM, MSG_NO_STREAM)
            }
            DiscoveryOutcome::StreamError => {
                self.fail_scan(Phase::StreamError, PLACEHOLDER_ERROR, MSG_STREAM_ERROR)
            }
        }
    }

    fn fail_scan(&mut self, phase: Phase, placeholder: &'static str, status: impl Into<String>) {
        self.phase = phase;
        self.qualities.clear();
        self.placeholder = Some(placeholder);
        self.set_status(status);
    }

    // ── Playback ─────────────────────────────────────────────────────────────

    /// Launch `quality` of `url` in the configured player.
    ///
    /// Without a player path nothing is launched; the problem is only logged.
    pub fn start_stream(&mut self, url: &str, quality: &str) -> Option<Effect> {
        if !self.controls().play {
            return None;
        }
        let Some(player) = self.settings.player_path().map(PathBuf::from) else {
            warn!("playback requested without a player configured");
            self.push_log(MSG_NO_PLAYER);
            self.set_status(MSG_NO_PLAYER);
            return None;
        };
        let url = url.trim();
        self.playback_generation += 1;
        self.push_log(format!(
            "starting {} ({}) in {}",
            url,
            quality,
            player.display()
        ));
        Some(Effect::StartPlayback {
            url: url.to_string(),
            quality: quality.to_string(),
            player,
            generation: self.playback_generation,
        })
    }

    // ── Stream list ──────────────────────────────────────────────────────────

    /// Add `url` to the saved list and write it out.
    pub fn save_url(&mut self, url: &str) -> Result<()> {
        if !self.controls().save_url {
            return Ok(());
        }
        let url = url.trim();
        match self.streams.append(url) {
            AppendOutcome::Appended => self.save_streams(),
            AppendOutcome::Duplicate => {
                self.set_status(format!("{} already saved", url));
                Ok(())
            }
            AppendOutcome::Empty => {
                self.set_status("Nothing to save");
                Ok(())
            }
        }
    }

    /// Write the list if it changed since the last save.
    pub fn save_streams(&mut self) -> Result<()> {
        self.set_status(MSG_SAVING);
        match self.streams.save() {
            Ok(SaveOutcome::Saved) => {
                self.set_status(MSG_SAVED);
                Ok(())
            }
            Ok(SaveOutcome::Unchanged) => {
                self.set_status(MSG_NO_CHANGES);
                Ok(())
            }
            Err(e) => {
                warn!("saving streams failed: {}", e);
                self.set_status(format!("Save failed: {}", e));
                Err(e)
            }
        }
    }

    /// Edit a saved URL in place. Empty values are refused.
    pub fn edit_stream(&mut self, index: usize, url: &str) -> Result<()> {
        let url = url.trim();
        if url.is_empty() {
            self.set_status("A stream URL cannot be empty");
            return Ok(());
        }
        if self.streams.replace(index, url) {
            self.save_streams()?;
        }
        Ok(())
    }

    pub fn remove_stream(&mut self, index: usize) -> Result<()> {
        if let Some(url) = self.streams.remove(index) {
            info!("removed stream {}", url);
            self.save_streams()?;
        }
        Ok(())
    }

    // ── Settings ─────────────────────────────────────────────────────────────

    pub fn set_player_path(&mut self, player: Option<PathBuf>) -> Result<()> {
        let label = player
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string());
        match self.settings.set_player_path(player) {
            Ok(()) => {
                self.set_status(format!("Player set to {}", label));
                Ok(())
            }
            Err(e) => {
                self.set_status(format!("Could not save settings: {}", e));
                Err(e)
            }
        }
    }
}
