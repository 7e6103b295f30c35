//! External process runner.
//!
//! ```text
//!   ProcessRunner::start_discovery(url)      ProcessRunner::start_playback(..)
//!         │                                         │
//!         └── supervise task ──┬── stdout lines ────┤
//!                              ├── stderr lines     │
//!                              └── wait / timeout   │
//!                                        │
//!                                        └──► mpsc::Sender<ProcessEvent>
//! ```
//!
//! Each slot holds at most one child. Starting a slot again aborts the old
//! supervise task, which drops (and so kills) its child. Every event carries
//! the generation it was started with so the receiver can discard output
//! from a replaced process.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::controller::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Discovery,
    Playback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEventKind {
    /// One line of stdout or stderr, without its line terminator.
    Line(String),
    /// The OS refused to start the process.
    LaunchFailed(String),
    /// The process ended. `None` when killed by a signal.
    Exited(Option<i32>),
    /// The discovery timeout elapsed and the process was killed.
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEvent {
    pub slot: Slot,
    pub generation: u64,
    pub kind: ProcessEventKind,
}

/// How to invoke the streaming tool.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    pub binary: PathBuf,
    /// Inserted before the URL on every invocation.
    pub extra_args: Vec<String>,
}

impl ToolCommand {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// `<tool> [extra…] <url>`
    pub fn discovery_args(&self, url: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.extra_args.iter().map(OsString::from).collect();
        args.push(url.into());
        args
    }

    /// `<tool> [extra…] <url> <quality> --player <path>`
    pub fn playback_args(&self, url: &str, quality: &str, player: &Path) -> Vec<OsString> {
        let mut args = self.discovery_args(url);
        args.push(quality.into());
        args.push("--player".into());
        args.push(player.as_os_str().to_owned());
        args
    }

    /// Display name used in status messages.
    pub fn name(&self) -> String {
        self.binary
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.binary.display().to_string())
    }
}

pub struct ProcessRunner {
    tool: ToolCommand,
    discovery_timeout: Option<Duration>,
    events: mpsc::Sender<ProcessEvent>,
    discovery: Option<JoinHandle<()>>,
    playback: Option<JoinHandle<()>>,
}

impl ProcessRunner {
    pub fn new(
        tool: ToolCommand,
        discovery_timeout: Option<Duration>,
        events: mpsc::Sender<ProcessEvent>,
    ) -> Self {
        Self {
            tool,
            discovery_timeout,
            events,
            discovery: None,
            playback: None,
        }
    }

    pub fn tool(&self) -> &ToolCommand {
        &self.tool
    }

    /// Run an effect produced by the controller.
    pub fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::StartDiscovery { url, generation } => self.start_discovery(&url, generation),
            Effect::StartPlayback {
                url,
                quality,
                player,
                generation,
            } => self.start_playback(&url, &quality, &player, generation),
        }
    }

    /// Launch the quality scan for `url`, cancelling any scan still running.
    pub fn start_discovery(&mut self, url: &str, generation: u64) {
        if let Some(old) = self.discovery.take() {
            if !old.is_finished() {
                info!("cancelling previous quality scan");
            }
            old.abort();
        }
        let args = self.tool.discovery_args(url);
        self.discovery = Some(tokio::spawn(supervise(
            Slot::Discovery,
            generation,
            self.tool.binary.clone(),
            args,
            self.discovery_timeout,
            self.events.clone(),
        )));
    }

    /// Launch playback, replacing any playback still running.
    pub fn start_playback(&mut self, url: &str, quality: &str, player: &Path, generation: u64) {
        if let Some(old) = self.playback.take() {
            if !old.is_finished() {
                info!("stopping previous playback");
            }
            old.abort();
        }
        let args = self.tool.playback_args(url, quality, player);
        self.playback = Some(tokio::spawn(supervise(
            Slot::Playback,
            generation,
            self.tool.binary.clone(),
            args,
            None,
            self.events.clone(),
        )));
    }

    pub fn is_running(&self, slot: Slot) -> bool {
        let handle = match slot {
            Slot::Discovery => &self.discovery,
            Slot::Playback => &self.playback,
        };
        handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    /// Kill both children.
    pub fn shutdown(&mut self) {
        for handle in [self.discovery.take(), self.playback.take()].into_iter().flatten() {
            handle.abort();
        }
    }
}

impl Drop for ProcessRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn supervise(
    slot: Slot,
    generation: u64,
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Option<Duration>,
    tx: mpsc::Sender<ProcessEvent>,
) {
    let event = |kind| ProcessEvent {
        slot,
        generation,
        kind,
    };

    let mut child = match Command::new(&program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            warn!("{:?}: failed to launch {}: {}", slot, program.display(), e);
            let msg = format!("{}: {}", program.display(), e);
            let _ = tx.send(event(ProcessEventKind::LaunchFailed(msg))).await;
            return;
        }
    };
    info!(
        "{:?}: started {} {:?} (pid {:?}, gen {})",
        slot,
        program.display(),
        args,
        child.id(),
        generation
    );

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let run = async {
        tokio::join!(
            forward_lines(stdout, slot, generation, &tx),
            forward_lines(stderr, slot, generation, &tx)
        );
        child.wait().await
    };

    let finished = match timeout {
        Some(limit) => tokio::time::timeout(limit, run).await.ok(),
        None => Some(run.await),
    };

    let kind = match finished {
        Some(Ok(status)) => {
            info!("{:?}: exited with {} (gen {})", slot, status, generation);
            ProcessEventKind::Exited(status.code())
        }
        Some(Err(e)) => {
            warn!("{:?}: wait failed: {}", slot, e);
            ProcessEventKind::Exited(None)
        }
        None => {
            warn!("{:?}: timed out, killing (gen {})", slot, generation);
            if let Err(e) = child.kill().await {
                debug!("{:?}: kill after timeout failed: {}", slot, e);
            }
            ProcessEventKind::TimedOut
        }
    };
    let _ = tx.send(event(kind)).await;
}

async fn forward_lines<R: AsyncRead + Unpin>(
    reader: Option<R>,
    slot: Slot,
    generation: u64,
    tx: &mpsc::Sender<ProcessEvent>,
) {
    let Some(reader) = reader else {
        return;
    };
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                let ev = ProcessEvent {
                    slot,
                    generation,
                    kind: ProcessEventKind::Line(line),
                };
                if tx.send(ev).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("{:?}: output read error: {}", slot, e);
                break;
            }
        }
    }
}
