//! A stand-in for the streaming tool built from `sh -c`.
//!
//! Extra args are `-c <script> fake-streamlink`, so the URL the runner
//! appends arrives as `$1`, the quality as `$2` and so on.

use std::path::Path;
use std::time::Duration;

use kadse_core::process::{ProcessEvent, ProcessEventKind, Slot, ToolCommand};
use tokio::sync::mpsc;

pub fn sh_tool(script: &str) -> ToolCommand {
    ToolCommand::new("sh").with_extra_args(vec![
        "-c".to_string(),
        script.to_string(),
        "fake-streamlink".to_string(),
    ])
}

fn is_terminal(kind: &ProcessEventKind) -> bool {
    matches!(
        kind,
        ProcessEventKind::Exited(_) | ProcessEventKind::TimedOut | ProcessEventKind::LaunchFailed(_)
    )
}

/// Receive events until `slot` reports its terminal event for `generation`.
pub async fn collect_until_done(
    rx: &mut mpsc::Receiver<ProcessEvent>,
    slot: Slot,
    generation: u64,
) -> Vec<ProcessEvent> {
    let mut events = Vec::new();
    let deadline = tokio::time::sleep(Duration::from_secs(10));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            ev = rx.recv() => {
                let ev = ev.expect("runner dropped its sender");
                let done = ev.slot == slot && ev.generation == generation && is_terminal(&ev.kind);
                events.push(ev);
                if done {
                    return events;
                }
            }
            _ = &mut deadline => panic!("no terminal event within 10s; got {:?}", events),
        }
    }
}

pub fn lines(events: &[ProcessEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match &e.kind {
            ProcessEventKind::Line(l) => Some(l.as_str()),
            _ => None,
        })
        .collect()
}

/// Wait for a script to write its `$$` into `path`.
pub async fn wait_for_pid(path: &Path) -> u32 {
    for _ in 0..100 {
        if let Ok(text) = std::fs::read_to_string(path) {
            if let Ok(pid) = text.trim().parse() {
                return pid;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("{} never got a pid", path.display());
}

/// Whether `pid` is still running. Zombies count as gone.
pub fn process_alive(pid: u32) -> bool {
    let signalled = std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    if !signalled {
        return false;
    }
    let stat = std::process::Command::new("ps")
        .args(["-o", "stat=", "-p", &pid.to_string()])
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default();
    !stat.starts_with('Z')
}

/// Poll until `pid` has exited, panicking after five seconds.
pub async fn assert_exits(pid: u32) {
    for _ in 0..100 {
        if !process_alive(pid) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("process {} still running", pid);
}
