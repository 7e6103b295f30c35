#![cfg(unix)]

mod common;

use std::path::Path;
use std::time::Duration;

use common::fake_tool::{assert_exits, collect_until_done, lines, sh_tool, wait_for_pid};
use kadse_core::controller::{Controller, Phase};
use kadse_core::process::{ProcessEventKind, ProcessRunner, Slot, ToolCommand};
use kadse_core::settings::SettingsStore;
use kadse_core::streams::StreamListStore;
use tokio::sync::mpsc;

#[tokio::test]
async fn discovery_forwards_lines_in_order_then_exit() {
    let (tx, mut rx) = mpsc::channel(64);
    let tool = sh_tool(r#"echo "[cli][info] Found matching plugin for URL $1"; echo "Available streams: 360p, best""#);
    let mut runner = ProcessRunner::new(tool, Some(Duration::from_secs(5)), tx);

    runner.start_discovery("twitch.tv/foo", 1);
    let events = collect_until_done(&mut rx, Slot::Discovery, 1).await;

    assert_eq!(
        lines(&events),
        vec![
            "[cli][info] Found matching plugin for URL twitch.tv/foo",
            "Available streams: 360p, best",
        ]
    );
    assert_eq!(
        events.last().map(|e| &e.kind),
        Some(&ProcessEventKind::Exited(Some(0)))
    );
}

#[tokio::test]
async fn stderr_is_forwarded_too() {
    let (tx, mut rx) = mpsc::channel(64);
    let tool = sh_tool(r#"echo "error: No plugin can handle URL: $1" >&2; exit 1"#);
    let mut runner = ProcessRunner::new(tool, None, tx);

    runner.start_discovery("nope", 7);
    let events = collect_until_done(&mut rx, Slot::Discovery, 7).await;

    assert_eq!(lines(&events), vec!["error: No plugin can handle URL: nope"]);
    assert_eq!(
        events.last().map(|e| &e.kind),
        Some(&ProcessEventKind::Exited(Some(1)))
    );
}

#[tokio::test]
async fn playback_passes_quality_and_player() {
    let (tx, mut rx) = mpsc::channel(64);
    let mut runner = ProcessRunner::new(sh_tool(r#"echo "$@""#), None, tx);

    runner.start_playback("twitch.tv/foo", "720p", Path::new("/usr/bin/mpv"), 3);
    let events = collect_until_done(&mut rx, Slot::Playback, 3).await;

    assert_eq!(lines(&events), vec!["twitch.tv/foo 720p --player /usr/bin/mpv"]);
    assert!(events.iter().all(|e| e.slot == Slot::Playback));
}

#[tokio::test]
async fn hung_discovery_times_out() {
    let (tx, mut rx) = mpsc::channel(64);
    let mut runner = ProcessRunner::new(sh_tool("sleep 5"), Some(Duration::from_millis(200)), tx);

    runner.start_discovery("twitch.tv/foo", 1);
    let events = collect_until_done(&mut rx, Slot::Discovery, 1).await;

    assert_eq!(
        events.last().map(|e| &e.kind),
        Some(&ProcessEventKind::TimedOut)
    );
}

#[tokio::test]
async fn missing_binary_reports_launch_failure() {
    let (tx, mut rx) = mpsc::channel(64);
    let tool = ToolCommand::new("/nonexistent/kadse-test-tool");
    let mut runner = ProcessRunner::new(tool, None, tx);

    runner.start_discovery("twitch.tv/foo", 1);
    let events = collect_until_done(&mut rx, Slot::Discovery, 1).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0].kind, ProcessEventKind::LaunchFailed(_)));
}

#[tokio::test]
async fn new_scan_cancels_the_previous_one() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("slow.pid");
    let script = format!(
        r#"if [ "$1" = slow ]; then echo $$ > '{}'; sleep 30; echo late; fi; echo "Available streams: best""#,
        pid_file.display()
    );
    let (tx, mut rx) = mpsc::channel(64);
    let mut runner = ProcessRunner::new(sh_tool(&script), None, tx);

    runner.start_discovery("slow", 1);
    let slow_pid = wait_for_pid(&pid_file).await;
    assert!(runner.is_running(Slot::Discovery));

    runner.start_discovery("fast", 2);
    let events = collect_until_done(&mut rx, Slot::Discovery, 2).await;

    assert!(events.iter().all(|e| e.generation == 2));
    assert_eq!(lines(&events), vec!["Available streams: best"]);
    assert_exits(slow_pid).await;
}

#[tokio::test]
async fn controller_and_runner_complete_a_scan() {
    let dir = tempfile::tempdir().unwrap();
    let streams = StreamListStore::load(dir.path().join("streams.json")).unwrap();
    let settings = SettingsStore::load(dir.path().join("settings.toml")).unwrap();
    let mut controller = Controller::new(streams, settings, "fake-streamlink");

    let (tx, mut rx) = mpsc::channel(64);
    let tool = sh_tool(r#"echo "Available streams: audio_only, 480p (worst), 1080p60 (best)""#);
    let mut runner = ProcessRunner::new(tool, Some(Duration::from_secs(5)), tx);

    let effect = controller.query_quality("twitch.tv/foo").expect("scan effect");
    runner.execute(effect);
    for event in collect_until_done(&mut rx, Slot::Discovery, 1).await {
        controller.on_process_event(event);
    }

    assert_eq!(controller.phase(), Phase::QualitiesReady);
    assert_eq!(controller.qualities(), ["audio_only", "480p", "1080p60"]);
    assert_eq!(controller.log().len(), 2);
}

#[tokio::test]
async fn shutdown_kills_both_children() {
    let dir = tempfile::tempdir().unwrap();
    let script = format!(
        r#"echo $$ > '{}'/"$#".pid; sleep 30"#,
        dir.path().display()
    );
    let (tx, _rx) = mpsc::channel(64);
    let mut runner = ProcessRunner::new(sh_tool(&script), None, tx);

    // discovery gets 1 argument, playback 4
    runner.start_discovery("a", 1);
    runner.start_playback("a", "best", Path::new("/usr/bin/mpv"), 1);
    let discovery_pid = wait_for_pid(&dir.path().join("1.pid")).await;
    let playback_pid = wait_for_pid(&dir.path().join("4.pid")).await;
    assert!(runner.is_running(Slot::Discovery));
    assert!(runner.is_running(Slot::Playback));

    runner.shutdown();
    assert!(!runner.is_running(Slot::Discovery));
    assert!(!runner.is_running(Slot::Playback));
    assert_exits(discovery_pid).await;
    assert_exits(playback_pid).await;
}
