//! Action enum — all user-initiated intents.

use std::path::PathBuf;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    UrlBar,
    QualityList,
    LogPanel,
    SettingsDialog,
    StreamsDialog,
    HelpOverlay,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Main window ──────────────────────────────────────────────────────────
    /// Scan the URL currently in the URL bar.
    QueryQuality,
    /// Play the selected quality of the URL in the URL bar.
    Play,
    /// Append the URL bar contents to the saved list.
    SaveUrl,
    SaveStreams,

    // ── Streams dialog ───────────────────────────────────────────────────────
    EditStream(usize, String),
    RemoveStream(usize),
    /// Put a saved URL into the URL bar and scan it.
    UseStream(String),

    // ── Settings dialog ──────────────────────────────────────────────────────
    SetPlayerPath(Option<PathBuf>),

    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),

    // ── Dialogs / overlays ───────────────────────────────────────────────────
    OpenPreferences,
    OpenAllStreams,
    CloseDialog,
    ToggleHelp,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
    Resize(u16, u16),
    Noop,
}
