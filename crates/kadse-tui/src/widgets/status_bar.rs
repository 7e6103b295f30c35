//! Status bar: phase, status message, last log line and the keys footer.

use kadse_core::controller::Phase;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{
    C_ERROR, C_MODE_DIALOG, C_MODE_INSERT, C_MODE_NORMAL, C_MUTED, C_PRIMARY, C_READY,
    C_SCANNING, C_SECONDARY, C_SEPARATOR,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    /// Global single-key shortcuts are live
    Normal,
    /// A text field has the keyboard
    Insert,
    /// A modal dialog has the keyboard
    Dialog,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Dialog => "DIALOG",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Insert => C_MODE_INSERT,
            Self::Dialog => C_MODE_DIALOG,
        }
    }
}

/// Short label and color for a controller phase.
pub fn phase_badge(phase: Phase) -> (&'static str, Color) {
    match phase {
        Phase::Idle => ("IDLE", C_MUTED),
        Phase::Scanning => ("SCANNING", C_SCANNING),
        Phase::QualitiesReady => ("READY", C_READY),
        Phase::NoPlugin => ("NO PLUGIN", C_ERROR),
        Phase::NoStream => ("OFFLINE", C_ERROR),
        Phase::StreamError => ("ERROR", C_ERROR),
    }
}

/// One row: phase dot, status message (or last log line when there is none).
pub fn draw_status_line(
    frame: &mut Frame,
    area: Rect,
    phase: Phase,
    status: Option<&str>,
    last_log: Option<&str>,
) {
    let (_, color) = phase_badge(phase);
    let mut spans = vec![Span::styled(" ● ", Style::default().fg(color))];
    match status {
        Some(msg) => spans.push(Span::styled(
            msg.to_string(),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        )),
        None => spans.push(Span::styled(
            last_log.unwrap_or("").to_string(),
            Style::default().fg(C_SECONDARY),
        )),
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode) {
    let keys = match mode {
        InputMode::Normal => {
            " Enter scan/play  ↑↓ select  Ctrl+A save url  Ctrl+S save  F2 prefs  F3 streams  Tab panes  ? help  q quit"
        }
        InputMode::Insert => {
            " type url  Enter scan  ↑↓ saved urls  Ctrl+A save url  Ctrl+P play  Esc/Tab leave  Ctrl+C quit"
        }
        InputMode::Dialog => " Enter pick/confirm  Esc close  Ctrl+S accept",
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default()
                .fg(mode.color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys, Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
