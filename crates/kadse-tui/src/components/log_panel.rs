//! LogPanel component — scrollable view of the tool output.
//!
//! Follows the newest line until the user scrolls up; scrolling back to the
//! bottom (End / G) resumes following.

use kadse_core::log_buffer::{LogEntry, LogSource};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_SECONDARY, C_SOURCE_DISCOVERY, C_SOURCE_PLAYBACK},
    widgets::pane_chrome::pane_chrome,
};

pub struct LogPanel {
    /// First visible row; `usize::MAX` pins to the bottom.
    scroll: usize,
    last_height: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            scroll: usize::MAX,
            last_height: 0,
        }
    }

    fn scroll_up(&mut self, n: usize, total: usize) {
        let max_scroll = total.saturating_sub(self.last_height);
        self.scroll = self.scroll.min(max_scroll).saturating_sub(n);
    }

    fn scroll_down(&mut self, n: usize, total: usize) {
        let max_scroll = total.saturating_sub(self.last_height);
        let next = self.scroll.min(max_scroll).saturating_add(n);
        self.scroll = if next >= max_scroll { usize::MAX } else { next };
    }
}

impl Component for LogPanel {
    fn id(&self) -> ComponentId {
        ComponentId::LogPanel
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let total = state.controller.log().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(1, total),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(1, total),
            KeyCode::PageUp => self.scroll_up(10, total),
            KeyCode::PageDown => self.scroll_down(10, total),
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            KeyCode::End | KeyCode::Char('G') => self.scroll = usize::MAX,
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        let total = state.controller.log().len();
        match event.kind {
            MouseEventKind::ScrollUp => self.scroll_up(3, total),
            MouseEventKind::ScrollDown => self.scroll_down(3, total),
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        if area.height == 0 {
            return;
        }
        let log = state.controller.log();
        let block = pane_chrome("log", Some('3'), focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let height = inner.height as usize;
        self.last_height = height;
        let total = log.len();

        if log.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  no output yet",
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        }

        let max_scroll = total.saturating_sub(height);
        let top = self.scroll.min(max_scroll);

        let lines: Vec<Line> = log
            .entries()
            .skip(top)
            .take(height)
            .map(log_line)
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn log_line(entry: &LogEntry) -> Line<'static> {
    let (tag, color) = match entry.source {
        LogSource::Discovery => ("scan", C_SOURCE_DISCOVERY),
        LogSource::Playback => ("play", C_SOURCE_PLAYBACK),
        LogSource::App => ("app ", C_MUTED),
    };
    Line::from(vec![
        Span::styled(
            format!(" {} ", entry.at.format("%H:%M:%S")),
            Style::default().fg(C_MUTED),
        ),
        Span::styled(format!("{} ", tag), Style::default().fg(color)),
        Span::styled(strip_ansi(&entry.text), Style::default().fg(C_SECONDARY)),
    ])
}

/// Drop ANSI escape sequences; streamlink colors some of its output.
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_escape = false;
    for ch in s.chars() {
        if in_escape {
            if ('@'..='~').contains(&ch) && ch != '[' {
                in_escape = false;
            }
            continue;
        }
        if ch == '\u{1b}' {
            in_escape = true;
            continue;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\u{1b}[31merror\u{1b}[0m: x"), "error: x");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn test_scroll_follows_until_scrolled_up() {
        let mut panel = LogPanel::new();
        panel.last_height = 5;
        panel.scroll_up(2, 20);
        assert_eq!(panel.scroll, 13);
        panel.scroll_down(5, 20);
        assert_eq!(panel.scroll, usize::MAX);
    }
}
