//! UrlBar component — the stream URL field on top of the main window.
//!
//! Up/Down walk through the saved stream list, Enter scans the URL.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{layout::Rect, Frame};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        status_bar::phase_badge,
        text_input::{InputAction, TextInput},
    },
};

pub struct UrlBar {
    input: TextInput,
    /// Position in the saved list while cycling with Up/Down.
    history: Option<usize>,
}

impl UrlBar {
    pub fn new() -> Self {
        Self {
            input: TextInput::new(" ", "stream url, e.g. twitch.tv/somechannel"),
            history: None,
        }
    }

    pub fn url(&self) -> &str {
        self.input.text()
    }

    pub fn set_url(&mut self, url: &str) {
        self.input.set_value(url);
        self.history = None;
    }

    fn cycle(&mut self, streams: &[String], forward: bool) {
        if streams.is_empty() {
            return;
        }
        let last = streams.len() - 1;
        // The list may have shrunk since the last step.
        let next = match (self.history.map(|i| i.min(last)), forward) {
            (None, true) => 0,
            (None, false) => last,
            (Some(i), true) => (i + 1).min(last),
            (Some(i), false) => i.saturating_sub(1),
        };
        self.input.set_value(&streams[next]);
        self.history = Some(next);
    }
}

impl Component for UrlBar {
    fn id(&self) -> ComponentId {
        ComponentId::UrlBar
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Up => {
                self.cycle(state.controller.streams(), false);
                return vec![];
            }
            KeyCode::Down => {
                self.cycle(state.controller.streams(), true);
                return vec![];
            }
            _ => {}
        }
        match self.input.handle_key(key) {
            InputAction::Confirmed(_) => vec![Action::QueryQuality],
            InputAction::Changed(_) => {
                self.history = None;
                vec![]
            }
            InputAction::Cancelled => vec![Action::FocusPane(ComponentId::QualityList)],
            InputAction::Ignored => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::UseStream(url) = action {
            self.set_url(url);
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let (label, color) = phase_badge(state.controller.phase());
        let block = pane_chrome(
            "stream url",
            Some('1'),
            focused,
            Some(Badge { text: label, color }),
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 {
            return;
        }
        let row = Rect { height: 1, ..inner };
        self.input.draw(frame, row, focused);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streams() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    #[test]
    fn test_cycle_walks_saved_urls() {
        let mut bar = UrlBar::new();
        bar.cycle(&streams(), true);
        assert_eq!(bar.url(), "a");
        bar.cycle(&streams(), true);
        bar.cycle(&streams(), true);
        bar.cycle(&streams(), true);
        assert_eq!(bar.url(), "c");
        bar.cycle(&streams(), false);
        assert_eq!(bar.url(), "b");
    }

    #[test]
    fn test_cycle_up_starts_from_newest() {
        let mut bar = UrlBar::new();
        bar.cycle(&streams(), false);
        assert_eq!(bar.url(), "c");
        bar.cycle(&[], true);
        assert_eq!(bar.url(), "c");
    }

    #[test]
    fn test_cycle_survives_a_shrinking_list() {
        let mut bar = UrlBar::new();
        for _ in 0..3 {
            bar.cycle(&streams(), true);
        }
        assert_eq!(bar.url(), "c");

        let shrunk = vec!["a".to_string()];
        bar.cycle(&shrunk, false);
        assert_eq!(bar.url(), "a");
        bar.cycle(&shrunk, true);
        assert_eq!(bar.url(), "a");

        let two = vec!["a".to_string(), "b".to_string()];
        bar.cycle(&streams(), true);
        bar.cycle(&streams(), true);
        bar.cycle(&two, true);
        assert_eq!(bar.url(), "b");
    }
}
