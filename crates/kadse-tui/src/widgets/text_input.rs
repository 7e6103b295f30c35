//! TextInput — single-line editor on top of tui-input.
//!
//! Used for the URL bar, the player path field, the stream filter and the
//! inline editor in the streams dialog.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_INPUT_BG, C_INPUT_FG, C_MUTED};

#[derive(Debug, PartialEq, Eq)]
pub enum InputAction {
    Changed(String),
    Confirmed(String),
    Cancelled,
    /// Key was not consumed (arrows, function keys)
    Ignored,
}

pub struct TextInput {
    input: Input,
    prefix: &'static str,
    placeholder: String,
}

impl TextInput {
    pub fn new(prefix: &'static str, placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            prefix,
            placeholder: placeholder.into(),
        }
    }

    pub fn clear(&mut self) {
        self.input = Input::default();
    }

    pub fn set_value(&mut self, value: &str) {
        self.input = Input::new(value.to_string());
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn is_empty(&self) -> bool {
        self.input.value().is_empty()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        match key.code {
            KeyCode::Esc => InputAction::Cancelled,
            KeyCode::Enter => InputAction::Confirmed(self.input.value().to_string()),
            KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::BackTab | KeyCode::F(_) => {
                InputAction::Ignored
            }
            _ => {
                if self.input.handle_event(&Event::Key(key)).is_some() {
                    InputAction::Changed(self.input.value().to_string())
                } else {
                    InputAction::Ignored
                }
            }
        }
    }

    /// Render into a single row. The cursor is only placed when `active`.
    pub fn draw(&self, frame: &mut Frame, area: Rect, active: bool) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let prefix_w = self.prefix.chars().count();
        let scroll = self
            .input
            .visual_scroll((area.width as usize).saturating_sub(prefix_w + 1));
        let value = self.input.value();
        let display = if value.is_empty() {
            Span::styled(
                format!("{}{}", self.prefix, self.placeholder),
                Style::default().fg(C_MUTED),
            )
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(
                format!("{}{}", self.prefix, visible),
                Style::default().fg(C_INPUT_FG),
            )
        };

        let paragraph =
            Paragraph::new(Line::from(vec![display])).style(Style::default().bg(C_INPUT_BG));
        frame.render_widget(paragraph, area);

        if active {
            let offset = prefix_w + self.input.visual_cursor().saturating_sub(scroll);
            let cursor_x = area.x + offset as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_and_confirm() {
        let mut input = TextInput::new("", "url");
        input.handle_key(key(KeyCode::Char('a')));
        let action = input.handle_key(key(KeyCode::Char('b')));
        assert_eq!(action, InputAction::Changed("ab".into()));
        assert_eq!(input.handle_key(key(KeyCode::Enter)), InputAction::Confirmed("ab".into()));
    }

    #[test]
    fn test_navigation_keys_are_not_consumed() {
        let mut input = TextInput::new("", "");
        input.set_value("x");
        assert_eq!(input.handle_key(key(KeyCode::Up)), InputAction::Ignored);
        assert_eq!(input.handle_key(key(KeyCode::Esc)), InputAction::Cancelled);
        assert_eq!(input.text(), "x");
    }
}
