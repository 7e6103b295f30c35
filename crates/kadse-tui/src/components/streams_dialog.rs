//! StreamsDialog — modal editor for the saved stream list.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::help_overlay::centered_rect,
    theme::{
        style_focused_border, style_secondary, style_selected_focused, C_DIALOG_BG, C_MUTED,
        C_NUMBER_HINT, C_PRIMARY,
    },
    widgets::{
        scrollable_list::ScrollableList,
        text_input::{InputAction, TextInput},
    },
};

pub struct StreamsDialog {
    pub visible: bool,
    list: ScrollableList<String>,
    list_state: ListState,
    /// Inline editor: original index and the field.
    editing: Option<(usize, TextInput)>,
    filter: TextInput,
    filter_active: bool,
}

impl StreamsDialog {
    pub fn new() -> Self {
        Self {
            visible: false,
            list: ScrollableList::new(|url: &String, q: &str| {
                url.to_lowercase().contains(&q.to_lowercase())
            }),
            list_state: ListState::default(),
            editing: None,
            filter: TextInput::new("/ ", "filter..."),
            filter_active: false,
        }
    }

    pub fn open(&mut self, streams: &[String]) {
        self.visible = true;
        self.editing = None;
        self.filter_active = false;
        self.filter.clear();
        self.list.set_filter("");
        self.sync(streams);
        self.list.select_first();
    }

    /// Mirror the store; the filter and selection survive where possible.
    pub fn sync(&mut self, streams: &[String]) {
        if self.list.items.as_slice() != streams {
            self.list.set_items(streams.to_vec());
        }
    }

    fn close(&mut self) -> Vec<Action> {
        self.visible = false;
        self.editing = None;
        vec![Action::CloseDialog]
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Vec<Action> {
        let Some((index, input)) = self.editing.as_mut() else {
            return vec![];
        };
        match input.handle_key(key) {
            InputAction::Confirmed(url) => {
                let index = *index;
                self.editing = None;
                vec![Action::EditStream(index, url)]
            }
            InputAction::Cancelled => {
                self.editing = None;
                vec![]
            }
            InputAction::Changed(_) | InputAction::Ignored => vec![],
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Up => self.list.select_up(1),
            KeyCode::Down => self.list.select_down(1),
            _ => match self.filter.handle_key(key) {
                InputAction::Changed(q) => self.list.set_filter(&q),
                InputAction::Confirmed(_) => self.filter_active = false,
                InputAction::Cancelled => {
                    self.filter.clear();
                    self.list.set_filter("");
                    self.filter_active = false;
                }
                InputAction::Ignored => {}
            },
        }
        vec![]
    }

    /// Key handling; the dialog works on its own copy of the list.
    fn on_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.visible {
            return vec![];
        }
        if self.editing.is_some() {
            return self.handle_edit_key(key);
        }
        if self.filter_active {
            return self.handle_filter_key(key);
        }
        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::SaveStreams];
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return self.close(),
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(1),
            KeyCode::PageUp => self.list.select_up(10),
            KeyCode::PageDown => self.list.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Char('/') => self.filter_active = true,
            KeyCode::Enter | KeyCode::Char('e') => {
                if let (Some(index), Some(url)) =
                    (self.list.selected_original_index(), self.list.selected_item())
                {
                    let mut input = TextInput::new(" ", "");
                    input.set_value(url);
                    self.editing = Some((index, input));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(index) = self.list.selected_original_index() {
                    return vec![Action::RemoveStream(index)];
                }
            }
            KeyCode::Char('o') => {
                if let Some(url) = self.list.selected_item().cloned() {
                    let mut actions = self.close();
                    actions.insert(0, Action::UseStream(url));
                    actions.push(Action::QueryQuality);
                    return actions;
                }
            }
            _ => {}
        }
        vec![]
    }
}

impl Component for StreamsDialog {
    fn id(&self) -> ComponentId {
        ComponentId::StreamsDialog
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        self.on_key(key)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if !self.visible {
            return;
        }
        self.sync(state.controller.streams());

        let popup = centered_rect(76, area.height.saturating_sub(4).clamp(8, 26), area);
        frame.render_widget(Clear, popup);
        let title = format!(" all streams ({}) ", self.list.total_len());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style_focused_border())
            .title(Span::styled(
                title,
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(C_DIALOG_BG));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);
        let list_area = rows[0];

        if self.list.is_empty() {
            let msg = if self.list.total_len() == 0 {
                "  no saved streams; use Ctrl+A in the url bar"
            } else {
                "  no streams match filter"
            };
            frame.render_widget(
                Paragraph::new(Span::styled(msg, Style::default().fg(C_MUTED))),
                list_area,
            );
        } else {
            let content_h = list_area.height as usize;
            self.list.ensure_visible(content_h);
            let sel_in_view = self.list.selected_in_view(content_h);
            let editing_idx = self.editing.as_ref().map(|(i, _)| *i);
            let mut edit_row = None;
            let items: Vec<ListItem> = self
                .list
                .visible_items(content_h)
                .into_iter()
                .enumerate()
                .map(|(view_row, (orig_idx, url))| {
                    if editing_idx == Some(orig_idx) {
                        edit_row = Some(view_row);
                    }
                    let style = if view_row == sel_in_view {
                        style_selected_focused()
                    } else {
                        style_secondary()
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            format!(" {:>3} ", orig_idx + 1),
                            Style::default().fg(C_NUMBER_HINT),
                        ),
                        Span::styled(url.clone(), style),
                    ]))
                })
                .collect();
            let list = List::new(items)
                .highlight_style(Style::default())
                .highlight_symbol("");
            self.list_state.select(Some(sel_in_view));
            frame.render_stateful_widget(list, list_area, &mut self.list_state);

            if let (Some(row), Some((_, input))) = (edit_row, self.editing.as_ref()) {
                let edit_area = Rect {
                    x: list_area.x + 5,
                    y: list_area.y + row as u16,
                    width: list_area.width.saturating_sub(5),
                    height: 1,
                };
                input.draw(frame, edit_area, true);
            }
        }

        if self.filter_active || !self.filter.is_empty() {
            self.filter.draw(frame, rows[1], self.filter_active);
        }

        let keys = if self.editing.is_some() {
            " Enter commit  Esc abort"
        } else {
            " e edit  d delete  o open  / filter  Ctrl+S save  Esc close"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(keys, Style::default().fg(C_MUTED))),
            rows[2],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn dialog() -> StreamsDialog {
        let mut d = StreamsDialog::new();
        d.open(&["twitch.tv/a".to_string(), "youtube.com/b".to_string()]);
        d
    }

    #[test]
    fn test_inline_edit_commits_on_enter() {
        let mut d = dialog();
        d.list.select_down(1);
        d.on_key(key(KeyCode::Char('e')));
        d.on_key(key(KeyCode::Char('x')));
        let actions = d.on_key(key(KeyCode::Enter));
        assert_eq!(actions, vec![Action::EditStream(1, "youtube.com/bx".into())]);
        assert!(d.editing.is_none());
    }

    #[test]
    fn test_inline_edit_aborts_on_esc() {
        let mut d = dialog();
        d.on_key(key(KeyCode::Enter));
        let actions = d.on_key(key(KeyCode::Esc));
        assert!(actions.is_empty());
        assert!(d.visible);
        assert!(d.editing.is_none());
    }

    #[test]
    fn test_delete_uses_original_index_under_filter() {
        let mut d = dialog();
        d.on_key(key(KeyCode::Char('/')));
        for c in "you".chars() {
            d.on_key(key(KeyCode::Char(c)));
        }
        d.on_key(key(KeyCode::Enter));
        let actions = d.on_key(key(KeyCode::Char('d')));
        assert_eq!(actions, vec![Action::RemoveStream(1)]);
    }

    #[test]
    fn test_open_loads_url_and_scans() {
        let mut d = dialog();
        let actions = d.on_key(key(KeyCode::Char('o')));
        assert_eq!(
            actions,
            vec![
                Action::UseStream("twitch.tv/a".into()),
                Action::CloseDialog,
                Action::QueryQuality
            ]
        );
        assert!(!d.visible);
    }
}
