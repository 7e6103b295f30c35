//! QualityList component — the qualities found by the last scan.
//!
//! Only selectable in the ready phase. Otherwise it shows the controller's
//! placeholder ("scanning…", "no stream", "error") greyed out.

use std::time::Instant;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_default, style_muted, style_selected, style_selected_focused, C_ACCENT, C_MUTED},
    widgets::{pane_chrome::pane_chrome, scrollable_list::ScrollableList},
};

pub struct QualityList {
    list: ScrollableList<String>,
    list_state: ListState,
    last_click: Option<(usize, Instant)>,
}

impl QualityList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(|q: &String, f: &str| q.contains(f)),
            list_state: ListState::default(),
            last_click: None,
        }
    }

    /// Keep the list in step with the controller after every event.
    pub fn sync(&mut self, qualities: &[String]) {
        if self.list.items.as_slice() != qualities {
            self.list.set_items(qualities.to_vec());
            self.list.select_first();
        }
    }

    pub fn selected_quality(&self) -> Option<&str> {
        self.list.selected_item().map(String::as_str)
    }
}

impl Component for QualityList {
    fn id(&self) -> ComponentId {
        ComponentId::QualityList
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !state.controller.controls().quality {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(1),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Enter | KeyCode::Char('p') => return vec![Action::Play],
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action> {
        if !state.controller.controls().quality {
            return vec![];
        }
        let rel_row = event.row.saturating_sub(area.y + 1) as usize;
        match event.kind {
            MouseEventKind::ScrollUp => self.list.select_up(1),
            MouseEventKind::ScrollDown => self.list.select_down(1),
            MouseEventKind::Down(MouseButton::Left) => {
                let is_double = self
                    .last_click
                    .map(|(row, t)| row == rel_row && t.elapsed().as_millis() < 400)
                    .unwrap_or(false);
                if self.list.handle_click(rel_row) && is_double {
                    self.last_click = None;
                    return vec![Action::Play];
                }
                self.last_click = Some((rel_row, Instant::now()));
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("quality", Some('2'), focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let controller = &state.controller;
        if !controller.controls().quality || self.list.is_empty() {
            let text = controller.placeholder().unwrap_or("enter a url and press enter");
            frame.render_widget(
                Paragraph::new(Span::styled(format!("  {}", text), style_muted())),
                inner,
            );
            return;
        }

        let content_h = inner.height as usize;
        self.list.ensure_visible(content_h);
        let sel_in_view = self.list.selected_in_view(content_h);
        let items: Vec<ListItem> = self
            .list
            .visible_items(content_h)
            .into_iter()
            .enumerate()
            .map(|(view_row, (_, quality))| {
                let selected = view_row == sel_in_view;
                let (marker, style) = match (selected, focused) {
                    (true, true) => ("▶ ", style_selected_focused()),
                    (true, false) => ("▶ ", style_selected()),
                    _ => ("  ", style_default()),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(if selected { C_ACCENT } else { C_MUTED })),
                    Span::styled(quality.clone(), style),
                ]))
                .style(style)
            })
            .collect();

        let list = List::new(items)
            .highlight_style(Style::default())
            .highlight_symbol("");
        self.list_state.select(Some(sel_in_view));
        frame.render_stateful_widget(list, inner, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_selects_first_and_ignores_repeats() {
        let mut list = QualityList::new();
        let qualities = vec!["worst".to_string(), "720p".to_string(), "best".to_string()];
        list.sync(&qualities);
        assert_eq!(list.selected_quality(), Some("worst"));

        list.list.select_last();
        list.sync(&qualities);
        assert_eq!(list.selected_quality(), Some("best"));

        list.sync(&[]);
        assert_eq!(list.selected_quality(), None);
    }
}
