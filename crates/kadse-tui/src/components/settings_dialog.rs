//! SettingsDialog — modal for picking the video player executable.
//!
//! A path field on top, a directory browser below that only lists
//! sub-directories and executables. Tab switches between the two.

use std::io;
use std::path::{Path, PathBuf};

use kadse_core::platform;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use tracing::warn;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::help_overlay::centered_rect,
    theme::{
        style_focused_border, style_selected_focused, C_DIALOG_BG, C_MUTED, C_PRIMARY, C_READY,
        C_SECONDARY,
    },
    widgets::{
        scrollable_list::ScrollableList,
        text_input::{InputAction, TextInput},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Sub-directories and executables in `dir`, directories first, both sorted
/// by name. Dot entries are skipped.
pub fn read_dir_entries(dir: &Path) -> io::Result<Vec<BrowserEntry>> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            dirs.push(BrowserEntry {
                name,
                path,
                is_dir: true,
            });
        } else if platform::is_executable(&path) {
            files.push(BrowserEntry {
                name,
                path,
                is_dir: false,
            });
        }
    }
    dirs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    dirs.extend(files);
    Ok(dirs)
}

pub struct SettingsDialog {
    pub visible: bool,
    input: TextInput,
    in_input: bool,
    dir: PathBuf,
    entries: ScrollableList<BrowserEntry>,
    list_state: ListState,
    error: Option<String>,
}

impl SettingsDialog {
    pub fn new() -> Self {
        Self {
            visible: false,
            input: TextInput::new(" ", "path to video player"),
            in_input: false,
            dir: PathBuf::from("/"),
            entries: ScrollableList::new(|e: &BrowserEntry, q: &str| e.name.contains(q)),
            list_state: ListState::default(),
            error: None,
        }
    }

    /// Show the dialog, pre-filled with the stored player path.
    pub fn open(&mut self, player: Option<&Path>) {
        self.visible = true;
        self.in_input = false;
        match player {
            Some(p) => self.input.set_value(&p.to_string_lossy()),
            None => self.input.clear(),
        }
        let start = player
            .and_then(Path::parent)
            .filter(|p| p.is_dir())
            .map(Path::to_path_buf)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("/"));
        self.change_dir(start);
    }

    fn change_dir(&mut self, dir: PathBuf) {
        match read_dir_entries(&dir) {
            Ok(entries) => {
                self.entries.set_items(entries);
                self.entries.select_first();
                self.dir = dir;
                self.error = None;
            }
            Err(e) => {
                warn!("cannot list {}: {}", dir.display(), e);
                self.error = Some(format!("{}: {}", dir.display(), e));
            }
        }
    }

    fn go_up(&mut self) {
        if let Some(parent) = self.dir.parent().map(Path::to_path_buf) {
            self.change_dir(parent);
        }
    }

    fn accept(&mut self) -> Vec<Action> {
        let text = self.input.text().trim();
        let player = if text.is_empty() {
            None
        } else {
            Some(PathBuf::from(text))
        };
        self.visible = false;
        vec![Action::SetPlayerPath(player), Action::CloseDialog]
    }

    fn activate_selected(&mut self) {
        let Some(entry) = self.entries.selected_item().cloned() else {
            return;
        };
        if entry.is_dir {
            self.change_dir(entry.path);
        } else {
            self.input.set_value(&entry.path.to_string_lossy());
        }
    }
}

impl Component for SettingsDialog {
    fn id(&self) -> ComponentId {
        ComponentId::SettingsDialog
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.visible {
            return vec![];
        }
        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return self.accept();
        }
        if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
            self.in_input = !self.in_input;
            return vec![];
        }

        if self.in_input {
            return match self.input.handle_key(key) {
                InputAction::Confirmed(_) => self.accept(),
                InputAction::Cancelled => {
                    self.visible = false;
                    vec![Action::CloseDialog]
                }
                InputAction::Changed(_) | InputAction::Ignored => vec![],
            };
        }

        match key.code {
            KeyCode::Esc => {
                self.visible = false;
                return vec![Action::CloseDialog];
            }
            KeyCode::Up | KeyCode::Char('k') => self.entries.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.entries.select_down(1),
            KeyCode::PageUp => self.entries.select_up(10),
            KeyCode::PageDown => self.entries.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.entries.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.entries.select_last(),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => self.activate_selected(),
            KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => self.go_up(),
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, _state: &AppState) {
        if !self.visible {
            return;
        }
        let popup = centered_rect(70, area.height.saturating_sub(4).clamp(8, 24), area);
        frame.render_widget(Clear, popup);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style_focused_border())
            .title(Span::styled(
                " preferences · video player ",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(C_DIALOG_BG));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(inner);

        self.input.draw(frame, rows[0], self.in_input);

        let header = match &self.error {
            Some(err) => Span::styled(format!(" {}", err), Style::default().fg(C_MUTED)),
            None => Span::styled(
                format!(" {}", self.dir.display()),
                Style::default().fg(C_SECONDARY),
            ),
        };
        frame.render_widget(Paragraph::new(Line::from(header)), rows[1]);

        let list_area = rows[2];
        let content_h = list_area.height as usize;
        if self.entries.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  no directories or executables here",
                    Style::default().fg(C_MUTED),
                )),
                list_area,
            );
        } else {
            self.entries.ensure_visible(content_h);
            let sel_in_view = self.entries.selected_in_view(content_h);
            let browsing = !self.in_input;
            let items: Vec<ListItem> = self
                .entries
                .visible_items(content_h)
                .into_iter()
                .enumerate()
                .map(|(view_row, (_, entry))| {
                    let (label, color) = if entry.is_dir {
                        (format!("  {}/", entry.name), C_SECONDARY)
                    } else {
                        (format!("  {}", entry.name), C_READY)
                    };
                    let style = if browsing && view_row == sel_in_view {
                        style_selected_focused()
                    } else {
                        Style::default().fg(color)
                    };
                    ListItem::new(Line::from(Span::styled(label, style)))
                })
                .collect();
            let list = List::new(items)
                .highlight_style(Style::default())
                .highlight_symbol("");
            self.list_state.select(Some(sel_in_view));
            frame.render_stateful_widget(list, list_area, &mut self.list_state);
        }

        frame.render_widget(
            Paragraph::new(Span::styled(
                " Tab field/browser  Enter open/pick  Backspace up  Ctrl+S accept  Esc cancel",
                Style::default().fg(C_MUTED),
            )),
            rows[3],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        std::fs::write(path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_browser_lists_dirs_then_executables() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("bin")).unwrap();
        std::fs::create_dir(dir.path().join(".hidden")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        make_executable(&dir.path().join("mpv"));

        let entries = read_dir_entries(dir.path()).unwrap();
        let names: Vec<(&str, bool)> = entries.iter().map(|e| (e.name.as_str(), e.is_dir)).collect();
        assert_eq!(names, vec![("bin", true), ("mpv", false)]);
    }

    #[cfg(unix)]
    #[test]
    fn test_picking_a_file_fills_the_field() {
        let dir = tempfile::tempdir().unwrap();
        make_executable(&dir.path().join("vlc"));

        let mut dialog = SettingsDialog::new();
        dialog.open(None);
        dialog.change_dir(dir.path().to_path_buf());
        dialog.activate_selected();
        assert_eq!(dialog.input.text(), dir.path().join("vlc").to_string_lossy());

        let actions = dialog.accept();
        assert_eq!(
            actions,
            vec![
                Action::SetPlayerPath(Some(dir.path().join("vlc"))),
                Action::CloseDialog
            ]
        );
        assert!(!dialog.visible);
    }

    #[test]
    fn test_empty_field_clears_the_player() {
        let mut dialog = SettingsDialog::new();
        dialog.open(Some(Path::new("/usr/bin/mpv")));
        dialog.input.clear();
        assert_eq!(dialog.accept()[0], Action::SetPlayerPath(None));
    }
}
