//! App — component-based event loop.
//!
//! - `App` owns all components, the process runner and `AppState`.
//! - Terminal events arrive on an mpsc channel fed by a blocking reader task;
//!   process output arrives on the runner's event channel.
//! - Components return `Vec<Action>`; App dispatches each Action, which
//!   drives the controller and hands its effects to the runner.

use std::io;
use std::time::Duration;

use kadse_core::controller::{
    Phase, MSG_NO_CHANGES, MSG_NO_PLAYER, MSG_SAVED, MSG_SCANNING,
};
use kadse_core::process::{ProcessEvent, ProcessRunner};
use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{
        help_overlay::HelpOverlay, log_panel::LogPanel, quality_list::QualityList,
        settings_dialog::SettingsDialog, streams_dialog::StreamsDialog, url_bar::UrlBar,
    },
    focus::FocusRing,
    theme::{C_ACCENT, C_BG, C_SECONDARY},
    widgets::{
        status_bar::{self, InputMode},
        toast::{Severity, ToastManager},
    },
};

/// Last-drawn layout rects, for mouse hit-testing.
#[derive(Default, Clone)]
struct PaneAreas {
    url_bar: Rect,
    quality_list: Rect,
    log_panel: Rect,
}

pub struct App {
    pub state: AppState,
    runner: ProcessRunner,

    url_bar: UrlBar,
    quality_list: QualityList,
    log_panel: LogPanel,
    help_overlay: HelpOverlay,
    settings_dialog: SettingsDialog,
    streams_dialog: StreamsDialog,

    focus: FocusRing,
    toast: ToastManager,
    pane_areas: PaneAreas,
    /// Status text already surfaced as a toast.
    last_status: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(state: AppState, runner: ProcessRunner) -> Self {
        Self {
            state,
            runner,
            url_bar: UrlBar::new(),
            quality_list: QualityList::new(),
            log_panel: LogPanel::new(),
            help_overlay: HelpOverlay::new(),
            settings_dialog: SettingsDialog::new(),
            streams_dialog: StreamsDialog::new(),
            focus: FocusRing::new(vec![
                ComponentId::UrlBar,
                ComponentId::QualityList,
                ComponentId::LogPanel,
            ]),
            toast: ToastManager::new(),
            pane_areas: PaneAreas::default(),
            last_status: None,
            should_quit: false,
        }
    }

    pub async fn run(mut self, mut process_rx: mpsc::Receiver<ProcessEvent>) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let tool = self.runner.tool().name();
        self.state
            .controller
            .push_log(format!("kadse started, using {}", tool));
        if self.state.controller.player_path().is_none() {
            self.toast
                .push("No video player selected! Press F2 to pick one.", Severity::Warning);
        }
        self.sync_input_mode();

        // ── Background task: keyboard/mouse events ────────────────────────────
        let (event_tx, mut event_rx) = mpsc::channel::<Event>(256);
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(ev).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // Toast expiry + spinner animation
        let mut toast_tick = tokio::time::interval(Duration::from_millis(100));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(ev) = event_rx.recv() => {
                    needs_redraw = self.handle_event(ev);
                }

                Some(ev) = process_rx.recv() => {
                    const MAX_DRAIN: usize = 256;
                    self.state.controller.on_process_event(ev);
                    let mut drained = 0usize;
                    while drained < MAX_DRAIN {
                        match process_rx.try_recv() {
                            Ok(ev) => self.state.controller.on_process_event(ev),
                            Err(_) => break,
                        }
                        drained += 1;
                    }
                    self.sync_from_controller();
                    needs_redraw = true;
                }

                _ = toast_tick.tick() => {
                    if !self.toast.is_empty() {
                        self.toast.tick();
                        needs_redraw = true;
                    }
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        info!("shutting down");
        self.runner.shutdown();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        Ok(())
    }

    /// Returns whether the screen needs a redraw.
    fn handle_event(&mut self, ev: Event) -> bool {
        let actions = match ev {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(w, h) => vec![Action::Resize(w, h)],
            _ => return false,
        };
        for action in actions {
            self.dispatch(action);
        }
        self.sync_from_controller();
        true
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return vec![Action::Quit];
        }

        // Help overlay captures all keys when visible
        if self.help_overlay.visible {
            return self.help_overlay.handle_key(key, &self.state);
        }

        // Modal dialogs own the keyboard
        if self.settings_dialog.visible {
            return self.settings_dialog.handle_key(key, &self.state);
        }
        if self.streams_dialog.visible {
            return self.streams_dialog.handle_key(key, &self.state);
        }

        // Global keys, usable from the url bar too
        match key.code {
            KeyCode::F(1) => return vec![Action::ToggleHelp],
            KeyCode::F(2) => return vec![Action::OpenPreferences],
            KeyCode::F(3) => return vec![Action::OpenAllStreams],
            KeyCode::Char('o') if ctrl => return vec![Action::OpenPreferences],
            KeyCode::Char('l') if ctrl => return vec![Action::OpenAllStreams],
            KeyCode::Char('s') if ctrl => return vec![Action::SaveStreams],
            KeyCode::Char('a') if ctrl => return vec![Action::SaveUrl],
            KeyCode::Char('p') if ctrl => return vec![Action::Play],
            KeyCode::Tab => return vec![Action::FocusNext],
            KeyCode::BackTab => return vec![Action::FocusPrev],
            _ => {}
        }

        if self.state.input_mode == InputMode::Normal {
            match key.code {
                KeyCode::Char('q') => return vec![Action::Quit],
                KeyCode::Char('?') => return vec![Action::ToggleHelp],
                KeyCode::Char('1') => return vec![Action::FocusPane(ComponentId::UrlBar)],
                KeyCode::Char('2') => return vec![Action::FocusPane(ComponentId::QualityList)],
                KeyCode::Char('3') => return vec![Action::FocusPane(ComponentId::LogPanel)],
                _ => {}
            }
        }

        let s = &self.state;
        match self.focus.current() {
            Some(ComponentId::UrlBar) => self.url_bar.handle_key(key, s),
            Some(ComponentId::QualityList) => self.quality_list.handle_key(key, s),
            Some(ComponentId::LogPanel) => self.log_panel.handle_key(key, s),
            _ => vec![],
        }
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let is_click = matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        );
        if !is_click
            || self.help_overlay.visible
            || self.settings_dialog.visible
            || self.streams_dialog.visible
        {
            return vec![];
        }

        fn hit(r: Rect, col: u16, row: u16) -> bool {
            r.width > 0
                && r.height > 0
                && col >= r.x
                && col < r.x + r.width
                && row >= r.y
                && row < r.y + r.height
        }

        let (col, row) = (event.column, event.row);
        let areas = self.pane_areas.clone();
        let s = &self.state;

        let (id, mut actions) = if hit(areas.url_bar, col, row) {
            (self.url_bar.id(), self.url_bar.handle_mouse(event, areas.url_bar, s))
        } else if hit(areas.quality_list, col, row) {
            (
                self.quality_list.id(),
                self.quality_list.handle_mouse(event, areas.quality_list, s),
            )
        } else if hit(areas.log_panel, col, row) {
            (
                self.log_panel.id(),
                self.log_panel.handle_mouse(event, areas.log_panel, s),
            )
        } else {
            return vec![];
        };

        if matches!(event.kind, MouseEventKind::Down(_)) && !self.focus.is_focused(id) {
            actions.insert(0, Action::FocusPane(id));
        }
        actions
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.url_bar.on_action(&action, s));
            out.extend(self.quality_list.on_action(&action, s));
            out.extend(self.log_panel.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out.extend(self.settings_dialog.on_action(&action, s));
            out.extend(self.streams_dialog.on_action(&action, s));
            out
        };

        self.apply_action(action);

        for a in secondary {
            self.apply_action(a);
        }
    }

    fn apply_action(&mut self, action: Action) {
        match &action {
            Action::Resize(..) | Action::Noop => {}
            _ => debug!("apply_action: {:?}", action),
        }
        match action {
            // ── Main window ───────────────────────────────────────────────────
            Action::QueryQuality => {
                let url = self.url_bar.url().to_string();
                if let Some(effect) = self.state.controller.query_quality(&url) {
                    self.runner.execute(effect);
                }
            }
            Action::Play => {
                let Some(quality) = self.quality_list.selected_quality().map(str::to_string) else {
                    return;
                };
                let url = self.url_bar.url().to_string();
                self.reset_status();
                if let Some(effect) = self.state.controller.start_stream(&url, &quality) {
                    self.toast
                        .push(format!("Starting {} ({})", url.trim(), quality), Severity::Info);
                    self.runner.execute(effect);
                }
            }
            Action::SaveUrl => {
                let url = self.url_bar.url().to_string();
                self.reset_status();
                if let Err(e) = self.state.controller.save_url(&url) {
                    error!("saving url failed: {}", e);
                }
            }
            Action::SaveStreams => {
                self.reset_status();
                if let Err(e) = self.state.controller.save_streams() {
                    error!("saving streams failed: {}", e);
                }
            }

            // ── Streams dialog ────────────────────────────────────────────────
            Action::EditStream(index, url) => {
                self.reset_status();
                if let Err(e) = self.state.controller.edit_stream(index, &url) {
                    error!("editing stream {} failed: {}", index, e);
                }
            }
            Action::RemoveStream(index) => {
                self.reset_status();
                if let Err(e) = self.state.controller.remove_stream(index) {
                    error!("removing stream {} failed: {}", index, e);
                }
            }
            Action::UseStream(_) => {
                self.focus.set(ComponentId::QualityList);
            }

            // ── Settings ──────────────────────────────────────────────────────
            Action::SetPlayerPath(player) => {
                self.reset_status();
                if let Err(e) = self.state.controller.set_player_path(player) {
                    error!("saving settings failed: {}", e);
                }
            }

            // ── Navigation ────────────────────────────────────────────────────
            Action::FocusNext => {
                self.focus.next();
            }
            Action::FocusPrev => {
                self.focus.prev();
            }
            Action::FocusPane(id) => self.focus.set(id),

            // ── Dialogs ───────────────────────────────────────────────────────
            Action::OpenPreferences => {
                let player = self.state.controller.player_path().map(|p| p.to_path_buf());
                self.settings_dialog.open(player.as_deref());
            }
            Action::OpenAllStreams => {
                self.streams_dialog.open(self.state.controller.streams());
            }
            Action::CloseDialog | Action::ToggleHelp => {}

            // ── System ────────────────────────────────────────────────────────
            Action::Quit => self.should_quit = true,
            Action::Resize(..) | Action::Noop => {}
        }
        self.sync_input_mode();
    }

    /// Forget the surfaced status so the next one toasts even if identical.
    fn reset_status(&mut self) {
        self.state.controller.clear_status();
        self.last_status = None;
    }

    /// Pull controller changes into the components and the toast layer.
    fn sync_from_controller(&mut self) {
        let controller = &self.state.controller;
        self.quality_list.sync(controller.qualities());

        if controller.phase() == Phase::Scanning {
            if !self.toast.has_spinner() {
                self.toast.spinner(MSG_SCANNING);
            }
        } else if self.toast.has_spinner() {
            self.toast.dismiss_spinner();
        }

        let status = controller.status().map(str::to_string);
        if status != self.last_status {
            if let Some(msg) = status.as_deref() {
                if msg != MSG_SCANNING {
                    let severity = status_severity(controller.phase(), msg);
                    self.toast.push(msg, severity);
                }
            }
            self.last_status = status;
        }
    }

    fn sync_input_mode(&mut self) {
        self.state.input_mode = if self.settings_dialog.visible || self.streams_dialog.visible {
            InputMode::Dialog
        } else if self.focus.is_focused(ComponentId::UrlBar) && !self.help_overlay.visible {
            InputMode::Insert
        } else {
            InputMode::Normal
        };
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        self.draw_header(frame, outer[0]);

        let url_focused = self.focus.is_focused(ComponentId::UrlBar);
        self.url_bar.draw(frame, outer[1], url_focused, &self.state);
        self.pane_areas.url_bar = outer[1];

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(20)])
            .split(outer[2]);
        let quality_focused = self.focus.is_focused(ComponentId::QualityList);
        self.quality_list
            .draw(frame, body[0], quality_focused, &self.state);
        self.pane_areas.quality_list = body[0];
        let log_focused = self.focus.is_focused(ComponentId::LogPanel);
        self.log_panel.draw(frame, body[1], log_focused, &self.state);
        self.pane_areas.log_panel = body[1];

        status_bar::draw_separator(frame, outer[3]);
        let controller = &self.state.controller;
        status_bar::draw_status_line(
            frame,
            outer[4],
            controller.phase(),
            controller.status(),
            controller.log().last().map(|e| e.text.as_str()),
        );
        status_bar::draw_keys_bar(frame, outer[5], self.state.input_mode);

        // ── Overlays ──────────────────────────────────────────────────────────
        self.settings_dialog.draw(frame, area, true, &self.state);
        self.streams_dialog.draw(frame, area, true, &self.state);
        self.help_overlay.draw(frame, area, false, &self.state);

        self.toast.draw(frame, area);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let player = self
            .state
            .controller
            .player_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "no player".to_string());
        let line = Line::from(vec![
            Span::styled(
                " kadse ",
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("· {} · {}", self.state.controller.tool_name(), player),
                Style::default().fg(C_SECONDARY),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn status_severity(phase: Phase, msg: &str) -> Severity {
    match msg {
        MSG_SAVED => Severity::Success,
        MSG_NO_CHANGES | MSG_NO_PLAYER => Severity::Warning,
        _ if matches!(phase, Phase::NoPlugin | Phase::NoStream | Phase::StreamError) => {
            Severity::Error
        }
        m if m.starts_with("Save failed") || m.starts_with("Could not") => Severity::Error,
        _ => Severity::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_severity() {
        assert_eq!(status_severity(Phase::Idle, MSG_SAVED), Severity::Success);
        assert_eq!(status_severity(Phase::QualitiesReady, MSG_NO_PLAYER), Severity::Warning);
        assert_eq!(
            status_severity(Phase::NoPlugin, "Bad URL / no plugin for this host"),
            Severity::Error
        );
        assert_eq!(
            status_severity(Phase::Idle, "twitch.tv/a already saved"),
            Severity::Info
        );
    }
}
