//! AppState — shared read-only data passed to all components during render/event.
//!
//! Components read this for controller state, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use kadse_core::controller::Controller;

use crate::widgets::status_bar::InputMode;

pub struct AppState {
    pub controller: Controller,
    pub input_mode: InputMode,
}

impl AppState {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            input_mode: InputMode::Normal,
        }
    }
}
