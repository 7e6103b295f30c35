pub mod help_overlay;
pub mod log_panel;
pub mod quality_list;
pub mod settings_dialog;
pub mod streams_dialog;
pub mod url_bar;
