pub mod pane_chrome;
pub mod scrollable_list;
pub mod status_bar;
pub mod text_input;
pub mod toast;
