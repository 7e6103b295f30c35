//! Everything behind the kadse UI: stores, the quality-output parser, the
//! external process runner and the controller state machine.

pub mod config;
pub mod controller;
pub mod error;
pub mod log_buffer;
pub mod platform;
pub mod process;
pub mod quality;
pub mod settings;
pub mod streams;

pub use error::{Error, Result};
