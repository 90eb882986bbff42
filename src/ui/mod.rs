//! UI module: the view boundary, its terminal implementation and the
//! controller driving both.
//!
//! Threading model:
//! - UI loop thread: key handling, drawing, every state mutation
//! - `rayon::spawn`: blocking calls to the translation service
//! - `std::sync::mpsc`: results from worker threads back to the UI loop

pub mod commands;
pub mod handlers;
mod state_helpers;
pub mod terminal;
pub mod view;

pub use handlers::{Controller, Flow, Message};
pub use terminal::{TerminalGuard, TerminalView};
