//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling per input mode
//! - `render` - Layout, category tabs, input bars and overlays
//! - `articles` - Article card panel
//! - `admin` - Source lookup and import panes
//! - `help` - Keybinding overlay
//! - `status` - Status bar widget

mod admin;
mod articles;
mod help;
mod input;
mod loop_runner;
mod render;
mod status;

pub use loop_runner::{run, Action};
