//! flowchat CLI library
//!
//! Chat state, relay client and the terminal front ends (ratatui TUI and a
//! headless one-shot mode).

pub mod app;
pub mod headless;
pub mod relay;
pub mod tui;
pub mod ui;
