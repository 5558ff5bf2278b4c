//! `flowchat` Core Library
//!
//! Shared functionality for `flowchat` components:
//! - Chat message model and relay wire types
//! - Typed decoding of flow-run responses
//! - Reply post-processing for display
//! - Chat history persistence
//! - Configuration resolution and hierarchy
//! - Common error types

pub mod config;
pub mod error;
pub mod format;
pub mod history;
pub mod message;
pub mod reply;
pub mod tracing_init;
pub mod wire;

pub use config::Config;
pub use error::{Error, Result};
pub use format::format_reply;
pub use history::HistoryStore;
pub use message::{Message, Role};
pub use wire::{FlowRunRequest, RelayEnvelope, RelayRequest};
