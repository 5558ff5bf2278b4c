//! Persistent chat history.
//!
//! The whole message list is stored as one JSON array and rewritten on every
//! change. There is no schema version and no merge with what is on disk.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::message::Message;

/// File name of the stored conversation.
pub const HISTORY_FILE: &str = "chatMessages.json";

/// File-backed store for the conversation.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<data dir>/flowchat/chatMessages.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("flowchat").join(HISTORY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved conversation. Returns `None` when nothing was saved yet.
    pub fn load(&self) -> Result<Option<Vec<Message>>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::History(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };
        serde_json::from_str(&content).map(Some).map_err(|e| {
            Error::History(format!("Failed to parse {}: {e}", self.path.display()))
        })
    }

    /// Overwrite the stored conversation with `messages`.
    pub fn save(&self, messages: &[Message]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(messages)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
