//! Chat session state: the conversation, the pending query and terminal
//! bookkeeping (cursor, input history, scrolling).

use std::collections::VecDeque;

use tracing::{error, warn};

use flowchat_core::config::FlowConfig;
use flowchat_core::{HistoryStore, Message, RelayEnvelope, RelayRequest, format_reply, reply};

use crate::relay::{RelayClient, RelayClientError, envelope_data};

/// Flow parameters sent with every query.
pub type ChatSettings = FlowConfig;

pub const GREETING: &str = "Hello! I'm your AI analytics assistant. How can I help you analyze your social media data today?";
pub const EMPTY_INPUT: &str = "Please enter a valid query.";
pub const GENERIC_ERROR: &str = "An error occurred while processing your query.";

const INPUT_HISTORY_CAP: usize = 100;

/// How a dispatched query ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The reply was appended.
    Answered,
    /// The generic error message was appended.
    Failed,
}

/// State of one chat window.
pub struct ChatSession {
    pub input: String,
    /// Byte offset into `input`, always on a char boundary.
    pub cursor_pos: usize,
    messages: Vec<Message>,
    pub is_loading: bool,
    pub settings: ChatSettings,
    store: Option<HistoryStore>,
    pub input_history: VecDeque<String>,
    pub history_index: Option<usize>,
    /// Manual scroll offset from the bottom (0 = pinned to bottom).
    pub scroll_offset: u16,
    pub scroll_pinned: bool,
    /// Height of the message viewport (set each frame by the renderer).
    pub viewport_height: u16,
    /// Total line count of rendered messages (set each frame by the renderer).
    pub total_lines: u16,
    pub should_quit: bool,
    pub status: String,
}

impl ChatSession {
    /// Start a session with the greeting, or with the saved conversation
    /// when `store` holds one. The resulting list is written back to `store`.
    pub fn new(settings: ChatSettings, store: Option<HistoryStore>) -> Self {
        let saved = store.as_ref().and_then(|s| match s.load() {
            Ok(saved) => saved,
            Err(e) => {
                warn!(path = %s.path().display(), error = %e, "Ignoring saved messages");
                None
            }
        });
        let mut session = Self {
            input: String::new(),
            cursor_pos: 0,
            messages: saved.unwrap_or_else(|| vec![Message::assistant(GREETING)]),
            is_loading: false,
            settings,
            store,
            input_history: VecDeque::with_capacity(INPUT_HISTORY_CAP),
            history_index: None,
            scroll_offset: 0,
            scroll_pinned: true,
            viewport_height: 0,
            total_lines: 0,
            should_quit: false,
            status: "Ready".to_string(),
        };
        session.persist();
        session
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub(crate) fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.persist();
        self.scroll_to_bottom();
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save(&self.messages) {
            warn!(path = %store.path().display(), error = %e, "Failed to save messages");
        }
    }

    /// Take the current input as a query.
    ///
    /// Blank input gets a prompt from the assistant and no request. While a
    /// query is in flight nothing changes.
    pub fn begin_submit(&mut self) -> Option<RelayRequest> {
        if self.input.trim().is_empty() {
            self.push_message(Message::assistant(EMPTY_INPUT));
            return None;
        }
        if self.is_loading {
            return None;
        }

        let text = std::mem::take(&mut self.input);
        self.cursor_pos = 0;
        self.history_index = None;
        self.input_history.push_front(text.clone());
        self.input_history.truncate(INPUT_HISTORY_CAP);

        self.push_message(Message::user(text.clone()));
        self.is_loading = true;
        self.status = "Waiting for reply...".to_string();

        Some(RelayRequest {
            flow_id: self.settings.flow_id.clone(),
            langflow_id: self.settings.langflow_id.clone(),
            input_value: text,
            input_type: self.settings.input_type.clone(),
            output_type: self.settings.output_type.clone(),
            tweaks: self.settings.tweaks.clone(),
        })
    }

    /// Record the relay's answer to the query started by [`Self::begin_submit`].
    pub fn finish_submit(
        &mut self,
        result: Result<RelayEnvelope, RelayClientError>,
    ) -> SubmitOutcome {
        self.is_loading = false;
        match result.and_then(decode_reply) {
            Ok(text) => {
                self.push_message(Message::assistant(format_reply(&text)));
                self.status = "Ready".to_string();
                SubmitOutcome::Answered
            }
            Err(e) => {
                error!(error = %e, "Error fetching response");
                self.push_message(Message::assistant(GENERIC_ERROR));
                self.status = format!("Error: {e}");
                SubmitOutcome::Failed
            }
        }
    }

    /// Send the current input through `client` and wait for the answer.
    /// Returns `None` when no request was made.
    pub async fn submit(&mut self, client: &RelayClient) -> Option<SubmitOutcome> {
        let request = self.begin_submit()?;
        let result = client.send(&request).await;
        Some(self.finish_submit(result))
    }

    // -- Input editing --

    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor_pos, c);
        self.cursor_pos += c.len_utf8();
    }

    pub fn delete_before_cursor(&mut self) {
        let prev = self.input[..self.cursor_pos].chars().next_back();
        if let Some(c) = prev {
            self.cursor_pos -= c.len_utf8();
            self.input.remove(self.cursor_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        let prev = self.input[..self.cursor_pos].chars().next_back();
        if let Some(c) = prev {
            self.cursor_pos -= c.len_utf8();
        }
    }

    pub fn cursor_right(&mut self) {
        let next = self.input[self.cursor_pos..].chars().next();
        if let Some(c) = next {
            self.cursor_pos += c.len_utf8();
        }
    }

    /// Navigate input history (up).
    pub fn history_up(&mut self) {
        if self.input_history.is_empty() {
            return;
        }
        let idx = match self.history_index {
            None => 0,
            Some(i) => (i + 1).min(self.input_history.len() - 1),
        };
        self.history_index = Some(idx);
        self.input.clone_from(&self.input_history[idx]);
        self.cursor_pos = self.input.len();
    }

    /// Navigate input history (down).
    pub fn history_down(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                self.history_index = None;
                self.input.clear();
                self.cursor_pos = 0;
            }
            Some(i) => {
                let idx = i - 1;
                self.history_index = Some(idx);
                self.input.clone_from(&self.input_history[idx]);
                self.cursor_pos = self.input.len();
            }
        }
    }

    // -- Scrolling --

    /// Scroll up by `n` lines.
    pub fn scroll_up(&mut self, n: u16) {
        let max_scroll = self.total_lines.saturating_sub(self.viewport_height);
        self.scroll_offset = self.scroll_offset.saturating_add(n).min(max_scroll);
        if self.scroll_offset > 0 {
            self.scroll_pinned = false;
        }
    }

    /// Scroll down by `n` lines.
    pub fn scroll_down(&mut self, n: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
        if self.scroll_offset == 0 {
            self.scroll_pinned = true;
        }
    }

    /// Snap scroll to the most recent messages.
    pub const fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
        self.scroll_pinned = true;
    }
}

fn decode_reply(envelope: RelayEnvelope) -> Result<String, RelayClientError> {
    let data = envelope_data(envelope)?;
    Ok(reply::reply_text(&data)?)
}
