//! Chat application state.

mod state;

pub use state::{
    ChatSession, ChatSettings, EMPTY_INPUT, GENERIC_ERROR, GREETING, SubmitOutcome,
};
