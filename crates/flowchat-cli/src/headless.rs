//! Headless (non-interactive) mode.
//!
//! Sends one query through the relay and prints the formatted reply to stdout.

use std::io::Write;

use tracing::info;

use crate::app::{ChatSession, SubmitOutcome};
use crate::relay::RelayClient;

/// Run one query and print the assistant's reply.
pub async fn run(
    session: &mut ChatSession,
    client: &RelayClient,
    prompt: &str,
) -> Result<(), HeadlessError> {
    session.input = prompt.to_string();
    session.cursor_pos = session.input.len();

    info!(relay = client.endpoint(), "Headless query started");
    let outcome = session.submit(client).await;

    let reply = session
        .messages()
        .last()
        .map(|m| m.content.clone())
        .unwrap_or_default();
    match outcome {
        None => Err(HeadlessError::EmptyPrompt),
        Some(SubmitOutcome::Failed) => Err(HeadlessError::Failed(session.status.clone())),
        Some(SubmitOutcome::Answered) => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{reply}")?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// Headless mode errors.
#[derive(Debug, thiserror::Error)]
pub enum HeadlessError {
    #[error("Please enter a valid query.")]
    EmptyPrompt,

    #[error("An error occurred while processing your query. ({0})")]
    Failed(String),

    #[error("Failed to write reply: {0}")]
    Output(#[from] std::io::Error),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::app::{ChatSettings, EMPTY_INPUT};

    #[tokio::test]
    async fn blank_prompt_makes_no_request() {
        // Nothing listens here; a request would fail with Failed, not EmptyPrompt.
        let client = RelayClient::new("http://127.0.0.1:9").unwrap();
        let mut session = ChatSession::new(ChatSettings::default(), None);

        let err = run(&mut session, &client, "  ").await.unwrap_err();
        assert!(matches!(err, HeadlessError::EmptyPrompt));
        assert_eq!(session.messages().last().unwrap().content, EMPTY_INPUT);
    }
}
