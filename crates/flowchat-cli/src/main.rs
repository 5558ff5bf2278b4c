//! flowchat CLI
//!
//! Terminal chat window for a flowchat relay, with a headless one-shot mode.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use flowchat_cli::app::ChatSession;
use flowchat_cli::relay::RelayClient;
use flowchat_cli::{headless, tui};
use flowchat_core::HistoryStore;
use flowchat_core::config::load_config;
use flowchat_core::tracing_init::{LogTarget, init_tracing};

#[derive(Parser, Debug)]
#[command(name = "flowchat")]
#[command(version, about = "Chat with a hosted analytics flow through a flowchat relay", long_about = None)]
struct Cli {
    /// Query to send (enables headless mode)
    #[arg(short, long)]
    prompt: Option<String>,

    /// Settings file (defaults to ~/.config/flowchat/settings.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Relay base URL (overrides settings and FLOWCHAT_RELAY_URL)
    #[arg(long)]
    relay_url: Option<String>,

    /// Flow to query (overrides settings and LANGFLOW_FLOW_ID)
    #[arg(long)]
    flow_id: Option<String>,

    /// Langflow instance hosting the flow (overrides settings and LANGFLOW_ID)
    #[arg(long)]
    langflow_id: Option<String>,

    /// Conversation file (defaults to the user data directory)
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Do not load or save the conversation
    #[arg(long, conflicts_with = "history_file")]
    no_history: bool,

    /// Output logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // Logs go to stderr so they never mix with the TUI or the headless reply.
    let default_filter = if cli.prompt.is_some() {
        "flowchat_cli=info"
    } else {
        "flowchat_cli=warn"
    };
    init_tracing(default_filter, cli.log_json, LogTarget::Stderr);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(relay_url) = cli.relay_url {
        config.client.relay_url = relay_url;
    }
    if let Some(flow_id) = cli.flow_id {
        config.flow.flow_id = flow_id;
    }
    if let Some(langflow_id) = cli.langflow_id {
        config.flow.langflow_id = langflow_id;
    }
    config
        .flow
        .validate()
        .context("flow is not configured (LANGFLOW_FLOW_ID, LANGFLOW_ID)")?;

    let store = if cli.no_history {
        None
    } else {
        cli.history_file
            .or(config.client.history_path)
            .or_else(HistoryStore::default_path)
            .map(HistoryStore::new)
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        relay = %config.client.relay_url,
        history = ?store.as_ref().map(HistoryStore::path),
        "Starting flowchat"
    );

    let client = RelayClient::new(&config.client.relay_url)?;
    let mut session = ChatSession::new(config.flow, store);

    if let Some(prompt) = cli.prompt {
        headless::run(&mut session, &client, &prompt).await?;
    } else {
        tui::run(session, client).await?;
    }
    Ok(())
}
