//! flowchat relay server
//!
//! Authenticates chat queries and forwards them to a hosted flow.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use flowchat_core::config::load_config;
use flowchat_core::tracing_init::{LogTarget, init_tracing};
use flowchat_relay::flow::{FlowClientConfig, LangflowClient};
use flowchat_relay::routes::{AppState, build_router};

#[derive(Parser, Debug)]
#[command(name = "flowchat-relay")]
#[command(version, about = "flowchat relay server - forwards chat queries to a hosted flow")]
struct Args {
    /// Listen address
    #[arg(long, default_value = "0.0.0.0:3000", env = "LISTEN_ADDR")]
    addr: SocketAddr,

    /// Settings file (defaults to ~/.config/flowchat/settings.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Flow service base URL (overrides settings and LANGFLOW_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Request streamed runs and follow their event stream.
    #[arg(long)]
    stream: bool,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("flowchat_relay=info", args.log_json, LogTarget::Stdout);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        config.service.base_url = Some(base_url);
    }
    if args.stream {
        config.service.stream = true;
    }

    let client = LangflowClient::new(&FlowClientConfig {
        base_url: config
            .service
            .base_url
            .clone()
            .context("flow service base URL is not configured (LANGFLOW_BASE_URL)")?,
        application_token: config
            .service
            .application_token
            .clone()
            .context("application token is not configured (LANGFLOW_APPLICATION_TOKEN)")?,
    })?;

    if let Err(e) = config.flow.validate() {
        warn!(error = %e, "Browser chat page has no flow configured");
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %args.addr,
        stream = config.service.stream,
        "Starting flowchat-relay"
    );

    let app = build_router(AppState {
        client,
        stream: config.service.stream,
        flow: config.flow,
    });
    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("flowchat-relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
