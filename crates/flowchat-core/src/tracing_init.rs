//! Shared tracing/logging initialization.
//!
//! The relay logs to stdout; the chat client logs to stderr so the terminal
//! UI and headless replies on stdout stay clean.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    Stderr,
}

/// Initialise the global tracing subscriber.
///
/// * `default_filter` -- default `RUST_LOG` value when the env-var is not set
///   (e.g. `"flowchat_relay=info"`).
/// * `log_json` -- when `true`, emit structured JSON log lines instead of the
///   human-readable format.
/// * `target` -- output stream for log lines.
pub fn init_tracing(default_filter: &str, log_json: bool, target: LogTarget) {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );
    let registry = tracing_subscriber::registry().with(env_filter);
    match (log_json, target) {
        (true, LogTarget::Stdout) => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        (true, LogTarget::Stderr) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        (false, LogTarget::Stdout) => registry.with(tracing_subscriber::fmt::layer()).init(),
        (false, LogTarget::Stderr) => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
