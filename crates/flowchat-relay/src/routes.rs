use std::fmt::Write;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

use flowchat_core::config::FlowConfig;
use flowchat_core::{RelayEnvelope, RelayRequest};

use crate::flow::{FlowError, LangflowClient, StreamEvent, StreamSubscription};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub client: LangflowClient,
    /// Request streamed runs and follow their event stream.
    pub stream: bool,
    /// Flow the browser chat page is wired to.
    pub flow: FlowConfig,
}

const CHAT_HTML: &str = include_str!("assets/chat.html");

/// Build the relay router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/chat", get(chat_page))
        .route("/health", get(health))
        .route("/api/rag", post(rag))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `POST /api/rag`: run the flow and wrap the outcome in an envelope.
///
/// Every failure, including an unparseable body, becomes a 500 envelope.
pub async fn rag(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<RelayEnvelope>) {
    match relay(&state, &body).await {
        Ok(data) => (StatusCode::OK, Json(RelayEnvelope::success(data))),
        Err(e) => {
            error!(error = %e, "Relay request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RelayEnvelope::failure(e.to_string())),
            )
        }
    }
}

async fn relay(state: &AppState, body: &[u8]) -> Result<Value, FlowError> {
    let request: RelayRequest =
        serde_json::from_slice(body).map_err(FlowError::InvalidRequest)?;
    info!(
        flow_id = %request.flow_id,
        input_len = request.input_value.len(),
        "Relaying query"
    );
    let run = state.client.run_flow(&request, state.stream).await?;
    if let Some(subscription) = run.subscription {
        tokio::spawn(drain_stream(subscription));
    }
    Ok(run.response)
}

/// Log a run stream until it ends.
async fn drain_stream(mut subscription: StreamSubscription) {
    while let Some(event) = subscription.next_event().await {
        match event {
            StreamEvent::Connected => info!("Run stream connected"),
            StreamEvent::Message(data) => debug!(data = %data, "Run stream update"),
            StreamEvent::Closed(reason) => {
                info!(reason = %reason, "Run stream closed");
                break;
            }
            StreamEvent::Failed(reason) => {
                warn!(reason = %reason, "Run stream failed");
                break;
            }
        }
    }
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /chat`: browser chat window wired to the configured flow.
pub async fn chat_page(State(state): State<AppState>) -> Html<String> {
    Html(render_chat_page(&state.flow))
}

/// Encode a value as a JSON literal that is safe inside a `<script>` block.
fn script_literal(value: &Value) -> String {
    value.to_string().replace('<', "\\u003c")
}

fn render_chat_page(flow: &FlowConfig) -> String {
    // LANGFLOW_ID_PLACEHOLDER contains FLOW_ID_PLACEHOLDER; replace it first.
    CHAT_HTML
        .replace(
            "LANGFLOW_ID_PLACEHOLDER",
            &script_literal(&json!(flow.langflow_id)),
        )
        .replace("FLOW_ID_PLACEHOLDER", &script_literal(&json!(flow.flow_id)))
        .replace("INPUT_TYPE_PLACEHOLDER", &script_literal(&json!(flow.input_type)))
        .replace(
            "OUTPUT_TYPE_PLACEHOLDER",
            &script_literal(&json!(flow.output_type)),
        )
        .replace("TWEAKS_PLACEHOLDER", &script_literal(&Value::Object(flow.tweaks.clone())))
}

/// `GET /`: landing page.
pub async fn landing() -> Html<String> {
    Html(landing_page())
}

const FEATURES: &[(&str, &str)] = &[
    (
        "Data Storage",
        "Your social media engagement data lives in a managed document store behind the flow.",
    ),
    (
        "Workflow Creation",
        "Analytics workflows are built and hosted as flows, so the logic can change without redeploying this server.",
    ),
    (
        "GPT-Powered Insights",
        "Ask questions in plain language and get human-readable answers about post performance.",
    ),
];

const STEPS: &[(&str, &str)] = &[
    (
        "1. Fetch Engagement Data",
        "Store your social media engagement data in the document store the flow reads from.",
    ),
    (
        "2. Analyze Post Performance",
        "The flow calculates average engagement metrics for each post type.",
    ),
    (
        "3. Provide Insights",
        "GPT turns those metrics into actionable insights about your content.",
    ),
];

/// Render `(title, body)` pairs as cards with the given class.
fn cards(items: &[(&str, &str)], class: &str) -> String {
    let mut cards = String::new();
    for (title, body) in items {
        let _ = write!(
            cards,
            r#"<div class="{class}">
  <h3>{title}</h3>
  <p>{body}</p>
</div>"#
        );
    }
    cards
}

/// Generate a styled HTML landing page.
fn landing_page() -> String {
    let features = cards(FEATURES, "card");
    let steps = cards(STEPS, "step");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Social Media Analytics</title>
<style>
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
         color: #1f2933; background: #f5f7fa; line-height: 1.6; }}
  .container {{ max-width: 960px; margin: 0 auto; padding: 2rem 1rem; }}
  .hero {{ text-align: center; padding: 4rem 0 3rem; }}
  h1 {{ font-size: 2.5rem; margin-bottom: 0.75rem; }}
  h2 {{ font-size: 1.6rem; margin: 2rem 0 1rem; text-align: center; }}
  h3 {{ font-size: 1.1rem; margin-bottom: 0.5rem; }}
  p {{ color: #52606d; }}
  .cta {{ display: inline-block; margin-top: 1.5rem; padding: 0.6rem 1.4rem; border-radius: 6px;
          background: #111827; color: #fff; text-decoration: none; }}
  .grid {{ display: grid; gap: 1rem; grid-template-columns: repeat(auto-fit, minmax(240px, 1fr)); }}
  .card {{ background: #fff; border: 1px solid #e4e7eb; border-radius: 8px; padding: 1.25rem; }}
  .step {{ text-align: center; padding: 1.25rem; }}
</style>
</head>
<body>
<div class="container">
  <div class="hero">
    <h1>Social Media Analytics Made Simple</h1>
    <p>Ask an AI assistant about your social media engagement data.</p>
    <a class="cta" href="/chat">Get Started</a>
  </div>

  <h2>Key Features</h2>
  <div class="grid">
    {features}
  </div>

  <h2>How It Works</h2>
  <div class="grid">
    {steps}
  </div>
</div>
</body>
</html>"#
    )
}
