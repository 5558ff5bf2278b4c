//! Flow service REST client.
//!
//! Uses reqwest to call the run endpoint of a hosted flow and, when asked
//! to, to follow the event stream the service advertises for the run.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use flowchat_core::{reply, FlowRunRequest, RelayRequest};

use super::stream::StreamSubscription;

/// Flow client errors.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the flow service, with its response body.
    #[error("{status} {reason} - {body}")]
    Api {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("Invalid JSON in flow response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid request body: {0}")]
    InvalidRequest(serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Configuration for connecting to the flow service.
#[derive(Debug, Clone)]
pub struct FlowClientConfig {
    /// Service URL (e.g., "<https://api.langflow.astra.datastax.com>").
    pub base_url: String,
    /// Application token, sent as a bearer credential.
    pub application_token: String,
}

/// Result of starting a run.
#[derive(Debug)]
pub struct FlowRun {
    /// Raw response of the run endpoint.
    pub response: Value,
    /// Live event stream, when streaming was requested and advertised.
    pub subscription: Option<StreamSubscription>,
}

/// Client for the flow service's run API.
#[derive(Debug, Clone)]
pub struct LangflowClient {
    http: reqwest::Client,
    base_url: String,
}

impl LangflowClient {
    /// Create a new flow client.
    pub fn new(config: &FlowClientConfig) -> Result<Self, FlowError> {
        if config.base_url.is_empty() {
            return Err(FlowError::Config("base_url is empty".into()));
        }
        if config.application_token.is_empty() {
            return Err(FlowError::Config("application_token is empty".into()));
        }

        let mut headers = HeaderMap::new();
        let token_val = HeaderValue::from_str(&format!("Bearer {}", config.application_token))
            .map_err(|_| FlowError::Config("Invalid token format".into()))?;
        headers.insert(AUTHORIZATION, token_val);

        // reqwest is built with rustls-no-provider; Err means one is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    /// Absolute URL for a service path.
    pub(crate) fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Run endpoint path for a flow.
    pub(crate) fn run_endpoint(flow_id: &str, langflow_id: &str, stream: bool) -> String {
        format!("/lf/{langflow_id}/api/v1/run/{flow_id}?stream={stream}")
    }

    /// POST a JSON body and parse the JSON response.
    pub async fn post<B: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Value, FlowError> {
        let result = self.post_inner(endpoint, body).await;
        if let Err(ref e) = result {
            error!(endpoint, error = %e, "Flow request failed");
        }
        result
    }

    async fn post_inner<B: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Value, FlowError> {
        let resp = self.http.post(self.url(endpoint)).json(body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            // Compact the body when it is JSON so the message stays on one line.
            let body = serde_json::from_str::<Value>(&text)
                .map_or(text, |v| v.to_string());
            return Err(FlowError::Api {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").into(),
                body,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Start a run of `request.flow_id`.
    pub async fn initiate_session(
        &self,
        request: &RelayRequest,
        stream: bool,
    ) -> Result<Value, FlowError> {
        let endpoint = Self::run_endpoint(&request.flow_id, &request.langflow_id, stream);
        self.post(&endpoint, &FlowRunRequest::from(request)).await
    }

    /// Run a flow, following its event stream when `stream` is set and the
    /// service returned a stream URL.
    pub async fn run_flow(&self, request: &RelayRequest, stream: bool) -> Result<FlowRun, FlowError> {
        let response = self.initiate_session(request, stream).await?;
        debug!(flow_id = %request.flow_id, response = %response, "Run started");

        let subscription = if stream {
            reply::stream_url(&response).map(|url| {
                let url = self.resolve(&url);
                info!(url = %url, "Following run stream");
                StreamSubscription::open(self.http.clone(), url)
            })
        } else {
            None
        };

        Ok(FlowRun {
            response,
            subscription,
        })
    }

    /// Stream URLs may be relative to the service.
    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            self.url(url)
        }
    }
}
