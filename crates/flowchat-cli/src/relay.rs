//! HTTP client for the relay's `POST /api/rag`.

use serde_json::Value;
use thiserror::Error;

use flowchat_core::{RelayEnvelope, RelayRequest};

/// Relay client errors.
#[derive(Debug, Error)]
pub enum RelayClientError {
    #[error("Request to relay failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// The relay answered with a failure envelope.
    #[error("{0}")]
    Rejected(String),

    /// The success envelope did not contain a usable reply.
    #[error(transparent)]
    Reply(#[from] flowchat_core::Error),
}

/// Client for a flowchat relay.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RelayClient {
    /// Create a client for the relay at `relay_url`.
    pub fn new(relay_url: &str) -> Result<Self, RelayClientError> {
        // reqwest is built with rustls-no-provider; Err means one is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/api/rag", relay_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one query and return the relay's envelope.
    pub async fn send(&self, request: &RelayRequest) -> Result<RelayEnvelope, RelayClientError> {
        let resp = self.http.post(&self.endpoint).json(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RelayClientError::Status(status.as_u16()));
        }
        Ok(resp.json().await?)
    }
}

/// Unwrap a success envelope into its flow response.
pub fn envelope_data(envelope: RelayEnvelope) -> Result<Value, RelayClientError> {
    if !envelope.success {
        return Err(RelayClientError::Rejected(
            envelope
                .error
                .unwrap_or_else(|| "Unknown error from /api/rag".to_string()),
        ));
    }
    Ok(envelope.data.unwrap_or(Value::Null))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = RelayClient::new("http://127.0.0.1:3000/").unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:3000/api/rag");
    }

    #[test]
    fn failure_envelope_uses_its_error() {
        let err = envelope_data(RelayEnvelope::failure("500 Internal Server Error - {}")).unwrap_err();
        assert_eq!(err.to_string(), "500 Internal Server Error - {}");
    }

    #[test]
    fn failure_envelope_without_error_gets_default() {
        let env = RelayEnvelope {
            success: false,
            data: None,
            error: None,
        };
        let err = envelope_data(env).unwrap_err();
        assert_eq!(err.to_string(), "Unknown error from /api/rag");
    }

    #[test]
    fn success_envelope_yields_data() {
        let data = envelope_data(RelayEnvelope::success(json!({"outputs": []}))).unwrap();
        assert_eq!(data, json!({"outputs": []}));
    }

    #[test]
    fn status_error_message() {
        assert_eq!(
            RelayClientError::Status(500).to_string(),
            "HTTP error! status: 500"
        );
    }
}
