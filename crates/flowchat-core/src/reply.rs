//! Typed views into the flow service's run response.
//!
//! The service returns a deeply nested document. Only two leaves matter here:
//! the reply text at `outputs[0].outputs[0].outputs.message.message.text` and
//! the optional stream URL at `outputs[0].outputs[0].artifacts.stream_url`.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct RunResponse {
    #[serde(default)]
    outputs: Vec<RunOutput>,
}

#[derive(Debug, Deserialize)]
struct RunOutput {
    #[serde(default)]
    outputs: Vec<ComponentOutput>,
}

#[derive(Debug, Deserialize)]
struct ComponentOutput {
    #[serde(default)]
    outputs: Option<ComponentResults>,
    #[serde(default)]
    artifacts: Option<Artifacts>,
}

#[derive(Debug, Deserialize)]
struct ComponentResults {
    #[serde(default)]
    message: Option<ResultMessage>,
}

#[derive(Debug, Deserialize)]
struct ResultMessage {
    #[serde(default)]
    message: Option<MessageBody>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Artifacts {
    #[serde(default)]
    stream_url: Option<String>,
}

fn first_component(response: &Value) -> Result<ComponentOutput> {
    let run = RunResponse::deserialize(response)
        .map_err(|e| Error::UnexpectedShape(e.to_string()))?;
    run.outputs
        .into_iter()
        .next()
        .ok_or_else(|| missing("outputs[0]"))?
        .outputs
        .into_iter()
        .next()
        .ok_or_else(|| missing("outputs[0].outputs[0]"))
}

fn missing(path: &str) -> Error {
    Error::UnexpectedShape(format!("missing {path}"))
}

/// Extract the assistant reply text from a run response.
pub fn reply_text(response: &Value) -> Result<String> {
    first_component(response)?
        .outputs
        .ok_or_else(|| missing("outputs[0].outputs[0].outputs"))?
        .message
        .ok_or_else(|| missing("outputs[0].outputs[0].outputs.message"))?
        .message
        .ok_or_else(|| missing("outputs[0].outputs[0].outputs.message.message"))?
        .text
        .ok_or_else(|| missing("outputs[0].outputs[0].outputs.message.message.text"))
}

/// Stream URL advertised by a run started with `stream=true`, if any.
pub fn stream_url(response: &Value) -> Option<String> {
    first_component(response).ok()?.artifacts?.stream_url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run_response(text: &str) -> Value {
        json!({
            "session_id": "abc",
            "outputs": [{
                "inputs": {"input_value": "hello"},
                "outputs": [{
                    "results": {},
                    "artifacts": {"message": text},
                    "outputs": {
                        "message": {
                            "message": {"text": text, "sender": "Machine"},
                            "type": "object"
                        }
                    }
                }]
            }]
        })
    }

    #[test]
    fn extracts_reply_text() {
        assert_eq!(reply_text(&run_response("Hi there")).unwrap(), "Hi there");
    }

    #[test]
    fn empty_outputs_is_unexpected_shape() {
        let err = reply_text(&json!({"outputs": []})).unwrap_err();
        assert!(matches!(err, Error::UnexpectedShape(ref m) if m.contains("outputs[0]")));
    }

    #[test]
    fn missing_text_names_full_path() {
        let response = json!({"outputs": [{"outputs": [{"outputs": {"message": {"message": {}}}}]}]});
        let err = reply_text(&response).unwrap_err();
        assert!(
            matches!(err, Error::UnexpectedShape(ref m) if m.ends_with("message.message.text"))
        );
    }

    #[test]
    fn wrong_type_is_unexpected_shape() {
        let err = reply_text(&json!({"outputs": "nope"})).unwrap_err();
        assert!(matches!(err, Error::UnexpectedShape(_)));
    }

    #[test]
    fn non_object_response_is_unexpected_shape() {
        assert!(matches!(
            reply_text(&json!(null)).unwrap_err(),
            Error::UnexpectedShape(_)
        ));
    }

    #[test]
    fn stream_url_present() {
        let response = json!({
            "outputs": [{"outputs": [{"artifacts": {"stream_url": "/api/v1/build/x/stream"}}]}]
        });
        assert_eq!(
            stream_url(&response).as_deref(),
            Some("/api/v1/build/x/stream")
        );
    }

    #[test]
    fn stream_url_absent() {
        assert_eq!(stream_url(&run_response("x")), None);
        assert_eq!(stream_url(&json!({})), None);
    }
}
