//! JSON bodies exchanged between the chat client, the relay and the flow service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_io_type() -> String {
    "chat".to_string()
}

/// Body of `POST /api/rag`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    pub flow_id: String,
    pub langflow_id: String,
    pub input_value: String,
    #[serde(default = "default_io_type")]
    pub input_type: String,
    #[serde(default = "default_io_type")]
    pub output_type: String,
    /// Per-component overrides, forwarded to the flow service untouched.
    #[serde(default)]
    pub tweaks: Map<String, Value>,
}

/// Response of `POST /api/rag`. Exactly one is returned per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayEnvelope {
    pub const fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Body of the flow service's run endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRunRequest {
    pub input_value: String,
    pub input_type: String,
    pub output_type: String,
    pub tweaks: Map<String, Value>,
}

impl From<&RelayRequest> for FlowRunRequest {
    fn from(req: &RelayRequest) -> Self {
        Self {
            input_value: req.input_value.clone(),
            input_type: req.input_type.clone(),
            output_type: req.output_type.clone(),
            tweaks: req.tweaks.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn relay_request_uses_camel_case() {
        let req: RelayRequest = serde_json::from_value(json!({
            "flowId": "f1",
            "langflowId": "lf1",
            "inputValue": "hello",
            "inputType": "chat",
            "outputType": "chat",
            "tweaks": {"Prompt-uBxb1": {}}
        }))
        .unwrap();
        assert_eq!(req.flow_id, "f1");
        assert_eq!(req.langflow_id, "lf1");
        assert_eq!(req.input_value, "hello");
        assert!(req.tweaks.contains_key("Prompt-uBxb1"));
    }

    #[test]
    fn relay_request_defaults() {
        let req: RelayRequest = serde_json::from_value(json!({
            "flowId": "f1",
            "langflowId": "lf1",
            "inputValue": "hello"
        }))
        .unwrap();
        assert_eq!(req.input_type, "chat");
        assert_eq!(req.output_type, "chat");
        assert!(req.tweaks.is_empty());
    }

    #[test]
    fn success_envelope_omits_error() {
        let env = RelayEnvelope::success(json!({"outputs": []}));
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value, json!({"success": true, "data": {"outputs": []}}));
    }

    #[test]
    fn failure_envelope_omits_data() {
        let env = RelayEnvelope::failure("boom");
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value, json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn flow_run_request_is_snake_case() {
        let req = RelayRequest {
            flow_id: "f".into(),
            langflow_id: "l".into(),
            input_value: "q".into(),
            input_type: "chat".into(),
            output_type: "chat".into(),
            tweaks: Map::new(),
        };
        let value = serde_json::to_value(FlowRunRequest::from(&req)).unwrap();
        assert_eq!(
            value,
            json!({"input_value": "q", "input_type": "chat", "output_type": "chat", "tweaks": {}})
        );
    }
}
