//! Configuration resolution for flowchat.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Settings file (~/.config/flowchat/settings.json, or an explicit path)
//! 3. Environment variables
//! 4. CLI arguments (applied by the binaries, highest priority)
//!
//! The resolved [`Config`] is handed to constructors; nothing reads the
//! environment after startup.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete flowchat configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// Connection to the hosted flow service (used by the relay).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    /// Base URL of the flow service (e.g. "<https://api.langflow.astra.datastax.com>").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Application token sent as a bearer credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_token: Option<String>,
    /// Ask the service for a streamed run and follow its event stream.
    #[serde(default)]
    pub stream: bool,
}

/// Which flow to run and how to parameterize it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub flow_id: String,
    pub langflow_id: String,
    pub input_type: String,
    pub output_type: String,
    /// Per-component overrides, forwarded verbatim.
    pub tweaks: Map<String, Value>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            flow_id: String::new(),
            langflow_id: String::new(),
            input_type: "chat".to_string(),
            output_type: "chat".to_string(),
            tweaks: Map::new(),
        }
    }
}

/// Chat client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the relay (the client posts to `<relay_url>/api/rag`).
    pub relay_url: String,
    /// Where the conversation is persisted. Defaults to the data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: "http://127.0.0.1:3000".to_string(),
            history_path: None,
        }
    }
}

/// Load configuration with hierarchical resolution.
///
/// `path` overrides the default settings file location; an explicit path that
/// does not exist is an error, a missing default file is not.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    match path {
        Some(p) => config = load_config_file(p)?,
        None => {
            if let Some(global_path) = global_config_path() {
                if global_path.exists() {
                    config = load_config_file(&global_path)?;
                }
            }
        }
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Get the global settings file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("flowchat").join("settings.json"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Overlay environment variables read through `var` onto `config`.
pub fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("LANGFLOW_BASE_URL") {
        config.service.base_url = Some(val);
    }
    if let Some(val) = var("LANGFLOW_APPLICATION_TOKEN") {
        config.service.application_token = Some(val);
    }
    if let Some(val) = var("LANGFLOW_STREAM") {
        if let Ok(b) = val.parse() {
            config.service.stream = b;
        }
    }
    if let Some(val) = var("LANGFLOW_FLOW_ID") {
        config.flow.flow_id = val;
    }
    if let Some(val) = var("LANGFLOW_ID") {
        config.flow.langflow_id = val;
    }
    if let Some(val) = var("LANGFLOW_TWEAKS") {
        match serde_json::from_str(&val) {
            Ok(tweaks) => config.flow.tweaks = tweaks,
            Err(e) => tracing::warn!(error = %e, "Ignoring LANGFLOW_TWEAKS: not a JSON object"),
        }
    }
    if let Some(val) = var("FLOWCHAT_RELAY_URL") {
        config.client.relay_url = val;
    }
    if let Some(val) = var("FLOWCHAT_HISTORY_PATH") {
        config.client.history_path = Some(PathBuf::from(val));
    }
}

impl FlowConfig {
    /// Both identifiers are required to address a flow.
    pub fn validate(&self) -> Result<()> {
        if self.flow_id.is_empty() {
            return Err(Error::Config("flow_id is empty".into()));
        }
        if self.langflow_id.is_empty() {
            return Err(Error::Config("langflow_id is empty".into()));
        }
        Ok(())
    }
}
