use crate::agents::AgentRegistry;
use crate::manager::ConnectionManager;
use crate::ollama::OllamaProbe;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// AppState && AiConfig
// ============================================================================

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub url: String,
    pub default_model: String,
    pub request_timeout: Duration,
    pub tool_timeout: Duration,
    /// Tool-call round trips allowed per prompt.
    pub max_turns: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            default_model: "mistral:latest".to_string(),
            request_timeout: Duration::from_secs(300),
            tool_timeout: Duration::from_secs(60),
            max_turns: 5,
        }
    }
}

impl AiConfig {
    pub fn from_env() -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let defaults = Self::default();
        Ok(Self {
            url: std::env::var("OLLAMA_HOST").unwrap_or(defaults.url),
            default_model: std::env::var("DEFAULT_MODEL").unwrap_or(defaults.default_model),
            request_timeout: match std::env::var("MODEL_TIMEOUT_SECS") {
                Ok(v) => Duration::from_secs(v.parse()?),
                Err(_) => defaults.request_timeout,
            },
            tool_timeout: match std::env::var("TOOL_TIMEOUT_SECS") {
                Ok(v) => Duration::from_secs(v.parse()?),
                Err(_) => defaults.tool_timeout,
            },
            max_turns: match std::env::var("AGENT_MAX_TURNS") {
                Ok(v) => v.parse()?,
                Err(_) => defaults.max_turns,
            },
        })
    }
}

/// Everything the HTTP and websocket handlers share.
#[derive(Clone)]
pub struct AppState {
    pub ai_config: AiConfig,
    pub registry: Arc<AgentRegistry>,
    pub manager: Arc<ConnectionManager>,
    pub probe: OllamaProbe,
}

impl AppState {
    pub fn new(ai_config: AiConfig, registry: AgentRegistry, manager: Arc<ConnectionManager>) -> Self {
        let probe = OllamaProbe::new(&ai_config.url);
        Self {
            ai_config,
            registry: Arc::new(registry),
            manager,
            probe,
        }
    }
}
