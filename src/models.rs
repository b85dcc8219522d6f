use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Accepted for compatibility; replies are never streamed.
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub agent_id: String,
    pub agent_name: String,
    pub response: String,
    pub success: bool,
    pub error: Option<String>,
    pub interaction_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamChatResponse {
    pub team_id: String,
    pub team_name: String,
    pub response: String,
    pub success: bool,
    pub error: Option<String>,
    pub interaction_id: String,
}

// ============================================================================
// Agents & teams
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSummary {
    pub name: String,
    pub description: String,
    pub model: String,
    pub status: String,
    pub tools: Vec<String>,
    pub emoji: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentList {
    pub agents: BTreeMap<String, AgentSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    pub model: String,
    pub tools: Vec<String>,
    pub instructions: Vec<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSummary {
    pub name: String,
    pub description: String,
    pub members_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamList {
    pub teams: BTreeMap<String, TeamSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSummary {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    pub mode: String,
    pub model: String,
    pub members: Vec<MemberSummary>,
    pub instructions: Vec<String>,
}

// ============================================================================
// Service info & health
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub websocket: String,
    pub ui: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaHealth {
    pub status: String,
    pub ollama_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_models: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WebhookOutcome {
    Reply { to: String, body: String },
    Ignored { ignored: bool },
}
