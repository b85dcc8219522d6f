use crate::agents::{run_tracked, track_task, WhatsAppMessage};
use crate::error::*;
use crate::manager::ManagerStats;
use crate::models::*;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

const WHATSAPP_AGENT: &str = "whatsapp";
const WHATSAPP_FALLBACK: &str = "Sorry, I can't answer right now. Please try again in a moment.";

fn status_of(state: &AppState, agent_id: &str) -> String {
    state
        .manager
        .agent_status(agent_id)
        .and_then(|s| s.get("status").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

// ============================================================================
// Service
// ============================================================================

pub async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Multi-Agent System API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        websocket: "/ws".to_string(),
        ui: "/ui".to_string(),
    })
}

pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        service: "Multi-Agent System API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Always 200; daemon failures are reported in the body.
pub async fn ollama_health(State(state): State<Arc<AppState>>) -> Json<OllamaHealth> {
    match state.probe.list_models().await {
        Ok(models) => Json(OllamaHealth {
            status: "healthy".to_string(),
            ollama_connected: true,
            models_count: Some(models.len()),
            available_models: Some(models.into_iter().map(|m| m.name).collect()),
            error: None,
        }),
        Err(e) => {
            log::warn!("Ollama health check failed: {}", e);
            Json(OllamaHealth {
                status: "unhealthy".to_string(),
                ollama_connected: false,
                models_count: None,
                available_models: None,
                error: Some(e.to_string()),
            })
        }
    }
}

pub async fn ws_status(State(state): State<Arc<AppState>>) -> Json<ManagerStats> {
    Json(state.manager.stats())
}

// ============================================================================
// Agents
// ============================================================================

pub async fn list_agents(State(state): State<Arc<AppState>>) -> Json<AgentList> {
    let agents = state
        .registry
        .agents()
        .iter()
        .map(|agent| {
            let summary = AgentSummary {
                name: agent.config.name.clone(),
                description: agent.config.description.clone(),
                model: agent.model.clone(),
                status: status_of(&state, &agent.config.id),
                tools: agent.config.tool_names(),
                emoji: agent.config.emoji.clone(),
            };
            (agent.config.id.clone(), summary)
        })
        .collect();
    Json(AgentList { agents })
}

pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
) -> Result<Json<AgentDetail>> {
    let agent = state
        .registry
        .agent(&agent_id)
        .ok_or_else(|| AppError::not_found(format!("Agent '{}'", agent_id)))?;

    Ok(Json(AgentDetail {
        id: agent.config.id.clone(),
        name: agent.config.name.clone(),
        description: agent.config.description.clone(),
        model: agent.model.clone(),
        tools: agent.config.tool_names(),
        instructions: agent.config.instructions.clone(),
        status: status_of(&state, &agent_id),
    }))
}

/// POST /agents/{id}/chat
///
/// Agent failures come back as 200 with `success=false`; only an unknown id
/// is an HTTP error.
pub async fn chat_with_agent(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let agent = state
        .registry
        .agent(&agent_id)
        .ok_or_else(|| AppError::not_found(format!("Agent '{}'", agent_id)))?;

    let outcome = run_tracked(
        &state.manager,
        &agent_id,
        agent.responder.as_ref(),
        &request.message,
        request.metadata,
    )
    .await;

    let (response, error) = match outcome.result {
        Ok(text) => (text, None),
        Err(e) => (String::new(), Some(e.to_string())),
    };
    Ok(Json(ChatResponse {
        agent_id,
        agent_name: agent.config.name.clone(),
        success: error.is_none(),
        response,
        error,
        interaction_id: outcome.interaction_id,
    }))
}

// ============================================================================
// Teams
// ============================================================================

pub async fn list_teams(State(state): State<Arc<AppState>>) -> Json<TeamList> {
    let teams = state
        .registry
        .teams()
        .iter()
        .map(|team| {
            let summary = TeamSummary {
                name: team.config.name.clone(),
                description: team.config.description.clone(),
                members_count: team.team.members().len(),
            };
            (team.config.id.clone(), summary)
        })
        .collect();
    Json(TeamList { teams })
}

pub async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<String>,
) -> Result<Json<TeamDetail>> {
    let team = state
        .registry
        .team(&team_id)
        .ok_or_else(|| AppError::not_found(format!("Team '{}'", team_id)))?;

    Ok(Json(TeamDetail {
        id: team.config.id.clone(),
        name: team.config.name.clone(),
        description: team.config.description.clone(),
        mode: team.config.mode.clone(),
        model: team.model.clone(),
        members: team
            .team
            .members()
            .iter()
            .map(|m| MemberSummary {
                id: m.id.clone(),
                name: m.name.clone(),
                description: m.description.clone(),
            })
            .collect(),
        instructions: team.config.instructions.clone(),
    }))
}

pub async fn chat_with_team(
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<TeamChatResponse>> {
    let team = state
        .registry
        .team(&team_id)
        .ok_or_else(|| AppError::not_found(format!("Team '{}'", team_id)))?;

    let outcome = run_tracked(
        &state.manager,
        &team_id,
        team.team.as_ref(),
        &request.message,
        request.metadata,
    )
    .await;

    let (response, error) = match outcome.result {
        Ok(text) => (text, None),
        Err(e) => (String::new(), Some(e.to_string())),
    };
    Ok(Json(TeamChatResponse {
        team_id,
        team_name: team.config.name.clone(),
        success: error.is_none(),
        response,
        error,
        interaction_id: outcome.interaction_id,
    }))
}

// ============================================================================
// Webhooks
// ============================================================================

/// POST /webhooks/whatsapp
pub async fn whatsapp_webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<Json<WebhookOutcome>> {
    let Some(message) = WhatsAppMessage::from_webhook(&payload) else {
        log::debug!("WhatsApp webhook without text message ignored");
        return Ok(Json(WebhookOutcome::Ignored { ignored: true }));
    };
    let agent = state
        .registry
        .agent(WHATSAPP_AGENT)
        .ok_or_else(|| AppError::not_found(format!("Agent '{}'", WHATSAPP_AGENT)))?;

    let metadata = json!({
        "channel": "whatsapp",
        "from": message.from_number,
        "message_id": message.message_id,
        "sent_at": message.timestamp,
    });
    let outcome = track_task(
        &state.manager,
        WHATSAPP_AGENT,
        "whatsapp_message",
        Some(metadata),
        agent.responder.respond(&message.text),
    )
    .await;

    let body = outcome.result.unwrap_or_else(|_| WHATSAPP_FALLBACK.to_string());
    let reply = message.reply(body);
    Ok(Json(WebhookOutcome::Reply {
        to: reply.to,
        body: reply.body,
    }))
}
