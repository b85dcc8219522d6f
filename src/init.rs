use crate::agents::AgentRegistry;
use crate::manager::{ConnectionManager, ManagerConfig};
use crate::{AiConfig, AppState};
use serde_json::json;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
    pub heartbeat_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
            heartbeat_interval: Duration::from_secs(
                std::env::var("HEARTBEAT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
            ),
        })
    }
}

pub async fn app_init() -> Result<(Config, Arc<AppState>), Box<dyn Error>> {
    let config = Config::from_env()?;
    log::info!("✅ Configuration loaded");
    let ai_config = AiConfig::from_env()?;
    log::info!("✅ Ai Configuration loaded ({})", ai_config.url);

    let manager = Arc::new(ConnectionManager::new(ManagerConfig {
        heartbeat_interval: config.heartbeat_interval,
        ..ManagerConfig::default()
    }));

    log::info!("🤖 Building agents...");
    let registry = AgentRegistry::build(&ai_config)?;
    register_all(&manager, &registry);

    let state = Arc::new(AppState::new(ai_config, registry, manager));
    if state.probe.is_available().await {
        log::info!("✅ Ollama reachable");
    } else {
        log::warn!("⚠️  Ollama not reachable at {}", state.probe.base_url());
    }

    Ok((config, state))
}

// ============================================================================
// Setup Functions
// ============================================================================

/// Seed the status table so clients see every agent and team as idle.
pub fn register_all(manager: &ConnectionManager, registry: &AgentRegistry) {
    for agent in registry.agents() {
        manager.register_agent(
            &agent.config.id,
            json!({
                "name": agent.config.name,
                "kind": "agent",
                "model": agent.model,
                "tools": agent.config.tool_names(),
            }),
        );
    }
    for team in registry.teams() {
        manager.register_agent(
            &team.config.id,
            json!({
                "name": team.config.name,
                "kind": "team",
                "model": team.model,
                "members": team.config.members,
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registers_agents_and_teams_as_idle() {
        let manager = ConnectionManager::new(ManagerConfig::default());
        let registry = AgentRegistry::build(&AiConfig::default()).unwrap();
        register_all(&manager, &registry);

        let statuses = manager.agent_statuses();
        assert_eq!(statuses.len(), 7);
        assert_eq!(statuses["collaborative"]["status"], "idle");
        assert_eq!(statuses["code"]["metadata"]["model"], "qwen2.5-coder:7b");
        assert_eq!(manager.interaction_count(), 7);
    }
}
