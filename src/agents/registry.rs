use crate::agents::config::{collaborative_team, presets, AgentConfig, TeamConfig};
use crate::agents::ollama_agent::{ollama_client, OllamaAgent};
use crate::agents::team::Team;
use crate::agents::Responder;
use crate::error::AgentError;
use crate::AiConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct RegisteredAgent {
    pub config: AgentConfig,
    pub model: String,
    pub responder: Arc<dyn Responder>,
}

#[derive(Clone)]
pub struct RegisteredTeam {
    pub config: TeamConfig,
    pub model: String,
    pub team: Arc<Team>,
}

/// Agents and teams by id, in registration order.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: Vec<RegisteredAgent>,
    teams: Vec<RegisteredTeam>,
}

impl AgentRegistry {
    /// Every preset plus the collaborative team, backed by Ollama.
    pub fn build(ai: &AiConfig) -> Result<Self, AgentError> {
        let client = ollama_client(&ai.url)?;
        let http = reqwest::Client::new();
        let mut registry = Self::default();

        for config in presets() {
            let agent = OllamaAgent::new(config.clone(), ai, client.clone(), http.clone());
            let model = agent.model().to_string();
            registry.insert_agent(config, model, Arc::new(agent));
        }

        let team_config = collaborative_team();
        let coordinator = OllamaAgent::new(team_config.coordinator(), ai, client, http);
        let model = coordinator.model().to_string();
        let team = Team::from_registry(team_config, &registry, Arc::new(coordinator))?;
        registry.insert_team(model, team);

        log::info!(
            "Registry ready: {} agents, {} teams",
            registry.agents.len(),
            registry.teams.len()
        );
        Ok(registry)
    }

    /// Adds an agent, replacing any with the same id in place.
    pub fn insert_agent(&mut self, config: AgentConfig, model: String, responder: Arc<dyn Responder>) {
        let entry = RegisteredAgent {
            config,
            model,
            responder,
        };
        match self.agents.iter_mut().find(|a| a.config.id == entry.config.id) {
            Some(slot) => *slot = entry,
            None => self.agents.push(entry),
        }
    }

    pub fn insert_team(&mut self, model: String, team: Team) {
        let entry = RegisteredTeam {
            config: team.config().clone(),
            model,
            team: Arc::new(team),
        };
        match self.teams.iter_mut().find(|t| t.config.id == entry.config.id) {
            Some(slot) => *slot = entry,
            None => self.teams.push(entry),
        }
    }

    pub fn agent(&self, id: &str) -> Option<&RegisteredAgent> {
        self.agents.iter().find(|a| a.config.id == id)
    }

    pub fn team(&self, id: &str) -> Option<&RegisteredTeam> {
        self.teams.iter().find(|t| t.config.id == id)
    }

    pub fn agents(&self) -> &[RegisteredAgent] {
        &self.agents
    }

    pub fn teams(&self) -> &[RegisteredTeam] {
        &self.teams
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::{Echo, Failing};

    #[test]
    fn builds_presets_and_team_in_order() {
        let registry = AgentRegistry::build(&AiConfig::default()).unwrap();
        let ids: Vec<&str> = registry.agents().iter().map(|a| a.config.id.as_str()).collect();
        assert_eq!(ids, ["general", "search", "finance", "code", "system", "whatsapp"]);

        let team = registry.team("collaborative").unwrap();
        assert_eq!(team.team.members().len(), 5);
        assert_eq!(team.model, AiConfig::default().default_model);
    }

    #[tokio::test]
    async fn insert_replaces_same_id_in_place() {
        let mut registry = AgentRegistry::default();
        let configs = presets();
        registry.insert_agent(configs[0].clone(), "m".into(), Arc::new(Failing));
        registry.insert_agent(configs[1].clone(), "m".into(), Arc::new(Failing));
        registry.insert_agent(configs[0].clone(), "m".into(), Arc::new(Echo("stub")));

        assert_eq!(registry.agents().len(), 2);
        assert_eq!(registry.agents()[0].config.id, "general");
        let reply = registry.agent("general").unwrap().responder.respond("hi").await.unwrap();
        assert_eq!(reply, "stub: hi");
    }

    #[test]
    fn lookup_misses_return_none() {
        let registry = AgentRegistry::default();
        assert!(registry.agent("unknown").is_none());
        assert!(registry.team("unknown").is_none());
    }
}
