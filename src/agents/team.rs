use crate::agents::config::TeamConfig;
use crate::agents::registry::AgentRegistry;
use crate::agents::Responder;
use crate::error::AgentError;
use futures::future::{join_all, BoxFuture};
use std::sync::Arc;

#[derive(Clone)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub description: String,
    pub responder: Arc<dyn Responder>,
}

/// Fans a prompt out to every member, then has the coordinator merge the
/// answers into one reply.
pub struct Team {
    config: TeamConfig,
    members: Vec<Member>,
    coordinator: Arc<dyn Responder>,
}

impl Team {
    pub fn new(config: TeamConfig, members: Vec<Member>, coordinator: Arc<dyn Responder>) -> Self {
        Self {
            config,
            members,
            coordinator,
        }
    }

    /// Resolve member ids against the registry.
    pub fn from_registry(
        config: TeamConfig,
        registry: &AgentRegistry,
        coordinator: Arc<dyn Responder>,
    ) -> Result<Self, AgentError> {
        let members = config
            .members
            .iter()
            .map(|id| {
                registry
                    .agent(id)
                    .map(|agent| Member {
                        id: agent.config.id.clone(),
                        name: agent.config.name.clone(),
                        description: agent.config.description.clone(),
                        responder: agent.responder.clone(),
                    })
                    .ok_or_else(|| AgentError::UnknownMember(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(config, members, coordinator))
    }

    pub fn config(&self) -> &TeamConfig {
        &self.config
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    async fn run(&self, prompt: &str) -> Result<String, AgentError> {
        let results = join_all(self.members.iter().map(|m| m.responder.respond(prompt))).await;

        let mut answers = Vec::new();
        let mut failures = Vec::new();
        let mut first_error = None;
        for (member, result) in self.members.iter().zip(results) {
            match result {
                Ok(text) => answers.push((member.name.as_str(), text)),
                Err(e) => {
                    log::warn!("{}: member {} failed: {}", self.config.name, member.id, e);
                    failures.push((member.name.as_str(), e.to_string()));
                    first_error.get_or_insert(e);
                }
            }
        }

        if answers.is_empty() {
            return Err(first_error.unwrap_or_else(|| AgentError::UnknownMember("team has no members".into())));
        }

        let merge = consolidation_prompt(&self.config.instructions, prompt, &answers, &failures);
        self.coordinator.respond(&merge).await
    }
}

impl Responder for Team {
    fn respond<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, AgentError>> {
        Box::pin(self.run(prompt))
    }
}

fn consolidation_prompt(
    instructions: &[String],
    question: &str,
    answers: &[(&str, String)],
    failures: &[(&str, String)],
) -> String {
    let mut text = String::new();
    for line in instructions {
        text.push_str(line);
        text.push('\n');
    }
    text.push_str("\nUser request:\n");
    text.push_str(question);
    text.push_str("\n\nExpert answers:\n");
    for (name, answer) in answers {
        text.push_str(&format!("\n### {}\n{}\n", name, answer));
    }
    if !failures.is_empty() {
        text.push_str("\nUnavailable experts:\n");
        for (name, error) in failures {
            text.push_str(&format!("- {}: {}\n", name, error));
        }
    }
    text.push_str("\nWrite the final answer for the user.");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::collaborative_team;
    use crate::agents::testing::{Echo, Failing, Recorder};
    use std::sync::atomic::Ordering;

    fn member(id: &str, responder: Arc<dyn Responder>) -> Member {
        Member {
            id: id.to_string(),
            name: format!("{}Agent", id),
            description: String::new(),
            responder,
        }
    }

    #[tokio::test]
    async fn merges_member_answers_through_coordinator() {
        let coordinator = Arc::new(Recorder::default());
        let team = Team::new(
            collaborative_team(),
            vec![
                member("general", Arc::new(Echo("general"))),
                member("search", Arc::new(Failing)),
                member("code", Arc::new(Echo("code"))),
            ],
            coordinator.clone(),
        );

        let merged = team.respond("what is rust?").await.unwrap();
        assert_eq!(coordinator.calls.load(Ordering::SeqCst), 1);
        assert!(merged.contains("### generalAgent\ngeneral: what is rust?"));
        assert!(merged.contains("### codeAgent\ncode: what is rust?"));
        assert!(merged.contains("- searchAgent: model unavailable"));
    }

    #[tokio::test]
    async fn all_members_failing_skips_coordinator() {
        let coordinator = Arc::new(Recorder::default());
        let team = Team::new(
            collaborative_team(),
            vec![member("a", Arc::new(Failing)), member("b", Arc::new(Failing))],
            coordinator.clone(),
        );

        let err = team.respond("hi").await.unwrap_err();
        assert!(matches!(err, AgentError::ModelUnavailable(_)));
        assert_eq!(coordinator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_member_is_rejected() {
        let registry = AgentRegistry::default();
        let result = Team::from_registry(collaborative_team(), &registry, Arc::new(Failing));
        assert!(matches!(result, Err(AgentError::UnknownMember(id)) if id == "general"));
    }
}
