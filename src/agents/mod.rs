pub mod activity;
pub mod config;
pub mod ollama_agent;
pub mod registry;
pub mod team;
pub mod tools;
pub mod whatsapp;

pub use activity::{run_tracked, track_task, ChatOutcome};
pub use config::{presets, collaborative_team, AgentConfig, TeamConfig};
pub use ollama_agent::{ollama_client, OllamaAgent};
pub use registry::{AgentRegistry, RegisteredAgent, RegisteredTeam};
pub use team::{Member, Team};
pub use tools::ToolKind;
pub use whatsapp::{WebhookReply, WhatsAppMessage};

use crate::error::AgentError;
use futures::future::BoxFuture;

/// Anything that answers a text prompt: a single agent or a whole team.
pub trait Responder: Send + Sync {
    fn respond<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, AgentError>>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub struct Echo(pub &'static str);

    impl Responder for Echo {
        fn respond<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, AgentError>> {
            Box::pin(async move { Ok(format!("{}: {}", self.0, prompt)) })
        }
    }

    pub struct Failing;

    impl Responder for Failing {
        fn respond<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String, AgentError>> {
            Box::pin(async { Err(AgentError::ModelUnavailable("connection refused".into())) })
        }
    }

    /// Returns the prompt it was given and counts calls.
    #[derive(Default)]
    pub struct Recorder {
        pub calls: AtomicUsize,
    }

    impl Responder for Recorder {
        fn respond<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, AgentError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Ok(prompt.to_string()) })
        }
    }
}
