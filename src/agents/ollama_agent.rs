use crate::agents::config::AgentConfig;
use crate::agents::tools::{RunPython, RunShell, StockPrice, ToolKind, WebSearch};
use crate::agents::Responder;
use crate::error::AgentError;
use crate::AiConfig;
use futures::future::BoxFuture;
use rig::client::Nothing;
use rig::completion::{Prompt, PromptError};
use rig::prelude::CompletionClient;
use rig::providers::ollama;
use std::time::Duration;

pub fn ollama_client(url: &str) -> Result<ollama::Client, AgentError> {
    ollama::Client::builder()
        .api_key(Nothing)
        .base_url(url)
        .build()
        .map_err(|e| AgentError::ModelUnavailable(format!("cannot build Ollama client for {}: {}", url, e)))
}

/// A preset run through the Ollama daemon, with its tools attached.
pub struct OllamaAgent {
    config: AgentConfig,
    model: String,
    client: ollama::Client,
    http: reqwest::Client,
    timeout: Duration,
    tool_timeout: Duration,
    max_turns: usize,
}

impl OllamaAgent {
    pub fn new(config: AgentConfig, ai: &AiConfig, client: ollama::Client, http: reqwest::Client) -> Self {
        let model = config.resolve_model(&ai.default_model);
        Self {
            config,
            model,
            client,
            http,
            timeout: ai.request_timeout,
            tool_timeout: ai.tool_timeout,
            max_turns: ai.max_turns,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn preamble(&self) -> String {
        preamble(&self.config.description, &self.config.instructions)
    }

    async fn run(&self, prompt: &str) -> Result<String, AgentError> {
        macro_rules! attach {
            ($builder:expr, $tool:expr) => {
                match $tool {
                    ToolKind::WebSearch => $builder.tool(WebSearch::new(self.http.clone())),
                    ToolKind::StockPrice => $builder.tool(StockPrice::new(self.http.clone())),
                    ToolKind::Python => $builder.tool(RunPython::new(self.tool_timeout)),
                    ToolKind::Shell => $builder.tool(RunShell::new(self.tool_timeout)),
                }
            };
        }

        let builder = self.client.agent(self.model.as_str()).preamble(&self.preamble());
        let agent = match self.config.tools.split_first() {
            None => builder.build(),
            Some((first, rest)) => {
                let mut builder = attach!(builder, first);
                for tool in rest {
                    builder = attach!(builder, tool);
                }
                builder.build()
            }
        };

        log::debug!("{} ({}) running prompt", self.config.name, self.model);
        let request = async { agent.prompt(prompt).multi_turn(self.max_turns).await };
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(classify(e)),
            Err(_) => Err(AgentError::Timeout(self.timeout)),
        }
    }
}

impl Responder for OllamaAgent {
    fn respond<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, AgentError>> {
        Box::pin(self.run(prompt))
    }
}

pub(crate) fn preamble(description: &str, instructions: &[String]) -> String {
    let mut text = format!("{}\n", description);
    for line in instructions {
        text.push_str("- ");
        text.push_str(line);
        text.push('\n');
    }
    text.push_str("Format answers in markdown.");
    text
}

fn classify(err: PromptError) -> AgentError {
    match err {
        PromptError::ToolError(e) => AgentError::ToolExecution(e.to_string()),
        other => AgentError::ModelUnavailable(other.to_string()),
    }
}
