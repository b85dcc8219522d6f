use crate::agents::tools::{parameters, run_command, CommandOutput};
use crate::error::ToolError;
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ShellArgs {
    /// Program followed by its arguments, e.g. ["ls", "-la", "/tmp"].
    pub args: Vec<String>,
}

/// Executes one command without a shell, so pipes and globs are not expanded.
pub struct RunShell {
    timeout: Duration,
}

impl RunShell {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Tool for RunShell {
    const NAME: &'static str = "run_shell";

    type Error = ToolError;
    type Args = ShellArgs;
    type Output = CommandOutput;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Run a single system command and return its exit code, stdout and stderr."
                .to_string(),
            parameters: parameters::<ShellArgs>(),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let (program, rest) = args
            .args
            .split_first()
            .ok_or_else(|| ToolError::InvalidInput("empty command".to_string()))?;
        log::info!("Shell tool: {} {:?}", program, rest);
        run_command(program, rest, self.timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_argv() {
        let tool = RunShell::new(Duration::from_secs(5));
        let out = tool
            .call(ShellArgs { args: vec!["echo".into(), "a b".into()] })
            .await
            .unwrap();
        assert_eq!(out.stdout.trim(), "a b");
    }

    #[tokio::test]
    async fn rejects_empty_command() {
        let tool = RunShell::new(Duration::from_secs(5));
        let err = tool.call(ShellArgs { args: vec![] }).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
