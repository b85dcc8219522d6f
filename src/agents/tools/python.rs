use crate::agents::tools::{parameters, run_command, CommandOutput};
use crate::error::ToolError;
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PythonArgs {
    /// Complete Python 3 program. Print whatever should be returned.
    pub code: String,
}

pub struct RunPython {
    interpreter: String,
    timeout: Duration,
}

impl RunPython {
    pub fn new(timeout: Duration) -> Self {
        Self {
            interpreter: "python3".to_string(),
            timeout,
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }
}

impl Tool for RunPython {
    const NAME: &'static str = "run_python";

    type Error = ToolError;
    type Args = PythonArgs;
    type Output = CommandOutput;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Execute Python 3 code and return what it printed.".to_string(),
            parameters: parameters::<PythonArgs>(),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        if args.code.trim().is_empty() {
            return Err(ToolError::InvalidInput("no code given".to_string()));
        }
        run_command(&self.interpreter, &["-c".to_string(), args.code], self.timeout).await
    }
}
