use crate::error::ToolError;
use serde::Serialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const MAX_OUTPUT_CHARS: usize = 8_000;

#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub truncated: bool,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Run `program` directly (no shell) and collect its output. The child is
/// killed if it outlives `timeout`.
pub async fn run_command(
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<CommandOutput, ToolError> {
    log::debug!("Running {} {:?}", program, args);

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| ToolError::Timeout(timeout))??;

    let (stdout, out_cut) = truncate(String::from_utf8_lossy(&output.stdout).into_owned());
    let (stderr, err_cut) = truncate(String::from_utf8_lossy(&output.stderr).into_owned());

    Ok(CommandOutput {
        exit_code: output.status.code(),
        stdout,
        stderr,
        truncated: out_cut || err_cut,
    })
}

fn truncate(text: String) -> (String, bool) {
    if text.chars().count() <= MAX_OUTPUT_CHARS {
        return (text, false);
    }
    (text.chars().take(MAX_OUTPUT_CHARS).collect(), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout() {
        let out = run_command("echo", &["hello".to_string()], Duration::from_secs(5))
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
        assert!(!out.truncated);
    }

    #[tokio::test]
    async fn times_out() {
        let err = run_command("sleep", &["5".to_string()], Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Timeout(_)));
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let err = run_command("definitely-not-a-real-binary-xyz", &[], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn(_)));
    }

    #[test]
    fn truncates_long_output() {
        let (text, cut) = truncate("x".repeat(MAX_OUTPUT_CHARS + 10));
        assert!(cut);
        assert_eq!(text.len(), MAX_OUTPUT_CHARS);
    }
}
