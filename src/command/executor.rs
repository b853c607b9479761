use crate::error::{ToolError, ToolResult};
use crate::security::{GuardedPath, Program, ValidatedCommand};
use crate::text::head_chars;
use std::fmt;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Default deadline for one external command
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(180);

/// Default bound on the combined stdout/stderr text returned to the caller
pub const DEFAULT_MAX_OUTPUT_CHARS: usize = 15_000;

/// Result of running an allowlisted command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub command_line: String,
    /// Combined stdout and stderr, trimmed and bounded
    pub output: String,
    pub exit_code: Option<i32>,
    pub success: bool,
    pub truncated: bool,
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.success {
            match self.exit_code {
                Some(code) => writeln!(f, "[exit code {}]", code)?,
                None => writeln!(f, "[terminated by signal]")?,
            }
        }

        if self.output.is_empty() {
            f.write_str("(no output)")?;
        } else {
            f.write_str(&self.output)?;
        }

        if self.truncated {
            f.write_str("\n… (truncated)")?;
        }
        Ok(())
    }
}

/// Runs allowlisted commands without a shell, under a hard deadline
///
/// When the deadline passes the child is killed and reaped by the runtime; no
/// partially-run process outlives the call.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
    max_output_chars: usize,
}

impl CommandRunner {
    pub fn new(timeout: Duration, max_output_chars: usize) -> Self {
        Self {
            timeout,
            max_output_chars,
        }
    }

    /// Run a validated command in `cwd`
    ///
    /// Launch failures, timeouts and OS errors come back as
    /// [`ToolError::ExecutionFailure`]. A non-zero exit status is not an error; it
    /// is reported in the returned [`CommandOutput`].
    pub async fn run(
        &self,
        command: &ValidatedCommand,
        cwd: &GuardedPath,
    ) -> ToolResult<CommandOutput> {
        cwd.require_dir()?;

        let mut process = Command::new(command.program.executable());
        process.args(&command.args);
        if command.program == Program::Git {
            // Never block on a credential prompt or an interactive editor
            process
                .env("GIT_TERMINAL_PROMPT", "0")
                .env("GIT_EDITOR", "true");
        }

        self.execute(process, &command.command_line(), cwd.path()).await
    }

    async fn execute(
        &self,
        mut process: Command,
        command_line: &str,
        cwd: &Path,
    ) -> ToolResult<CommandOutput> {
        process
            .current_dir(cwd)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        tracing::debug!(command = command_line, cwd = %cwd.display(), "running command");

        let output = match tokio::time::timeout(self.timeout, process.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ToolError::ExecutionFailure(format!(
                    "failed to run '{}': {}",
                    command_line, e
                )));
            }
            Err(_) => {
                tracing::warn!(command = command_line, "command timed out; child killed");
                return Err(ToolError::ExecutionFailure(format!(
                    "'{}' timed out after {}s",
                    command_line,
                    self.timeout.as_secs_f64()
                )));
            }
        };

        Ok(self.process_output(output, command_line))
    }

    /// Process command output into CommandOutput struct
    fn process_output(&self, output: Output, command_line: &str) -> CommandOutput {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.stderr.is_empty() {
            combined.push('\n');
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
        }

        let trimmed = combined.trim();
        let bounded = head_chars(trimmed, self.max_output_chars);

        CommandOutput {
            command_line: command_line.to_string(),
            output: bounded.to_string(),
            exit_code: output.status.code(),
            success: output.status.success(),
            truncated: bounded.len() < trimmed.len(),
        }
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT, DEFAULT_MAX_OUTPUT_CHARS)
    }
}
