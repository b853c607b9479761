//! Tool catalog consumed by the external agent runtime
//!
//! Each tool is one variant of [`ToolCall`] with typed arguments. [`Toolbox`] runs a
//! call against the session, sending every path through the path guard, every file
//! mutation through the mutation gate and every command through the allowlist.
//! Failures stay typed ([`ToolError`]) until [`render`] turns the result into the
//! single string handed back to the agent.

pub mod definitions;
pub mod files;
pub mod review;

pub use definitions::{ToolDefinition, tool_definitions};

use crate::audit::AuditLogger;
use crate::command::{CommandOutput, CommandRunner};
use crate::config::LimitsConfig;
use crate::error::{ToolError, ToolResult};
use crate::mutation::{GateMode, MutationGate, MutationOutcome};
use crate::security::{CommandAllowlist, Program};
use crate::session::Session;
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_dir() -> String {
    ".".to_string()
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "auto".to_string()
}

fn default_style() -> String {
    "conventional".to_string()
}

/// One tool invocation with its arguments
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolCall {
    ShowProjectRoot,
    SetProjectRoot {
        path: String,
    },
    Ping,
    AddNote {
        text: String,
    },
    ListNotes,
    AddTodo {
        item: String,
    },
    ListTodos,
    CompleteTodo {
        index: i64,
    },
    ListDir {
        #[serde(default = "default_dir")]
        path: String,
        #[serde(default)]
        recursive: bool,
    },
    ReadTextFile {
        path: String,
        #[serde(default)]
        max_bytes: Option<u64>,
    },
    WriteTextFile {
        path: String,
        content: String,
        #[serde(default)]
        confirm: bool,
        #[serde(default = "default_true")]
        overwrite: bool,
    },
    AppendTextFile {
        path: String,
        content: String,
        #[serde(default)]
        confirm: bool,
    },
    SearchReplaceFile {
        path: String,
        find: String,
        replace: String,
        #[serde(default)]
        confirm: bool,
        #[serde(default)]
        preview_only: bool,
    },
    RegexReplaceFile {
        path: String,
        pattern: String,
        replace: String,
        #[serde(default)]
        flags: String,
        #[serde(default)]
        confirm: bool,
        #[serde(default)]
        preview_only: bool,
    },
    RunGit {
        args: String,
        #[serde(default = "default_dir")]
        working_dir: String,
    },
    RunNpm {
        args: String,
        #[serde(default = "default_dir")]
        working_dir: String,
    },
    CodeReviewSnippet {
        code: String,
        #[serde(default = "default_language")]
        language: String,
        #[serde(default)]
        goals: String,
    },
    ProposeCommitMessage {
        changes_summary: String,
        #[serde(default = "default_style")]
        style: String,
    },
}

impl ToolCall {
    /// Build a call from a tool name and its JSON arguments object
    ///
    /// `null` arguments are treated as an empty object.
    pub fn from_parts(name: &str, arguments: serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut object = match arguments {
            serde_json::Value::Null => serde_json::Map::new(),
            serde_json::Value::Object(map) => map,
            other => {
                return Err(serde_json::Error::custom(format!(
                    "arguments for {} must be an object, got {}",
                    name, other
                )));
            }
        };
        object.insert("tool".to_string(), serde_json::Value::String(name.to_string()));
        serde_json::from_value(serde_json::Value::Object(object))
    }

    /// Tool name as exposed to the agent
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::ShowProjectRoot => "show_project_root",
            ToolCall::SetProjectRoot { .. } => "set_project_root",
            ToolCall::Ping => "ping",
            ToolCall::AddNote { .. } => "add_note",
            ToolCall::ListNotes => "list_notes",
            ToolCall::AddTodo { .. } => "add_todo",
            ToolCall::ListTodos => "list_todos",
            ToolCall::CompleteTodo { .. } => "complete_todo",
            ToolCall::ListDir { .. } => "list_dir",
            ToolCall::ReadTextFile { .. } => "read_text_file",
            ToolCall::WriteTextFile { .. } => "write_text_file",
            ToolCall::AppendTextFile { .. } => "append_text_file",
            ToolCall::SearchReplaceFile { .. } => "search_replace_file",
            ToolCall::RegexReplaceFile { .. } => "regex_replace_file",
            ToolCall::RunGit { .. } => "run_git",
            ToolCall::RunNpm { .. } => "run_npm",
            ToolCall::CodeReviewSnippet { .. } => "code_review_snippet",
            ToolCall::ProposeCommitMessage { .. } => "propose_commit_message",
        }
    }
}

/// Successful result of a tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    Text(String),
    Mutation(MutationOutcome),
    Command(CommandOutput),
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutput::Text(text) => f.write_str(text),
            ToolOutput::Mutation(outcome) => outcome.fmt(f),
            ToolOutput::Command(output) => output.fmt(f),
        }
    }
}

/// Render a tool result as the single string returned to the agent
pub fn render(result: &ToolResult<ToolOutput>) -> String {
    match result {
        Ok(output) => output.to_string(),
        Err(err) => err.to_string(),
    }
}

/// Executes tool calls for one session
///
/// Calls take `&mut self`, so a session runs one tool at a time.
pub struct Toolbox {
    session: Session,
    gate: MutationGate,
    allowlist: CommandAllowlist,
    runner: CommandRunner,
    limits: LimitsConfig,
    audit: Option<AuditLogger>,
}

impl Toolbox {
    pub fn new(session: Session, limits: LimitsConfig) -> Self {
        Self {
            session,
            gate: MutationGate::new(limits.preview_chars),
            allowlist: CommandAllowlist::new(),
            runner: CommandRunner::new(limits.command_timeout(), limits.max_command_output_chars),
            limits,
            audit: None,
        }
    }

    /// Record applied mutations, commands and rejections to `logger`
    pub fn with_audit(mut self, logger: AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run a call and render its result
    pub async fn call(&mut self, call: ToolCall) -> String {
        render(&self.invoke(call).await)
    }

    /// Run a call
    pub async fn invoke(&mut self, call: ToolCall) -> ToolResult<ToolOutput> {
        let tool = call.name();
        let result = self.dispatch(call).await;

        match &result {
            Ok(_) => tracing::debug!(tool, "tool call succeeded"),
            Err(err) => tracing::info!(tool, error = %err, "tool call failed"),
        }
        self.record(tool, &result);

        result
    }

    async fn dispatch(&mut self, call: ToolCall) -> ToolResult<ToolOutput> {
        match call {
            ToolCall::ShowProjectRoot => Ok(ToolOutput::Text(format!(
                "Project root: {}",
                self.session.root()
            ))),
            ToolCall::SetProjectRoot { path } => {
                let previous = self.session.root().path().to_path_buf();
                let new_root = self.session.set_root(&path)?.path().to_path_buf();
                if let Some(audit) = &self.audit {
                    if let Err(e) = audit.log_root_change(&previous, &new_root) {
                        tracing::warn!(error = %e, "failed to write audit log");
                    }
                }
                Ok(ToolOutput::Text(format!(
                    "Project root set to: {}",
                    new_root.display()
                )))
            }
            ToolCall::Ping => Ok(ToolOutput::Text("pong".to_string())),
            ToolCall::AddNote { text } => {
                let number = self.session.add_note(&text)?;
                Ok(ToolOutput::Text(format!("Saved note #{}.", number)))
            }
            ToolCall::ListNotes => Ok(ToolOutput::Text(Self::numbered(
                self.session.notes(),
                "",
                "No notes yet.",
            ))),
            ToolCall::AddTodo { item } => {
                let number = self.session.add_todo(&item)?;
                Ok(ToolOutput::Text(format!("Added todo #{}.", number)))
            }
            ToolCall::ListTodos => Ok(ToolOutput::Text(Self::numbered(
                self.session.todos(),
                "[ ] ",
                "No todos yet.",
            ))),
            ToolCall::CompleteTodo { index } => {
                let done = self.session.complete_todo(index)?;
                Ok(ToolOutput::Text(format!("Completed: {}", done)))
            }
            ToolCall::ListDir { path, recursive } => {
                let dir = self.session.guard().resolve(&path)?;
                files::list_dir(&dir, recursive, self.limits.max_listing_entries)
                    .map(ToolOutput::Text)
            }
            ToolCall::ReadTextFile { path, max_bytes } => {
                let file = self.session.guard().resolve(&path)?;
                let max_bytes = max_bytes.unwrap_or(self.limits.max_read_bytes);
                files::read_text_file(&file, max_bytes).map(ToolOutput::Text)
            }
            ToolCall::WriteTextFile {
                path,
                content,
                confirm,
                overwrite,
            } => {
                let target = self.session.guard().resolve(&path)?;
                let mode = GateMode::from_flags(confirm, false);
                self.gate
                    .write(&target, &content, mode, overwrite)
                    .map(ToolOutput::Mutation)
            }
            ToolCall::AppendTextFile {
                path,
                content,
                confirm,
            } => {
                let target = self.session.guard().resolve(&path)?;
                let mode = GateMode::from_flags(confirm, false);
                self.gate
                    .append(&target, &content, mode)
                    .map(ToolOutput::Mutation)
            }
            ToolCall::SearchReplaceFile {
                path,
                find,
                replace,
                confirm,
                preview_only,
            } => {
                let target = self.session.guard().resolve(&path)?;
                let mode = GateMode::from_flags(confirm, preview_only);
                self.gate
                    .search_replace(&target, &find, &replace, mode)
                    .map(ToolOutput::Mutation)
            }
            ToolCall::RegexReplaceFile {
                path,
                pattern,
                replace,
                flags,
                confirm,
                preview_only,
            } => {
                let target = self.session.guard().resolve(&path)?;
                let mode = GateMode::from_flags(confirm, preview_only);
                self.gate
                    .regex_replace(&target, &pattern, &replace, &flags, mode)
                    .map(ToolOutput::Mutation)
            }
            ToolCall::RunGit { args, working_dir } => {
                self.run_command(Program::Git, &args, &working_dir).await
            }
            ToolCall::RunNpm { args, working_dir } => {
                self.run_command(Program::Npm, &args, &working_dir).await
            }
            ToolCall::CodeReviewSnippet {
                code,
                language,
                goals,
            } => Ok(ToolOutput::Text(review::code_review_snippet(
                &code,
                &language,
                &goals,
                self.limits.review_snippet_chars,
            ))),
            ToolCall::ProposeCommitMessage {
                changes_summary,
                style,
            } => Ok(ToolOutput::Text(review::propose_commit_message(
                &changes_summary,
                &style,
            ))),
        }
    }

    async fn run_command(
        &self,
        program: Program,
        args: &str,
        working_dir: &str,
    ) -> ToolResult<ToolOutput> {
        let command = self.allowlist.check(program, args)?;
        let cwd = self.session.guard().resolve(working_dir)?;
        let output = self.runner.run(&command, &cwd).await?;

        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_command(&output.command_line, cwd.path(), output.exit_code) {
                tracing::warn!(error = %e, "failed to write audit log");
            }
        }
        Ok(ToolOutput::Command(output))
    }

    fn numbered(items: &[String], marker: &str, empty: &str) -> String {
        if items.is_empty() {
            return empty.to_string();
        }
        items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}{}. {}", marker, i + 1, item))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Audit applied mutations and refusals; audit failures never fail the call
    fn record(&self, tool: &str, result: &ToolResult<ToolOutput>) {
        let Some(audit) = &self.audit else {
            return;
        };

        let written = match result {
            Ok(ToolOutput::Mutation(outcome)) if outcome.applied() => {
                let path = match outcome {
                    MutationOutcome::Written { path, .. }
                    | MutationOutcome::Appended { path, .. }
                    | MutationOutcome::Replaced { path, .. } => path,
                    _ => return,
                };
                audit.log_mutation(tool, path, &outcome.to_string())
            }
            Err(err) if err.is_rejection() => {
                audit.log_rejection(tool, &err.to_string(), self.session.root().path())
            }
            _ => return,
        };

        if let Err(e) = written {
            tracing::warn!(error = %e, "failed to write audit log");
        }
    }
}
