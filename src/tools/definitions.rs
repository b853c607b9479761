use serde::Serialize;
use serde_json::{Value, json};

/// Name, description and JSON-schema parameters of one tool, as advertised to the agent
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

fn define(name: &'static str, description: &'static str, parameters: Value) -> ToolDefinition {
    ToolDefinition {
        name,
        description,
        parameters,
    }
}

fn no_parameters() -> Value {
    json!({"type": "object", "properties": {}})
}

/// Every tool the surface exposes
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        define(
            "show_project_root",
            "Show the current project root. All file and command tools are confined to it.",
            no_parameters(),
        ),
        define(
            "set_project_root",
            "Change the project root. Relative paths resolve against the current root.",
            json!({
                "type": "object",
                "properties": {"path": {"type": "string"}},
                "required": ["path"]
            }),
        ),
        define("ping", "Health check. Returns pong.", no_parameters()),
        define(
            "add_note",
            "Save a note in session memory.",
            json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            }),
        ),
        define("list_notes", "List saved notes.", no_parameters()),
        define(
            "add_todo",
            "Add an item to the session todo list.",
            json!({
                "type": "object",
                "properties": {"item": {"type": "string"}},
                "required": ["item"]
            }),
        ),
        define("list_todos", "List open todos.", no_parameters()),
        define(
            "complete_todo",
            "Complete and remove a todo by its 1-based index.",
            json!({
                "type": "object",
                "properties": {"index": {"type": "integer"}},
                "required": ["index"]
            }),
        ),
        define(
            "list_dir",
            "List a directory inside the project root, optionally recursively.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "default": "."},
                    "recursive": {"type": "boolean", "default": false}
                }
            }),
        ),
        define(
            "read_text_file",
            "Read a UTF-8 text file inside the project root. Large files are truncated.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"},
                    "max_bytes": {"type": "integer"}
                },
                "required": ["path"]
            }),
        ),
        define(
            "write_text_file",
            "Write a text file. Dry run unless confirm=true.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"},
                    "content": {"type": "string"},
                    "confirm": {"type": "boolean", "default": false},
                    "overwrite": {"type": "boolean", "default": true}
                },
                "required": ["path", "content"]
            }),
        ),
        define(
            "append_text_file",
            "Append text to a file. Dry run unless confirm=true.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"},
                    "content": {"type": "string"},
                    "confirm": {"type": "boolean", "default": false}
                },
                "required": ["path", "content"]
            }),
        ),
        define(
            "search_replace_file",
            "Replace every literal occurrence of a string in a file. Dry run unless confirm=true; preview_only shows old and new heads.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"},
                    "find": {"type": "string"},
                    "replace": {"type": "string"},
                    "confirm": {"type": "boolean", "default": false},
                    "preview_only": {"type": "boolean", "default": false}
                },
                "required": ["path", "find", "replace"]
            }),
        ),
        define(
            "regex_replace_file",
            "Regex replace in a file. Flags: i (ignore case), m (multiline), s (dot matches newline). Dry run unless confirm=true.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"},
                    "pattern": {"type": "string"},
                    "replace": {"type": "string"},
                    "flags": {"type": "string", "default": ""},
                    "confirm": {"type": "boolean", "default": false},
                    "preview_only": {"type": "boolean", "default": false}
                },
                "required": ["path", "pattern", "replace"]
            }),
        ),
        define(
            "run_git",
            "Run an allowlisted git command (status, diff, log, show, rev-parse, branch, add, restore, checkout, commit, switch).",
            json!({
                "type": "object",
                "properties": {
                    "args": {"type": "string"},
                    "working_dir": {"type": "string", "default": "."}
                },
                "required": ["args"]
            }),
        ),
        define(
            "run_npm",
            "Run an allowlisted npm command (install, run, test, ci).",
            json!({
                "type": "object",
                "properties": {
                    "args": {"type": "string"},
                    "working_dir": {"type": "string", "default": "."}
                },
                "required": ["args"]
            }),
        ),
        define(
            "code_review_snippet",
            "Prepare a structured review request for a code snippet. Nothing is executed.",
            json!({
                "type": "object",
                "properties": {
                    "code": {"type": "string"},
                    "language": {"type": "string", "default": "auto"},
                    "goals": {"type": "string", "default": ""}
                },
                "required": ["code"]
            }),
        ),
        define(
            "propose_commit_message",
            "Draft a commit message from a short summary of the changes.",
            json!({
                "type": "object",
                "properties": {
                    "changes_summary": {"type": "string"},
                    "style": {"type": "string", "default": "conventional"}
                },
                "required": ["changes_summary"]
            }),
        ),
    ]
}
