use std::io;
use std::path::PathBuf;
use thiserror::Error;

// Import module-level errors for AppError
use crate::config::settings::ConfigError;
use crate::security::allowlist::BlockReason;

/// Errors raised while establishing or changing the project root
#[derive(Debug, Error)]
pub enum RootError {
    #[error("Not a valid directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to resolve project root {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors a tool call can end in
///
/// None of these escape the tool boundary as faults: `tools::render` turns every
/// variant into a result string for the agent runtime. The `Display` text keeps the
/// `Refused:`, `Blocked` and `[command failed]` markers callers look for.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Refused: path outside project root ({}) -> {}", .root.display(), .path.display())]
    ConfinementViolation { path: PathBuf, root: PathBuf },

    #[error("Path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Blocked {program} command: {args:?} ({reason})")]
    BlockedCommand {
        program: String,
        args: String,
        reason: BlockReason,
    },

    #[error("[command failed] {0}")]
    ExecutionFailure(String),

    #[error("Refused: exists and overwrite=false -> {}", .0.display())]
    OverwriteRefused(PathBuf),

    #[error("Refused: {0}")]
    InvalidArgument(String),

    #[error("Invalid index: {0}")]
    InvalidIndex(i64),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Root(#[from] RootError),
}

impl ToolError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ToolError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the rejections the jail itself produces (as opposed to I/O faults)
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ToolError::ConfinementViolation { .. }
                | ToolError::BlockedCommand { .. }
                | ToolError::OverwriteRefused(_)
        )
    }
}

/// Top-level application error that wraps all module-specific errors
///
/// Used by the binary during startup. Once the tool loop is running, failures are
/// rendered per call and never reach this type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Project root error: {0}")]
    Root(#[from] RootError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Tool protocol error: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for tool operations
pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
