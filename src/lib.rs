pub mod audit;
pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod mutation;
pub mod root;
pub mod security;
pub mod session;
pub mod text;
pub mod tools;

// Re-export commonly used types for convenience
pub use error::{AppError, AppResult, RootError, ToolError, ToolResult};
pub use root::ProjectRoot;
pub use session::Session;
pub use tools::{ToolCall, ToolOutput, Toolbox, render};
