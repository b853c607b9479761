pub mod executor;

// Re-export commonly used types
pub use executor::{CommandOutput, CommandRunner, DEFAULT_COMMAND_TIMEOUT, DEFAULT_MAX_OUTPUT_CHARS};
