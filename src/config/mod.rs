pub mod settings;

pub use settings::{AgentConfig, AuditConfig, Config, ConfigError, LimitsConfig, RootConfig};
