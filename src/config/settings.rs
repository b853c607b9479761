use crate::root::{DEFAULT_PROJECT_MARKERS, ROOT_OVERRIDE_ENV};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub root: RootConfig,
    pub limits: LimitsConfig,
    pub agent: AgentConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RootConfig {
    /// Names whose presence marks a project root during discovery
    pub markers: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_read_bytes: u64,
    pub preview_chars: usize,
    pub command_timeout_seconds: u64,
    pub max_command_output_chars: usize,
    pub max_listing_entries: usize,
    pub review_snippet_chars: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AgentConfig {
    /// Environment variable holding the model API credential
    pub api_key_env: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            markers: DEFAULT_PROJECT_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_read_bytes: 400_000,
            preview_chars: 1200,
            command_timeout_seconds: 180,
            max_command_output_chars: 15_000,
            max_listing_entries: 2000,
            review_snippet_chars: 8000,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_path: None,
        }
    }
}

impl LimitsConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_seconds)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::DirectoryNotFound)?;
        Ok(base.join("rootguard"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location
    ///
    /// A missing file is not an error: defaults apply.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        // Validate config
        config.validate()?;

        Ok(config)
    }

    /// Write a default config file at `path` unless one already exists
    ///
    /// Returns whether a file was written.
    pub fn init_at(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Validate before saving
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        // Set permissions to 600 (owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.root.markers.is_empty() {
            return Err(ConfigError::InvalidValue(
                "root.markers must list at least one marker".to_string(),
            ));
        }

        if self.root.markers.iter().any(|m| m.is_empty() || m.contains('/')) {
            return Err(ConfigError::InvalidValue(
                "root.markers entries must be plain file or directory names".to_string(),
            ));
        }

        let limits = [
            ("max_read_bytes", self.limits.max_read_bytes == 0),
            ("preview_chars", self.limits.preview_chars == 0),
            (
                "command_timeout_seconds",
                self.limits.command_timeout_seconds == 0,
            ),
            (
                "max_command_output_chars",
                self.limits.max_command_output_chars == 0,
            ),
            ("max_listing_entries", self.limits.max_listing_entries == 0),
            ("review_snippet_chars", self.limits.review_snippet_chars == 0),
        ];
        for (name, is_zero) in limits {
            if is_zero {
                return Err(ConfigError::InvalidValue(format!(
                    "limits.{} must be greater than 0",
                    name
                )));
            }
        }

        if self.agent.api_key_env.is_empty() {
            return Err(ConfigError::InvalidValue(
                "agent.api_key_env must name an environment variable".to_string(),
            ));
        }

        Ok(())
    }

    /// Check if the agent credential is present in the environment
    ///
    /// Only presence is checked; the credential is consumed by the agent runtime.
    pub fn has_api_key(&self) -> bool {
        std::env::var(&self.agent.api_key_env).is_ok_and(|key| !key.is_empty())
    }

    /// Project root pre-seeded through `PROJECT_ROOT`, if any
    pub fn root_override() -> Option<PathBuf> {
        std::env::var_os(ROOT_OVERRIDE_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }
}
