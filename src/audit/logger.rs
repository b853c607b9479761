use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Append-only record of everything the tool surface changed, ran or refused
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create a new AuditLogger with the default log path
    pub fn new() -> std::io::Result<Self> {
        let log_path = Self::default_log_path()?;
        Self::with_path(log_path)
    }

    /// Create an AuditLogger with a custom log path
    pub fn with_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let log_path = path.as_ref().to_path_buf();

        // Ensure directory exists
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { log_path })
    }

    /// Get the default log path: <config dir>/rootguard/audit.log
    pub fn default_log_path() -> std::io::Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no configuration directory for this platform",
            )
        })?;

        Ok(config_dir.join("rootguard").join("audit.log"))
    }

    /// Log a file mutation that was actually applied
    pub fn log_mutation(&self, tool: &str, path: &Path, summary: &str) -> std::io::Result<()> {
        self.write_entry(&format!(
            "[MUTATION] tool={} path=\"{}\" {}",
            tool,
            path.display(),
            summary
        ))
    }

    /// Log a command execution
    pub fn log_command(
        &self,
        command: &str,
        cwd: &Path,
        exit_code: Option<i32>,
    ) -> std::io::Result<()> {
        let exit = exit_code.map_or_else(|| "signal".to_string(), |code| code.to_string());
        self.write_entry(&format!(
            "[cwd:{}] [exit:{}] {}",
            cwd.display(),
            exit,
            command
        ))
    }

    /// Log a refused request for forensics
    ///
    /// Records confinement violations, blocked commands and refused overwrites. This
    /// helps spot an agent that keeps probing the edges of the jail.
    pub fn log_rejection(&self, tool: &str, reason: &str, root: &Path) -> std::io::Result<()> {
        self.write_entry(&format!(
            "[root:{}] [REJECTED] tool={} reason=\"{}\"",
            root.display(),
            tool,
            reason
        ))
    }

    /// Log a project root change
    pub fn log_root_change(&self, from: &Path, to: &Path) -> std::io::Result<()> {
        self.write_entry(&format!(
            "[ROOT] \"{}\" -> \"{}\"",
            from.display(),
            to.display()
        ))
    }

    fn write_entry(&self, body: &str) -> std::io::Result<()> {
        // Check and rotate log if needed
        self.rotate_if_needed()?;

        let timestamp = Utc::now().to_rfc3339();
        let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
        let log_entry = format!("[{}] [{}] {}\n", timestamp, user, body);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        file.write_all(log_entry.as_bytes())?;
        file.flush()?;

        Ok(())
    }

    /// Rotate log file if it exceeds MAX_LOG_SIZE
    fn rotate_if_needed(&self) -> std::io::Result<()> {
        if !self.log_path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(&self.log_path)?;
        if metadata.len() > MAX_LOG_SIZE {
            // Rotate: audit.log -> audit.log.1
            let backup_path = self.log_path.with_extension("log.1");
            fs::rename(&self.log_path, backup_path)?;
        }

        Ok(())
    }

    /// Get the path to the log file
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
