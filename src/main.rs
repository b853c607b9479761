use clap::Parser;
use rootguard::audit::AuditLogger;
use rootguard::config::Config;
use rootguard::tools::tool_definitions;
use rootguard::host;
use rootguard::{AppResult, ProjectRoot, Session, Toolbox};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Serve root-confined file, git and npm tools to an agent runtime over stdin/stdout
#[derive(Parser)]
#[command(name = "rootguard", version, about)]
struct Cli {
    /// Project root; overrides PROJECT_ROOT and marker discovery
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Config file to load instead of the default location
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the tool definitions as JSON and exit
    #[arg(long)]
    list_tools: bool,

    /// Do not write the audit log
    #[arg(long)]
    no_audit: bool,

    /// Write a default config file (at --config or the default location) and exit
    #[arg(long)]
    init_config: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the protocol; diagnostics go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    if cli.list_tools {
        println!("{}", serde_json::to_string_pretty(&tool_definitions())?);
        return Ok(());
    }

    if cli.init_config {
        let path = match &cli.config {
            Some(path) => path.clone(),
            None => Config::config_path()?,
        };
        if Config::init_at(&path)? {
            println!("Wrote default config to {}", path.display());
        } else {
            println!("Config already exists at {}; left unchanged", path.display());
        }
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if !config.has_api_key() {
        tracing::warn!(
            var = %config.agent.api_key_env,
            "API key not set; the agent runtime will not be able to reach the model"
        );
    }

    let cwd = std::env::current_dir()?;
    let explicit = cli.root.clone().or_else(Config::root_override);
    let root = ProjectRoot::at_startup(explicit.as_deref(), &cwd, &config.root.markers)?;
    tracing::info!(root = %root, "project root resolved");

    let mut toolbox = Toolbox::new(Session::new(root), config.limits.clone());
    if config.audit.enabled && !cli.no_audit {
        let logger = match &config.audit.log_path {
            Some(path) => AuditLogger::with_path(path),
            None => AuditLogger::new(),
        };
        match logger {
            Ok(logger) => toolbox = toolbox.with_audit(logger),
            Err(e) => tracing::warn!(error = %e, "audit log unavailable; continuing without it"),
        }
    }

    let stdin = BufReader::new(tokio::io::stdin());
    host::serve(&mut toolbox, stdin, tokio::io::stdout()).await
}
