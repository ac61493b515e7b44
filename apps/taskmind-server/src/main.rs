use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modkit::{DbOptions, ModuleEntry, ModuleRegistry, RunOptions, ShutdownOptions};
use modkit_db::{absolutize_sqlite_dsn, ConnectOpts, DbHandle};
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// TaskMind Server - personal task planner with an LLM assistant
#[derive(Parser)]
#[command(name = "taskmind-server")]
#[command(about = "TaskMind Server - personal task planner with an LLM assistant")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // home_dir is normalized (absolute, created) by the loader
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, config.home_dir());
    tracing::info!("TaskMind Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
    }
}

fn build_registry() -> Result<ModuleRegistry> {
    let ingress = Arc::new(api_ingress::ApiIngress::default());
    let accounts = Arc::new(accounts::AccountsModule::new());
    let tasks = Arc::new(tasks::TasksModule::new());
    let assistant = Arc::new(assistant::AssistantModule::new());

    let mut builder = ModuleRegistry::builder();
    builder
        .register(
            ModuleEntry::new(api_ingress::MODULE_NAME, ingress.clone())
                .with_rest_host(ingress.clone())
                .with_stateful(ingress),
        )
        .register(
            ModuleEntry::new(accounts::MODULE_NAME, accounts.clone())
                .with_db(accounts.clone())
                .with_rest(accounts.clone())
                .with_stateful(accounts),
        )
        .register(
            ModuleEntry::new(tasks::MODULE_NAME, tasks.clone())
                .depends_on(&[accounts::MODULE_NAME])
                .with_db(tasks.clone())
                .with_rest(tasks),
        )
        .register(
            ModuleEntry::new(assistant::MODULE_NAME, assistant.clone())
                .depends_on(&[accounts::MODULE_NAME, tasks::MODULE_NAME])
                .with_rest(assistant),
        );
    Ok(builder.build()?)
}

async fn connect_db(db_config: &DatabaseConfig, home_dir: &Path) -> Result<DbHandle> {
    let raw = db_config.url.trim();
    if raw.is_empty() {
        anyhow::bail!("Database URL not configured");
    }
    // Relative sqlite paths resolve against home_dir, not the cwd
    let dsn = absolutize_sqlite_dsn(raw, home_dir);

    let opts = ConnectOpts {
        max_conns: db_config.max_conns,
        busy_timeout: db_config
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(ms as u64)),
        ..Default::default()
    };

    tracing::info!(dsn = %dsn, "connecting to database");
    DbHandle::connect(&dsn, opts)
        .await
        .with_context(|| format!("failed to open database '{dsn}'"))
}

async fn run_server(mut config: AppConfig) -> Result<()> {
    tracing::info!("Initializing modules...");

    // server.host/port feed the ingress unless modules.api_ingress sets its own
    let bind_addr = config.server.bind_addr();
    config.seed_module_value(api_ingress::MODULE_NAME, "bind_addr", bind_addr.into());
    if config.server.timeout_sec > 0 {
        config.seed_module_value(
            api_ingress::MODULE_NAME,
            "timeout_secs",
            config.server.timeout_sec.into(),
        );
    }

    let db = match config.database.as_ref() {
        Some(db_config) => DbOptions::Handle(Arc::new(
            connect_db(db_config, config.home_dir()).await?,
        )),
        None => {
            tracing::warn!("No database configuration found, running without database");
            DbOptions::None
        }
    };

    let modules_cfg: HashMap<String, serde_json::Value> = config.modules.clone();
    modkit::run(RunOptions {
        registry: build_registry()?,
        modules_cfg: Arc::new(modules_cfg),
        db,
        shutdown: ShutdownOptions::Signals,
    })
    .await
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    build_registry()?;

    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);
    Ok(())
}
