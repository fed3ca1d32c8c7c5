use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use taskd::{
    cli::{status, tasks},
    client::ApiClient,
    config::ServerConfig,
    storage::Storage,
    ui::TaskUi,
    AppContext,
};

#[derive(Parser)]
#[command(
    name = "taskd",
    about = "taskd — task-list API service and terminal client",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP API port
    #[arg(long, env = "TASKD_PORT")]
    port: Option<u16>,

    /// Data directory for config and the SQLite database
    #[arg(long, env = "TASKD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKD_LOG")]
    log: Option<String>,

    /// Bind address for the HTTP server (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "TASKD_BIND")]
    bind_address: Option<String>,

    /// Base URL of the task API for client commands (default: http://127.0.0.1:<port>/api)
    #[arg(long, env = "TASKD_API_URL")]
    api_url: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "TASKD_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the task API server (default when no subcommand given).
    ///
    /// Runs taskd in the foreground. When invoked with no subcommand, this is the default.
    ///
    /// Examples:
    ///   taskd serve
    ///   taskd
    Serve,
    /// Open the interactive terminal task list.
    ///
    /// Connects to the running server, fetches the current tasks, and lets
    /// you add, toggle, and remove them full-screen.
    ///
    /// Examples:
    ///   taskd ui
    ///   taskd ui --api-url http://192.168.1.10:5000/api
    Ui,
    /// Manage tasks from the command line.
    ///
    /// One-shot equivalents of the terminal UI actions, for scripting.
    /// All task commands require the server to be running.
    ///
    /// Examples:
    ///   taskd tasks list
    ///   taskd tasks add "buy milk"
    ///   taskd tasks toggle <task-id>
    ///   taskd tasks remove <task-id>
    Tasks {
        #[command(subcommand)]
        action: TasksAction,
    },
    /// Show server status (reachable, version, task count).
    ///
    /// Connects to the running server and prints a summary line.
    /// Exits 0 if healthy, 1 if stopped or unresponsive.
    ///
    /// Examples:
    ///   taskd status
    ///   taskd status --json
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TasksAction {
    /// List all tasks, newest first.
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a task.
    Add {
        /// Task text
        text: String,
    },
    /// Toggle a task's completion state.
    Toggle {
        /// Task id
        id: String,
    },
    /// Remove a task.
    Remove {
        /// Task id
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServerConfig::new(
        args.port,
        args.data_dir,
        args.log,
        args.bind_address,
        args.api_url,
    );

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let _guard = setup_logging(&config.log, args.log_file.as_deref(), &config.log_format);
            run_serve(config).await
        }
        Command::Ui => {
            // Logs would corrupt the alternate screen, so only file logging
            // applies here. Without --log-file, client failures are dropped.
            let _guard = args
                .log_file
                .as_deref()
                .and_then(|path| setup_file_logging(&config.log, path, &config.log_format));
            let client = ApiClient::new(&config.api_base_url)?;
            TaskUi::new(client).run().await
        }
        Command::Tasks { action } => {
            let client = ApiClient::new(&config.api_base_url)?;
            match action {
                TasksAction::List { json } => tasks::run_list(&client, json).await,
                TasksAction::Add { text } => tasks::run_add(&client, &text).await,
                TasksAction::Toggle { id } => tasks::run_toggle(&client, &id).await,
                TasksAction::Remove { id } => tasks::run_remove(&client, &id).await,
            }
        }
        Command::Status { json } => {
            let client = ApiClient::new(&config.api_base_url)?;
            status::run_status(&client, json).await
        }
    }
}

async fn run_serve(config: ServerConfig) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.port,
        data_dir = %config.data_dir.display(),
        "starting taskd"
    );

    let storage = Arc::new(Storage::new(&config.data_dir).await?);
    let ctx = Arc::new(AppContext {
        config: Arc::new(config),
        storage,
        started_at: std::time::Instant::now(),
    });

    taskd::rest::start_rest_server(ctx).await
}

/// Initialize a file-only tracing subscriber for the terminal UI.
/// Returns `None` (and stays silent) when the log directory cannot be created.
fn setup_file_logging(
    log_level: &str,
    path: &std::path::Path,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let filename = path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("taskd.log"));
    std::fs::create_dir_all(dir).ok()?;

    let appender = tracing_appender::rolling::daily(dir, filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(EnvFilter::new(log_level))
            .with(fmt::layer().json().with_writer(non_blocking))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(EnvFilter::new(log_level))
            .with(fmt::layer().with_writer(non_blocking))
            .init();
    }
    Some(guard)
}

/// Initialize the tracing subscriber.
/// If `log_file` is set, logs go to both stdout and a daily-rolling file.
/// Returns a `WorkerGuard` that must stay alive for the process lifetime.
///
/// `log_format` may be `"pretty"` (default, human-readable compact format) or
/// `"json"` (structured JSON for log aggregators).
///
/// If the log directory cannot be created, falls back to stdout-only logging
/// with a warning — never panics.
fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("taskd.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_writer(non_blocking))
                .init();
        }

        Some(guard)
    } else if use_json {
        tracing_subscriber::fmt().json().with_env_filter(log_level).init();
        None
    } else {
        tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        None
    }
}
