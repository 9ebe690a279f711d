mod app;
mod cache;
mod config;
mod error;
mod event;
mod todo;
mod ui;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use todo::{AppSyncClient, CachedTodoClient};

#[derive(Parser, Debug)]
#[command(name = "todosync")]
#[command(about = "Create and list AppSync todos with optimistic local caching")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/todosync/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// GraphQL endpoint, overriding the configured one
  #[arg(short, long)]
  endpoint: Option<String>,
}

/// Log to a daily file, since the terminal belongs to the UI.
fn init_logging() -> Result<WorkerGuard> {
  let log_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?
    .join("todosync")
    .join("logs");
  std::fs::create_dir_all(&log_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;

  let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(
    &log_dir,
    "todosync.log",
  ));

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("todosync=info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = init_logging()?;

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Override endpoint if specified on command line
  if let Some(endpoint) = args.endpoint {
    config.appsync.graphql_endpoint = endpoint;
    config.validate()?;
  }

  info!(
    "Using {} in {} ({:?})",
    config.appsync.graphql_endpoint, config.appsync.region, config.appsync.auth_type
  );

  // One client for the lifetime of the process
  let remote = AppSyncClient::new(&config)?;
  let todos = CachedTodoClient::new(remote);
  let sample = config.sample_todo.to_input()?;

  // Initialize and run the app
  let mut app = app::App::new(todos, sample, config.appsync.graphql_endpoint.clone());
  app.run().await?;

  Ok(())
}
