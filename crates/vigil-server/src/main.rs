//! `vigil` — the dead man's switch server.
//!
//! Reads `config.toml` (or the path given with `--config`) and the
//! environment, then runs one of:
//!
//! - `serve` (default): HTTP API, bot webhook, and the watchdog
//! - `poll`: the bot alone, long-polling Telegram for updates
//! - `set-webhook`: point Telegram at this server's `/webhook`

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio::{net::TcpListener, sync::watch};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vigil_api::ApiState;
use vigil_server::ServerConfig;
use vigil_store_sqlite::SqliteStore;
use vigil_telegram::{ApiClient, Bot, TelegramClient};
use vigil_watchdog::Watchdog;

#[derive(Parser)]
#[command(author, version, about = "Vigil check-in server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the API and webhook, and run the watchdog.
  Serve,
  /// Run the bot with `getUpdates` long polling instead of a webhook.
  Poll,
  /// Register the webhook URL with Telegram and exit.
  SetWebhook {
    /// Overrides `webhook_url` from the configuration.
    #[arg(long)]
    url: Option<String>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(cfg).await,
    Command::Poll => poll(cfg).await,
    Command::SetWebhook { url } => set_webhook(cfg, url).await,
  }
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let db_path = expand_tilde(&cfg.database_path);
  if let Some(parent) = db_path.parent() {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open database at {db_path:?}"))?;
  let registry = Arc::new(store);

  let telegram = Arc::new(
    TelegramClient::new(cfg.telegram()).context("failed to build Telegram client")?,
  );
  let api_client =
    Arc::new(ApiClient::new(cfg.api_base_url.clone()).context("failed to build API client")?);

  let watchdog = Watchdog::new(
    Arc::clone(&registry),
    Arc::clone(&telegram),
    cfg.staleness(),
    cfg.watchdog(),
  )
  .spawn();

  let app = vigil_server::router(
    ApiState::new(registry, cfg.staleness()),
    Bot::new(api_client, telegram),
  );
  let address = cfg.bind_address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  let served = axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error");

  watchdog.stop().await;
  served
}

async fn poll(cfg: ServerConfig) -> anyhow::Result<()> {
  let telegram = Arc::new(
    TelegramClient::new(cfg.telegram()).context("failed to build Telegram client")?,
  );
  let api_client =
    Arc::new(ApiClient::new(cfg.api_base_url.clone()).context("failed to build API client")?);

  // getUpdates is refused while a webhook is registered.
  telegram
    .delete_webhook()
    .await
    .context("failed to clear the webhook")?;

  let bot = Bot::new(api_client, Arc::clone(&telegram));
  let (stop_tx, stop_rx) = watch::channel(false);
  let signal = tokio::spawn(async move {
    shutdown_signal().await;
    let _ = stop_tx.send(true);
  });

  bot
    .run_polling(telegram.as_ref(), cfg.polling(), stop_rx)
    .await;
  signal.abort();
  Ok(())
}

async fn set_webhook(cfg: ServerConfig, url: Option<String>) -> anyhow::Result<()> {
  let Some(url) = url.or(cfg.webhook_url.clone()) else {
    anyhow::bail!("no webhook URL: pass --url or set webhook_url");
  };
  let telegram = TelegramClient::new(cfg.telegram()).context("failed to build Telegram client")?;
  telegram
    .set_webhook(&url)
    .await
    .with_context(|| format!("failed to set webhook to {url}"))?;
  tracing::info!(url = %url, "webhook registered");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
