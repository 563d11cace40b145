//! Happy Tails server binary.
//!
//! Reads `tails.toml` (or the path given with `--config`) plus `TAILS_*`
//! environment variables, opens the SQLite store, and serves the JSON API.
//!
//! # Bootstrapping an administrator
//!
//! Admin rights can only be granted by another admin, so the first one is
//! promoted from the command line:
//!
//! ```
//! tails --grant-admin someone@example.com
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use tails_api::{AppState, ServerConfig};
use tails_core::store::TailsStore;
use tails_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Happy Tails adoption API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "tails.toml")]
  config: PathBuf,

  /// Mark the account with this email as an administrator and exit.
  #[arg(long, value_name = "EMAIL")]
  grant_admin: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let mut server_cfg = load_config(&cli.config)?;
  server_cfg.store_path = expand_tilde(&server_cfg.store_path);
  server_cfg.upload_dir = expand_tilde(&server_cfg.upload_dir);

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  if let Some(email) = cli.grant_admin {
    return grant_admin(&store, &email).await;
  }

  if server_cfg.jwt_secret.trim().is_empty() {
    anyhow::bail!("jwt_secret must be set (TAILS_JWT_SECRET or tails.toml)");
  }
  if server_cfg.google.is_none() {
    tracing::info!("google sign-in is not configured");
  }

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState::new(store, server_cfg)
    .await
    .context("failed to prepare upload directory")?;
  let app = tails_api::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("server stopped");
  Ok(())
}

/// Layer defaults, the optional config file and `TAILS_*` variables.
/// Nested keys use a double underscore, e.g. `TAILS_GOOGLE__CLIENT_ID`.
fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .set_default("host", "0.0.0.0")?
    .set_default("port", 8080)?
    .set_default("store_path", "tails.db")?
    .set_default("upload_dir", "uploads")?
    .set_default("jwt_secret", "")?
    .set_default("token_ttl_days", 7)?
    .set_default("max_upload_bytes", 5 * 1024 * 1024)?
    .add_source(config::File::from(path.to_path_buf()).required(false))
    .add_source(
      config::Environment::with_prefix("TAILS")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("cors_origins"),
    )
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

async fn grant_admin(store: &SqliteStore, email: &str) -> anyhow::Result<()> {
  let email = email.trim().to_lowercase();
  let credentials = store
    .credentials_by_email(email.clone())
    .await
    .context("failed to look up account")?
    .with_context(|| format!("no account registered for {email}"))?;
  let user = store
    .set_admin(credentials.user_id, true)
    .await
    .context("failed to update account")?;
  println!("{} (id {}) is now an administrator", user.email, user.id);
  Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to install Ctrl+C handler");
      std::future::pending::<()>().await;
    }
    tracing::info!("received Ctrl+C, shutting down");
  };

  #[cfg(unix)]
  let terminate = async {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
        tracing::info!("received terminate signal, shutting down");
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to install signal handler");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
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
