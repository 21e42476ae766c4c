//! linkage server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), layers
//! `LINKAGE_*` environment variables on top, opens the SQLite store, and
//! serves the identify API over HTTP.
//!
//! # Preparing a database
//!
//! ```
//! cargo run -p linkage-server --bin server -- --init-db
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use linkage_server::{ServerConfig, open_store};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Linkage identity reconciliation server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create the database schema and exit without serving.
  #[arg(long)]
  init_db: bool,
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

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  let store = open_store(&server_cfg).await.with_context(|| {
    format!("failed to open store at {:?}", server_cfg.store_path)
  })?;

  if cli.init_db {
    tracing::info!(path = ?server_cfg.store_path, "database initialised");
    return Ok(());
  }

  let app = linkage_server::router(Arc::new(store));
  let address = server_cfg.address();

  tracing::info!(
    lock_timeout_ms = server_cfg.lock_timeout_ms,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
