//! HTTP server wiring for Linkage.
//!
//! Loads [`ServerConfig`], opens the SQLite store, and wraps the
//! `linkage-api` router with request tracing.

pub mod error;

pub use error::{Error, Result};

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::Router;
use linkage_core::store::IdentityStore;
use linkage_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `LINKAGE_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// Upper bound on waiting for the per-email/phone locks of a request.
  pub lock_timeout_ms: u64,
  /// SQLite busy handler; relevant when another process shares the file.
  pub busy_timeout_ms: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "0.0.0.0".to_string(),
      port:            3000,
      store_path:      PathBuf::from("linkage.db"),
      lock_timeout_ms: 5_000,
      busy_timeout_ms: 5_000,
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `LINKAGE_*` environment
  /// variables. Missing keys fall back to [`ServerConfig::default`].
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("LINKAGE").try_parsing(true))
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn lock_timeout(&self) -> Duration {
    Duration::from_millis(self.lock_timeout_ms)
  }

  pub fn busy_timeout(&self) -> Duration {
    Duration::from_millis(self.busy_timeout_ms)
  }
}

/// Open the SQLite store named by `config`, creating the schema if needed.
pub async fn open_store(config: &ServerConfig) -> Result<SqliteStore> {
  let store = SqliteStore::open(expand_tilde(&config.store_path))
    .await?
    .with_lock_timeout(config.lock_timeout());
  store.set_busy_timeout(config.busy_timeout()).await?;
  Ok(store)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full HTTP router: the JSON API plus request tracing.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: IdentityStore + 'static,
{
  linkage_api::api_router(store).layer(TraceLayer::new_for_http())
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use tower::ServiceExt as _;

  fn temp_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir()
      .join(format!("linkage-{name}-{}.toml", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
  }

  #[test]
  fn missing_file_yields_defaults() {
    let path = std::env::temp_dir().join("linkage-does-not-exist.toml");
    let config = ServerConfig::load(&path).unwrap();
    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.address(), "0.0.0.0:3000");
  }

  #[test]
  fn file_overrides_selected_keys() {
    let path = temp_config(
      "partial",
      "port = 8080\nstore_path = \"/var/lib/linkage/contacts.db\"\nlock_timeout_ms = 250\n",
    );
    let config = ServerConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.port, 8080);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.store_path, PathBuf::from("/var/lib/linkage/contacts.db"));
    assert_eq!(config.lock_timeout(), Duration::from_millis(250));
    assert_eq!(config.busy_timeout(), Duration::from_secs(5));
  }

  #[test]
  fn tilde_expands_only_as_prefix() {
    let plain = Path::new("/tmp/linkage.db");
    assert_eq!(expand_tilde(plain), plain.to_path_buf());
    let odd = Path::new("data/~/linkage.db");
    assert_eq!(expand_tilde(odd), odd.to_path_buf());
  }

  #[tokio::test]
  async fn router_serves_identify() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = router(Arc::new(store));

    let req = Request::builder()
      .method("POST")
      .uri("/identify")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(r#"{"email":"mcfly@hillvalley.edu","phoneNumber":"123456"}"#))
      .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["primaryContactId"], 1);
  }

  #[tokio::test]
  async fn unknown_route_returns_404() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let req = Request::builder().uri("/identify/extra").body(Body::empty()).unwrap();
    let resp = router(Arc::new(store)).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
