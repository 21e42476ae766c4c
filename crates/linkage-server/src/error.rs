//! Error type for server bootstrap.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("store error: {0}")]
  Store(#[from] linkage_store_sqlite::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
