//! Error types for `linkage-core`.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::contact::ContactId;

/// Machine-readable classification of an [`Error`], surfaced to clients
/// alongside the human-readable message.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::AsRefStr, strum::Display,
)]
pub enum ErrorKind {
  InvalidInput,
  NotFound,
  StorageUnavailable,
  LockTimeout,
  ConsistencyViolation,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("contact not found: {0}")]
  ContactNotFound(ContactId),

  #[error("storage unavailable: {0}")]
  StorageUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("timed out after {waited:?} waiting for lock on {key:?}")]
  LockTimeout { key: String, waited: Duration },

  #[error("consistency violation: {0}")]
  ConsistencyViolation(String),
}

impl Error {
  /// Wrap a backend error. Every storage failure aborts the surrounding
  /// transaction, so callers may retry the whole request.
  pub fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StorageUnavailable(Box::new(e))
  }

  pub fn consistency(message: impl Into<String>) -> Self {
    Self::ConsistencyViolation(message.into())
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::InvalidInput(_) => ErrorKind::InvalidInput,
      Self::ContactNotFound(_) => ErrorKind::NotFound,
      Self::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
      Self::LockTimeout { .. } => ErrorKind::LockTimeout,
      Self::ConsistencyViolation(_) => ErrorKind::ConsistencyViolation,
    }
  }

  pub fn is_retryable(&self) -> bool {
    matches!(
      self.kind(),
      ErrorKind::StorageUnavailable | ErrorKind::LockTimeout
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
