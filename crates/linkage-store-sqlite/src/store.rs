//! [`SqliteStore`] — the SQLite implementation of [`IdentityStore`].

use std::{path::Path, sync::Arc, time::Duration};

use linkage_core::{
  contact::{Contact, ContactId},
  identity::{IdentifyRequest, Identity},
  lock::KeyLocks,
  pipeline,
  repository::ContactRepository as _,
  store::IdentityStore,
};
use rusqlite::TransactionBehavior;
use tracing::debug;

use crate::{Result, repository::ConnRepository, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Linkage identity store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection and the key locks are
/// reference-counted, so clones serialize against each other.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  locks: Arc<KeyLocks>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, locks: Arc::default() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, locks: Arc::default() };
    store.init_schema().await?;
    Ok(store)
  }

  /// Bound how long an identify request waits for its key locks.
  pub fn with_lock_timeout(self, timeout: Duration) -> Self {
    Self {
      locks: Arc::new(KeyLocks::new(timeout)),
      ..self
    }
  }

  /// How long SQLite retries when another process holds the write lock.
  pub async fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.busy_timeout(timeout)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` inside one transaction; commit only if it succeeds.
  ///
  /// Any error, including one raised after earlier writes, drops the
  /// transaction and rolls every write back.
  pub(crate) async fn in_transaction<T, F>(&self, behavior: TransactionBehavior, f: F) -> Result<T>
  where
    F: FnOnce(&ConnRepository<'_>) -> linkage_core::Result<T> + Send + 'static,
    T: Send + 'static,
  {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(behavior)?;
        let outcome = f(&ConnRepository::new(&tx));
        if outcome.is_ok() {
          tx.commit()?;
        }
        Ok(outcome)
      })
      .await?;
    Ok(outcome?)
  }

  #[cfg(test)]
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }

  #[cfg(test)]
  pub(crate) fn locks(&self) -> &KeyLocks { &self.locks }
}

// ─── IdentityStore impl ──────────────────────────────────────────────────────

impl IdentityStore for SqliteStore {
  type Error = crate::Error;

  async fn identify(&self, request: IdentifyRequest) -> Result<Identity> {
    let _guard = self.locks.acquire(request.lock_keys()).await?;
    debug!(email = request.email(), phone_number = request.phone_number(), "identify");

    // IMMEDIATE takes SQLite's write lock up front, so a second process
    // cannot interleave between our match read and our writes.
    self
      .in_transaction(TransactionBehavior::Immediate, move |repo| {
        pipeline::identify(repo, &request)
      })
      .await
  }

  async fn get_contact(&self, id: ContactId) -> Result<Option<Contact>> {
    self
      .conn
      .call(move |conn| Ok(ConnRepository::new(conn).get(id)))
      .await?
  }

  async fn list_contacts(&self) -> Result<Vec<Contact>> {
    self
      .conn
      .call(|conn| Ok(ConnRepository::new(conn).all()))
      .await?
  }

  async fn identity_of(&self, id: ContactId) -> Result<Option<Identity>> {
    self
      .in_transaction(TransactionBehavior::Deferred, move |repo| {
        pipeline::identity_of(repo, id)
      })
      .await
  }
}
