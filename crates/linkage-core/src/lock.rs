//! Per-key serialization guard.
//!
//! Each identify request locks one key per value it carries
//! (`email:<value>`, `phone:<value>`). Two requests that share any value
//! therefore run one after the other; disjoint requests run in parallel.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
  time::Duration,
};

use tokio::{
  sync::{Mutex as AsyncMutex, OwnedMutexGuard},
  time::Instant,
};

use crate::{Error, Result};

/// Default bound on how long a request waits for its keys.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

type Slot = Arc<AsyncMutex<()>>;

#[derive(Debug)]
pub struct KeyLocks {
  slots:   Mutex<HashMap<String, Slot>>,
  timeout: Duration,
}

/// Holds every acquired key until dropped.
#[derive(Debug)]
pub struct KeyGuard {
  _held: Vec<OwnedMutexGuard<()>>,
}

impl Default for KeyLocks {
  fn default() -> Self { Self::new(DEFAULT_LOCK_TIMEOUT) }
}

impl KeyLocks {
  pub fn new(timeout: Duration) -> Self {
    Self {
      slots: Mutex::new(HashMap::new()),
      timeout,
    }
  }

  /// Acquire all `keys` under a single deadline.
  ///
  /// Keys are taken in sorted order, so two callers with overlapping key sets
  /// never wait on each other in a cycle. Fails with [`Error::LockTimeout`]
  /// naming the first key that could not be taken in time; keys already held
  /// are released on return.
  pub async fn acquire<I>(&self, keys: I) -> Result<KeyGuard>
  where
    I: IntoIterator<Item = String>,
  {
    let mut keys: Vec<String> = keys.into_iter().collect();
    keys.sort();
    keys.dedup();

    let deadline = Instant::now() + self.timeout;
    let mut held = Vec::with_capacity(keys.len());
    for key in keys {
      let slot = self.slot(&key);
      match tokio::time::timeout_at(deadline, slot.lock_owned()).await {
        Ok(guard) => held.push(guard),
        Err(_) => {
          return Err(Error::LockTimeout {
            key,
            waited: self.timeout,
          });
        }
      }
    }
    Ok(KeyGuard { _held: held })
  }

  fn slot(&self, key: &str) -> Slot {
    let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
    // Drop slots nobody holds or waits on.
    slots.retain(|_, slot| Arc::strong_count(slot) > 1);
    slots
      .entry(key.to_owned())
      .or_insert_with(|| Arc::new(AsyncMutex::new(())))
      .clone()
  }

  #[cfg(test)]
  fn tracked(&self) -> usize {
    self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
  }
}
