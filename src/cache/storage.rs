//! In-memory collection storage.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{SyncError, SyncResult};

use super::merge::{merge, CacheEvent};
use super::traits::{CachedEntry, Cacheable};

/// Snapshot of one cached query result.
#[derive(Debug, Clone)]
pub struct CachedCollection<T> {
  /// The cached entries in display order
  pub entries: Vec<CachedEntry<T>>,
  /// When the collection was last replaced by a network fetch
  pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> Default for CachedCollection<T> {
  fn default() -> Self {
    Self {
      entries: Vec::new(),
      fetched_at: None,
    }
  }
}

/// Process-local storage for collection snapshots, keyed by query hash.
///
/// Each event is merged and swapped in under one write lock, so a reader
/// never sees a partially applied event. Nothing is persisted.
pub struct MemoryStorage<T> {
  collections: RwLock<HashMap<String, CachedCollection<T>>>,
}

impl<T: Cacheable> MemoryStorage<T> {
  pub fn new() -> Self {
    Self {
      collections: RwLock::new(HashMap::new()),
    }
  }

  /// Get a copy of the cached collection for a query.
  pub fn get_collection(&self, key: &str) -> SyncResult<Option<CachedCollection<T>>> {
    let collections = self
      .collections
      .read()
      .map_err(|e| SyncError::CachePoisoned(e.to_string()))?;

    Ok(collections.get(key).cloned())
  }

  /// Apply an event to the collection stored under `key`.
  ///
  /// A missing collection is treated as empty. On error nothing changes.
  /// The fetch timestamp is carried over; use [`Self::replace`] for
  /// network fetches.
  pub fn apply(&self, key: &str, event: CacheEvent<T>) -> SyncResult<CachedCollection<T>> {
    self.write(key, event, None)
  }

  /// Replace the collection with freshly fetched items and stamp it.
  pub fn replace(
    &self,
    key: &str,
    items: Vec<T>,
  ) -> SyncResult<(CachedCollection<T>, DateTime<Utc>)> {
    let fetched_at = Utc::now();
    let next = self.write(key, CacheEvent::Replace(items), Some(fetched_at))?;
    Ok((next, fetched_at))
  }

  fn write(
    &self,
    key: &str,
    event: CacheEvent<T>,
    fetched_at: Option<DateTime<Utc>>,
  ) -> SyncResult<CachedCollection<T>> {
    let mut collections = self
      .collections
      .write()
      .map_err(|e| SyncError::CachePoisoned(e.to_string()))?;

    let current = collections.get(key);
    let entries = merge(current.map(|c| c.entries.as_slice()).unwrap_or(&[]), event)?;
    let fetched_at = fetched_at.or_else(|| current.and_then(|c| c.fetched_at));

    let next = CachedCollection {
      entries,
      fetched_at,
    };
    collections.insert(key.to_string(), next.clone());

    Ok(next)
  }
}

impl<T: Cacheable> Default for MemoryStorage<T> {
  fn default() -> Self {
    Self::new()
  }
}
