//! Cache layer that orchestrates optimistic writes and network refreshes.

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};

use super::merge::CacheEvent;
use super::storage::MemoryStorage;
use super::traits::{CacheResult, CachedEntry, Cacheable, QueryKey};

/// Cache layer that manages optimistic updates and network fetching.
///
/// This layer sits between the application and the network client. Writes
/// show up in the cache before the server confirms them; reads never touch
/// the network unless a refresh is requested.
pub struct CacheLayer<T: Cacheable> {
  storage: Arc<MemoryStorage<T>>,
}

impl<T: Cacheable> CacheLayer<T> {
  /// Create a new cache layer with empty storage.
  pub fn new() -> Self {
    Self {
      storage: Arc::new(MemoryStorage::new()),
    }
  }

  /// Read the cached collection without contacting the network.
  pub fn read<K: QueryKey>(&self, key: &K) -> SyncResult<CacheResult<Vec<CachedEntry<T>>>> {
    let collection = self
      .storage
      .get_collection(&key.cache_hash())?
      .unwrap_or_default();

    Ok(CacheResult::from_cache(
      collection.entries,
      collection.fetched_at,
    ))
  }

  /// Insert `provisional` into the collection ahead of server confirmation.
  pub fn begin_create<K: QueryKey>(&self, key: &K, provisional: T) -> SyncResult<()> {
    debug!(
      "Optimistic {} {} in {}",
      T::entity_type(),
      provisional.cache_key(),
      key.description()
    );
    self
      .storage
      .apply(&key.cache_hash(), CacheEvent::Optimistic(provisional))?;
    Ok(())
  }

  /// Merge the outcome of a remote create into the collection.
  ///
  /// On success the provisional entry is swapped for the authoritative one.
  /// On failure it is rolled back and the error is returned unchanged.
  /// If the provisional entry vanished in the meantime the authoritative
  /// entity is still cached, but `ConflictOnMerge` is reported.
  pub fn settle_create<K: QueryKey>(
    &self,
    key: &K,
    provisional_id: &str,
    outcome: SyncResult<T>,
  ) -> SyncResult<T> {
    let hash = key.cache_hash();

    match outcome {
      Ok(authoritative) => {
        let confirm = CacheEvent::Confirm {
          provisional_id: provisional_id.to_string(),
          authoritative: authoritative.clone(),
        };
        match self.storage.apply(&hash, confirm) {
          Ok(_) => Ok(authoritative),
          Err(conflict @ SyncError::ConflictOnMerge { .. }) => {
            warn!(
              "Could not reconcile {} {} with {}: {}",
              T::entity_type(),
              authoritative.cache_key(),
              key.description(),
              conflict
            );
            self
              .storage
              .apply(&hash, CacheEvent::Upsert(authoritative))?;
            Err(conflict)
          }
          Err(e) => Err(e),
        }
      }
      Err(e) => {
        warn!(
          "Rolling back {} {} in {}: {}",
          T::entity_type(),
          provisional_id,
          key.description(),
          e
        );
        self.rollback(key, provisional_id)?;
        Err(e)
      }
    }
  }

  /// Remove a provisional entry. A no-op if it is already gone.
  pub fn rollback<K: QueryKey>(&self, key: &K, provisional_id: &str) -> SyncResult<()> {
    self.storage.apply(
      &key.cache_hash(),
      CacheEvent::Rollback {
        provisional_id: provisional_id.to_string(),
      },
    )?;
    Ok(())
  }

  /// Fetch the collection from the network, bypassing the cache.
  ///
  /// 1. Fetch from network
  /// 2. On failure, return the error and leave the cache untouched
  /// 3. Replace the cached collection with the fetched set
  pub async fn refresh<K, F, Fut>(&self, key: &K, fetcher: F) -> SyncResult<CacheResult<Vec<T>>>
  where
    K: QueryKey,
    F: FnOnce() -> Fut,
    Fut: Future<Output = SyncResult<Vec<T>>>,
  {
    let data = fetcher().await?;
    debug!(
      "Fetched {} {} entities for {}",
      data.len(),
      T::entity_type(),
      key.description()
    );

    let (collection, fetched_at) = self.storage.replace(&key.cache_hash(), data)?;

    let items = collection.entries.into_iter().map(|e| e.entity).collect();
    Ok(CacheResult::from_network(items, fetched_at))
  }
}

impl<T: Cacheable> Default for CacheLayer<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Cacheable> Clone for CacheLayer<T> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Clone, PartialEq, Eq)]
  struct Row {
    id: String,
  }

  impl Cacheable for Row {
    fn cache_key(&self) -> &str {
      &self.id
    }

    fn entity_type() -> &'static str {
      "Row"
    }
  }

  struct AllRows;

  impl QueryKey for AllRows {
    fn cache_hash(&self) -> String {
      "all_rows".to_string()
    }

    fn description(&self) -> String {
      "all rows".to_string()
    }
  }

  fn row(id: &str) -> Row {
    Row { id: id.to_string() }
  }

  fn ids(layer: &CacheLayer<Row>) -> Vec<String> {
    layer
      .read(&AllRows)
      .unwrap()
      .data
      .into_iter()
      .map(|e| e.entity.id)
      .collect()
  }

  #[test]
  fn test_confirmed_create_swaps_in_authoritative() {
    let layer = CacheLayer::new();
    layer.begin_create(&AllRows, row("tmp")).unwrap();

    let entries = layer.read(&AllRows).unwrap().data;
    assert_eq!(entries, vec![CachedEntry::provisional(row("tmp"))]);

    let created = layer
      .settle_create(&AllRows, "tmp", Ok(row("srv-1")))
      .unwrap();

    assert_eq!(created, row("srv-1"));
    assert_eq!(
      layer.read(&AllRows).unwrap().data,
      vec![CachedEntry::confirmed(row("srv-1"))]
    );
  }

  #[tokio::test]
  async fn test_failed_create_rolls_back() {
    let layer = CacheLayer::new();
    layer
      .refresh(&AllRows, || async { Ok(vec![row("a")]) })
      .await
      .unwrap();
    layer.begin_create(&AllRows, row("tmp")).unwrap();
    assert_eq!(ids(&layer), vec!["a", "tmp"]);

    let err = layer
      .settle_create(
        &AllRows,
        "tmp",
        Err(SyncError::RemoteUnavailable("down".into())),
      )
      .unwrap_err();

    assert_eq!(err, SyncError::RemoteUnavailable("down".into()));
    assert_eq!(ids(&layer), vec!["a"]);
  }

  #[tokio::test]
  async fn test_refresh_failure_leaves_cache_untouched() {
    let layer = CacheLayer::new();
    layer
      .refresh(&AllRows, || async { Ok(vec![row("a"), row("b")]) })
      .await
      .unwrap();
    let before = layer.read(&AllRows).unwrap();

    let err = layer
      .refresh(&AllRows, || async {
        Err(SyncError::RemoteUnavailable("timeout".into()))
      })
      .await
      .unwrap_err();

    assert!(matches!(err, SyncError::RemoteUnavailable(_)));
    let after = layer.read(&AllRows).unwrap();
    assert_eq!(after.data, before.data);
    assert_eq!(after.fetched_at, before.fetched_at);
  }

  #[tokio::test]
  async fn test_refresh_stamps_fetch_time() {
    let layer = CacheLayer::new();
    assert!(layer.read(&AllRows).unwrap().fetched_at.is_none());

    let result = layer
      .refresh(&AllRows, || async { Ok(vec![row("a")]) })
      .await
      .unwrap();

    assert!(result.fetched_at.is_some());
    assert_eq!(layer.read(&AllRows).unwrap().fetched_at, result.fetched_at);
  }

  #[test]
  fn test_settle_after_provisional_vanished_reports_conflict() {
    let layer = CacheLayer::new();
    layer.begin_create(&AllRows, row("tmp")).unwrap();
    layer.rollback(&AllRows, "tmp").unwrap();

    let err = layer
      .settle_create(&AllRows, "tmp", Ok(row("srv-1")))
      .unwrap_err();

    assert!(matches!(err, SyncError::ConflictOnMerge { .. }));
    // Server state still wins
    assert_eq!(ids(&layer), vec!["srv-1"]);
  }
}
