//! Pure merge function for collection snapshots.
//!
//! Every mutation of a cached collection is expressed as a [`CacheEvent`]
//! applied to the previous snapshot, producing the next one. The store swaps
//! snapshots under a single write lock, so readers only ever observe a
//! snapshot from before or after an event.

use std::collections::HashSet;

use crate::error::{SyncError, SyncResult};

use super::traits::{CachedEntry, Cacheable};

/// A change to a cached collection.
#[derive(Debug, Clone)]
pub enum CacheEvent<T> {
  /// Insert a provisional entity for an in-flight create
  Optimistic(T),
  /// Replace a provisional entity with the server's authoritative version
  Confirm { provisional_id: String, authoritative: T },
  /// Drop a provisional entity after its create failed
  Rollback { provisional_id: String },
  /// Insert or replace a confirmed entity by key
  Upsert(T),
  /// Replace all confirmed entities with a freshly fetched set
  Replace(Vec<T>),
}

/// Apply `event` to `old`, returning the new snapshot.
///
/// On error the old snapshot is untouched and must be kept by the caller.
pub fn merge<T: Cacheable>(
  old: &[CachedEntry<T>],
  event: CacheEvent<T>,
) -> SyncResult<Vec<CachedEntry<T>>> {
  match event {
    CacheEvent::Optimistic(entity) => {
      if old.iter().any(|e| e.entity.cache_key() == entity.cache_key()) {
        return Err(SyncError::ConflictOnMerge {
          id: entity.cache_key().to_string(),
          reason: "an entry with this id is already cached".to_string(),
        });
      }
      let mut next = old.to_vec();
      next.push(CachedEntry::provisional(entity));
      Ok(next)
    }

    CacheEvent::Confirm {
      provisional_id,
      authoritative,
    } => {
      let position = old
        .iter()
        .position(|e| e.is_provisional() && e.entity.cache_key() == provisional_id)
        .ok_or_else(|| SyncError::ConflictOnMerge {
          id: provisional_id.clone(),
          reason: "provisional entry is no longer cached".to_string(),
        })?;

      // Entries before the provisional slot that get removed shift it left.
      let auth_id = authoritative.cache_key().to_string();
      let is_replaced = |e: &CachedEntry<T>| {
        let key = e.entity.cache_key();
        key == provisional_id || key == auth_id
      };
      let removed_before = old[..position].iter().filter(|&e| is_replaced(e)).count();

      let mut next: Vec<CachedEntry<T>> = old
        .iter()
        .filter(|&e| !is_replaced(e))
        .cloned()
        .collect();
      next.insert(
        position - removed_before,
        CachedEntry::confirmed(authoritative),
      );
      Ok(next)
    }

    CacheEvent::Rollback { provisional_id } => Ok(
      old
        .iter()
        .filter(|e| !(e.is_provisional() && e.entity.cache_key() == provisional_id))
        .cloned()
        .collect(),
    ),

    CacheEvent::Upsert(entity) => {
      let mut next = old.to_vec();
      match next
        .iter_mut()
        .find(|e| e.entity.cache_key() == entity.cache_key())
      {
        Some(existing) => *existing = CachedEntry::confirmed(entity),
        None => next.push(CachedEntry::confirmed(entity)),
      }
      Ok(next)
    }

    CacheEvent::Replace(entities) => {
      let mut seen = HashSet::new();
      let mut next: Vec<CachedEntry<T>> = entities
        .into_iter()
        .filter(|e| seen.insert(e.cache_key().to_string()))
        .map(CachedEntry::confirmed)
        .collect();

      // Creates still in flight keep their provisional entry.
      next.extend(
        old
          .iter()
          .filter(|e| e.is_provisional() && !seen.contains(e.entity.cache_key()))
          .cloned(),
      );
      Ok(next)
    }
  }
}
