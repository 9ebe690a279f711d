//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};

/// Trait for entities that can live in a collection cache.
///
/// The cache key is the sole identity of an entity and must never change
/// once assigned.
pub trait Cacheable: Clone + std::fmt::Debug + Send + Sync + 'static {
  /// Unique identifier for this entity (e.g., todo id)
  fn cache_key(&self) -> &str;

  /// Entity type name, used in log output (e.g., "Todo")
  fn entity_type() -> &'static str;
}

/// Identity of a cached query.
pub trait QueryKey {
  /// Stable, fixed-length hash used as the storage key
  fn cache_hash(&self) -> String;

  /// Human-readable description for logs
  fn description(&self) -> String;
}

/// Whether a cached entry has been confirmed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
  /// Backed by a still-pending create
  Provisional,
  /// Received from the remote service
  Confirmed,
}

/// A cached entity together with its confirmation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry<T> {
  pub entity: T,
  pub state: EntryState,
}

impl<T> CachedEntry<T> {
  pub fn confirmed(entity: T) -> Self {
    Self {
      entity,
      state: EntryState::Confirmed,
    }
  }

  pub fn provisional(entity: T) -> Self {
    Self {
      entity,
      state: EntryState::Provisional,
    }
  }

  pub fn is_provisional(&self) -> bool {
    self.state == EntryState::Provisional
  }
}

/// Result from a cache operation, including when the data was fetched.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// When the collection was last replaced from the network
  pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T, fetched_at: DateTime<Utc>) -> Self {
    Self {
      data,
      fetched_at: Some(fetched_at),
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, fetched_at: Option<DateTime<Utc>>) -> Self {
    Self { data, fetched_at }
  }
}
