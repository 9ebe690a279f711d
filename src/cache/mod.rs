//! Generic optimistic caching layer for remote list resources.
//!
//! This module provides a backend-agnostic caching mechanism that:
//! - Keeps one ordered collection per query, keyed by entity id
//! - Applies creates optimistically and reconciles them with the server
//! - Rolls back failed creates and leaves the cache untouched on failed refreshes
//! - Expresses every mutation as a pure `(snapshot, event) -> snapshot` merge

mod layer;
mod merge;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use traits::{CacheResult, CachedEntry, Cacheable, QueryKey};
