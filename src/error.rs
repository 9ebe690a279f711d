//! Error taxonomy for the sync layer.

use thiserror::Error;

/// Errors surfaced by `create` and `refresh`.
///
/// The cache itself only produces `ConflictOnMerge` and `CachePoisoned`;
/// everything else originates at the remote service boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
  /// Transport or service failure talking to the remote data service
  #[error("remote data service unavailable: {0}")]
  RemoteUnavailable(String),

  /// An authoritative response could not be reconciled with local state
  #[error("cannot merge {id} into cache: {reason}")]
  ConflictOnMerge { id: String, reason: String },

  /// Input payload is missing required fields
  #[error("invalid input: {0}")]
  ValidationError(String),

  /// A cache lock was poisoned by a panicking writer
  #[error("cache lock poisoned: {0}")]
  CachePoisoned(String),

  /// The background dispatch task panicked or was cancelled
  #[error("create was aborted: {0}")]
  Aborted(String),
}

impl From<reqwest::Error> for SyncError {
  fn from(e: reqwest::Error) -> Self {
    SyncError::RemoteUnavailable(e.to_string())
  }
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;
