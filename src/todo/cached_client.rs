//! Todo client that wraps a remote data service with an optimistic cache.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::{CacheLayer, CacheResult, CachedEntry};
use crate::error::{SyncError, SyncResult};

use super::cache::TodoQueryKey;
use super::client::RemoteDataService;
use super::types::{CreateTodoInput, Todo};

/// Todo client with optimistic caching.
///
/// Creates appear in the cache immediately and are reconciled when the
/// server answers. Refreshes always go to the network.
pub struct CachedTodoClient<R: RemoteDataService> {
  remote: Arc<R>,
  cache: CacheLayer<Todo>,
}

impl<R: RemoteDataService> CachedTodoClient<R> {
  pub fn new(remote: R) -> Self {
    Self {
      remote: Arc::new(remote),
      cache: CacheLayer::new(),
    }
  }

  /// Create a todo.
  ///
  /// The provisional todo is in the cache when this returns. The remote
  /// call runs on a spawned task, so this must be called from within a
  /// tokio runtime.
  pub fn create(&self, input: CreateTodoInput) -> SyncResult<PendingCreate> {
    let provisional = Todo::provisional(&input);
    self
      .cache
      .begin_create(&TodoQueryKey::ListTodos, provisional.clone())?;

    let remote = Arc::clone(&self.remote);
    let cache = self.cache.clone();
    let provisional_id = provisional.id.clone();

    let handle = tokio::spawn(async move {
      let outcome = remote.mutate_create(&input).await;
      let created = cache.settle_create(&TodoQueryKey::ListTodos, &provisional_id, outcome)?;
      info!("New Todo: {} ({})", created.name, created.id);
      Ok::<_, SyncError>(created)
    });

    Ok(PendingCreate {
      provisional,
      handle,
      cache: self.cache.clone(),
    })
  }

  /// Fetch all todos from the network and replace the cached list.
  pub async fn refresh(&self) -> SyncResult<Vec<Todo>> {
    let remote = Arc::clone(&self.remote);
    let result = self
      .cache
      .refresh(&TodoQueryKey::ListTodos, || async move {
        remote.query_list().await
      })
      .await?;

    info!("Items: {}", result.data.len());
    Ok(result.data)
  }

  /// Current cached todos, provisional ones included.
  pub fn read(&self) -> SyncResult<CacheResult<Vec<CachedEntry<Todo>>>> {
    self.cache.read(&TodoQueryKey::ListTodos)
  }
}

impl<R: RemoteDataService> Clone for CachedTodoClient<R> {
  fn clone(&self) -> Self {
    Self {
      remote: Arc::clone(&self.remote),
      cache: self.cache.clone(),
    }
  }
}

/// An in-flight create.
pub struct PendingCreate {
  provisional: Todo,
  handle: JoinHandle<SyncResult<Todo>>,
  cache: CacheLayer<Todo>,
}

impl PendingCreate {
  /// The optimistic todo currently shown in the cache
  pub fn provisional(&self) -> &Todo {
    &self.provisional
  }

  /// Wait for the server's answer.
  ///
  /// Resolves to the authoritative todo, or the error after the provisional
  /// entry has been rolled back.
  pub async fn confirmed(self) -> SyncResult<Todo> {
    match self.handle.await {
      Ok(outcome) => outcome,
      Err(e) => {
        warn!("Create of {} aborted: {}", self.provisional.id, e);
        self
          .cache
          .rollback(&TodoQueryKey::ListTodos, &self.provisional.id)?;
        Err(SyncError::Aborted(e.to_string()))
      }
    }
  }
}
