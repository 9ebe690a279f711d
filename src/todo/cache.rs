//! Caching implementations for todo types.

use sha2::{Digest, Sha256};

use crate::cache::{Cacheable, QueryKey};

use super::types::{Todo, TODO_TYPENAME};

impl Cacheable for Todo {
  fn cache_key(&self) -> &str {
    &self.id
  }

  fn entity_type() -> &'static str {
    TODO_TYPENAME
  }
}

/// Query key types for the todo API.
#[derive(Clone, Debug)]
pub enum TodoQueryKey {
  /// The `listTodos` query with no filter
  ListTodos,
}

impl QueryKey for TodoQueryKey {
  fn cache_hash(&self) -> String {
    let input = match self {
      Self::ListTodos => "list_todos",
    };

    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }

  fn description(&self) -> String {
    match self {
      Self::ListTodos => "all todos".to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_list_hash_is_stable() {
    let a = TodoQueryKey::ListTodos.cache_hash();
    let b = TodoQueryKey::ListTodos.cache_hash();

    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
  }
}
