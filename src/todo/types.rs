use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{SyncError, SyncResult};

/// GraphQL type name shared by every todo record
pub const TODO_TYPENAME: &str = "Todo";

/// A todo record, either provisional (client id) or confirmed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
  pub id: String,
  pub name: String,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub description: String,
  #[serde(rename = "__typename", default = "default_typename")]
  pub typename: String,
}

impl Todo {
  /// Build the optimistic record for `input` with a fresh random id.
  pub fn provisional(input: &CreateTodoInput) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      name: input.name().to_string(),
      description: input.description().unwrap_or_default().to_string(),
      typename: TODO_TYPENAME.to_string(),
    }
  }
}

fn default_typename() -> String {
  TODO_TYPENAME.to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let v: Option<String> = Option::deserialize(deserializer)?;
  Ok(v.unwrap_or_default())
}

/// Validated payload for creating a todo.
///
/// Only constructible through [`CreateTodoInput::new`], so a value of this
/// type always has a non-blank name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTodoInput {
  name: String,
  description: Option<String>,
}

impl CreateTodoInput {
  pub fn new(name: impl Into<String>, description: Option<String>) -> SyncResult<Self> {
    let name = name.into().trim().to_string();
    if name.is_empty() {
      return Err(SyncError::ValidationError(
        "todo name must not be empty".to_string(),
      ));
    }

    Ok(Self { name, description })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn description(&self) -> Option<&str> {
    self.description.as_deref()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_blank_name_is_rejected() {
    let err = CreateTodoInput::new("   ", None).unwrap_err();
    assert!(matches!(err, SyncError::ValidationError(_)));
  }

  #[test]
  fn test_name_is_trimmed() {
    let input = CreateTodoInput::new("  Use AppSync ", None).unwrap();
    assert_eq!(input.name(), "Use AppSync");
  }

  #[test]
  fn test_provisional_ids_are_unique() {
    let input = CreateTodoInput::new("Use AppSync", Some("Realtime and Offline".into())).unwrap();
    let a = Todo::provisional(&input);
    let b = Todo::provisional(&input);

    assert_ne!(a.id, b.id);
    assert_eq!(a.typename, "Todo");
    assert_eq!(a.description, "Realtime and Offline");
  }

  #[test]
  fn test_deserialize_server_todo() {
    let json = r#"{"__typename":"Todo","id":"srv-1","name":"Use AppSync","description":null}"#;
    let todo: Todo = serde_json::from_str(json).unwrap();

    assert_eq!(todo.id, "srv-1");
    assert_eq!(todo.description, "");
    assert_eq!(todo.typename, "Todo");
  }

  #[test]
  fn test_input_serializes_missing_description_as_null() {
    let input = CreateTodoInput::new("x", None).unwrap();
    let value = serde_json::to_value(&input).unwrap();
    assert_eq!(value, serde_json::json!({"name": "x", "description": null}));
  }
}
