//! Serde types matching the AppSync GraphQL API.
//!
//! These types are separate from domain types to keep the GraphQL envelope
//! out of the rest of the application.

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

use super::types::{CreateTodoInput, Todo};

// ============================================================================
// Documents
// ============================================================================

pub const CREATE_TODO: &str = r#"mutation CreateTodo($input: CreateTodoInput!) {
  createTodo(input: $input) {
    __typename
    id
    name
    description
  }
}"#;

pub const LIST_TODOS: &str = r#"query ListTodos {
  listTodos {
    items {
      __typename
      id
      name
      description
    }
  }
}"#;

// ============================================================================
// Envelope
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V: Serialize> {
  pub query: &'a str,
  pub variables: V,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<D> {
  pub data: Option<D>,
  #[serde(default)]
  pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
  pub message: String,
  #[serde(rename = "errorType")]
  pub error_type: Option<String>,
}

impl<D> GraphQlResponse<D> {
  /// Unwrap the payload, turning GraphQL-level errors into `RemoteUnavailable`.
  pub fn into_data(self) -> SyncResult<D> {
    if let Some(first) = self.errors.first() {
      let message = match &first.error_type {
        Some(kind) => format!("{}: {}", kind, first.message),
        None => first.message.clone(),
      };
      return Err(SyncError::RemoteUnavailable(message));
    }

    self
      .data
      .ok_or_else(|| SyncError::RemoteUnavailable("response contained no data".to_string()))
  }
}

// ============================================================================
// Operation payloads
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CreateTodoVariables<'a> {
  pub input: &'a CreateTodoInput,
}

#[derive(Debug, Serialize)]
pub struct NoVariables {}

#[derive(Debug, Deserialize)]
pub struct CreateTodoData {
  #[serde(rename = "createTodo")]
  pub create_todo: Option<Todo>,
}

#[derive(Debug, Deserialize)]
pub struct ListTodosData {
  #[serde(rename = "listTodos")]
  pub list_todos: Option<TodoConnection>,
}

#[derive(Debug, Deserialize)]
pub struct TodoConnection {
  #[serde(default)]
  pub items: Vec<Option<Todo>>,
}
