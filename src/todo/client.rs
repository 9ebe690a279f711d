use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::{SyncError, SyncResult};
use crate::todo::api_types::{
  CreateTodoData, CreateTodoVariables, GraphQlRequest, GraphQlResponse, ListTodosData,
  NoVariables, CREATE_TODO, LIST_TODOS,
};
use crate::todo::types::{CreateTodoInput, Todo};

/// The remote side of the todo collection.
#[async_trait]
pub trait RemoteDataService: Send + Sync + 'static {
  /// Create a durable record and return the server's version of it
  async fn mutate_create(&self, input: &CreateTodoInput) -> SyncResult<Todo>;

  /// Fetch the full current set of records
  async fn query_list(&self) -> SyncResult<Vec<Todo>>;
}

/// AppSync GraphQL client authenticated with an API key
#[derive(Clone)]
pub struct AppSyncClient {
  http: reqwest::Client,
  endpoint: String,
  api_key: String,
}

impl AppSyncClient {
  pub fn new(config: &Config) -> color_eyre::Result<Self> {
    let api_key = Config::get_api_key()?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.appsync.timeout_secs))
      .build()
      .map_err(|e| color_eyre::eyre::eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      endpoint: config.appsync.graphql_endpoint.clone(),
      api_key,
    })
  }

  /// POST a GraphQL document and decode the `data` payload
  async fn execute<V, D>(&self, operation: &str, query: &str, variables: V) -> SyncResult<D>
  where
    V: Serialize + Send,
    D: DeserializeOwned,
  {
    debug!("Sending {} to {}", operation, self.endpoint);

    let response = self
      .http
      .post(&self.endpoint)
      .header("x-api-key", &self.api_key)
      .json(&GraphQlRequest { query, variables })
      .send()
      .await
      .map_err(|e| {
        error!("{} failed: {}", operation, e);
        SyncError::from(e)
      })?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      error!("{} returned {}: {}", operation, status, body);
      return Err(SyncError::RemoteUnavailable(format!(
        "{} returned HTTP {}",
        operation, status
      )));
    }

    let envelope: GraphQlResponse<D> = response.json().await?;
    envelope.into_data().inspect_err(|e| {
      error!("{} rejected: {}", operation, e);
    })
  }
}

#[async_trait]
impl RemoteDataService for AppSyncClient {
  async fn mutate_create(&self, input: &CreateTodoInput) -> SyncResult<Todo> {
    let data: CreateTodoData = self
      .execute("createTodo", CREATE_TODO, CreateTodoVariables { input })
      .await?;

    data
      .create_todo
      .ok_or_else(|| SyncError::RemoteUnavailable("createTodo returned null".to_string()))
  }

  async fn query_list(&self) -> SyncResult<Vec<Todo>> {
    let data: ListTodosData = self
      .execute("listTodos", LIST_TODOS, NoVariables {})
      .await?;

    Ok(
      data
        .list_todos
        .map(|connection| connection.items.into_iter().flatten().collect())
        .unwrap_or_default(),
    )
  }
}
