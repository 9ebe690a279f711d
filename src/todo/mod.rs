pub mod api_types;
pub mod cache;
pub mod cached_client;
pub mod client;
pub mod types;

pub use cached_client::CachedTodoClient;
pub use client::{AppSyncClient, RemoteDataService};
pub use types::{CreateTodoInput, Todo};
