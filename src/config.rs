use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::todo::CreateTodoInput;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub appsync: AppSyncConfig,
  /// Payload used by the "Create Todo" action
  #[serde(default)]
  pub sample_todo: SampleTodo,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
  /// API key sent in the `x-api-key` header
  #[default]
  ApiKey,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSyncConfig {
  pub graphql_endpoint: String,
  pub region: String,
  #[serde(default)]
  pub auth_type: AuthType,
  /// Request timeout for GraphQL calls
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
  30
}

#[derive(Debug, Clone, Deserialize)]
pub struct SampleTodo {
  pub name: String,
  pub description: Option<String>,
}

impl Default for SampleTodo {
  fn default() -> Self {
    Self {
      name: "Use AppSync".to_string(),
      description: Some("Realtime and Offline".to_string()),
    }
  }
}

impl SampleTodo {
  pub fn to_input(&self) -> Result<CreateTodoInput> {
    Ok(CreateTodoInput::new(
      self.name.clone(),
      self.description.clone(),
    )?)
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./todosync.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/todosync/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/todosync/config.yaml\n\
                 See todosync.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("todosync.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("todosync").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    config.validate()?;
    Ok(config)
  }

  /// Check the endpoint URL and the sample payload.
  pub fn validate(&self) -> Result<()> {
    let url = url::Url::parse(&self.appsync.graphql_endpoint)
      .map_err(|e| eyre!("Invalid graphql_endpoint: {}", e))?;
    if !matches!(url.scheme(), "http" | "https") {
      return Err(eyre!(
        "graphql_endpoint must be http or https, got {}",
        url.scheme()
      ));
    }

    self.sample_todo.to_input()?;
    Ok(())
  }

  /// Get the AppSync API key from environment variables.
  ///
  /// Checks TODOSYNC_API_KEY first, then APPSYNC_API_KEY as fallback.
  pub fn get_api_key() -> Result<String> {
    std::env::var("TODOSYNC_API_KEY")
      .or_else(|_| std::env::var("APPSYNC_API_KEY"))
      .map_err(|_| {
        eyre!("AppSync API key not found. Set TODOSYNC_API_KEY or APPSYNC_API_KEY environment variable.")
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_minimal_config() {
    let yaml = r#"
appsync:
  graphql_endpoint: https://abc.appsync-api.us-east-1.amazonaws.com/graphql
  region: us-east-1
"#;
    let config = Config::parse(yaml).unwrap();

    assert_eq!(config.appsync.region, "us-east-1");
    assert_eq!(config.appsync.auth_type, AuthType::ApiKey);
    assert_eq!(config.appsync.timeout_secs, 30);
    assert_eq!(config.sample_todo.name, "Use AppSync");
  }

  #[test]
  fn test_parse_custom_sample() {
    let yaml = r#"
appsync:
  graphql_endpoint: http://localhost:20002/graphql
  region: local
  auth_type: api_key
  timeout_secs: 5
sample_todo:
  name: Write tests
"#;
    let config = Config::parse(yaml).unwrap();

    assert_eq!(config.appsync.timeout_secs, 5);
    let input = config.sample_todo.to_input().unwrap();
    assert_eq!(input.name(), "Write tests");
    assert_eq!(input.description(), None);
  }

  #[test]
  fn test_rejects_bad_endpoint() {
    let yaml = r#"
appsync:
  graphql_endpoint: not a url
  region: us-east-1
"#;
    assert!(Config::parse(yaml).is_err());
  }

  #[test]
  fn test_rejects_blank_sample_name() {
    let yaml = r#"
appsync:
  graphql_endpoint: https://example.com/graphql
  region: us-east-1
sample_todo:
  name: "  "
"#;
    assert!(Config::parse(yaml).is_err());
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let err = Config::load(Some(Path::new("/nonexistent/todosync.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}
