//! Client configuration for connecting to Minds services.
//!
//! Implements a kubeconfig-style configuration with named contexts:
//!
//! ```yaml
//! current-context: prod
//!
//! contexts:
//!   - name: prod
//!     base-url: https://mdb.ai
//!     auth:
//!       type: api-key
//!       key-env: MINDS_API_KEY
//!   - name: dev
//!     base-url: https://dev.mindsdb.com
//!     project: sandbox
//!     auth:
//!       type: api-key
//!       key-file: ~/.config/minds/keys/dev.key
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Client Config
// ─────────────────────────────────────────────────────────────────────────────

/// Default config filename.
const CLIENT_CONFIG_FILE: &str = "client.yaml";

/// Root client configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// Name of the current/default context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_context: Option<String>,

    /// Named connection contexts.
    #[serde(default)]
    pub contexts: Vec<Context>,

    /// Default settings applied to all contexts.
    #[serde(default)]
    pub defaults: ClientDefaults,
}

impl ClientConfig {
    /// Create an empty client config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a YAML string.
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        serde_yaml::from_str(yaml_str).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Serialize to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Get the current context, if set and valid.
    pub fn current(&self) -> Option<&Context> {
        self.current_context
            .as_ref()
            .and_then(|name| self.get_context(name))
    }

    /// Get a context by name.
    pub fn get_context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Get a mutable context by name.
    pub fn get_context_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Add or update a context.
    pub fn set_context(&mut self, context: Context) {
        if let Some(existing) = self.get_context_mut(&context.name) {
            *existing = context;
        } else {
            self.contexts.push(context);
        }
    }

    /// Remove a context by name.
    pub fn remove_context(&mut self, name: &str) -> Option<Context> {
        let pos = self.contexts.iter().position(|c| c.name == name)?;
        if self.current_context.as_deref() == Some(name) {
            self.current_context = None;
        }
        Some(self.contexts.remove(pos))
    }

    /// Set the current context by name.
    ///
    /// Returns an error if the context doesn't exist.
    pub fn use_context(&mut self, name: &str) -> Result<()> {
        if self.get_context(name).is_some() {
            self.current_context = Some(name.to_string());
            Ok(())
        } else {
            Err(ConfigError::ContextNotFound(name.to_string()))
        }
    }

    /// List all context names.
    pub fn context_names(&self) -> Vec<&str> {
        self.contexts.iter().map(|c| c.name.as_str()).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Context
// ─────────────────────────────────────────────────────────────────────────────

/// A named connection context (service + project + auth bundle).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Context {
    /// Unique name for this context.
    pub name: String,

    /// Service URL (e.g., "https://mdb.ai").
    pub base_url: String,

    /// Project minds are scoped to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Authentication configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    /// Request timeout override (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Context {
    /// Create a new context with just a name and service URL.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            project: None,
            auth: None,
            timeout: None,
        }
    }

    /// Set the auth configuration.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the project.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication configuration for a context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AuthConfig {
    /// No authentication.
    None,

    /// API key read from a file or an environment variable.
    #[serde(rename_all = "kebab-case")]
    ApiKey {
        /// Path to file containing the API key.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key_file: Option<PathBuf>,
        /// Environment variable containing the API key.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key_env: Option<String>,
    },

    /// API key stored in the config file itself (plaintext).
    Inline {
        /// The API key.
        key: String,
    },
}

impl AuthConfig {
    /// Create API key auth referencing a file.
    pub fn api_key_file(path: impl Into<PathBuf>) -> Self {
        Self::ApiKey {
            key_file: Some(path.into()),
            key_env: None,
        }
    }

    /// Create API key auth referencing an environment variable.
    pub fn api_key_env(var: impl Into<String>) -> Self {
        Self::ApiKey {
            key_file: None,
            key_env: Some(var.into()),
        }
    }

    /// Resolve the actual credential value.
    ///
    /// Reads from file or environment variable as configured.
    pub fn resolve(&self) -> Result<Option<String>> {
        match self {
            AuthConfig::None => Ok(None),

            AuthConfig::ApiKey { key_file, key_env } => {
                // Try file first, then env var
                if let Some(path) = key_file {
                    let expanded = expand_path(path);
                    if expanded.exists() {
                        let key = std::fs::read_to_string(&expanded)
                            .map_err(|e| ConfigError::ReadFile {
                                path: expanded.display().to_string(),
                                source: e,
                            })?
                            .trim()
                            .to_string();
                        return Ok(Some(key));
                    }
                    tracing::debug!(path = %expanded.display(), "API key file not found");
                }
                if let Some(var) = key_env
                    && let Ok(key) = std::env::var(var)
                    && !key.is_empty()
                {
                    return Ok(Some(key));
                }
                Ok(None)
            }

            AuthConfig::Inline { key } => {
                tracing::warn!("using plaintext API key from client config");
                Ok(Some(key.clone()))
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Default settings applied to all contexts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientDefaults {
    /// Default request timeout in seconds.
    pub timeout: u64,

    /// Default project name.
    pub project: String,
}

impl Default for ClientDefaults {
    fn default() -> Self {
        Self {
            timeout: 30,
            project: crate::DEFAULT_PROJECT.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading / Saving
// ─────────────────────────────────────────────────────────────────────────────

/// Get the path to the client config file.
pub fn client_config_path() -> Option<PathBuf> {
    crate::config_dir().map(|d| d.join(CLIENT_CONFIG_FILE))
}

/// Load the client configuration.
///
/// Returns a default config if the file doesn't exist.
pub fn load_client_config() -> Result<ClientConfig> {
    load_client_config_from(client_config_path().as_deref())
}

/// Load client config from a specific path.
pub fn load_client_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let Some(path) = path else {
        return Ok(ClientConfig::new());
    };

    if !path.exists() {
        return Ok(ClientConfig::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;

    ClientConfig::from_yaml(&contents)
}

/// Save the client configuration.
pub fn save_client_config(config: &ClientConfig) -> Result<()> {
    let path = client_config_path()
        .ok_or_else(|| ConfigError::Other("Could not determine config directory".to_string()))?;
    save_client_config_to(config, &path)
}

/// Save client config to a specific path.
pub fn save_client_config_to(config: &ClientConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_yaml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Expand ~ to home directory in paths.
fn expand_path(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str()
        && let Some(rest) = s.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = ClientConfig::new();
        assert!(config.current_context.is_none());
        assert!(config.contexts.is_empty());
        assert_eq!(config.defaults.timeout, 30);
        assert_eq!(config.defaults.project, "mindsdb");
    }

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
current-context: dev

contexts:
  - name: prod
    base-url: https://mdb.ai
    auth:
      type: api-key
      key-env: MINDS_PROD_KEY

  - name: dev
    base-url: https://dev.mindsdb.com
    project: sandbox
    timeout: 60
    auth:
      type: api-key
      key-file: ~/.config/minds/keys/dev.key

  - name: local
    base-url: http://127.0.0.1:47334
    auth:
      type: inline
      key: local-key

defaults:
  timeout: 45
  project: mindsdb
"#;
        let config = ClientConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.current_context.as_deref(), Some("dev"));
        assert_eq!(config.contexts.len(), 3);

        let dev = config.current().unwrap();
        assert_eq!(dev.base_url, "https://dev.mindsdb.com");
        assert_eq!(dev.project.as_deref(), Some("sandbox"));
        assert_eq!(dev.timeout, Some(60));
        match &dev.auth {
            Some(AuthConfig::ApiKey { key_file, key_env }) => {
                assert_eq!(
                    key_file.as_ref().unwrap().to_str().unwrap(),
                    "~/.config/minds/keys/dev.key"
                );
                assert!(key_env.is_none());
            }
            other => panic!("Expected ApiKey auth, got {:?}", other),
        }

        let local = config.get_context("local").unwrap();
        assert!(matches!(&local.auth, Some(AuthConfig::Inline { key }) if key == "local-key"));
        assert_eq!(config.defaults.timeout, 45);
    }

    #[test]
    fn test_set_and_remove_context() {
        let mut config = ClientConfig::new();
        config.set_context(Context::new("prod", "https://mdb.ai"));
        config.set_context(Context::new("prod", "https://eu.mdb.ai"));
        config.set_context(Context::new("dev", "https://dev.mindsdb.com"));
        assert_eq!(config.contexts.len(), 2);
        assert_eq!(config.get_context("prod").unwrap().base_url, "https://eu.mdb.ai");

        config.use_context("prod").unwrap();
        assert!(config.remove_context("dev").is_some());
        assert_eq!(config.current_context.as_deref(), Some("prod"));

        config.remove_context("prod");
        assert!(config.current_context.is_none());
        assert!(config.remove_context("prod").is_none());
    }

    #[test]
    fn test_use_unknown_context() {
        let mut config = ClientConfig::new();
        let err = config.use_context("nonexistent").unwrap_err();
        assert!(matches!(err, ConfigError::ContextNotFound(_)));
    }

    #[test]
    fn test_resolve_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("prod.key");
        std::fs::write(&key_path, "sk-from-file\n").unwrap();

        let auth = AuthConfig::api_key_file(&key_path);
        assert_eq!(auth.resolve().unwrap().as_deref(), Some("sk-from-file"));

        let missing = AuthConfig::api_key_file(dir.path().join("missing.key"));
        assert!(missing.resolve().unwrap().is_none());

        assert!(AuthConfig::None.resolve().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client.yaml");

        let mut config = ClientConfig::new();
        config.set_context(
            Context::new("prod", "https://mdb.ai")
                .with_project("analytics")
                .with_timeout(90)
                .with_auth(AuthConfig::api_key_env("MINDS_PROD_KEY")),
        );
        config.use_context("prod").unwrap();

        save_client_config_to(&config, &path).unwrap();
        let loaded = load_client_config_from(Some(&path)).unwrap();

        assert_eq!(loaded.current_context.as_deref(), Some("prod"));
        let prod = loaded.current().unwrap();
        assert_eq!(prod.project.as_deref(), Some("analytics"));
        assert_eq!(prod.timeout, Some(90));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_client_config_from(Some(&dir.path().join("absent.yaml"))).unwrap();
        assert!(config.contexts.is_empty());
        assert!(load_client_config_from(None).unwrap().contexts.is_empty());
    }
}
