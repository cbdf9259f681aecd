//! Resolve the connection settings a client should use.
//!
//! Precedence, highest first:
//! 1. Explicit overrides (command-line flags)
//! 2. Environment variables (`MINDS_API_KEY`, `MINDS_BASE_URL`)
//! 3. The selected context (override name, else `current-context`)
//! 4. Built-in defaults

use std::fmt;

use crate::{ClientConfig, ConfigError, Context, Result};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "MINDS_API_KEY";

/// Environment variable holding the service URL.
pub const BASE_URL_ENV: &str = "MINDS_BASE_URL";

/// Service used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://mdb.ai";

/// Project used when nothing else is configured.
pub const DEFAULT_PROJECT: &str = "mindsdb";

/// Values that take precedence over everything in the config file.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    /// Context to use instead of `current-context`.
    pub context: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Service URL.
    pub base_url: Option<String>,
    /// Project.
    pub project: Option<String>,
}

/// Where the API key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Passed explicitly.
    Override,
    /// Environment variable.
    EnvVar(String),
    /// Auth section of a context.
    Context(String),
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Override => write!(f, "command line"),
            KeySource::EnvVar(var) => write!(f, "env var {}", var),
            KeySource::Context(name) => write!(f, "context '{}'", name),
        }
    }
}

/// Fully resolved connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConnection {
    /// Service URL.
    pub base_url: String,
    /// API key.
    pub api_key: String,
    /// Project minds are scoped to.
    pub project: String,
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Where the API key came from.
    pub key_source: KeySource,
    /// Context the settings were taken from, if any.
    pub context: Option<String>,
}

impl fmt::Debug for ResolvedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConnection")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("project", &self.project)
            .field("timeout", &self.timeout)
            .field("key_source", &self.key_source)
            .field("context", &self.context)
            .finish()
    }
}

/// Resolve connection settings using the process environment.
pub fn resolve_connection(
    config: &ClientConfig,
    overrides: &ConnectionOverrides,
) -> Result<ResolvedConnection> {
    resolve_with_env(config, overrides, |var| {
        std::env::var(var).ok().filter(|v| !v.is_empty())
    })
}

fn resolve_with_env(
    config: &ClientConfig,
    overrides: &ConnectionOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConnection> {
    let context: Option<&Context> = match &overrides.context {
        Some(name) => Some(
            config
                .get_context(name)
                .ok_or_else(|| ConfigError::ContextNotFound(name.clone()))?,
        ),
        None => config.current(),
    };

    let (api_key, key_source) = if let Some(key) = &overrides.api_key {
        (key.clone(), KeySource::Override)
    } else if let Some(key) = env(API_KEY_ENV) {
        (key, KeySource::EnvVar(API_KEY_ENV.to_string()))
    } else if let Some(ctx) = context
        && let Some(auth) = &ctx.auth
        && let Some(key) = auth.resolve()?
    {
        (key, KeySource::Context(ctx.name.clone()))
    } else {
        return Err(ConfigError::ApiKeyNotFound {
            env_var: API_KEY_ENV.to_string(),
            context: context.map_or_else(|| "current".to_string(), |c| c.name.clone()),
        });
    };

    let base_url = overrides
        .base_url
        .clone()
        .or_else(|| env(BASE_URL_ENV))
        .or_else(|| context.map(|c| c.base_url.clone()))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let project = overrides
        .project
        .clone()
        .or_else(|| context.and_then(|c| c.project.clone()))
        .unwrap_or_else(|| config.defaults.project.clone());

    let timeout = context
        .and_then(|c| c.timeout)
        .unwrap_or(config.defaults.timeout);

    tracing::debug!(
        base_url = %base_url,
        project = %project,
        key_source = %key_source,
        "resolved connection"
    );

    Ok(ResolvedConnection {
        base_url,
        api_key,
        project,
        timeout,
        key_source,
        context: context.map(|c| c.name.clone()),
    })
}
