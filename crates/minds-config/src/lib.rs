//! Client configuration for the Minds command-line tools.
//!
//! Kubeconfig-style client configuration:
//! - Named connection contexts (base URL + project + auth)
//! - `current-context` for default selection
//! - API key resolution (explicit override → `MINDS_API_KEY` → context auth)

pub mod client;
pub mod discovery;
pub mod error;
pub mod resolver;

pub use client::{
    client_config_path, load_client_config, load_client_config_from, save_client_config,
    save_client_config_to, AuthConfig, ClientConfig, ClientDefaults, Context,
};
pub use discovery::config_dir;
pub use error::{ConfigError, Result};
pub use resolver::{
    resolve_connection, ConnectionOverrides, KeySource, ResolvedConnection, API_KEY_ENV,
    BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_PROJECT,
};
