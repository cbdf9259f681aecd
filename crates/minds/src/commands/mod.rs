//! CLI command handlers.

pub mod ask;
pub mod config;
pub mod datasources;
pub mod minds;

use std::time::Duration;

use anyhow::Result;
use minds_client::MindsClient;
use minds_config::ConnectionOverrides;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Connection settings given on the command line.
    pub overrides: ConnectionOverrides,
}

impl Context {
    /// Build a client from the command line, environment and client config.
    pub fn connect(&self) -> Result<MindsClient> {
        let config = minds_config::load_client_config()?;
        let resolved = minds_config::resolve_connection(&config, &self.overrides)?;

        tracing::debug!(
            base_url = %resolved.base_url,
            project = %resolved.project,
            context = ?resolved.context,
            "connecting"
        );
        if self.verbose {
            eprintln!(
                "{}",
                console::style(format!("API key from {}", resolved.key_source)).dim()
            );
        }

        let client = MindsClient::builder()
            .base_url(&resolved.base_url)
            .api_key(&resolved.api_key)
            .project(&resolved.project)
            .timeout(Duration::from_secs(resolved.timeout))
            .build()?;
        Ok(client)
    }
}

/// Parse a `key=value` pair. Values that parse as JSON keep their type.
pub fn parse_key_value(raw: &str) -> std::result::Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }

    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("host=db.internal").unwrap(),
            ("host".to_string(), json!("db.internal"))
        );
        assert_eq!(parse_key_value("port=5432").unwrap().1, json!(5432));
        assert_eq!(parse_key_value("ssl=true").unwrap().1, json!(true));
        assert_eq!(parse_key_value("dsn=a=b").unwrap().1, json!("a=b"));
        assert_eq!(parse_key_value("empty=").unwrap().1, json!(""));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }
}
