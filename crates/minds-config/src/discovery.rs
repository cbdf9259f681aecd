//! Config directory discovery.

use std::path::PathBuf;

/// Application name for platform config directory resolution.
const APP_NAME: &str = "minds";

/// Environment variable that overrides the config directory.
///
/// When set, this takes precedence over the platform default.
/// Useful for testing and for keeping several setups side by side.
pub const CONFIG_DIR_ENV: &str = "MINDS_CONFIG_DIR";

/// Get the config directory for minds.
///
/// Checks `MINDS_CONFIG_DIR` first, then falls back to the platform default
/// (`~/.config/minds` on Linux, `~/Library/Application Support/minds` on macOS).
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
