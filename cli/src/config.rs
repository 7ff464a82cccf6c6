//! Configuration file management.
//!
//! # Configuration Format
//!
//! ```toml
//! [server]
//! url = "http://127.0.0.1:5654"  # Meridian server URL
//! timeout = 30                   # request timeout in seconds
//!
//! [ui]
//! color = true
//! spinner = true
//! history_size = 1000
//! timing = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ShellError};

/// Shell configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Server connection settings
    pub server: Option<ServerConfig>,

    /// UI preferences
    pub ui: Option<UiConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server URL (e.g., http://127.0.0.1:5654)
    pub url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Enable colored output (default: true)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Show a spinner while a statement executes (default: true)
    #[serde(default = "default_true")]
    pub spinner: bool,

    /// Maximum history entries kept on disk (default: 1000)
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Print elapsed time after each query (default: false)
    #[serde(default)]
    pub timing: bool,
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_history_size() -> usize {
    1000
}

impl ShellConfig {
    /// Load configuration from the given path; a missing file yields the
    /// defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let expanded = expand_config_path(path);
        if !expanded.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&expanded).map_err(|e| {
            ShellError::Config(format!("failed to read {}: {}", expanded.display(), e))
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Server section with defaults applied
    pub fn resolved_server(&self) -> ServerConfig {
        self.server.clone().unwrap_or(ServerConfig {
            url: None,
            timeout: default_timeout(),
        })
    }

    /// UI section with defaults applied
    pub fn resolved_ui(&self) -> UiConfig {
        self.ui.clone().unwrap_or(UiConfig {
            color: true,
            spinner: true,
            history_size: default_history_size(),
            timing: false,
        })
    }
}

/// Expand a leading `~` against `$HOME`
pub fn expand_config_path(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        return PathBuf::from(home).join(stripped);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: ShellConfig = toml::from_str(
            r#"
            [server]
            url = "http://db.example.com:5654"
            timeout = 10

            [ui]
            color = false
            history_size = 50
            "#,
        )
        .unwrap();

        let server = config.resolved_server();
        assert_eq!(server.url.as_deref(), Some("http://db.example.com:5654"));
        assert_eq!(server.timeout, 10);

        let ui = config.resolved_ui();
        assert!(!ui.color);
        assert!(ui.spinner);
        assert_eq!(ui.history_size, 50);
        assert!(!ui.timing);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: ShellConfig = toml::from_str("").unwrap();
        let server = config.resolved_server();
        assert!(server.url.is_none());
        assert_eq!(server.timeout, 30);

        let ui = config.resolved_ui();
        assert!(ui.color);
        assert_eq!(ui.history_size, 1000);
    }

    #[test]
    fn test_missing_file_is_defaults() {
        let config = ShellConfig::load(Path::new("/nonexistent/meridian.toml")).unwrap();
        assert!(config.server.is_none());
        assert!(config.ui.is_none());
    }

    #[test]
    fn test_expand_tilde() {
        std::env::set_var("HOME", "/home/example");
        let expanded = expand_config_path(Path::new("~/.meridian/config.toml"));
        assert_eq!(expanded, PathBuf::from("/home/example/.meridian/config.toml"));

        let untouched = expand_config_path(Path::new("/etc/meridian.toml"));
        assert_eq!(untouched, PathBuf::from("/etc/meridian.toml"));
    }
}
