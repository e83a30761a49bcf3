//! Editor configuration.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_RELAY_URL: &str = "ws://127.0.0.1:8080";
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(3000);

/// Error loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for one relay connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// `ws://` or `wss://` address of the relay.
    pub relay_url: String,
    /// Name announced in `boardInfo`.
    pub name: String,
    /// Fixed wait between a failed or lost connection and the next attempt.
    pub retry_delay: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            relay_url: DEFAULT_RELAY_URL.to_string(),
            name: local_host_name(),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// On-disk form; every key is optional.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    relay_url: Option<String>,
    name: Option<String>,
    retry_delay_ms: Option<u64>,
}

impl EditorConfig {
    pub fn new(relay_url: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Parse TOML, filling missing keys with defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        let mut config = Self::default();
        if let Some(url) = file.relay_url {
            config.relay_url = url;
        }
        if let Some(name) = file.name {
            config.name = name;
        }
        if let Some(ms) = file.retry_delay_ms {
            config.retry_delay = Duration::from_millis(ms);
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }
}

/// Host name of this machine, used as the default identity name.
pub fn local_host_name() -> String {
    let name = gethostname::gethostname().to_string_lossy().into_owned();
    if name.is_empty() {
        "editor".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = EditorConfig::from_toml("").unwrap();
        assert_eq!(config.relay_url, DEFAULT_RELAY_URL);
        assert_eq!(config.retry_delay, DEFAULT_RETRY_DELAY);
        assert!(!config.name.is_empty());
    }

    #[test]
    fn file_overrides() {
        let config = EditorConfig::from_toml(
            r#"
            relay_url = "wss://relay.local"
            name = "booth"
            retry_delay_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.relay_url, "wss://relay.local");
        assert_eq!(config.name, "booth");
        assert_eq!(config.retry_delay, Duration::from_millis(500));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(matches!(
            EditorConfig::from_toml("relay = \"ws://x\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
