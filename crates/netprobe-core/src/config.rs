//! Centralized configuration management with TOML support.
//!
//! All process-wide configuration (listener address, upstream completion
//! service, knowledge file) is loaded once at startup and treated as
//! immutable afterwards.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{NetProbeError, Result};

/// Listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServingConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

/// External completion service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Full URL of the OpenAI-compatible chat completions endpoint.
    pub base_url: String,
    /// Model identifier forwarded on every request.
    pub model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Name of the environment variable holding the API credential.
    /// The value itself is read from the process environment at startup.
    pub api_key_env: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1/chat/completions".into(),
            model: "gpt-4o-mini".into(),
            timeout_secs: 30,
            api_key_env: "OPENAI_API_KEY".into(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listener configuration.
    pub serving: ServingConfig,
    /// Completion service configuration.
    pub upstream: UpstreamConfig,
    /// Path to the knowledge file folded into the chat system prompt.
    pub knowledge_path: String,
    /// Logging level (debug, info, warn, error).
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            serving: ServingConfig::default(),
            upstream: UpstreamConfig::default(),
            knowledge_path: "knowledge.md".into(),
            log_level: "info".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            NetProbeError::Other(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.validate()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| NetProbeError::Other(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.serving.port == 0 {
            return Err(NetProbeError::InvalidConfig(
                "serving.port must be > 0".into(),
            ));
        }
        if self.upstream.base_url.trim().is_empty() {
            return Err(NetProbeError::InvalidConfig(
                "upstream.base_url must not be empty".into(),
            ));
        }
        if self.upstream.model.trim().is_empty() {
            return Err(NetProbeError::InvalidConfig(
                "upstream.model must not be empty".into(),
            ));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(NetProbeError::InvalidConfig(
                "upstream.timeout_secs must be > 0".into(),
            ));
        }
        if self.upstream.api_key_env.trim().is_empty() {
            return Err(NetProbeError::InvalidConfig(
                "upstream.api_key_env must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Read the upstream credential from the process environment.
    ///
    /// Absence is not an error here; the chat route reports it at call time.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.upstream.api_key_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn test_zero_port_rejected() {
        let cfg = AppConfig {
            serving: ServingConfig {
                port: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_empty_model_rejected() {
        let mut cfg = AppConfig::default();
        cfg.upstream.model = "  ".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut cfg = AppConfig::default();
        cfg.upstream.timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_config_roundtrip() {
        let cfg = AppConfig::default();
        let tmp = tempfile::NamedTempFile::new().unwrap();
        cfg.save(tmp.path()).unwrap();
        let loaded = AppConfig::from_file(tmp.path()).unwrap();
        assert_eq!(cfg.serving.port, loaded.serving.port);
        assert_eq!(cfg.upstream.model, loaded.upstream.model);
        assert_eq!(cfg.knowledge_path, loaded.knowledge_path);
    }

    #[test]
    fn test_api_key_absent_env() {
        let mut cfg = AppConfig::default();
        cfg.upstream.api_key_env = "NETPROBE_TEST_UNSET_CREDENTIAL".into();
        assert!(cfg.api_key().is_none());
    }
}
