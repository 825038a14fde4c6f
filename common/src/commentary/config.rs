use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Validate;
use super::service::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentaryConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

impl Default for CommentaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_key_env: "API_KEY".to_string(),
            max_retries: 2,
            initial_backoff_ms: 1000,
        }
    }
}

impl CommentaryConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_backoff_ms),
        }
    }

    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|key| !key.trim().is_empty())
    }
}

impl Validate for CommentaryConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(format!("Commentary endpoint must be an http(s) URL, got '{}'", self.endpoint));
        }
        if self.model.trim().is_empty() {
            return Err("Commentary model cannot be empty".to_string());
        }
        if self.api_key_env.trim().is_empty() {
            return Err("Commentary api_key_env cannot be empty".to_string());
        }
        if self.max_retries > 10 {
            return Err(format!("Commentary max_retries must be at most 10, got {}", self.max_retries));
        }
        if self.initial_backoff_ms == 0 || self.initial_backoff_ms > 60_000 {
            return Err(format!(
                "Commentary initial_backoff_ms must be between 1 and 60000, got {}",
                self.initial_backoff_ms
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(CommentaryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_disabled_skips_validation() {
        let config = CommentaryConfig {
            enabled: false,
            endpoint: String::new(),
            ..CommentaryConfig::default()
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        let config = CommentaryConfig {
            endpoint: "ftp://example.com".to_string(),
            ..CommentaryConfig::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = CommentaryConfig {
            max_retries: 4,
            initial_backoff_ms: 250,
            ..CommentaryConfig::default()
        };

        let policy = config.retry_policy();

        assert_eq!(policy.max_retries, 4);
        assert_eq!(policy.initial_delay, Duration::from_millis(250));
    }
}
