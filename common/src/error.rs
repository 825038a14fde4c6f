use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(String),
    #[error("Failed to deserialize config: {0}")]
    Deserialize(String),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum CommentaryError {
    #[error("Commentary service is rate limited (HTTP 429)")]
    RateLimited,
    #[error("Commentary service returned HTTP {0}")]
    Status(u16),
    #[error("Commentary request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Commentary is disabled")]
    Disabled,
    #[error("Commentary API key is not set (env {0})")]
    MissingApiKey(String),
    #[error("Commentary response was empty")]
    EmptyResponse,
    #[error("Commentary response was malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl CommentaryError {
    pub fn is_rate_limited(&self) -> bool {
        match self {
            CommentaryError::RateLimited => true,
            CommentaryError::Status(code) => *code == 429,
            CommentaryError::Transport(e) => e.status().is_some_and(|s| s.as_u16() == 429),
            _ => false,
        }
    }
}
