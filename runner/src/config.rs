use std::path::PathBuf;

pub(crate) use common::config::{ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer};
use common::commentary::CommentaryConfig;
use common::games::snake::GameSettings;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "neon_snake_runner_config.yaml";

/// Config file next to the executable, falling back to the working directory.
pub fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

pub fn get_config_manager(
    path: Option<PathBuf>,
) -> ConfigManager<FileContentConfigProvider, RunnerConfig, YamlConfigSerializer> {
    ConfigManager::from_yaml_file(path.unwrap_or_else(default_config_path))
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RunnerConfig {
    pub snake: GameSettings,
    pub commentary: CommentaryConfig,
    pub high_score_path: String,
}

impl Validate for RunnerConfig {
    fn validate(&self) -> Result<(), String> {
        self.snake.validate()?;
        self.commentary.validate()?;
        if self.high_score_path.trim().is_empty() {
            return Err("high_score_path must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            snake: GameSettings::default(),
            commentary: CommentaryConfig::default(),
            high_score_path: "neon_snake_high_score.yaml".to_string(),
        }
    }
}
