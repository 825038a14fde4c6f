use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::config::{
    ConfigContentProvider, ConfigManager, FileContentConfigProvider, MemoryContentConfigProvider,
    Validate, YamlConfigSerializer,
};
use crate::error::HighScoreError;

/// Persisted best score. Read when a session starts, written when a finished
/// session beats it.
pub trait HighScoreStore: Send + Sync + 'static {
    fn load(&self) -> Result<u32, HighScoreError>;
    fn save(&self, score: u32) -> Result<(), HighScoreError>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub high_score: u32,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Validate for HighScoreRecord {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

pub struct ConfigHighScoreStore<TConfigContentProvider>
where
    TConfigContentProvider: ConfigContentProvider,
{
    manager: ConfigManager<TConfigContentProvider, HighScoreRecord>,
}

pub type FileHighScoreStore = ConfigHighScoreStore<FileContentConfigProvider>;
pub type MemoryHighScoreStore = ConfigHighScoreStore<MemoryContentConfigProvider>;

impl FileHighScoreStore {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Self {
        Self {
            manager: ConfigManager::from_yaml_file(path),
        }
    }
}

impl MemoryHighScoreStore {
    pub fn in_memory() -> Self {
        Self {
            manager: ConfigManager::new(MemoryContentConfigProvider::new(), YamlConfigSerializer::new()),
        }
    }
}

impl<TConfigContentProvider> HighScoreStore for ConfigHighScoreStore<TConfigContentProvider>
where
    TConfigContentProvider: ConfigContentProvider + Send + Sync + 'static,
{
    fn load(&self) -> Result<u32, HighScoreError> {
        Ok(self.manager.get_config()?.high_score)
    }

    fn save(&self, score: u32) -> Result<(), HighScoreError> {
        let record = HighScoreRecord {
            high_score: score,
            updated_at: Some(Local::now().to_rfc3339()),
        };
        self.manager.set_config(&record)?;
        Ok(())
    }
}
