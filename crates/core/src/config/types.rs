use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::PodcastId;

/// Root configuration. Every section has defaults, so an empty file is valid.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub catalogue: CatalogueConfig,
}

/// Which repository backend to run against.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub backend: RepositoryBackend,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryBackend {
    #[default]
    Memory,
    Database,
}

/// Database configuration (used by the `database` backend)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("podcasts.db")
}

/// Directory holding the catalogue CSV files.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogueConfig {
    /// Podcasts shown on the front page, in display order.
    #[serde(default = "default_featured")]
    pub featured: Vec<PodcastId>,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            featured: default_featured(),
        }
    }
}

fn default_featured() -> Vec<PodcastId> {
    vec![636, 431, 171, 392, 915]
}
