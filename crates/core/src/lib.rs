pub mod auth;
pub mod config;
pub mod domain;
pub mod loader;
pub mod repository;
pub mod services;
pub mod testing;

pub use auth::{hash_password, verify_password, PasswordError};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, RepositoryBackend,
};
pub use domain::{
    Author, Category, DomainError, Episode, Playlist, PlaylistItem, Podcast, PodcastSubscription,
    Review, User,
};
pub use loader::{CsvDataReader, Dataset, LoaderError};
pub use repository::{
    populate, MemoryRepository, PodcastRepository, PopulateSummary, RepositoryError,
    SearchFilter, SqliteRepository,
};
pub use services::ServiceError;
