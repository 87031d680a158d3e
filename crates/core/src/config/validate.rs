use std::collections::HashSet;

use super::{types::Config, ConfigError, RepositoryBackend};

/// Validate configuration
/// Currently validates:
/// - data.path is set
/// - database.path is set when the database backend is selected
/// - catalogue.featured has no duplicate ids
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.data.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "data.path cannot be empty".to_string(),
        ));
    }

    if config.repository.backend == RepositoryBackend::Database
        && config.database.path.as_os_str().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "database.path is required when repository.backend = \"database\"".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for id in &config.catalogue.featured {
        if !seen.insert(id) {
            return Err(ConfigError::ValidationError(format!(
                "catalogue.featured lists podcast {} more than once",
                id
            )));
        }
    }

    Ok(())
}
