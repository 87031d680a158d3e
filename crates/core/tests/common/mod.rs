//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use podcast_core::{MemoryRepository, PodcastRepository, SqliteRepository};

/// Directory holding the CSV fixtures.
pub fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

/// One empty instance of each backend, labelled for assertion messages.
pub fn empty_repositories() -> Vec<(&'static str, Box<dyn PodcastRepository>)> {
    vec![
        ("memory", Box::new(MemoryRepository::new())),
        (
            "sqlite",
            Box::new(SqliteRepository::in_memory().expect("Failed to open in-memory database")),
        ),
    ]
}

/// Each backend seeded with the shared fixture catalogue.
pub fn seeded_repositories() -> Vec<(&'static str, Box<dyn PodcastRepository>)> {
    let repos = empty_repositories();
    for (name, repo) in &repos {
        podcast_core::testing::fixtures::seed(repo.as_ref())
            .unwrap_or_else(|e| panic!("{}: failed to seed: {}", name, e));
    }
    repos
}
