//! Types for the CSV loader.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Author, Category, DomainError, Episode, Podcast, Review, User};

/// Everything read from a data directory, already linked by id.
///
/// Episodes and reviews whose podcast or user is unknown are kept with their
/// dangling id but are not attached to anything.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub authors: Vec<Author>,
    pub categories: Vec<Category>,
    pub podcasts: Vec<Podcast>,
    pub episodes: Vec<Episode>,
    pub users: Vec<User>,
    pub reviews: Vec<Review>,
}

/// Errors for loading catalogue data.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file} line {line}: {message}")]
    Csv {
        file: String,
        line: u64,
        message: String,
    },

    #[error("{file} line {line}: {source}")]
    Domain {
        file: String,
        line: u64,
        #[source]
        source: DomainError,
    },
}

/// A row of `podcasts.csv`.
#[derive(Debug, Deserialize)]
pub(crate) struct PodcastRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub itunes_id: String,
    #[serde(default)]
    pub author: String,
    /// `|`-separated category names.
    #[serde(default)]
    pub categories: String,
}

/// A row of `episodes.csv`.
#[derive(Debug, Deserialize)]
pub(crate) struct EpisodeRecord {
    pub id: String,
    pub podcast_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub audio: String,
    pub audio_length: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pub_date: String,
}

/// A row of `users.csv`.
#[derive(Debug, Deserialize)]
pub(crate) struct UserRecord {
    pub id: String,
    pub username: String,
    pub password: String,
}

/// A row of `reviews.csv`.
#[derive(Debug, Deserialize)]
pub(crate) struct ReviewRecord {
    #[serde(rename = "user-id")]
    pub user_id: String,
    #[serde(rename = "podcast-id")]
    pub podcast_id: String,
    pub rating: String,
    #[serde(rename = "comment-text", default)]
    pub comment: String,
}
