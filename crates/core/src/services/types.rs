//! Views and errors returned by the service layer.

use serde::Serialize;
use thiserror::Error;

use crate::auth::PasswordError;
use crate::domain::{DomainError, EpisodeId, PodcastId};
use crate::repository::RepositoryError;

/// Errors for service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Username already taken: {0}")]
    NameNotUnique(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Invalid username or password")]
    Authentication,

    #[error("Podcast not found: {0}")]
    NonExistentPodcast(PodcastId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub user_name: String,
}

/// A podcast with its author and category names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodcastSummary {
    pub id: PodcastId,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub description: String,
    pub language: String,
    pub website: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itunes_id: Option<u64>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewView {
    pub username: String,
    pub podcast_id: PodcastId,
    pub rating: u32,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeView {
    pub id: EpisodeId,
    pub title: String,
    pub description: String,
    pub audio_link: String,
    /// Seconds.
    pub audio_length: u32,
    /// `m:ss`.
    pub length: String,
    pub publish_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistDetails {
    pub username: String,
    pub title: String,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistPodcastView {
    pub id: PodcastId,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistEpisodeView {
    pub id: EpisodeId,
    pub title: String,
    pub author: String,
    pub podcast_id: PodcastId,
    pub podcast_title: String,
}
