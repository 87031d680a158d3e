//! Podcast catalogue domain model.
//!
//! Entities reference each other by id rather than by embedded objects:
//! a podcast knows its author's id, an episode its podcast's id, and so on.
//! Back-references are plain id lists that the repository resolves.

mod author;
mod category;
mod episode;
mod playlist;
mod podcast;
mod review;
mod subscription;
mod user;
mod validate;

pub use author::Author;
pub use category::Category;
pub use episode::{format_audio_length, Episode};
pub use playlist::{Playlist, PlaylistItem};
pub use podcast::Podcast;
pub use review::{make_review, Review};
pub use subscription::PodcastSubscription;
pub use user::User;
pub(crate) use user::normalize_username;
pub use validate::{parse_id, validate_non_empty};

use thiserror::Error;

pub type AuthorId = u32;
pub type CategoryId = u32;
pub type PodcastId = u32;
pub type EpisodeId = u32;
pub type UserId = u32;
pub type PlaylistId = u32;
pub type SubscriptionId = u32;
pub type ReviewId = uuid::Uuid;

/// Errors raised while constructing or mutating entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// A related entity was attached to an owner it does not belong to.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Ordering used by the sorted containers of the in-memory repository.
///
/// Kept separate from `Ord` because several entities sort by a field other
/// than the one their equality is defined on (authors by name, reviews by
/// rating, playlists by episode count).
pub trait Ordered {
    type Key: Ord;

    fn sort_key(&self) -> Self::Key;
}
