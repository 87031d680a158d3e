//! Storage boundary for the podcast catalogue.
//!
//! One trait, two independent backends: [`MemoryRepository`] keeps sorted
//! containers behind a mutex, [`SqliteRepository`] maps the same model onto
//! relational tables. Both enforce the same rules, so callers (and the
//! contract tests) can treat them interchangeably.

mod memory;
mod ordered_set;
mod populate;
mod sqlite;
mod types;

pub use memory::MemoryRepository;
pub use ordered_set::OrderedSet;
pub use populate::{populate, PopulateSummary};
pub use sqlite::SqliteRepository;
pub use types::*;

use crate::domain::{
    Author, AuthorId, Category, CategoryId, Episode, EpisodeId, Playlist, PlaylistItem, Podcast,
    PodcastId, Review, User, UserId,
};

/// Trait for podcast catalogue storage.
///
/// Adding something already stored is a silent no-op. Removing something
/// absent fails with [`RepositoryError::NotFound`]. Lookups of absent
/// entities return `Ok(None)`.
pub trait PodcastRepository: Send + Sync {
    /// Store a user. No-op if the id or the username is already taken.
    fn add_user(&self, user: &User) -> RepositoryResult<()>;

    /// Look a user up by username (trimmed, case-insensitive).
    fn get_user(&self, username: &str) -> RepositoryResult<Option<User>>;

    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;

    fn get_user_count(&self) -> RepositoryResult<usize>;

    fn add_author(&self, author: &Author) -> RepositoryResult<()>;

    fn get_author(&self, id: AuthorId) -> RepositoryResult<Option<Author>>;

    fn add_category(&self, category: &Category) -> RepositoryResult<()>;

    fn get_category(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;

    /// Store a podcast. Its author and categories must already be stored.
    fn add_podcast(&self, podcast: &Podcast) -> RepositoryResult<()>;

    /// Remove a podcast along with its episodes, reviews, category links
    /// and playlist entries.
    fn remove_podcast(&self, podcast: &Podcast) -> RepositoryResult<()>;

    fn get_podcast(&self, id: PodcastId) -> RepositoryResult<Option<Podcast>>;

    /// All podcasts, ordered by id.
    fn get_podcasts(&self) -> RepositoryResult<Vec<Podcast>>;

    fn get_number_of_podcasts(&self) -> RepositoryResult<usize>;

    /// Store an episode. Its podcast must already be stored.
    fn add_episode(&self, episode: &Episode) -> RepositoryResult<()>;

    /// Remove an episode and any playlist entries pointing at it.
    fn remove_episode(&self, episode: &Episode) -> RepositoryResult<()>;

    fn get_episode(
        &self,
        podcast_id: PodcastId,
        episode_id: EpisodeId,
    ) -> RepositoryResult<Option<Episode>>;

    /// Episodes of a podcast in the order they were added.
    fn get_episodes(&self, podcast: &Podcast) -> RepositoryResult<Vec<Episode>>;

    fn get_number_of_episodes(&self, podcast: &Podcast) -> RepositoryResult<usize>;

    /// Store a review. It must already be attached to `poster` and
    /// `podcast` (see [`crate::domain::make_review`]), and both must be
    /// stored.
    fn add_review(&self, review: &Review, poster: &User, podcast: &Podcast)
        -> RepositoryResult<()>;

    /// All reviews in the order they were added.
    fn get_reviews(&self) -> RepositoryResult<Vec<Review>>;

    /// Add an item to the stored user's playlist, then refresh `user`'s copy.
    fn add_to_user_playlist(&self, user: &mut User, item: PlaylistItem) -> RepositoryResult<()>;

    /// Remove an item from the stored user's playlist, then refresh `user`'s
    /// copy.
    fn remove_from_user_playlist(
        &self,
        user: &mut User,
        item: PlaylistItem,
    ) -> RepositoryResult<()>;

    fn get_user_playlist(&self, user: &User) -> RepositoryResult<Option<Playlist>>;

    fn get_user_podcast_playlist(&self, user: &User) -> RepositoryResult<Vec<Podcast>>;

    fn get_user_episode_playlist(&self, user: &User) -> RepositoryResult<Vec<Episode>>;

    /// Podcasts plus episodes saved in `playlist`.
    fn get_playlist_total(&self, playlist: &Playlist) -> usize {
        playlist.len()
    }

    /// Case-insensitive substring search, ordered by podcast id. A blank
    /// term matches nothing.
    fn search_podcasts(&self, term: &str, filter: SearchFilter) -> RepositoryResult<Vec<Podcast>>;
}
