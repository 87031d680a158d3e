//! In-memory repository backed by sorted containers.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::{
    ensure_review_attached, normalize_term, OrderedSet, PodcastRepository, RepositoryError,
    RepositoryResult, SearchFilter,
};
use crate::domain::{
    normalize_username, Author, AuthorId, Category, CategoryId, Episode, EpisodeId, Playlist,
    PlaylistItem, Podcast, PodcastId, Review, ReviewId, User, UserId,
};

#[derive(Debug, Default)]
struct MemoryState {
    podcasts: OrderedSet<Podcast>,
    authors: OrderedSet<Author>,
    categories: OrderedSet<Category>,
    episodes: OrderedSet<Episode>,
    users: Vec<User>,
    reviews: Vec<Review>,
}

impl MemoryState {
    fn podcast(&self, id: PodcastId) -> Option<&Podcast> {
        self.podcasts.find(|p| p.id() == id)
    }

    fn episode(&self, id: EpisodeId) -> Option<&Episode> {
        self.episodes.find(|e| e.id() == id)
    }

    fn user(&self, user: &User) -> Option<&User> {
        self.users.iter().find(|u| u.id() == user.id())
    }

    fn ensure_item_exists(&self, item: PlaylistItem) -> RepositoryResult<()> {
        let found = match item {
            PlaylistItem::Podcast(id) => self.podcast(id).is_some(),
            PlaylistItem::Episode(id) => self.episode(id).is_some(),
        };
        if found {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(item.to_string()))
        }
    }

    /// Copy of `playlist` holding only the items that resolve here.
    fn resolvable_playlist(&self, playlist: &Playlist) -> RepositoryResult<Playlist> {
        let mut stored = Playlist::new(playlist.id(), playlist.creator(), playlist.name())?;
        let items = playlist
            .podcast_ids()
            .iter()
            .map(|id| PlaylistItem::Podcast(*id))
            .chain(playlist.episode_ids().iter().map(|id| PlaylistItem::Episode(*id)));
        for item in items {
            if self.ensure_item_exists(item).is_ok() {
                stored.add_item(item);
            }
        }
        Ok(stored)
    }

    fn matches(&self, podcast: &Podcast, needle: &str, filter: SearchFilter) -> bool {
        let contains = |haystack: &str| haystack.to_lowercase().contains(needle);
        match filter {
            SearchFilter::Title => contains(podcast.title()),
            SearchFilter::Language => contains(podcast.language()),
            SearchFilter::Author => self
                .authors
                .find(|a| a.id() == podcast.author_id())
                .is_some_and(|a| contains(a.name())),
            SearchFilter::Category => podcast.category_ids().iter().any(|id| {
                self.categories
                    .find(|c| c.id() == *id)
                    .is_some_and(|c| contains(c.name()))
            }),
        }
    }
}

/// Repository that keeps everything in process memory.
///
/// Every operation holds the state lock for its whole duration.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| RepositoryError::Database(format!("repository lock poisoned: {}", e)))
    }

    fn update_playlist(
        &self,
        user: &mut User,
        item: PlaylistItem,
        add: bool,
    ) -> RepositoryResult<()> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        if add {
            state.ensure_item_exists(item)?;
        }
        let stored = state
            .users
            .iter_mut()
            .find(|u| u.id() == user.id())
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", user.username())))?;

        let changed = if add {
            stored.playlist_mut().add_item(item)
        } else {
            stored.playlist_mut().remove_item(item)
        };
        debug!(user = stored.username(), %item, add, changed, "Playlist updated");

        user.replace_playlist(stored.playlist().clone());
        Ok(())
    }
}

impl PodcastRepository for MemoryRepository {
    fn add_user(&self, user: &User) -> RepositoryResult<()> {
        let mut state = self.lock()?;
        if state
            .users
            .iter()
            .any(|u| u.id() == user.id() || u.username() == user.username())
        {
            debug!(user_id = user.id(), username = user.username(), "User already stored");
            return Ok(());
        }

        let mut stored = user.clone();
        stored.clear_links();
        let playlist = state.resolvable_playlist(user.playlist())?;
        stored.replace_playlist(playlist);
        state.users.push(stored);
        Ok(())
    }

    fn get_user(&self, username: &str) -> RepositoryResult<Option<User>> {
        let username = normalize_username(username);
        let state = self.lock()?;
        Ok(state.users.iter().find(|u| u.username() == username).cloned())
    }

    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.id() == id).cloned())
    }

    fn get_user_count(&self) -> RepositoryResult<usize> {
        Ok(self.lock()?.users.len())
    }

    fn add_author(&self, author: &Author) -> RepositoryResult<()> {
        let mut stored = author.clone();
        stored.clear_links();
        if !self.lock()?.authors.insert(stored) {
            debug!(author_id = author.id(), "Author already stored");
        }
        Ok(())
    }

    fn get_author(&self, id: AuthorId) -> RepositoryResult<Option<Author>> {
        Ok(self.lock()?.authors.find(|a| a.id() == id).cloned())
    }

    fn add_category(&self, category: &Category) -> RepositoryResult<()> {
        let mut stored = category.clone();
        stored.clear_links();
        if !self.lock()?.categories.insert(stored) {
            debug!(category_id = category.id(), "Category already stored");
        }
        Ok(())
    }

    fn get_category(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        Ok(self.lock()?.categories.find(|c| c.id() == id).cloned())
    }

    fn add_podcast(&self, podcast: &Podcast) -> RepositoryResult<()> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        if state.podcasts.contains(podcast) {
            debug!(podcast_id = podcast.id(), "Podcast already stored");
            return Ok(());
        }
        if state.authors.find(|a| a.id() == podcast.author_id()).is_none() {
            return Err(RepositoryError::NotFound(format!(
                "author {}",
                podcast.author_id()
            )));
        }
        for category_id in podcast.category_ids() {
            if state.categories.find(|c| c.id() == *category_id).is_none() {
                return Err(RepositoryError::NotFound(format!("category {}", category_id)));
            }
        }

        if let Some(author) = state.authors.find_mut(|a| a.id() == podcast.author_id()) {
            author.link_podcast(podcast.id());
        }
        for category_id in podcast.category_ids() {
            if let Some(category) = state.categories.find_mut(|c| c.id() == *category_id) {
                category.link_podcast(podcast.id());
            }
        }

        let mut stored = podcast.clone();
        stored.clear_links();
        state.podcasts.insert(stored);
        Ok(())
    }

    fn remove_podcast(&self, podcast: &Podcast) -> RepositoryResult<()> {
        let mut guard = self.lock()?;
        let state = &mut *guard;
        let id = podcast.id();

        let removed = state
            .podcasts
            .remove_where(|p| p.id() == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("podcast {}", id)))?;
        let episodes = state.episodes.drain_where(|e| e.podcast_id() == id);

        if let Some(author) = state.authors.find_mut(|a| a.id() == removed.author_id()) {
            author.remove_podcast(id);
        }
        for category in state.categories.iter_mut() {
            category.unlink_podcast(id);
        }

        let review_ids: Vec<ReviewId> = state
            .reviews
            .iter()
            .filter(|r| r.podcast() == id)
            .map(|r| r.id())
            .collect();
        state.reviews.retain(|r| r.podcast() != id);

        for user in state.users.iter_mut() {
            for review_id in &review_ids {
                user.unlink_review(*review_id);
            }
            let playlist = user.playlist_mut();
            playlist.remove_item(PlaylistItem::Podcast(id));
            for episode in &episodes {
                playlist.remove_item(PlaylistItem::Episode(episode.id()));
            }
        }

        debug!(
            podcast_id = id,
            episodes = episodes.len(),
            reviews = review_ids.len(),
            "Podcast removed"
        );
        Ok(())
    }

    fn get_podcast(&self, id: PodcastId) -> RepositoryResult<Option<Podcast>> {
        Ok(self.lock()?.podcast(id).cloned())
    }

    fn get_podcasts(&self) -> RepositoryResult<Vec<Podcast>> {
        Ok(self.lock()?.podcasts.iter().cloned().collect())
    }

    fn get_number_of_podcasts(&self) -> RepositoryResult<usize> {
        Ok(self.lock()?.podcasts.len())
    }

    fn add_episode(&self, episode: &Episode) -> RepositoryResult<()> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        if state.episodes.contains(episode) {
            debug!(episode_id = episode.id(), "Episode already stored");
            return Ok(());
        }
        let podcast = state
            .podcasts
            .find_mut(|p| p.id() == episode.podcast_id())
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("podcast {}", episode.podcast_id()))
            })?;
        podcast.link_episode(episode.id());
        state.episodes.insert(episode.clone());
        Ok(())
    }

    fn remove_episode(&self, episode: &Episode) -> RepositoryResult<()> {
        let mut guard = self.lock()?;
        let state = &mut *guard;
        let id = episode.id();

        let removed = state
            .episodes
            .remove_where(|e| e.id() == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("episode {}", id)))?;
        if let Some(podcast) = state.podcasts.find_mut(|p| p.id() == removed.podcast_id()) {
            podcast.remove_episode(id);
        }
        for user in state.users.iter_mut() {
            user.playlist_mut().remove_item(PlaylistItem::Episode(id));
        }
        Ok(())
    }

    fn get_episode(
        &self,
        podcast_id: PodcastId,
        episode_id: EpisodeId,
    ) -> RepositoryResult<Option<Episode>> {
        let state = self.lock()?;
        Ok(state
            .episodes
            .find(|e| e.id() == episode_id && e.podcast_id() == podcast_id)
            .cloned())
    }

    fn get_episodes(&self, podcast: &Podcast) -> RepositoryResult<Vec<Episode>> {
        let state = self.lock()?;
        let Some(stored) = state.podcast(podcast.id()) else {
            return Ok(Vec::new());
        };
        Ok(stored
            .episode_ids()
            .iter()
            .filter_map(|id| state.episode(*id).cloned())
            .collect())
    }

    fn get_number_of_episodes(&self, podcast: &Podcast) -> RepositoryResult<usize> {
        let state = self.lock()?;
        Ok(state
            .podcast(podcast.id())
            .map(|p| p.episode_ids().len())
            .unwrap_or(0))
    }

    fn add_review(
        &self,
        review: &Review,
        poster: &User,
        podcast: &Podcast,
    ) -> RepositoryResult<()> {
        ensure_review_attached(review, poster, podcast)?;

        let mut guard = self.lock()?;
        let state = &mut *guard;

        let user = state
            .users
            .iter_mut()
            .find(|u| u.id() == poster.id())
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", poster.username())))?;
        let stored_podcast = state
            .podcasts
            .find_mut(|p| p.id() == podcast.id())
            .ok_or_else(|| RepositoryError::NotFound(format!("podcast {}", podcast.id())))?;

        if state.reviews.contains(review) {
            debug!(review_id = %review.id(), "Review already stored");
            return Ok(());
        }
        user.link_review(review.id());
        stored_podcast.link_review(review.id());
        state.reviews.push(review.clone());
        Ok(())
    }

    fn get_reviews(&self) -> RepositoryResult<Vec<Review>> {
        Ok(self.lock()?.reviews.clone())
    }

    fn add_to_user_playlist(&self, user: &mut User, item: PlaylistItem) -> RepositoryResult<()> {
        self.update_playlist(user, item, true)
    }

    fn remove_from_user_playlist(
        &self,
        user: &mut User,
        item: PlaylistItem,
    ) -> RepositoryResult<()> {
        self.update_playlist(user, item, false)
    }

    fn get_user_playlist(&self, user: &User) -> RepositoryResult<Option<Playlist>> {
        Ok(self.lock()?.user(user).map(|u| u.playlist().clone()))
    }

    fn get_user_podcast_playlist(&self, user: &User) -> RepositoryResult<Vec<Podcast>> {
        let state = self.lock()?;
        let Some(stored) = state.user(user) else {
            return Ok(Vec::new());
        };
        Ok(stored
            .playlist()
            .podcast_ids()
            .iter()
            .filter_map(|id| state.podcast(*id).cloned())
            .collect())
    }

    fn get_user_episode_playlist(&self, user: &User) -> RepositoryResult<Vec<Episode>> {
        let state = self.lock()?;
        let Some(stored) = state.user(user) else {
            return Ok(Vec::new());
        };
        Ok(stored
            .playlist()
            .episode_ids()
            .iter()
            .filter_map(|id| state.episode(*id).cloned())
            .collect())
    }

    fn search_podcasts(&self, term: &str, filter: SearchFilter) -> RepositoryResult<Vec<Podcast>> {
        let Some(needle) = normalize_term(term) else {
            return Ok(Vec::new());
        };
        let state = self.lock()?;
        Ok(state
            .podcasts
            .iter()
            .filter(|p| state.matches(p, &needle, filter))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::make_review;

    fn create_test_repository() -> MemoryRepository {
        let repo = MemoryRepository::new();
        repo.add_author(&Author::new(1, "Joe Toste").unwrap()).unwrap();
        repo.add_category(&Category::new(1, "Business").unwrap()).unwrap();
        let mut podcast = Podcast::new(1, 1, "Joe Toste Podcast").unwrap();
        podcast.add_category(&Category::new(1, "Business").unwrap());
        repo.add_podcast(&podcast).unwrap();
        repo
    }

    #[test]
    fn test_add_podcast_links_author_and_category() {
        let repo = create_test_repository();
        assert_eq!(repo.get_author(1).unwrap().unwrap().podcast_ids(), &[1]);
        assert_eq!(repo.get_category(1).unwrap().unwrap().podcast_ids(), &[1]);
    }

    #[test]
    fn test_add_podcast_requires_author() {
        let repo = MemoryRepository::new();
        let result = repo.add_podcast(&Podcast::new(1, 9, "Orphan").unwrap());
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
        assert_eq!(repo.get_number_of_podcasts().unwrap(), 0);
    }

    #[test]
    fn test_add_user_with_taken_username_is_noop() {
        let repo = MemoryRepository::new();
        repo.add_user(&User::new(0, "fmercury", "pw").unwrap()).unwrap();
        repo.add_user(&User::new(1, "FMercury", "other").unwrap()).unwrap();
        assert_eq!(repo.get_user_count().unwrap(), 1);
        assert_eq!(repo.get_user("fmercury").unwrap().unwrap().id(), 0);
    }

    #[test]
    fn test_remove_podcast_cascades() {
        let repo = create_test_repository();
        repo.add_episode(&Episode::new(1, 1, "http://a/1", 60).unwrap())
            .unwrap();

        let mut user = User::new(0, "thorke", "pw").unwrap();
        repo.add_user(&user).unwrap();
        repo.add_to_user_playlist(&mut user, PlaylistItem::Podcast(1)).unwrap();
        repo.add_to_user_playlist(&mut user, PlaylistItem::Episode(1)).unwrap();

        let mut podcast = repo.get_podcast(1).unwrap().unwrap();
        let review = make_review("nice", &mut user, &mut podcast, 5).unwrap();
        repo.add_review(&review, &user, &podcast).unwrap();

        repo.remove_podcast(&podcast).unwrap();

        assert!(repo.get_episode(1, 1).unwrap().is_none());
        assert!(repo.get_reviews().unwrap().is_empty());
        assert!(repo.get_author(1).unwrap().unwrap().podcast_ids().is_empty());
        assert!(repo.get_category(1).unwrap().unwrap().podcast_ids().is_empty());
        let stored = repo.get_user("thorke").unwrap().unwrap();
        assert!(stored.playlist().is_empty());
        assert!(stored.review_ids().is_empty());
    }

    #[test]
    fn test_playlist_add_refreshes_caller_copy() {
        let repo = create_test_repository();
        let mut user = User::new(0, "thorke", "pw").unwrap();
        repo.add_user(&user).unwrap();

        repo.add_to_user_playlist(&mut user, PlaylistItem::Podcast(1)).unwrap();
        assert_eq!(user.playlist().podcast_ids(), &[1]);

        let missing = repo.add_to_user_playlist(&mut user, PlaylistItem::Episode(77));
        assert!(matches!(missing, Err(RepositoryError::NotFound(_))));
    }

    #[test]
    fn test_playlist_for_unknown_user() {
        let repo = create_test_repository();
        let mut ghost = User::new(5, "ghost", "pw").unwrap();
        assert!(repo.get_user_playlist(&ghost).unwrap().is_none());
        assert!(matches!(
            repo.add_to_user_playlist(&mut ghost, PlaylistItem::Podcast(1)),
            Err(RepositoryError::NotFound(_))
        ));
    }
}
