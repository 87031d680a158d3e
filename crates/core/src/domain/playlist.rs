use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::{validate_non_empty, DomainResult, EpisodeId, Ordered, PlaylistId, PodcastId, UserId};

/// Something that can be saved to a playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PlaylistItem {
    Podcast(PodcastId),
    Episode(EpisodeId),
}

impl fmt::Display for PlaylistItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaylistItem::Podcast(id) => write!(f, "podcast {}", id),
            PlaylistItem::Episode(id) => write!(f, "episode {}", id),
        }
    }
}

/// A user's saved podcasts and episodes, each list unique.
#[derive(Debug, Clone, Serialize)]
pub struct Playlist {
    id: PlaylistId,
    creator: UserId,
    name: String,
    podcast_ids: Vec<PodcastId>,
    episode_ids: Vec<EpisodeId>,
}

impl Playlist {
    pub fn new(id: PlaylistId, creator: UserId, name: &str) -> DomainResult<Self> {
        Ok(Self {
            id,
            creator,
            name: validate_non_empty(name, "Playlist name")?,
            podcast_ids: Vec::new(),
            episode_ids: Vec::new(),
        })
    }

    pub fn id(&self) -> PlaylistId {
        self.id
    }

    pub fn creator(&self) -> UserId {
        self.creator
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) -> DomainResult<()> {
        self.name = validate_non_empty(name, "Playlist name")?;
        Ok(())
    }

    pub fn podcast_ids(&self) -> &[PodcastId] {
        &self.podcast_ids
    }

    pub fn episode_ids(&self) -> &[EpisodeId] {
        &self.episode_ids
    }

    pub fn contains(&self, item: PlaylistItem) -> bool {
        match item {
            PlaylistItem::Podcast(id) => self.podcast_ids.contains(&id),
            PlaylistItem::Episode(id) => self.episode_ids.contains(&id),
        }
    }

    /// Returns false if the item was already there.
    pub fn add_item(&mut self, item: PlaylistItem) -> bool {
        let (list, id) = match item {
            PlaylistItem::Podcast(id) => (&mut self.podcast_ids, id),
            PlaylistItem::Episode(id) => (&mut self.episode_ids, id),
        };
        if list.contains(&id) {
            return false;
        }
        list.push(id);
        true
    }

    /// Returns false if the item was not there.
    pub fn remove_item(&mut self, item: PlaylistItem) -> bool {
        let (list, id) = match item {
            PlaylistItem::Podcast(id) => (&mut self.podcast_ids, id),
            PlaylistItem::Episode(id) => (&mut self.episode_ids, id),
        };
        let before = list.len();
        list.retain(|x| *x != id);
        list.len() != before
    }

    /// Podcasts plus episodes.
    pub fn len(&self) -> usize {
        self.podcast_ids.len() + self.episode_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for Playlist {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.creator == other.creator && self.name == other.name
    }
}

impl Eq for Playlist {}

impl Hash for Playlist {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.creator.hash(state);
        self.name.hash(state);
    }
}

impl Ordered for Playlist {
    type Key = usize;

    fn sort_key(&self) -> usize {
        self.episode_ids.len()
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Playlist {}: '{}' ({} podcasts, {} episodes)>",
            self.id,
            self.name,
            self.podcast_ids.len(),
            self.episode_ids.len()
        )
    }
}
