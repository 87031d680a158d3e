use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use super::{validate_non_empty, CategoryId, DomainResult, Ordered, PodcastId};

/// A catalogue category such as "Comedy" or "Religion & Spirituality".
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    podcast_ids: Vec<PodcastId>,
}

impl Category {
    pub fn new(id: CategoryId, name: &str) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: validate_non_empty(name, "Category name")?,
            podcast_ids: Vec::new(),
        })
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) -> DomainResult<()> {
        self.name = validate_non_empty(name, "Category name")?;
        Ok(())
    }

    pub fn podcast_ids(&self) -> &[PodcastId] {
        &self.podcast_ids
    }

    pub(crate) fn link_podcast(&mut self, podcast_id: PodcastId) {
        if !self.podcast_ids.contains(&podcast_id) {
            self.podcast_ids.push(podcast_id);
        }
    }

    pub(crate) fn unlink_podcast(&mut self, podcast_id: PodcastId) {
        self.podcast_ids.retain(|id| *id != podcast_id);
    }

    pub(crate) fn clear_links(&mut self) {
        self.podcast_ids.clear();
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Ordered for Category {
    type Key = String;

    fn sort_key(&self) -> String {
        self.name.clone()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
