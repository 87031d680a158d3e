use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use super::{validate_non_empty, AuthorId, DomainError, DomainResult, Ordered, Podcast, PodcastId};

/// A podcast author. Holds the ids of the podcasts credited to it.
#[derive(Debug, Clone, Serialize)]
pub struct Author {
    id: AuthorId,
    name: String,
    podcast_ids: Vec<PodcastId>,
}

impl Author {
    pub fn new(id: AuthorId, name: &str) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: validate_non_empty(name, "Author name")?,
            podcast_ids: Vec::new(),
        })
    }

    pub fn id(&self) -> AuthorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) -> DomainResult<()> {
        self.name = validate_non_empty(name, "Author name")?;
        Ok(())
    }

    pub fn podcast_ids(&self) -> &[PodcastId] {
        &self.podcast_ids
    }

    /// Credit a podcast to this author. No-op if already credited.
    pub fn add_podcast(&mut self, podcast: &Podcast) -> DomainResult<()> {
        if podcast.author_id() != self.id {
            return Err(DomainError::TypeMismatch(format!(
                "podcast {} belongs to author {}, not {}",
                podcast.id(),
                podcast.author_id(),
                self.id
            )));
        }
        self.link_podcast(podcast.id());
        Ok(())
    }

    pub fn remove_podcast(&mut self, podcast_id: PodcastId) {
        self.podcast_ids.retain(|id| *id != podcast_id);
    }

    pub(crate) fn link_podcast(&mut self, podcast_id: PodcastId) {
        if !self.podcast_ids.contains(&podcast_id) {
            self.podcast_ids.push(podcast_id);
        }
    }

    pub(crate) fn clear_links(&mut self) {
        self.podcast_ids.clear();
    }
}

impl PartialEq for Author {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Author {}

impl Hash for Author {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Ordered for Author {
    type Key = String;

    fn sort_key(&self) -> String {
        self.name.clone()
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_trims_name() {
        let author = Author::new(1, "  Joe Toste ").unwrap();
        assert_eq!(author.id(), 1);
        assert_eq!(author.name(), "Joe Toste");
        assert_eq!(author.to_string(), "Joe Toste");
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(matches!(Author::new(1, ""), Err(DomainError::Validation(_))));
        assert!(matches!(Author::new(1, "   "), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_set_name_validates() {
        let mut author = Author::new(1, "Joe").unwrap();
        author.set_name(" Jane ").unwrap();
        assert_eq!(author.name(), "Jane");
        assert!(author.set_name(" ").is_err());
        assert_eq!(author.name(), "Jane");
    }

    #[test]
    fn test_equality_and_hash_by_id() {
        let a = Author::new(1, "Joe").unwrap();
        let b = Author::new(1, "Someone Else").unwrap();
        let c = Author::new(2, "Joe").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Author> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_sorted_by_name() {
        let a = Author::new(9, "Alice").unwrap();
        let b = Author::new(1, "Bob").unwrap();
        assert!(a.sort_key() < b.sort_key());
    }

    #[test]
    fn test_add_podcast_is_idempotent() {
        let mut author = Author::new(1, "Joe").unwrap();
        let podcast = Podcast::new(10, 1, "Show").unwrap();
        author.add_podcast(&podcast).unwrap();
        author.add_podcast(&podcast).unwrap();
        assert_eq!(author.podcast_ids(), &[10]);

        author.remove_podcast(10);
        author.remove_podcast(10);
        assert!(author.podcast_ids().is_empty());
    }

    #[test]
    fn test_add_podcast_of_other_author_fails() {
        let mut author = Author::new(1, "Joe").unwrap();
        let podcast = Podcast::new(10, 2, "Show").unwrap();
        assert!(matches!(
            author.add_podcast(&podcast),
            Err(DomainError::TypeMismatch(_))
        ));
    }
}
