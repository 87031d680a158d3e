use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use super::{
    validate_non_empty, AuthorId, Category, CategoryId, DomainError, DomainResult, Episode,
    EpisodeId, Ordered, PodcastId, Review, ReviewId,
};

const DEFAULT_LANGUAGE: &str = "Unspecified";

/// A podcast in the catalogue.
///
/// Categories and episodes are unique id lists; episodes keep the order in
/// which they were attached.
#[derive(Debug, Clone, Serialize)]
pub struct Podcast {
    id: PodcastId,
    author_id: AuthorId,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    description: String,
    language: String,
    website: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    itunes_id: Option<u64>,
    category_ids: Vec<CategoryId>,
    episode_ids: Vec<EpisodeId>,
    review_ids: Vec<ReviewId>,
}

impl Podcast {
    pub fn new(id: PodcastId, author_id: AuthorId, title: &str) -> DomainResult<Self> {
        Ok(Self {
            id,
            author_id,
            title: validate_non_empty(title, "Podcast title")?,
            image: None,
            description: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            website: String::new(),
            itunes_id: None,
            category_ids: Vec::new(),
            episode_ids: Vec::new(),
            review_ids: Vec::new(),
        })
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = website.into();
        self
    }

    pub fn with_itunes_id(mut self, itunes_id: u64) -> Self {
        self.itunes_id = Some(itunes_id);
        self
    }

    pub fn id(&self) -> PodcastId {
        self.id
    }

    pub fn author_id(&self) -> AuthorId {
        self.author_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) -> DomainResult<()> {
        self.title = validate_non_empty(title, "Podcast title")?;
        Ok(())
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn set_image(&mut self, image: Option<String>) {
        self.image = image;
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }

    pub fn website(&self) -> &str {
        &self.website
    }

    pub fn set_website(&mut self, website: &str) -> DomainResult<()> {
        self.website = validate_non_empty(website, "Podcast website")?;
        Ok(())
    }

    pub fn itunes_id(&self) -> Option<u64> {
        self.itunes_id
    }

    pub fn category_ids(&self) -> &[CategoryId] {
        &self.category_ids
    }

    pub fn add_category(&mut self, category: &Category) {
        self.link_category(category.id());
    }

    pub fn remove_category(&mut self, category_id: CategoryId) {
        self.category_ids.retain(|id| *id != category_id);
    }

    pub fn episode_ids(&self) -> &[EpisodeId] {
        &self.episode_ids
    }

    /// Attach an episode of this podcast. No-op if already attached.
    pub fn add_episode(&mut self, episode: &Episode) -> DomainResult<()> {
        if episode.podcast_id() != self.id {
            return Err(DomainError::TypeMismatch(format!(
                "episode {} belongs to podcast {}, not {}",
                episode.id(),
                episode.podcast_id(),
                self.id
            )));
        }
        self.link_episode(episode.id());
        Ok(())
    }

    pub fn remove_episode(&mut self, episode_id: EpisodeId) {
        self.episode_ids.retain(|id| *id != episode_id);
    }

    pub fn review_ids(&self) -> &[ReviewId] {
        &self.review_ids
    }

    pub fn number_of_reviews(&self) -> usize {
        self.review_ids.len()
    }

    pub fn has_review(&self, review_id: ReviewId) -> bool {
        self.review_ids.contains(&review_id)
    }

    pub fn add_review(&mut self, review: &Review) -> DomainResult<()> {
        if review.podcast() != self.id {
            return Err(DomainError::TypeMismatch(format!(
                "review {} is for podcast {}, not {}",
                review.id(),
                review.podcast(),
                self.id
            )));
        }
        self.link_review(review.id());
        Ok(())
    }

    pub(crate) fn link_category(&mut self, category_id: CategoryId) {
        if !self.category_ids.contains(&category_id) {
            self.category_ids.push(category_id);
        }
    }

    pub(crate) fn link_episode(&mut self, episode_id: EpisodeId) {
        if !self.episode_ids.contains(&episode_id) {
            self.episode_ids.push(episode_id);
        }
    }

    pub(crate) fn link_review(&mut self, review_id: ReviewId) {
        if !self.review_ids.contains(&review_id) {
            self.review_ids.push(review_id);
        }
    }

    /// Drop episode and review links; storage rebuilds them from what it holds.
    pub(crate) fn clear_links(&mut self) {
        self.episode_ids.clear();
        self.review_ids.clear();
    }
}

impl PartialEq for Podcast {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Podcast {}

impl Hash for Podcast {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Podcast {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Podcast {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Ordered for Podcast {
    type Key = PodcastId;

    fn sort_key(&self) -> PodcastId {
        self.id
    }
}

impl fmt::Display for Podcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Podcast {}: '{}'>", self.id, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn podcast(id: PodcastId) -> Podcast {
        Podcast::new(id, 1, "Joe Toste Podcast - Sales Training Expert").unwrap()
    }

    #[test]
    fn test_defaults() {
        let p = podcast(100);
        assert_eq!(p.id(), 100);
        assert_eq!(p.author_id(), 1);
        assert_eq!(p.image(), None);
        assert_eq!(p.description(), "");
        assert_eq!(p.language(), "Unspecified");
        assert_eq!(p.website(), "");
        assert_eq!(p.itunes_id(), None);
        assert_eq!(
            p.to_string(),
            "<Podcast 100: 'Joe Toste Podcast - Sales Training Expert'>"
        );
    }

    #[test]
    fn test_builder_fields() {
        let p = podcast(1)
            .with_image("http://img")
            .with_description("Sales")
            .with_language("English")
            .with_website("https://joetoste.com")
            .with_itunes_id(1373219498);
        assert_eq!(p.image(), Some("http://img"));
        assert_eq!(p.description(), "Sales");
        assert_eq!(p.language(), "English");
        assert_eq!(p.website(), "https://joetoste.com");
        assert_eq!(p.itunes_id(), Some(1373219498));
    }

    #[test]
    fn test_title_validation() {
        assert!(matches!(Podcast::new(1, 1, "  "), Err(DomainError::Validation(_))));
        let mut p = podcast(1);
        p.set_title("  TourMix Podcast ").unwrap();
        assert_eq!(p.title(), "TourMix Podcast");
        assert!(p.set_title("").is_err());
        assert!(p.set_website("").is_err());
    }

    #[test]
    fn test_equality_by_id_only() {
        let a = podcast(1).with_language("English");
        let b = Podcast::new(1, 7, "Something else").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, podcast(2));
        assert!(podcast(1) < podcast(2));
    }

    #[test]
    fn test_set_collapses_duplicate_ids() {
        let set: HashSet<Podcast> = vec![podcast(1), podcast(2), podcast(1), podcast(3), podcast(2)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_categories_are_unique() {
        let mut p = podcast(1);
        let comedy = Category::new(1, "Comedy").unwrap();
        let news = Category::new(2, "News").unwrap();
        p.add_category(&comedy);
        p.add_category(&news);
        p.add_category(&comedy);
        assert_eq!(p.category_ids(), &[1, 2]);
        p.remove_category(1);
        p.remove_category(1);
        assert_eq!(p.category_ids(), &[2]);
    }

    #[test]
    fn test_episodes_unique_in_insertion_order() {
        let mut p = podcast(1);
        let e3 = Episode::new(3, 1, "http://a/3", 10).unwrap();
        let e1 = Episode::new(1, 1, "http://a/1", 10).unwrap();
        p.add_episode(&e3).unwrap();
        p.add_episode(&e1).unwrap();
        p.add_episode(&e3).unwrap();
        assert_eq!(p.episode_ids(), &[3, 1]);
        p.remove_episode(3);
        assert_eq!(p.episode_ids(), &[1]);
    }

    #[test]
    fn test_episode_of_other_podcast_rejected() {
        let mut p = podcast(1);
        let foreign = Episode::new(3, 2, "http://a/3", 10).unwrap();
        assert!(matches!(p.add_episode(&foreign), Err(DomainError::TypeMismatch(_))));
        assert!(p.episode_ids().is_empty());
    }
}
