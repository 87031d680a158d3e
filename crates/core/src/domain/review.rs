use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use uuid::Uuid;

use super::{DomainResult, Ordered, Podcast, PodcastId, ReviewId, User, UserId};

const DEFAULT_COMMENT: &str = "No comment";

/// A rating plus comment left by a user on a podcast.
///
/// Reviews carry their own identity: two reviews with the same content are
/// still different reviews.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    id: ReviewId,
    poster: UserId,
    podcast: PodcastId,
    rating: u32,
    comment: String,
}

impl Review {
    pub fn new(poster: UserId, podcast: PodcastId, rating: u32, comment: &str) -> Self {
        Self::with_id(Uuid::new_v4(), poster, podcast, rating, comment)
    }

    /// Rebuild a review whose identity already exists, e.g. when reading it
    /// back from storage.
    pub fn with_id(
        id: ReviewId,
        poster: UserId,
        podcast: PodcastId,
        rating: u32,
        comment: &str,
    ) -> Self {
        let comment = comment.trim();
        Self {
            id,
            poster,
            podcast,
            rating,
            comment: if comment.is_empty() {
                DEFAULT_COMMENT.to_string()
            } else {
                comment.to_string()
            },
        }
    }

    pub fn id(&self) -> ReviewId {
        self.id
    }

    pub fn poster(&self) -> UserId {
        self.poster
    }

    pub fn podcast(&self) -> PodcastId {
        self.podcast
    }

    pub fn rating(&self) -> u32 {
        self.rating
    }

    pub fn set_rating(&mut self, rating: u32) {
        self.rating = rating;
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }
}

/// Build a review and attach it to both its poster and its podcast.
///
/// This is what the repository's `add_review` expects to have happened.
pub fn make_review(
    comment: &str,
    poster: &mut User,
    podcast: &mut Podcast,
    rating: u32,
) -> DomainResult<Review> {
    let review = Review::new(poster.id(), podcast.id(), rating, comment);
    poster.add_review(&review)?;
    podcast.add_review(&review)?;
    Ok(review)
}

impl PartialEq for Review {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Review {}

impl Hash for Review {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Ordered for Review {
    type Key = u32;

    fn sort_key(&self) -> u32 {
        self.rating
    }
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Review by user {} on podcast {}: {}/5 '{}'>",
            self.poster, self.podcast, self.rating, self.comment
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_comment() {
        let review = Review::new(1, 2, 4, "  ");
        assert_eq!(review.comment(), "No comment");
        assert_eq!(review.poster(), 1);
        assert_eq!(review.podcast(), 2);
    }

    #[test]
    fn test_identical_content_is_not_equal() {
        let a = Review::new(1, 2, 4, "Great");
        let b = Review::new(1, 2, 4, "Great");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_sort_key_is_rating() {
        let low = Review::new(1, 2, 1, "meh");
        let high = Review::new(1, 2, 5, "wow");
        assert!(low.sort_key() < high.sort_key());
    }

    #[test]
    fn test_make_review_attaches_both_sides() {
        let mut user = User::new(1, "Shyamli", "pw").unwrap();
        let mut podcast = Podcast::new(3, 1, "Tallin Messages").unwrap();
        let review = make_review("Loved it", &mut user, &mut podcast, 5).unwrap();

        assert_eq!(user.review_ids(), &[review.id()]);
        assert_eq!(podcast.review_ids(), &[review.id()]);
        assert_eq!(podcast.number_of_reviews(), 1);
        assert_eq!(review.comment(), "Loved it");
    }

    #[test]
    fn test_with_id_keeps_identity() {
        let review = Review::new(1, 2, 3, "ok");
        let restored = Review::with_id(review.id(), 1, 2, 3, "ok");
        assert_eq!(review, restored);
    }
}
