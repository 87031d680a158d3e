//! Error and query types shared by every repository backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DomainError, Podcast, Review, User};

/// Errors for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A review was handed to `add_review` without being attached to both
    /// its poster and its podcast.
    #[error("Consistency error: {0}")]
    Consistency(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Which podcast field `search_podcasts` matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchFilter {
    Title,
    Category,
    Author,
    Language,
}

impl SearchFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchFilter::Title => "title",
            SearchFilter::Category => "category",
            SearchFilter::Author => "author",
            SearchFilter::Language => "language",
        }
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SearchFilter::Title),
            "category" => Ok(SearchFilter::Category),
            "author" => Ok(SearchFilter::Author),
            "language" => Ok(SearchFilter::Language),
            other => Err(DomainError::Validation(format!(
                "unknown search filter '{}'",
                other
            ))),
        }
    }
}

/// The check `add_review` runs in every backend before writing anything:
/// the review must already sit in both its poster's and its podcast's
/// review lists.
pub fn ensure_review_attached(
    review: &Review,
    poster: &User,
    podcast: &Podcast,
) -> RepositoryResult<()> {
    if poster.id() != review.poster() || !poster.has_review(review.id()) {
        return Err(RepositoryError::Consistency(format!(
            "review {} is not attached to user {}",
            review.id(),
            poster.username()
        )));
    }
    if podcast.id() != review.podcast() || !podcast.has_review(review.id()) {
        return Err(RepositoryError::Consistency(format!(
            "review {} is not attached to podcast {}",
            review.id(),
            podcast.id()
        )));
    }
    Ok(())
}

/// Lowercased needle for case-insensitive matching, or `None` when the term
/// is blank and the search should return nothing.
pub(crate) fn normalize_term(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        None
    } else {
        Some(term.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::make_review;

    #[test]
    fn test_search_filter_from_str() {
        assert_eq!("Title".parse::<SearchFilter>().unwrap(), SearchFilter::Title);
        assert_eq!(" AUTHOR ".parse::<SearchFilter>().unwrap(), SearchFilter::Author);
        assert_eq!("category".parse::<SearchFilter>().unwrap(), SearchFilter::Category);
        assert!(matches!(
            "genre".parse::<SearchFilter>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_search_filter_serialization() {
        assert_eq!(
            serde_json::to_string(&SearchFilter::Language).unwrap(),
            "\"language\""
        );
        let parsed: SearchFilter = serde_json::from_str("\"category\"").unwrap();
        assert_eq!(parsed, SearchFilter::Category);
    }

    #[test]
    fn test_normalize_term() {
        assert_eq!(normalize_term("   "), None);
        assert_eq!(normalize_term(" RaDio "), Some("radio".to_string()));
    }

    #[test]
    fn test_ensure_review_attached() {
        let mut user = User::new(1, "thorke", "pw").unwrap();
        let mut podcast = Podcast::new(1, 1, "Brian Denny Radio").unwrap();
        let review = make_review("good", &mut user, &mut podcast, 4).unwrap();
        assert!(ensure_review_attached(&review, &user, &podcast).is_ok());

        let detached = Review::new(1, 1, 3, "not attached");
        assert!(matches!(
            ensure_review_attached(&detached, &user, &podcast),
            Err(RepositoryError::Consistency(_))
        ));
    }

    #[test]
    fn test_ensure_review_attached_one_side_only() {
        let mut user = User::new(1, "thorke", "pw").unwrap();
        let podcast = Podcast::new(1, 1, "Brian Denny Radio").unwrap();
        let review = Review::new(1, 1, 3, "half");
        user.add_review(&review).unwrap();
        assert!(matches!(
            ensure_review_attached(&review, &user, &podcast),
            Err(RepositoryError::Consistency(_))
        ));
    }
}
