//! Posting and listing reviews.

use tracing::info;

use super::{ReviewView, ServiceError, ServiceResult};
use crate::domain::{make_review, PodcastId, Review};
use crate::repository::PodcastRepository;

/// Post a review by `user_name` on a podcast.
pub fn add_review(
    repo: &dyn PodcastRepository,
    podcast_id: PodcastId,
    comment: &str,
    user_name: &str,
    rating: u32,
) -> ServiceResult<Review> {
    let mut podcast = repo
        .get_podcast(podcast_id)?
        .ok_or(ServiceError::NonExistentPodcast(podcast_id))?;
    let mut user = repo
        .get_user(user_name)?
        .ok_or_else(|| ServiceError::UnknownUser(user_name.to_string()))?;

    let review = make_review(comment, &mut user, &mut podcast, rating)?;
    repo.add_review(&review, &user, &podcast)?;

    info!(
        review_id = %review.id(),
        podcast_id,
        username = user.username(),
        rating,
        "Review added"
    );
    Ok(review)
}

/// Reviews of a podcast in the order they were posted.
pub fn get_reviews_for_podcast(
    repo: &dyn PodcastRepository,
    podcast_id: PodcastId,
) -> ServiceResult<Vec<ReviewView>> {
    let podcast = repo
        .get_podcast(podcast_id)?
        .ok_or(ServiceError::NonExistentPodcast(podcast_id))?;

    let mut views = Vec::new();
    for review in repo.get_reviews()? {
        if !podcast.has_review(review.id()) {
            continue;
        }
        let username = repo
            .get_user_by_id(review.poster())?
            .map(|u| u.username().to_string())
            .unwrap_or_default();
        views.push(ReviewView {
            username,
            podcast_id,
            rating: review.rating(),
            comment: review.comment().to_string(),
        });
    }
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_get_reviews_for_podcast() {
        let repo = fixtures::memory_repository().unwrap();
        let reviews = get_reviews_for_podcast(&repo, 1).unwrap();

        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].username, "thorke");
        assert_eq!(reviews[0].rating, 5);
        assert_eq!(reviews[1].username, "fmercury");
        assert_eq!(reviews[1].comment, "No comment");
    }

    #[test]
    fn test_add_review() {
        let repo = fixtures::memory_repository().unwrap();
        let review = add_review(&repo, 3, "Uplifting", "Thorke", 4).unwrap();

        let reviews = get_reviews_for_podcast(&repo, 3).unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].comment, "Uplifting");
        assert_eq!(reviews[0].username, "thorke");

        let podcast = repo.get_podcast(3).unwrap().unwrap();
        assert!(podcast.has_review(review.id()));
        let user = repo.get_user("thorke").unwrap().unwrap();
        assert!(user.has_review(review.id()));
    }

    #[test]
    fn test_add_review_unknown_podcast_or_user() {
        let repo = fixtures::memory_repository().unwrap();
        assert!(matches!(
            add_review(&repo, 42, "x", "thorke", 1),
            Err(ServiceError::NonExistentPodcast(42))
        ));
        assert!(matches!(
            add_review(&repo, 1, "x", "nobody", 1),
            Err(ServiceError::UnknownUser(_))
        ));
        assert!(matches!(
            get_reviews_for_podcast(&repo, 42),
            Err(ServiceError::NonExistentPodcast(42))
        ));
    }
}
