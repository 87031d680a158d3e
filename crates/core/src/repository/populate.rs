//! One-shot transfer of a loaded [`Dataset`] into a repository.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, warn};

use super::{PodcastRepository, RepositoryResult};
use crate::domain::PodcastId;
use crate::loader::Dataset;

/// Counts of what `populate` stored and skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopulateSummary {
    pub authors: usize,
    pub categories: usize,
    pub podcasts: usize,
    pub episodes: usize,
    pub users: usize,
    pub reviews: usize,
    pub skipped_episodes: usize,
    pub skipped_reviews: usize,
}

/// Store authors, categories, podcasts, episodes, users and reviews, in that
/// order. Episodes and reviews pointing at a podcast or user the dataset does
/// not contain are skipped.
pub fn populate(
    dataset: &Dataset,
    repo: &dyn PodcastRepository,
) -> RepositoryResult<PopulateSummary> {
    let mut summary = PopulateSummary::default();

    for author in &dataset.authors {
        repo.add_author(author)?;
        summary.authors += 1;
    }
    for category in &dataset.categories {
        repo.add_category(category)?;
        summary.categories += 1;
    }
    for podcast in &dataset.podcasts {
        repo.add_podcast(podcast)?;
        summary.podcasts += 1;
    }

    let podcast_ids: HashSet<PodcastId> = dataset.podcasts.iter().map(|p| p.id()).collect();
    for episode in &dataset.episodes {
        if !podcast_ids.contains(&episode.podcast_id()) {
            warn!(
                episode_id = episode.id(),
                podcast_id = episode.podcast_id(),
                "Skipping episode of unknown podcast"
            );
            summary.skipped_episodes += 1;
            continue;
        }
        repo.add_episode(episode)?;
        summary.episodes += 1;
    }

    for user in &dataset.users {
        repo.add_user(user)?;
        summary.users += 1;
    }

    for review in &dataset.reviews {
        let poster = dataset.users.iter().find(|u| u.id() == review.poster());
        let podcast = dataset.podcasts.iter().find(|p| p.id() == review.podcast());
        match (poster, podcast) {
            (Some(poster), Some(podcast)) => {
                repo.add_review(review, poster, podcast)?;
                summary.reviews += 1;
            }
            _ => {
                warn!(
                    review_id = %review.id(),
                    user_id = review.poster(),
                    podcast_id = review.podcast(),
                    "Skipping review with unknown user or podcast"
                );
                summary.skipped_reviews += 1;
            }
        }
    }

    info!(
        podcasts = summary.podcasts,
        episodes = summary.episodes,
        users = summary.users,
        reviews = summary.reviews,
        skipped_episodes = summary.skipped_episodes,
        skipped_reviews = summary.skipped_reviews,
        "Repository populated"
    );
    Ok(summary)
}
