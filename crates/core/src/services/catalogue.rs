//! Browsing and searching podcasts.

use super::{PodcastSummary, ServiceResult};
use crate::domain::{Podcast, PodcastId};
use crate::repository::{PodcastRepository, SearchFilter};

/// Resolve author and category names for a podcast.
pub(crate) fn summarize(
    repo: &dyn PodcastRepository,
    podcast: &Podcast,
) -> ServiceResult<PodcastSummary> {
    let author = repo
        .get_author(podcast.author_id())?
        .map(|a| a.name().to_string())
        .unwrap_or_default();
    let mut categories = Vec::with_capacity(podcast.category_ids().len());
    for id in podcast.category_ids() {
        if let Some(category) = repo.get_category(*id)? {
            categories.push(category.name().to_string());
        }
    }

    Ok(PodcastSummary {
        id: podcast.id(),
        title: podcast.title().to_string(),
        author,
        image: podcast.image().map(str::to_string),
        description: podcast.description().to_string(),
        language: podcast.language().to_string(),
        website: podcast.website().to_string(),
        itunes_id: podcast.itunes_id(),
        categories,
    })
}

fn summarize_all(
    repo: &dyn PodcastRepository,
    podcasts: &[Podcast],
) -> ServiceResult<Vec<PodcastSummary>> {
    podcasts.iter().map(|p| summarize(repo, p)).collect()
}

pub fn get_number_of_podcasts(repo: &dyn PodcastRepository) -> ServiceResult<usize> {
    Ok(repo.get_number_of_podcasts()?)
}

/// Every podcast, ordered by id.
pub fn get_podcasts(repo: &dyn PodcastRepository) -> ServiceResult<Vec<PodcastSummary>> {
    summarize_all(repo, &repo.get_podcasts()?)
}

pub fn get_podcast(
    repo: &dyn PodcastRepository,
    podcast_id: PodcastId,
) -> ServiceResult<Option<PodcastSummary>> {
    repo.get_podcast(podcast_id)?
        .map(|p| summarize(repo, &p))
        .transpose()
}

/// Podcasts for the given ids, in the given order. Unknown ids are skipped.
pub fn featured_podcasts(
    repo: &dyn PodcastRepository,
    ids: &[PodcastId],
) -> ServiceResult<Vec<PodcastSummary>> {
    let mut featured = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(podcast) = repo.get_podcast(*id)? {
            featured.push(summarize(repo, &podcast)?);
        }
    }
    Ok(featured)
}

pub fn search_podcasts(
    repo: &dyn PodcastRepository,
    term: &str,
    filter: SearchFilter,
) -> ServiceResult<Vec<PodcastSummary>> {
    summarize_all(repo, &repo.search_podcasts(term, filter)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_get_podcast_resolves_names() {
        let repo = fixtures::memory_repository().unwrap();
        let summary = get_podcast(&repo, 1).unwrap().unwrap();

        assert_eq!(summary.title, "Joe Toste Podcast - Sales Training Expert");
        assert_eq!(summary.author, "Joe Toste");
        assert_eq!(summary.categories, vec!["Business", "Education"]);
        assert_eq!(summary.itunes_id, Some(1_335_371_096));
        assert!(get_podcast(&repo, 99).unwrap().is_none());
    }

    #[test]
    fn test_get_podcasts_ordered_by_id() {
        let repo = fixtures::memory_repository().unwrap();
        let ids: Vec<_> = get_podcasts(&repo).unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(get_number_of_podcasts(&repo).unwrap(), 5);
    }

    #[test]
    fn test_featured_keeps_order_and_skips_unknown() {
        let repo = fixtures::memory_repository().unwrap();
        let ids: Vec<_> = featured_podcasts(&repo, &[4, 636, 2])
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![4, 2]);
    }

    #[test]
    fn test_search_by_language() {
        let repo = fixtures::memory_repository().unwrap();
        let found = search_podcasts(&repo, "spanish", SearchFilter::Language).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Radio Free Rainbow");
        assert!(search_podcasts(&repo, "  ", SearchFilter::Title)
            .unwrap()
            .is_empty());
    }
}
