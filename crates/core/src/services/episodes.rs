use super::{EpisodeView, ServiceError, ServiceResult};
use crate::domain::{format_audio_length, Episode, PodcastId};
use crate::repository::PodcastRepository;

impl From<&Episode> for EpisodeView {
    fn from(episode: &Episode) -> Self {
        Self {
            id: episode.id(),
            title: episode.title().to_string(),
            description: episode.description().to_string(),
            audio_link: episode.audio_link().to_string(),
            audio_length: episode.audio_length(),
            length: format_audio_length(episode.audio_length()),
            publish_date: episode.publish_date().to_string(),
        }
    }
}

/// Episodes of a podcast in the order they were added.
pub fn get_episodes(
    repo: &dyn PodcastRepository,
    podcast_id: PodcastId,
) -> ServiceResult<Vec<EpisodeView>> {
    let podcast = repo
        .get_podcast(podcast_id)?
        .ok_or(ServiceError::NonExistentPodcast(podcast_id))?;
    Ok(repo
        .get_episodes(&podcast)?
        .iter()
        .map(EpisodeView::from)
        .collect())
}
