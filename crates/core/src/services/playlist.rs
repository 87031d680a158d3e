//! A user's playlist of podcasts and episodes.

use tracing::debug;

use super::{
    PlaylistDetails, PlaylistEpisodeView, PlaylistPodcastView, ServiceError, ServiceResult,
};
use crate::domain::{EpisodeId, PlaylistItem, PodcastId, User};
use crate::repository::PodcastRepository;

fn require_user(repo: &dyn PodcastRepository, user_name: &str) -> ServiceResult<User> {
    repo.get_user(user_name)?
        .ok_or_else(|| ServiceError::UnknownUser(user_name.to_string()))
}

fn author_name(repo: &dyn PodcastRepository, podcast_id: PodcastId) -> ServiceResult<String> {
    let Some(podcast) = repo.get_podcast(podcast_id)? else {
        return Ok(String::new());
    };
    Ok(repo
        .get_author(podcast.author_id())?
        .map(|a| a.name().to_string())
        .unwrap_or_default())
}

/// Map a (podcast, episode) pair from a request onto a playlist item.
///
/// Episode id 0 stands for the podcast itself. Returns `None` when the
/// podcast or episode does not exist.
pub fn get_item(
    repo: &dyn PodcastRepository,
    podcast_id: PodcastId,
    episode_id: EpisodeId,
) -> ServiceResult<Option<PlaylistItem>> {
    if episode_id == 0 {
        return Ok(repo
            .get_podcast(podcast_id)?
            .map(|p| PlaylistItem::Podcast(p.id())));
    }
    Ok(repo
        .get_episode(podcast_id, episode_id)?
        .map(|e| PlaylistItem::Episode(e.id())))
}

pub fn add_to_playlist(
    repo: &dyn PodcastRepository,
    user_name: &str,
    item: PlaylistItem,
) -> ServiceResult<PlaylistDetails> {
    let mut user = require_user(repo, user_name)?;
    repo.add_to_user_playlist(&mut user, item)?;
    debug!(username = user.username(), %item, "Added to playlist");
    Ok(details(repo, &user))
}

/// Removing an item that is not in the playlist is not an error.
pub fn remove_from_playlist(
    repo: &dyn PodcastRepository,
    user_name: &str,
    item: PlaylistItem,
) -> ServiceResult<PlaylistDetails> {
    let mut user = require_user(repo, user_name)?;
    repo.remove_from_user_playlist(&mut user, item)?;
    debug!(username = user.username(), %item, "Removed from playlist");
    Ok(details(repo, &user))
}

fn details(repo: &dyn PodcastRepository, user: &User) -> PlaylistDetails {
    let playlist = user.playlist();
    PlaylistDetails {
        username: user.username().to_string(),
        title: playlist.name().to_string(),
        total: repo.get_playlist_total(playlist),
    }
}

pub fn get_playlist_details(
    repo: &dyn PodcastRepository,
    user_name: &str,
) -> ServiceResult<PlaylistDetails> {
    let user = require_user(repo, user_name)?;
    Ok(details(repo, &user))
}

pub fn get_playlist_podcasts(
    repo: &dyn PodcastRepository,
    user_name: &str,
) -> ServiceResult<Vec<PlaylistPodcastView>> {
    let user = require_user(repo, user_name)?;
    let mut views = Vec::new();
    for podcast in repo.get_user_podcast_playlist(&user)? {
        views.push(PlaylistPodcastView {
            id: podcast.id(),
            author: author_name(repo, podcast.id())?,
            title: podcast.title().to_string(),
            image: podcast.image().map(str::to_string),
        });
    }
    Ok(views)
}

pub fn get_playlist_episodes(
    repo: &dyn PodcastRepository,
    user_name: &str,
) -> ServiceResult<Vec<PlaylistEpisodeView>> {
    let user = require_user(repo, user_name)?;
    let mut views = Vec::new();
    for episode in repo.get_user_episode_playlist(&user)? {
        let podcast_title = repo
            .get_podcast(episode.podcast_id())?
            .map(|p| p.title().to_string())
            .unwrap_or_default();
        views.push(PlaylistEpisodeView {
            id: episode.id(),
            title: episode.title().to_string(),
            author: author_name(repo, episode.podcast_id())?,
            podcast_id: episode.podcast_id(),
            podcast_title,
        });
    }
    Ok(views)
}
