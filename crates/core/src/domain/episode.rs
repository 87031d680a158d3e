use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use super::{validate_non_empty, DomainResult, EpisodeId, Ordered, PodcastId};

const DEFAULT_TITLE: &str = "Untitled";
const DEFAULT_PUBLISH_DATE: &str = "Undated";

/// A single episode, linked to its podcast by id.
#[derive(Debug, Clone, Serialize)]
pub struct Episode {
    id: EpisodeId,
    podcast_id: PodcastId,
    audio_link: String,
    audio_length: u32,
    title: String,
    description: String,
    publish_date: String,
}

impl Episode {
    pub fn new(
        id: EpisodeId,
        podcast_id: PodcastId,
        audio_link: &str,
        audio_length: u32,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            podcast_id,
            audio_link: validate_non_empty(audio_link, "Episode audio link")?,
            audio_length,
            title: DEFAULT_TITLE.to_string(),
            description: String::new(),
            publish_date: DEFAULT_PUBLISH_DATE.to_string(),
        })
    }

    pub fn with_title(mut self, title: &str) -> DomainResult<Self> {
        self.set_title(title)?;
        Ok(self)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_publish_date(mut self, publish_date: &str) -> DomainResult<Self> {
        self.set_publish_date(publish_date)?;
        Ok(self)
    }

    pub fn id(&self) -> EpisodeId {
        self.id
    }

    pub fn podcast_id(&self) -> PodcastId {
        self.podcast_id
    }

    pub fn audio_link(&self) -> &str {
        &self.audio_link
    }

    pub fn set_audio_link(&mut self, audio_link: &str) -> DomainResult<()> {
        self.audio_link = validate_non_empty(audio_link, "Episode audio link")?;
        Ok(())
    }

    /// Length in seconds.
    pub fn audio_length(&self) -> u32 {
        self.audio_length
    }

    pub fn set_audio_length(&mut self, audio_length: u32) {
        self.audio_length = audio_length;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) -> DomainResult<()> {
        self.title = validate_non_empty(title, "Episode title")?;
        Ok(())
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn publish_date(&self) -> &str {
        &self.publish_date
    }

    pub fn set_publish_date(&mut self, publish_date: &str) -> DomainResult<()> {
        self.publish_date = validate_non_empty(publish_date, "Episode publish date")?;
        Ok(())
    }
}

/// Render a length in seconds as `m:ss`.
pub fn format_audio_length(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

impl PartialEq for Episode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Episode {}

impl Hash for Episode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Episode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Episode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Ordered for Episode {
    type Key = EpisodeId;

    fn sort_key(&self) -> EpisodeId {
        self.id
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Episode {}: '{}'>", self.id, self.title)
    }
}
