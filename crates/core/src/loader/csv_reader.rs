//! Reader for the catalogue's CSV data directory.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::{Dataset, EpisodeRecord, LoaderError, PodcastRecord, ReviewRecord, UserRecord};
use crate::auth::{hash_password, is_password_hash};
use crate::domain::{
    parse_id, Author, AuthorId, Category, CategoryId, DomainError, Episode, Podcast, Review, User,
};

pub const PODCASTS_FILE: &str = "podcasts.csv";
pub const EPISODES_FILE: &str = "episodes.csv";
pub const USERS_FILE: &str = "users.csv";
pub const REVIEWS_FILE: &str = "reviews.csv";

const UNKNOWN_AUTHOR: &str = "Unknown Author";
const MISSING_AUDIO: &str = "Link Not Available";

/// Wraps a domain error with the file and line it came from.
fn at(file: &'static str, line: u64) -> impl Fn(DomainError) -> LoaderError + Copy {
    move |source| LoaderError::Domain {
        file: file.to_string(),
        line,
        source,
    }
}

/// Read every record of `path`, paired with the line it started on.
fn read_records<T: DeserializeOwned>(
    path: &Path,
    file: &'static str,
) -> Result<Vec<(u64, T)>, LoaderError> {
    let handle = File::open(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(handle);
    let csv_error = |line: u64, e: csv::Error| LoaderError::Csv {
        file: file.to_string(),
        line,
        message: e.to_string(),
    };

    let headers = reader.headers().map_err(|e| csv_error(1, e))?.clone();
    let mut record = StringRecord::new();
    let mut rows = Vec::new();
    loop {
        let more = reader.read_record(&mut record).map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            csv_error(line, e)
        })?;
        if !more {
            break;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row = record
            .deserialize(Some(&headers))
            .map_err(|e| csv_error(line, e))?;
        rows.push((line, row));
    }
    Ok(rows)
}

/// Reads podcasts, episodes, users and reviews from a data directory into a
/// [`Dataset`].
///
/// Podcasts must be read before episodes, and users before reviews, since
/// later files are linked against earlier ones.
pub struct CsvDataReader {
    data_dir: PathBuf,
    dataset: Dataset,
}

impl CsvDataReader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            dataset: Dataset::default(),
        }
    }

    /// Read the whole directory. `users.csv` and `reviews.csv` are optional.
    pub fn load(data_dir: impl Into<PathBuf>) -> Result<Dataset, LoaderError> {
        let mut reader = Self::new(data_dir);
        reader.read_podcasts()?;
        reader.read_episodes()?;
        if reader.data_dir.join(USERS_FILE).exists() {
            reader.read_users()?;
        }
        if reader.data_dir.join(REVIEWS_FILE).exists() {
            reader.read_reviews()?;
        }

        let dataset = reader.into_dataset();
        info!(
            podcasts = dataset.podcasts.len(),
            episodes = dataset.episodes.len(),
            authors = dataset.authors.len(),
            categories = dataset.categories.len(),
            users = dataset.users.len(),
            reviews = dataset.reviews.len(),
            "Loaded catalogue data"
        );
        Ok(dataset)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    fn author_id_for(
        &mut self,
        name: &str,
        err: impl Fn(DomainError) -> LoaderError,
    ) -> Result<AuthorId, LoaderError> {
        let name = if name.is_empty() { UNKNOWN_AUTHOR } else { name };
        if let Some(author) = self.dataset.authors.iter().find(|a| a.name() == name) {
            return Ok(author.id());
        }
        let author = Author::new(self.dataset.authors.len() as AuthorId + 1, name).map_err(err)?;
        let id = author.id();
        self.dataset.authors.push(author);
        Ok(id)
    }

    fn category_id_for(
        &mut self,
        name: &str,
        err: impl Fn(DomainError) -> LoaderError,
    ) -> Result<CategoryId, LoaderError> {
        if let Some(category) = self.dataset.categories.iter().find(|c| c.name() == name) {
            return Ok(category.id());
        }
        let category =
            Category::new(self.dataset.categories.len() as CategoryId + 1, name).map_err(err)?;
        let id = category.id();
        self.dataset.categories.push(category);
        Ok(id)
    }

    pub fn read_podcasts(&mut self) -> Result<(), LoaderError> {
        let path = self.data_dir.join(PODCASTS_FILE);
        for (line, row) in read_records::<PodcastRecord>(&path, PODCASTS_FILE)? {
            let err = at(PODCASTS_FILE, line);
            let id = parse_id(&row.id, "podcast id").map_err(err)?;
            let author_id = self.author_id_for(&row.author, err)?;

            let mut podcast = Podcast::new(id, author_id, &row.title)
                .map_err(err)?
                .with_description(row.description)
                .with_website(row.website);
            if !row.image.is_empty() {
                podcast = podcast.with_image(row.image);
            }
            if !row.language.is_empty() {
                podcast = podcast.with_language(row.language);
            }
            if !row.itunes_id.is_empty() {
                // stored as a signed 64-bit INTEGER, so the upper half of u64 is refused
                let itunes_id = row
                    .itunes_id
                    .parse::<u64>()
                    .ok()
                    .filter(|id| i64::try_from(*id).is_ok())
                    .ok_or_else(|| {
                        err(DomainError::Validation(format!(
                            "itunes id must be an integer between 0 and {}, got '{}'",
                            i64::MAX,
                            row.itunes_id
                        )))
                    })?;
                podcast = podcast.with_itunes_id(itunes_id);
            }

            for name in row.categories.split('|').map(str::trim).filter(|n| !n.is_empty()) {
                let category_id = self.category_id_for(name, err)?;
                if let Some(category) =
                    self.dataset.categories.iter_mut().find(|c| c.id() == category_id)
                {
                    podcast.add_category(category);
                    category.link_podcast(id);
                }
            }
            if let Some(author) = self.dataset.authors.iter_mut().find(|a| a.id() == author_id) {
                author.add_podcast(&podcast).map_err(err)?;
            }

            self.dataset.podcasts.push(podcast);
        }
        debug!(count = self.dataset.podcasts.len(), "Read podcasts");
        Ok(())
    }

    pub fn read_episodes(&mut self) -> Result<(), LoaderError> {
        let path = self.data_dir.join(EPISODES_FILE);
        for (line, row) in read_records::<EpisodeRecord>(&path, EPISODES_FILE)? {
            let err = at(EPISODES_FILE, line);
            let id = parse_id(&row.id, "episode id").map_err(err)?;
            let podcast_id = parse_id(&row.podcast_id, "podcast id").map_err(err)?;
            let audio_length = parse_id(&row.audio_length, "audio length").map_err(err)?;
            let audio = if row.audio.is_empty() {
                MISSING_AUDIO
            } else {
                row.audio.as_str()
            };

            let mut episode = Episode::new(id, podcast_id, audio, audio_length)
                .map_err(err)?
                .with_description(row.description);
            if !row.title.is_empty() {
                episode = episode.with_title(&row.title).map_err(err)?;
            }
            if !row.pub_date.is_empty() {
                episode = episode.with_publish_date(&row.pub_date).map_err(err)?;
            }

            match self.dataset.podcasts.iter_mut().find(|p| p.id() == podcast_id) {
                Some(podcast) => podcast.add_episode(&episode).map_err(err)?,
                None => debug!(episode_id = id, podcast_id, "Episode of unknown podcast"),
            }
            self.dataset.episodes.push(episode);
        }
        debug!(count = self.dataset.episodes.len(), "Read episodes");
        Ok(())
    }

    /// Plain-text passwords are hashed on the way in.
    pub fn read_users(&mut self) -> Result<(), LoaderError> {
        let path = self.data_dir.join(USERS_FILE);
        for (line, row) in read_records::<UserRecord>(&path, USERS_FILE)? {
            let err = at(USERS_FILE, line);
            let id = parse_id(&row.id, "user id").map_err(err)?;
            let password = if is_password_hash(&row.password) {
                row.password
            } else {
                hash_password(&row.password)
                    .map_err(|e| err(DomainError::Validation(e.to_string())))?
            };
            let user = User::new(id, &row.username, &password).map_err(err)?;
            self.dataset.users.push(user);
        }
        debug!(count = self.dataset.users.len(), "Read users");
        Ok(())
    }

    pub fn read_reviews(&mut self) -> Result<(), LoaderError> {
        let path = self.data_dir.join(REVIEWS_FILE);
        for (line, row) in read_records::<ReviewRecord>(&path, REVIEWS_FILE)? {
            let err = at(REVIEWS_FILE, line);
            let user_id = parse_id(&row.user_id, "user id").map_err(err)?;
            let podcast_id = parse_id(&row.podcast_id, "podcast id").map_err(err)?;
            let rating = parse_id(&row.rating, "rating").map_err(err)?;
            let review = Review::new(user_id, podcast_id, rating, &row.comment);

            let user = self.dataset.users.iter_mut().find(|u| u.id() == user_id);
            let podcast = self.dataset.podcasts.iter_mut().find(|p| p.id() == podcast_id);
            match (user, podcast) {
                (Some(user), Some(podcast)) => {
                    user.add_review(&review).map_err(err)?;
                    podcast.add_review(&review).map_err(err)?;
                }
                _ => debug!(user_id, podcast_id, "Review with unknown user or podcast"),
            }
            self.dataset.reviews.push(review);
        }
        debug!(count = self.dataset.reviews.len(), "Read reviews");
        Ok(())
    }
}
