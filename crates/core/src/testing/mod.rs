//! Testing utilities shared by unit and integration tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use podcast_core::testing::fixtures;
//!
//! let repo = fixtures::memory_repository()?;
//! assert_eq!(repo.get_number_of_podcasts()?, 5);
//! ```

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::domain::{make_review, Author, Category, DomainResult, Episode, Podcast, User};
    use crate::loader::Dataset;
    use crate::repository::{
        populate, MemoryRepository, PodcastRepository, RepositoryResult, SqliteRepository,
    };

    /// Plain-text password of every fixture user.
    pub const PASSWORD: &str = "pass1234";

    /// [`PASSWORD`] hashed with a fixed salt.
    pub const PASSWORD_HASH: &str = "sha256$5f1c9a0e2b7d4c8e9a3f6b1d0e2c4a7b$c5dc7e5af9e153b5f65db4c65bfa7cc56c24d2fea628a348970151498277c192";

    /// Create an episode with a title and a two-minute length.
    pub fn episode(id: u32, podcast_id: u32, title: &str) -> DomainResult<Episode> {
        Episode::new(id, podcast_id, &format!("https://audio.example/{}.mp3", id), 120)?
            .with_title(title)
    }

    /// A small catalogue: five podcasts, four episodes, two users and three
    /// reviews.
    ///
    /// Podcast 1 ("Joe Toste Podcast - Sales Training Expert") has episodes
    /// 1 to 3 and two reviews. Podcast 4 is the only Spanish one. User ids
    /// start at 0 so that newly registered users continue the sequence.
    pub fn dataset() -> DomainResult<Dataset> {
        let mut authors = vec![
            Author::new(1, "Joe Toste")?,
            Author::new(2, "Brian Denny")?,
            Author::new(3, "USA Radio")?,
            Author::new(4, "Bethel Presbyterian Church")?,
            Author::new(5, "Tallin Country Church")?,
        ];
        let categories = vec![
            Category::new(1, "Business")?,
            Category::new(2, "Education")?,
            Category::new(3, "Religion & Spirituality")?,
            Category::new(4, "Music")?,
            Category::new(5, "Society & Culture")?,
        ];

        let mut podcasts = vec![
            Podcast::new(1, 1, "Joe Toste Podcast - Sales Training Expert")?
                .with_description("Sales training for B2B teams")
                .with_language("English")
                .with_website("http://joetoste.com")
                .with_itunes_id(1_335_371_096),
            Podcast::new(2, 2, "Brian Denny Radio")?
                .with_image("http://is1.mzstatic.com/brian-denny.jpg")
                .with_language("English")
                .with_website("http://briandenny.com"),
            Podcast::new(3, 5, "Tallin Messages")?
                .with_description("Sunday messages")
                .with_language("English"),
            Podcast::new(4, 3, "Radio Free Rainbow")?
                .with_description("Musica y noticias")
                .with_language("Spanish"),
            Podcast::new(5, 4, "Bethel Presbyterian Church (EPC) Sermons")?
                .with_language("English"),
        ];
        podcasts[0].add_category(&categories[0]);
        podcasts[0].add_category(&categories[1]);
        podcasts[1].add_category(&categories[4]);
        podcasts[2].add_category(&categories[2]);
        podcasts[3].add_category(&categories[3]);
        podcasts[4].add_category(&categories[2]);

        let episodes = vec![
            episode(1, 1, "Week 16 Day 3")?,
            episode(2, 1, "Week 16 Day 4")?,
            episode(3, 1, "Week 16 Day 5")?,
            episode(4, 2, "Opening Night")?,
        ];
        for episode in &episodes {
            if let Some(podcast) = podcasts.iter_mut().find(|p| p.id() == episode.podcast_id()) {
                podcast.add_episode(episode)?;
            }
        }
        for podcast in &podcasts {
            if let Some(author) = authors.iter_mut().find(|a| a.id() == podcast.author_id()) {
                author.add_podcast(podcast)?;
            }
        }

        let mut users = vec![
            User::new(0, "thorke", PASSWORD_HASH)?,
            User::new(1, "fmercury", PASSWORD_HASH)?,
        ];
        let reviews = {
            let (thorke, fmercury) = users.split_at_mut(1);
            let (first, rest) = podcasts.split_at_mut(1);
            vec![
                make_review("Great sales tips", &mut thorke[0], &mut first[0], 5)?,
                make_review("", &mut fmercury[0], &mut first[0], 3)?,
                make_review("Fun to listen to", &mut fmercury[0], &mut rest[0], 4)?,
            ]
        };

        Ok(Dataset {
            authors,
            categories,
            podcasts,
            episodes,
            users,
            reviews,
        })
    }

    /// Store [`dataset`] in `repo`.
    pub fn seed(repo: &dyn PodcastRepository) -> RepositoryResult<()> {
        populate(&dataset()?, repo)?;
        Ok(())
    }

    /// In-memory repository holding [`dataset`].
    pub fn memory_repository() -> RepositoryResult<MemoryRepository> {
        let repo = MemoryRepository::new();
        seed(&repo)?;
        Ok(repo)
    }

    /// In-memory SQLite repository holding [`dataset`].
    pub fn sqlite_repository() -> RepositoryResult<SqliteRepository> {
        let repo = SqliteRepository::in_memory()?;
        seed(&repo)?;
        Ok(repo)
    }
}
