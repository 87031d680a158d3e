//! SQLite-backed podcast repository.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension, Params, Row, ToSql, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    ensure_review_attached, normalize_term, PodcastRepository, RepositoryError, RepositoryResult,
    SearchFilter,
};
use crate::domain::{
    normalize_username, Author, AuthorId, Category, CategoryId, DomainError, Episode, EpisodeId,
    Playlist, PlaylistItem, Podcast, PodcastId, Review, ReviewId, User, UserId,
};

const PODCAST_COLUMNS: &str =
    "p.id, p.author_id, p.title, p.image, p.description, p.language, p.website, p.itunes_id";

const EPISODE_COLUMNS: &str =
    "e.id, e.podcast_id, e.title, e.audio_link, e.audio_length, e.description, e.publish_date";

/// SQL name of the Unicode-aware lowercase function used by search.
const LOWER_FN: &str = "unicode_lower";

fn db(e: rusqlite::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

/// SQLite's own `lower()` and `LIKE` only fold ASCII. Search lowercases both
/// sides with Rust's Unicode rules instead, matching the in-memory backend.
fn register_functions(conn: &Connection) -> RepositoryResult<()> {
    conn.create_scalar_function(
        LOWER_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|v| v.to_lowercase()))
        },
    )
    .map_err(db)
}

/// SQLite-backed podcast repository.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open (or create) the database file and its tables.
    pub fn new(path: &Path) -> RepositoryResult<Self> {
        let conn = Connection::open(path).map_err(db)?;
        register_functions(&conn)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite repository (useful for testing).
    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory().map_err(db)?;
        register_functions(&conn)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> RepositoryResult<()> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS authors (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );

            -- seq keeps insertion order for author/category podcast lists
            CREATE TABLE IF NOT EXISTS podcasts (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id INTEGER NOT NULL UNIQUE,
                author_id INTEGER NOT NULL REFERENCES authors(id),
                title TEXT NOT NULL,
                image TEXT,
                description TEXT NOT NULL DEFAULT '',
                language TEXT NOT NULL,
                website TEXT NOT NULL DEFAULT '',
                itunes_id INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_podcasts_author ON podcasts(author_id);

            CREATE TABLE IF NOT EXISTS episodes (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id INTEGER NOT NULL UNIQUE,
                podcast_id INTEGER NOT NULL REFERENCES podcasts(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                audio_link TEXT NOT NULL,
                audio_length INTEGER NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                publish_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_episodes_podcast ON episodes(podcast_id);

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS reviews (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                podcast_id INTEGER NOT NULL REFERENCES podcasts(id) ON DELETE CASCADE,
                rating INTEGER NOT NULL,
                comment TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reviews_podcast ON reviews(podcast_id);

            CREATE TABLE IF NOT EXISTS playlists (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS podcast_categories (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                podcast_id INTEGER NOT NULL REFERENCES podcasts(id) ON DELETE CASCADE,
                category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                UNIQUE(podcast_id, category_id)
            );

            CREATE TABLE IF NOT EXISTS playlist_podcasts (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                playlist_id INTEGER NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
                podcast_id INTEGER NOT NULL REFERENCES podcasts(id) ON DELETE CASCADE,
                UNIQUE(playlist_id, podcast_id)
            );

            CREATE TABLE IF NOT EXISTS playlist_episodes (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                playlist_id INTEGER NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
                episode_id INTEGER NOT NULL REFERENCES episodes(id) ON DELETE CASCADE,
                UNIQUE(playlist_id, episode_id)
            );
            "#,
        )
        .map_err(db)?;

        Ok(())
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::Database(format!("connection lock poisoned: {}", e)))
    }

    /// Run `work` inside a transaction: commit if it succeeds, roll back
    /// (by dropping the transaction) if it fails.
    fn unit_of_work<T>(
        &self,
        operation: &str,
        work: impl FnOnce(&Transaction<'_>) -> RepositoryResult<T>,
    ) -> RepositoryResult<T> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(db)?;
        match work(&tx) {
            Ok(value) => {
                tx.commit().map_err(db)?;
                debug!(operation, "Unit of work committed");
                Ok(value)
            }
            Err(e) => {
                warn!(operation, error = %e, "Unit of work rolled back");
                Err(e)
            }
        }
    }
}

fn exists(conn: &Connection, sql: &str, id: impl ToSql) -> RepositoryResult<bool> {
    conn.query_row(sql, [id], |_| Ok(()))
        .optional()
        .map(|row| row.is_some())
        .map_err(db)
}

fn require(conn: &Connection, sql: &str, id: u32, what: &str) -> RepositoryResult<()> {
    if exists(conn, sql, id)? {
        Ok(())
    } else {
        Err(RepositoryError::NotFound(format!("{} {}", what, id)))
    }
}

fn query_ids(conn: &Connection, sql: &str, params: impl Params) -> RepositoryResult<Vec<u32>> {
    let mut stmt = conn.prepare(sql).map_err(db)?;
    let rows = stmt.query_map(params, |row| row.get(0)).map_err(db)?;
    rows.collect::<Result<Vec<u32>, _>>().map_err(db)
}

fn parse_review_id(raw: &str) -> RepositoryResult<ReviewId> {
    Uuid::parse_str(raw)
        .map_err(|e| RepositoryError::Database(format!("invalid review id '{}': {}", raw, e)))
}

fn query_review_ids(conn: &Connection, sql: &str, id: u32) -> RepositoryResult<Vec<ReviewId>> {
    let mut stmt = conn.prepare(sql).map_err(db)?;
    let rows = stmt
        .query_map([id], |row| row.get::<_, String>(0))
        .map_err(db)?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(parse_review_id(&row.map_err(db)?)?);
    }
    Ok(ids)
}

/// Escape `%`, `_` and the escape character itself for `LIKE ... ESCAPE '\'`.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn load_author(conn: &Connection, id: AuthorId) -> RepositoryResult<Option<Author>> {
    let name: Option<String> = conn
        .query_row("SELECT name FROM authors WHERE id = ?1", [id], |row| {
            row.get(0)
        })
        .optional()
        .map_err(db)?;
    let Some(name) = name else {
        return Ok(None);
    };

    let mut author = Author::new(id, &name)?;
    for podcast_id in query_ids(
        conn,
        "SELECT id FROM podcasts WHERE author_id = ?1 ORDER BY seq",
        [id],
    )? {
        author.link_podcast(podcast_id);
    }
    Ok(Some(author))
}

fn load_category(conn: &Connection, id: CategoryId) -> RepositoryResult<Option<Category>> {
    let name: Option<String> = conn
        .query_row("SELECT name FROM categories WHERE id = ?1", [id], |row| {
            row.get(0)
        })
        .optional()
        .map_err(db)?;
    let Some(name) = name else {
        return Ok(None);
    };

    let mut category = Category::new(id, &name)?;
    for podcast_id in query_ids(
        conn,
        "SELECT podcast_id FROM podcast_categories WHERE category_id = ?1 ORDER BY seq",
        [id],
    )? {
        category.link_podcast(podcast_id);
    }
    Ok(Some(category))
}

/// Raw podcast columns, before the link tables are read.
struct PodcastRow {
    id: PodcastId,
    author_id: AuthorId,
    title: String,
    image: Option<String>,
    description: String,
    language: String,
    website: String,
    itunes_id: Option<i64>,
}

impl PodcastRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            author_id: row.get(1)?,
            title: row.get(2)?,
            image: row.get(3)?,
            description: row.get(4)?,
            language: row.get(5)?,
            website: row.get(6)?,
            itunes_id: row.get(7)?,
        })
    }

    fn into_podcast(self, conn: &Connection) -> RepositoryResult<Podcast> {
        let mut podcast = Podcast::new(self.id, self.author_id, &self.title)?
            .with_description(self.description)
            .with_language(self.language)
            .with_website(self.website);
        podcast.set_image(self.image);
        if let Some(itunes_id) = self.itunes_id {
            let itunes_id = u64::try_from(itunes_id).map_err(|_| {
                RepositoryError::Database(format!(
                    "podcast {} has negative itunes id {}",
                    self.id, itunes_id
                ))
            })?;
            podcast = podcast.with_itunes_id(itunes_id);
        }

        for category_id in query_ids(
            conn,
            "SELECT category_id FROM podcast_categories WHERE podcast_id = ?1 ORDER BY seq",
            [self.id],
        )? {
            podcast.link_category(category_id);
        }
        for episode_id in query_ids(
            conn,
            "SELECT id FROM episodes WHERE podcast_id = ?1 ORDER BY seq",
            [self.id],
        )? {
            podcast.link_episode(episode_id);
        }
        for review_id in query_review_ids(
            conn,
            "SELECT id FROM reviews WHERE podcast_id = ?1 ORDER BY seq",
            self.id,
        )? {
            podcast.link_review(review_id);
        }
        Ok(podcast)
    }
}

fn query_podcasts(
    conn: &Connection,
    sql: &str,
    params: impl Params,
) -> RepositoryResult<Vec<Podcast>> {
    let rows = {
        let mut stmt = conn.prepare(sql).map_err(db)?;
        let rows = stmt.query_map(params, PodcastRow::from_row).map_err(db)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db)?
    };
    rows.into_iter().map(|row| row.into_podcast(conn)).collect()
}

/// Raw episode columns.
struct EpisodeRow {
    id: EpisodeId,
    podcast_id: PodcastId,
    title: String,
    audio_link: String,
    audio_length: u32,
    description: String,
    publish_date: String,
}

impl EpisodeRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            podcast_id: row.get(1)?,
            title: row.get(2)?,
            audio_link: row.get(3)?,
            audio_length: row.get(4)?,
            description: row.get(5)?,
            publish_date: row.get(6)?,
        })
    }

    fn into_episode(self) -> RepositoryResult<Episode> {
        Ok(
            Episode::new(self.id, self.podcast_id, &self.audio_link, self.audio_length)?
                .with_title(&self.title)?
                .with_description(self.description)
                .with_publish_date(&self.publish_date)?,
        )
    }
}

fn query_episodes(
    conn: &Connection,
    sql: &str,
    params: impl Params,
) -> RepositoryResult<Vec<Episode>> {
    let mut stmt = conn.prepare(sql).map_err(db)?;
    let rows = stmt.query_map(params, EpisodeRow::from_row).map_err(db)?;

    let mut episodes = Vec::new();
    for row in rows {
        episodes.push(row.map_err(db)?.into_episode()?);
    }
    Ok(episodes)
}

fn load_playlist(conn: &Connection, user_id: UserId) -> RepositoryResult<Option<Playlist>> {
    let row: Option<(u32, String)> = conn
        .query_row(
            "SELECT id, name FROM playlists WHERE user_id = ?1",
            [user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(db)?;
    let Some((id, name)) = row else {
        return Ok(None);
    };

    let mut playlist = Playlist::new(id, user_id, &name)?;
    for podcast_id in query_ids(
        conn,
        "SELECT podcast_id FROM playlist_podcasts WHERE playlist_id = ?1 ORDER BY seq",
        [id],
    )? {
        playlist.add_item(PlaylistItem::Podcast(podcast_id));
    }
    for episode_id in query_ids(
        conn,
        "SELECT episode_id FROM playlist_episodes WHERE playlist_id = ?1 ORDER BY seq",
        [id],
    )? {
        playlist.add_item(PlaylistItem::Episode(episode_id));
    }
    Ok(Some(playlist))
}

fn load_user(conn: &Connection, id: UserId) -> RepositoryResult<Option<User>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT username, password FROM users WHERE id = ?1",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(db)?;
    let Some((username, password)) = row else {
        return Ok(None);
    };

    let mut user = User::new(id, &username, &password)?;
    for review_id in query_review_ids(
        conn,
        "SELECT id FROM reviews WHERE user_id = ?1 ORDER BY seq",
        id,
    )? {
        user.link_review(review_id);
    }
    if let Some(playlist) = load_playlist(conn, id)? {
        user.replace_playlist(playlist);
    }
    Ok(Some(user))
}

fn playlist_id_for(conn: &Connection, user: &User) -> RepositoryResult<u32> {
    conn.query_row(
        "SELECT id FROM playlists WHERE user_id = ?1",
        [user.id()],
        |row| row.get(0),
    )
    .optional()
    .map_err(db)?
    .ok_or_else(|| RepositoryError::NotFound(format!("user {}", user.username())))
}

fn count(conn: &Connection, sql: &str, params: impl Params) -> RepositoryResult<usize> {
    let n: i64 = conn.query_row(sql, params, |row| row.get(0)).map_err(db)?;
    Ok(n as usize)
}

impl PodcastRepository for SqliteRepository {
    fn add_user(&self, user: &User) -> RepositoryResult<()> {
        self.unit_of_work("add_user", |tx| {
            let inserted = tx
                .execute(
                    "INSERT OR IGNORE INTO users (id, username, password) VALUES (?1, ?2, ?3)",
                    params![user.id(), user.username(), user.password()],
                )
                .map_err(db)?;
            if inserted == 0 {
                debug!(user_id = user.id(), username = user.username(), "User already stored");
                return Ok(());
            }

            let playlist = user.playlist();
            tx.execute(
                "INSERT INTO playlists (id, user_id, name) VALUES (?1, ?2, ?3)",
                params![playlist.id(), user.id(), playlist.name()],
            )
            .map_err(db)?;
            // items pointing at nothing stored are dropped
            for podcast_id in playlist.podcast_ids() {
                tx.execute(
                    "INSERT OR IGNORE INTO playlist_podcasts (playlist_id, podcast_id)
                     SELECT ?1, id FROM podcasts WHERE id = ?2",
                    params![playlist.id(), podcast_id],
                )
                .map_err(db)?;
            }
            for episode_id in playlist.episode_ids() {
                tx.execute(
                    "INSERT OR IGNORE INTO playlist_episodes (playlist_id, episode_id)
                     SELECT ?1, id FROM episodes WHERE id = ?2",
                    params![playlist.id(), episode_id],
                )
                .map_err(db)?;
            }
            Ok(())
        })
    }

    fn get_user(&self, username: &str) -> RepositoryResult<Option<User>> {
        let conn = self.lock()?;
        let id: Option<UserId> = conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                [normalize_username(username)],
                |row| row.get(0),
            )
            .optional()
            .map_err(db)?;
        match id {
            Some(id) => load_user(&conn, id),
            None => Ok(None),
        }
    }

    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let conn = self.lock()?;
        load_user(&conn, id)
    }

    fn get_user_count(&self) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        count(&conn, "SELECT COUNT(*) FROM users", [])
    }

    fn add_author(&self, author: &Author) -> RepositoryResult<()> {
        self.unit_of_work("add_author", |tx| {
            tx.execute(
                "INSERT OR IGNORE INTO authors (id, name) VALUES (?1, ?2)",
                params![author.id(), author.name()],
            )
            .map_err(db)?;
            Ok(())
        })
    }

    fn get_author(&self, id: AuthorId) -> RepositoryResult<Option<Author>> {
        let conn = self.lock()?;
        load_author(&conn, id)
    }

    fn add_category(&self, category: &Category) -> RepositoryResult<()> {
        self.unit_of_work("add_category", |tx| {
            tx.execute(
                "INSERT OR IGNORE INTO categories (id, name) VALUES (?1, ?2)",
                params![category.id(), category.name()],
            )
            .map_err(db)?;
            Ok(())
        })
    }

    fn get_category(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        let conn = self.lock()?;
        load_category(&conn, id)
    }

    fn add_podcast(&self, podcast: &Podcast) -> RepositoryResult<()> {
        self.unit_of_work("add_podcast", |tx| {
            if exists(tx, "SELECT 1 FROM podcasts WHERE id = ?1", podcast.id())? {
                debug!(podcast_id = podcast.id(), "Podcast already stored");
                return Ok(());
            }
            require(
                tx,
                "SELECT 1 FROM authors WHERE id = ?1",
                podcast.author_id(),
                "author",
            )?;
            for category_id in podcast.category_ids() {
                require(
                    tx,
                    "SELECT 1 FROM categories WHERE id = ?1",
                    *category_id,
                    "category",
                )?;
            }

            // INTEGER columns are signed 64-bit
            let itunes_id = podcast
                .itunes_id()
                .map(i64::try_from)
                .transpose()
                .map_err(|_| {
                    DomainError::Validation(format!(
                        "itunes id of podcast {} does not fit in 64 signed bits",
                        podcast.id()
                    ))
                })?;

            tx.execute(
                "INSERT INTO podcasts (id, author_id, title, image, description, language, website, itunes_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    podcast.id(),
                    podcast.author_id(),
                    podcast.title(),
                    podcast.image(),
                    podcast.description(),
                    podcast.language(),
                    podcast.website(),
                    itunes_id,
                ],
            )
            .map_err(db)?;

            for category_id in podcast.category_ids() {
                tx.execute(
                    "INSERT OR IGNORE INTO podcast_categories (podcast_id, category_id) VALUES (?1, ?2)",
                    params![podcast.id(), category_id],
                )
                .map_err(db)?;
            }
            Ok(())
        })
    }

    fn remove_podcast(&self, podcast: &Podcast) -> RepositoryResult<()> {
        self.unit_of_work("remove_podcast", |tx| {
            // cascades to episodes, reviews, category and playlist links
            let removed = tx
                .execute("DELETE FROM podcasts WHERE id = ?1", [podcast.id()])
                .map_err(db)?;
            if removed == 0 {
                return Err(RepositoryError::NotFound(format!("podcast {}", podcast.id())));
            }
            Ok(())
        })
    }

    fn get_podcast(&self, id: PodcastId) -> RepositoryResult<Option<Podcast>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM podcasts p WHERE p.id = ?1", PODCAST_COLUMNS);
        Ok(query_podcasts(&conn, &sql, [id])?.into_iter().next())
    }

    fn get_podcasts(&self) -> RepositoryResult<Vec<Podcast>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM podcasts p ORDER BY p.id", PODCAST_COLUMNS);
        query_podcasts(&conn, &sql, [])
    }

    fn get_number_of_podcasts(&self) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        count(&conn, "SELECT COUNT(*) FROM podcasts", [])
    }

    fn add_episode(&self, episode: &Episode) -> RepositoryResult<()> {
        self.unit_of_work("add_episode", |tx| {
            if exists(tx, "SELECT 1 FROM episodes WHERE id = ?1", episode.id())? {
                debug!(episode_id = episode.id(), "Episode already stored");
                return Ok(());
            }
            require(
                tx,
                "SELECT 1 FROM podcasts WHERE id = ?1",
                episode.podcast_id(),
                "podcast",
            )?;

            tx.execute(
                "INSERT INTO episodes (id, podcast_id, title, audio_link, audio_length, description, publish_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    episode.id(),
                    episode.podcast_id(),
                    episode.title(),
                    episode.audio_link(),
                    episode.audio_length(),
                    episode.description(),
                    episode.publish_date(),
                ],
            )
            .map_err(db)?;
            Ok(())
        })
    }

    fn remove_episode(&self, episode: &Episode) -> RepositoryResult<()> {
        self.unit_of_work("remove_episode", |tx| {
            let removed = tx
                .execute("DELETE FROM episodes WHERE id = ?1", [episode.id()])
                .map_err(db)?;
            if removed == 0 {
                return Err(RepositoryError::NotFound(format!("episode {}", episode.id())));
            }
            Ok(())
        })
    }

    fn get_episode(
        &self,
        podcast_id: PodcastId,
        episode_id: EpisodeId,
    ) -> RepositoryResult<Option<Episode>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM episodes e WHERE e.id = ?1 AND e.podcast_id = ?2",
            EPISODE_COLUMNS
        );
        Ok(query_episodes(&conn, &sql, [episode_id, podcast_id])?
            .into_iter()
            .next())
    }

    fn get_episodes(&self, podcast: &Podcast) -> RepositoryResult<Vec<Episode>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM episodes e WHERE e.podcast_id = ?1 ORDER BY e.seq",
            EPISODE_COLUMNS
        );
        query_episodes(&conn, &sql, [podcast.id()])
    }

    fn get_number_of_episodes(&self, podcast: &Podcast) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        count(
            &conn,
            "SELECT COUNT(*) FROM episodes WHERE podcast_id = ?1",
            [podcast.id()],
        )
    }

    fn add_review(
        &self,
        review: &Review,
        poster: &User,
        podcast: &Podcast,
    ) -> RepositoryResult<()> {
        ensure_review_attached(review, poster, podcast)?;

        self.unit_of_work("add_review", |tx| {
            if !exists(tx, "SELECT 1 FROM users WHERE id = ?1", poster.id())? {
                return Err(RepositoryError::NotFound(format!(
                    "user {}",
                    poster.username()
                )));
            }
            require(tx, "SELECT 1 FROM podcasts WHERE id = ?1", podcast.id(), "podcast")?;

            let inserted = tx
                .execute(
                    "INSERT OR IGNORE INTO reviews (id, user_id, podcast_id, rating, comment)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        review.id().to_string(),
                        review.poster(),
                        review.podcast(),
                        review.rating(),
                        review.comment(),
                    ],
                )
                .map_err(db)?;
            if inserted == 0 {
                debug!(review_id = %review.id(), "Review already stored");
            }
            Ok(())
        })
    }

    fn get_reviews(&self) -> RepositoryResult<Vec<Review>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, user_id, podcast_id, rating, comment FROM reviews ORDER BY seq")
            .map_err(db)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(db)?;

        let mut reviews = Vec::new();
        for row in rows {
            let (id, poster, podcast, rating, comment) = row.map_err(db)?;
            reviews.push(Review::with_id(
                parse_review_id(&id)?,
                poster,
                podcast,
                rating,
                &comment,
            ));
        }
        Ok(reviews)
    }

    fn add_to_user_playlist(&self, user: &mut User, item: PlaylistItem) -> RepositoryResult<()> {
        let playlist = self.unit_of_work("add_to_user_playlist", |tx| {
            let playlist_id = playlist_id_for(tx, user)?;
            match item {
                PlaylistItem::Podcast(id) => {
                    require(tx, "SELECT 1 FROM podcasts WHERE id = ?1", id, "podcast")?;
                    tx.execute(
                        "INSERT OR IGNORE INTO playlist_podcasts (playlist_id, podcast_id) VALUES (?1, ?2)",
                        params![playlist_id, id],
                    )
                    .map_err(db)?;
                }
                PlaylistItem::Episode(id) => {
                    require(tx, "SELECT 1 FROM episodes WHERE id = ?1", id, "episode")?;
                    tx.execute(
                        "INSERT OR IGNORE INTO playlist_episodes (playlist_id, episode_id) VALUES (?1, ?2)",
                        params![playlist_id, id],
                    )
                    .map_err(db)?;
                }
            }
            load_playlist(tx, user.id())?
                .ok_or_else(|| RepositoryError::NotFound(format!("playlist of {}", user.username())))
        })?;

        user.replace_playlist(playlist);
        Ok(())
    }

    fn remove_from_user_playlist(
        &self,
        user: &mut User,
        item: PlaylistItem,
    ) -> RepositoryResult<()> {
        let playlist = self.unit_of_work("remove_from_user_playlist", |tx| {
            let playlist_id = playlist_id_for(tx, user)?;
            let removed = match item {
                PlaylistItem::Podcast(id) => tx.execute(
                    "DELETE FROM playlist_podcasts WHERE playlist_id = ?1 AND podcast_id = ?2",
                    params![playlist_id, id],
                ),
                PlaylistItem::Episode(id) => tx.execute(
                    "DELETE FROM playlist_episodes WHERE playlist_id = ?1 AND episode_id = ?2",
                    params![playlist_id, id],
                ),
            }
            .map_err(db)?;
            debug!(user = user.username(), %item, removed, "Playlist item removed");
            load_playlist(tx, user.id())?
                .ok_or_else(|| RepositoryError::NotFound(format!("playlist of {}", user.username())))
        })?;

        user.replace_playlist(playlist);
        Ok(())
    }

    fn get_user_playlist(&self, user: &User) -> RepositoryResult<Option<Playlist>> {
        let conn = self.lock()?;
        load_playlist(&conn, user.id())
    }

    fn get_user_podcast_playlist(&self, user: &User) -> RepositoryResult<Vec<Podcast>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM playlist_podcasts pp
             JOIN playlists pl ON pl.id = pp.playlist_id
             JOIN podcasts p ON p.id = pp.podcast_id
             WHERE pl.user_id = ?1
             ORDER BY pp.seq",
            PODCAST_COLUMNS
        );
        query_podcasts(&conn, &sql, [user.id()])
    }

    fn get_user_episode_playlist(&self, user: &User) -> RepositoryResult<Vec<Episode>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM playlist_episodes pe
             JOIN playlists pl ON pl.id = pe.playlist_id
             JOIN episodes e ON e.id = pe.episode_id
             WHERE pl.user_id = ?1
             ORDER BY pe.seq",
            EPISODE_COLUMNS
        );
        query_episodes(&conn, &sql, [user.id()])
    }

    fn search_podcasts(&self, term: &str, filter: SearchFilter) -> RepositoryResult<Vec<Podcast>> {
        let Some(needle) = normalize_term(term) else {
            return Ok(Vec::new());
        };
        let pattern = format!("%{}%", escape_like(&needle));

        let sql = match filter {
            SearchFilter::Title => format!(
                r"SELECT {} FROM podcasts p WHERE {lower}(p.title) LIKE ?1 ESCAPE '\' ORDER BY p.id",
                PODCAST_COLUMNS,
                lower = LOWER_FN
            ),
            SearchFilter::Language => format!(
                r"SELECT {} FROM podcasts p WHERE {lower}(p.language) LIKE ?1 ESCAPE '\' ORDER BY p.id",
                PODCAST_COLUMNS,
                lower = LOWER_FN
            ),
            SearchFilter::Author => format!(
                r"SELECT {} FROM podcasts p
                  JOIN authors a ON a.id = p.author_id
                  WHERE {lower}(a.name) LIKE ?1 ESCAPE '\'
                  ORDER BY p.id",
                PODCAST_COLUMNS,
                lower = LOWER_FN
            ),
            SearchFilter::Category => format!(
                r"SELECT DISTINCT {} FROM podcasts p
                  JOIN podcast_categories pc ON pc.podcast_id = p.id
                  JOIN categories c ON c.id = pc.category_id
                  WHERE {lower}(c.name) LIKE ?1 ESCAPE '\'
                  ORDER BY p.id",
                PODCAST_COLUMNS,
                lower = LOWER_FN
            ),
        };

        let conn = self.lock()?;
        query_podcasts(&conn, &sql, [pattern])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::make_review;
    use tempfile::TempDir;

    fn create_test_repository() -> SqliteRepository {
        let repo = SqliteRepository::in_memory().unwrap();
        repo.add_author(&Author::new(1, "Joe Toste").unwrap()).unwrap();
        repo.add_author(&Author::new(2, "USA Radio").unwrap()).unwrap();
        repo.add_category(&Category::new(1, "Business").unwrap())
            .unwrap();
        repo.add_category(&Category::new(2, "News & Politics").unwrap())
            .unwrap();
        repo
    }

    fn create_test_podcast(id: PodcastId, author_id: AuthorId, title: &str) -> Podcast {
        Podcast::new(id, author_id, title).unwrap()
    }

    #[test]
    fn test_podcast_round_trip_keeps_fields() {
        let repo = create_test_repository();
        let mut podcast = create_test_podcast(1, 1, "Joe Toste Podcast")
            .with_image("http://img/1.jpg")
            .with_description("Sales training")
            .with_language("English")
            .with_website("https://joetoste.com")
            .with_itunes_id(1373219498);
        podcast.add_category(&Category::new(2, "News & Politics").unwrap());
        podcast.add_category(&Category::new(1, "Business").unwrap());
        repo.add_podcast(&podcast).unwrap();

        let stored = repo.get_podcast(1).unwrap().unwrap();
        assert_eq!(stored, podcast);
        assert_eq!(stored.title(), "Joe Toste Podcast");
        assert_eq!(stored.image(), Some("http://img/1.jpg"));
        assert_eq!(stored.description(), "Sales training");
        assert_eq!(stored.language(), "English");
        assert_eq!(stored.website(), "https://joetoste.com");
        assert_eq!(stored.itunes_id(), Some(1373219498));
        assert_eq!(stored.category_ids(), &[2, 1]);
    }

    #[test]
    fn test_get_nonexistent() {
        let repo = create_test_repository();
        assert!(repo.get_podcast(42).unwrap().is_none());
        assert!(repo.get_author(42).unwrap().is_none());
        assert!(repo.get_user("nobody").unwrap().is_none());
    }

    #[test]
    fn test_add_podcast_unknown_category_writes_nothing() {
        let repo = create_test_repository();
        let mut podcast = create_test_podcast(1, 1, "p");
        podcast.add_category(&Category::new(9, "Missing").unwrap());

        let result = repo.add_podcast(&podcast);
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
        assert_eq!(repo.get_number_of_podcasts().unwrap(), 0);
    }

    #[test]
    fn test_add_podcast_rejects_unsigned_itunes_id() {
        let repo = create_test_repository();
        let podcast = create_test_podcast(1, 1, "p").with_itunes_id(u64::MAX);

        let result = repo.add_podcast(&podcast);
        assert!(matches!(
            result,
            Err(RepositoryError::Domain(DomainError::Validation(_)))
        ));
        assert_eq!(repo.get_number_of_podcasts().unwrap(), 0);
    }

    #[test]
    fn test_search_folds_unicode_case() {
        let repo = create_test_repository();
        repo.add_author(&Author::new(3, "Émile Zola").unwrap()).unwrap();
        repo.add_podcast(&create_test_podcast(1, 3, "ÉCOUTE Radio")).unwrap();

        let hits = repo.search_podcasts("écoute", SearchFilter::Title).unwrap();
        assert_eq!(hits.len(), 1);
        let hits = repo.search_podcasts("ÉMILE", SearchFilter::Author).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_unit_of_work_rolls_back_on_error() {
        let repo = create_test_repository();
        let result: RepositoryResult<()> = repo.unit_of_work("test", |tx| {
            tx.execute("INSERT INTO authors (id, name) VALUES (3, 'Brian Denny')", [])
                .map_err(db)?;
            Err(RepositoryError::NotFound("forced".to_string()))
        });

        assert!(result.is_err());
        assert!(repo.get_author(3).unwrap().is_none());
    }

    #[test]
    fn test_remove_podcast_cascades() {
        let repo = create_test_repository();
        let mut podcast = create_test_podcast(1, 1, "Joe Toste Podcast");
        podcast.add_category(&Category::new(1, "Business").unwrap());
        repo.add_podcast(&podcast).unwrap();
        repo.add_episode(&Episode::new(10, 1, "http://a/10", 30).unwrap())
            .unwrap();

        let mut user = User::new(0, "thorke", "pw").unwrap();
        repo.add_user(&user).unwrap();
        repo.add_to_user_playlist(&mut user, PlaylistItem::Podcast(1))
            .unwrap();
        repo.add_to_user_playlist(&mut user, PlaylistItem::Episode(10))
            .unwrap();
        let review = make_review("great", &mut user, &mut podcast, 5).unwrap();
        repo.add_review(&review, &user, &podcast).unwrap();

        repo.remove_podcast(&podcast).unwrap();

        assert!(repo.get_episode(1, 10).unwrap().is_none());
        assert!(repo.get_reviews().unwrap().is_empty());
        assert!(repo.get_category(1).unwrap().unwrap().podcast_ids().is_empty());
        assert!(repo.get_author(1).unwrap().unwrap().podcast_ids().is_empty());
        assert!(repo.get_user_playlist(&user).unwrap().unwrap().is_empty());
        assert!(matches!(
            repo.remove_podcast(&podcast),
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[test]
    fn test_search_escapes_wildcards() {
        let repo = create_test_repository();
        repo.add_podcast(&create_test_podcast(1, 1, "100% Sales")).unwrap();
        repo.add_podcast(&create_test_podcast(2, 1, "1000 Sales Tips")).unwrap();
        repo.add_podcast(&create_test_podcast(3, 1, "snake_case radio")).unwrap();
        repo.add_podcast(&create_test_podcast(4, 1, "snakeXcase radio")).unwrap();

        let hits = repo.search_podcasts("0%", SearchFilter::Title).unwrap();
        let ids: Vec<_> = hits.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![1]);

        let hits = repo.search_podcasts("e_c", SearchFilter::Title).unwrap();
        let ids: Vec<_> = hits.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_search_category_is_distinct() {
        let repo = create_test_repository();
        let mut podcast = create_test_podcast(1, 2, "Radio Free Rainbow");
        podcast.add_category(&Category::new(1, "Business").unwrap());
        podcast.add_category(&Category::new(2, "News & Politics").unwrap());
        repo.add_podcast(&podcast).unwrap();

        // both category names contain "s"
        let hits = repo.search_podcasts("s", SearchFilter::Category).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_schema_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("podcasts.db");
        {
            let repo = SqliteRepository::new(&path).unwrap();
            repo.add_author(&Author::new(1, "Joe Toste").unwrap()).unwrap();
            repo.add_podcast(&create_test_podcast(1, 1, "Joe Toste Podcast"))
                .unwrap();
        }

        let repo = SqliteRepository::new(&path).unwrap();
        assert_eq!(repo.get_number_of_podcasts().unwrap(), 1);
        assert_eq!(repo.get_author(1).unwrap().unwrap().podcast_ids(), &[1]);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
