use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use podcast_core::config::CONFIG_PATH_ENV;
use podcast_core::domain::PodcastId;
use podcast_core::services::{catalogue, episodes, reviews};
use podcast_core::{
    load_config, populate, validate_config, Config, ConfigError, CsvDataReader, MemoryRepository,
    PodcastRepository, RepositoryBackend, SearchFilter, SqliteRepository,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "\
usage: podcasts <command>

commands:
  stats                       number of podcasts and users
  featured                    the configured front-page podcasts
  podcast <id>                one podcast
  episodes <podcast id>       episodes of a podcast
  reviews <podcast id>        reviews of a podcast
  search <filter> <term>      filter is one of title, category, author, language";

fn main() {
    if let Err(e) = run() {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,podcast_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let config_path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!(version = VERSION, "Loading configuration from {:?}", config_path);
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(path)) => {
            warn!("Config file {} not found, using defaults", path);
            Config::default()
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load config from {:?}", config_path))
        }
    };
    validate_config(&config).context("Configuration validation failed")?;

    let repo = open_repository(&config)?;
    let repo = repo.as_ref();

    match (command.as_str(), &args[1..]) {
        ("stats", []) => print_json(&Stats {
            podcasts: catalogue::get_number_of_podcasts(repo)?,
            users: repo.get_user_count()?,
        }),
        ("featured", []) => print_json(&catalogue::featured_podcasts(
            repo,
            &config.catalogue.featured,
        )?),
        ("podcast", [id]) => {
            let id = parse_podcast_id(id)?;
            match catalogue::get_podcast(repo, id)? {
                Some(summary) => print_json(&summary),
                None => bail!("Podcast not found: {}", id),
            }
        }
        ("episodes", [id]) => print_json(&episodes::get_episodes(repo, parse_podcast_id(id)?)?),
        ("reviews", [id]) => print_json(&reviews::get_reviews_for_podcast(
            repo,
            parse_podcast_id(id)?,
        )?),
        ("search", [filter, term @ ..]) if !term.is_empty() => {
            let filter: SearchFilter = filter.parse()?;
            print_json(&catalogue::search_podcasts(repo, &term.join(" "), filter)?)
        }
        _ => bail!("Unrecognised command\n\n{}", USAGE),
    }
}

#[derive(Serialize)]
struct Stats {
    podcasts: usize,
    users: usize,
}

/// Build the configured backend and fill it from the data directory. A
/// database that already holds podcasts is used as is.
fn open_repository(config: &Config) -> Result<Box<dyn PodcastRepository>> {
    let repo: Box<dyn PodcastRepository> = match config.repository.backend {
        RepositoryBackend::Memory => Box::new(MemoryRepository::new()),
        RepositoryBackend::Database => {
            info!("Database path: {:?}", config.database.path);
            Box::new(
                SqliteRepository::new(&config.database.path)
                    .context("Failed to open database")?,
            )
        }
    };

    if repo.get_number_of_podcasts()? > 0 {
        info!("Repository already populated");
        return Ok(repo);
    }

    let dataset = CsvDataReader::load(&config.data.path)
        .with_context(|| format!("Failed to load data from {:?}", config.data.path))?;
    let summary = populate(&dataset, repo.as_ref()).context("Failed to populate repository")?;
    info!(
        podcasts = summary.podcasts,
        episodes = summary.episodes,
        reviews = summary.reviews,
        "Repository populated"
    );
    Ok(repo)
}

fn parse_podcast_id(raw: &str) -> Result<PodcastId> {
    raw.parse().with_context(|| format!("Invalid podcast id: {}", raw))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
