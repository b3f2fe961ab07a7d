use anyhow::{bail, Context, Result};
use art_discovery_engine::analysis::{PpmImageSource, VisualFeatureExtractor};
use art_discovery_engine::background_jobs::jobs::{AffinityDecayJob, ArtworkClassificationJob};
use art_discovery_engine::background_jobs::{run_job, BackgroundJob, JobContext};
use art_discovery_engine::config::{AppConfig, CliConfig, FileConfig};
use art_discovery_engine::user_store::UserStore;
use art_discovery_engine::{
    metrics, ActionType, Artwork, CatalogStore, PreferenceGraph, RecommendationEngine,
    SqliteCatalogStore, SqliteUserStore,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[command(name = "discovery-cli", about = "Art discovery engine command line")]
struct CliArgs {
    /// Directory holding catalog.db and user.db.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Root directory that image references resolve against.
    #[clap(long, value_parser = parse_path)]
    pub media_path: Option<PathBuf>,

    /// Preference graph file (.toml or .json). Defaults to the built-in graph.
    #[clap(long, value_parser = parse_path)]
    pub graph: Option<PathBuf>,

    /// Seed for recommendation tiebreaks, for reproducible output.
    #[clap(long)]
    pub rng_seed: Option<u64>,

    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a user and print its id.
    AddUser {
        handle: String,
    },
    /// Add an artwork to the catalog.
    AddArtwork {
        id: String,
        title: String,
        artist: String,
        #[clap(long)]
        genre: Option<String>,
        #[clap(long)]
        period: Option<String>,
        #[clap(long)]
        style: Option<String>,
        #[clap(long, default_value_t = 0.0)]
        quality: f64,
        /// Image reference relative to the media path.
        #[clap(long)]
        image: Option<String>,
    },
    /// Record an interaction.
    Record {
        user_id: usize,
        artwork_id: String,
        /// view, like, save, share or purchase
        action: String,
        #[clap(long)]
        dwell: Option<f64>,
        #[clap(long)]
        rating: Option<u8>,
    },
    /// Print recommendations as JSON.
    Recommend {
        user_id: usize,
        #[clap(long)]
        limit: Option<usize>,
        #[clap(long)]
        diversity: Option<f64>,
        #[clap(long)]
        exclude_viewed: bool,
        /// Add a one-line explanation to every item.
        #[clap(long)]
        explain: bool,
    },
    /// Classify one artwork and store its tags.
    Classify {
        artwork_id: String,
    },
    /// Classify a batch of artworks waiting for analysis.
    ClassifyPending {
        #[clap(long)]
        batch_size: Option<usize>,
    },
    /// Seed a user's affinities from a personality seed type.
    ColdStart {
        user_id: usize,
        seed_type: String,
    },
    /// Decay every affinity score once.
    Decay {
        #[clap(long)]
        factor: Option<f64>,
    },
    /// Print collected metrics in Prometheus text format.
    Metrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    metrics::init_metrics();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_dir: cli_args.db_dir.clone(),
        media_path: cli_args.media_path.clone(),
        graph_path: cli_args.graph.clone(),
        rng_seed: cli_args.rng_seed,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    let catalog = Arc::new(SqliteCatalogStore::new(config.catalog_db_path())?);
    let users = Arc::new(SqliteUserStore::new(config.user_db_path())?);
    let graph = match &config.graph_path {
        Some(path) => PreferenceGraph::load(path)?,
        None => PreferenceGraph::curated(),
    };
    info!("Preference graph version {}", graph.version);
    let images = Arc::new(PpmImageSource::new(config.media_path.clone()));

    let mut engine = RecommendationEngine::new(
        catalog.clone(),
        users.clone(),
        Arc::new(graph),
        config.engine_settings(),
    )
    .with_image_source(images.clone());
    if let Some(seed) = config.rng_seed {
        engine = engine.with_rng_seed(seed);
    }
    let job_context = JobContext::new(CancellationToken::new(), catalog.clone(), users.clone());

    match cli_args.command {
        Command::AddUser { handle } => {
            let id = users.create_user(&handle, None)?;
            println!("{}", id);
        }
        Command::AddArtwork {
            id,
            title,
            artist,
            genre,
            period,
            style,
            quality,
            image,
        } => {
            let mut artwork = Artwork::new(id, title, artist).with_quality(quality);
            artwork.genre = genre;
            artwork.period = period;
            artwork.style = style;
            if let Some(image) = image {
                artwork = artwork.with_image_ref(image);
            }
            catalog.insert_artwork(&artwork)?;
            metrics::set_catalog_artworks(catalog.count_artworks()?);
            println!("{}", artwork.id);
        }
        Command::Record {
            user_id,
            artwork_id,
            action,
            dwell,
            rating,
        } => {
            let action: ActionType = action.parse()?;
            let event_id = engine.record_interaction(user_id, &artwork_id, action, dwell, rating)?;
            println!("{}", event_id);
        }
        Command::Recommend {
            user_id,
            limit,
            diversity,
            exclude_viewed,
            explain,
        } => {
            let limit = limit.unwrap_or(config.recommendations.default_limit);
            let diversity = diversity.unwrap_or(config.recommendations.diversity_factor);
            let candidates = engine
                .get_recommendations(user_id, limit, diversity, exclude_viewed)
                .await?;
            let mut items = Vec::with_capacity(candidates.len());
            for candidate in &candidates {
                let mut item = serde_json::to_value(candidate)?;
                if explain {
                    item["explanation"] = serde_json::Value::String(engine.explain(candidate, user_id)?);
                }
                items.push(item);
            }
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        Command::Classify { artwork_id } => {
            let profile = engine.classify_artwork(&artwork_id)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Command::ClassifyPending { batch_size } => {
            let job = ArtworkClassificationJob::new(
                images,
                VisualFeatureExtractor::new(config.analysis),
                batch_size.unwrap_or(config.jobs.classification_batch_size),
            );
            info!("Running {}", job.name());
            run_job(Arc::new(job), job_context).await?;
        }
        Command::ColdStart { user_id, seed_type } => {
            engine.initialize_cold_start(user_id, &seed_type)?;
        }
        Command::Decay { factor } => {
            let factor = factor.unwrap_or(config.jobs.decay_factor);
            if !(0.0..=1.0).contains(&factor) {
                bail!("decay factor must be within [0, 1], got {}", factor);
            }
            let job = AffinityDecayJob::new(factor);
            run_job(Arc::new(job), job_context).await?;
        }
        Command::Metrics => {
            metrics::set_catalog_artworks(catalog.count_artworks()?);
            print!("{}", metrics::gather_text());
        }
    }

    Ok(())
}
