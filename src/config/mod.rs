mod file_config;

pub use file_config::{AnalysisConfig, FileConfig, JobsConfig, RecommendationsConfig};

use crate::analysis::ExtractorSettings;
use crate::engine::EngineSettings;
use anyhow::{bail, Result};
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub media_path: Option<PathBuf>,
    pub graph_path: Option<PathBuf>,
    pub rng_seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub db_dir: PathBuf,
    pub media_path: PathBuf,
    /// Preference graph file; the built-in graph is used when absent.
    pub graph_path: Option<PathBuf>,
    pub rng_seed: Option<u64>,

    // Feature configs (with defaults)
    pub recommendations: RecommendationSettings,
    pub analysis: ExtractorSettings,
    pub jobs: JobsSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let media_path = file
            .media_path
            .map(PathBuf::from)
            .or_else(|| cli.media_path.clone())
            .unwrap_or_else(|| db_dir.clone());
        let graph_path = file
            .graph_path
            .map(PathBuf::from)
            .or_else(|| cli.graph_path.clone());
        let rng_seed = file.rng_seed.or(cli.rng_seed);

        let defaults = RecommendationSettings::default();
        let rec_file = file.recommendations.unwrap_or_default();
        let recommendations = RecommendationSettings {
            default_limit: rec_file.default_limit.unwrap_or(defaults.default_limit),
            max_limit: rec_file.max_limit.unwrap_or(defaults.max_limit),
            top_affinities: rec_file.top_affinities.unwrap_or(defaults.top_affinities),
            diversity_factor: rec_file
                .diversity_factor
                .unwrap_or(defaults.diversity_factor),
        };
        if recommendations.default_limit > recommendations.max_limit {
            bail!(
                "recommendations.default_limit ({}) exceeds max_limit ({})",
                recommendations.default_limit,
                recommendations.max_limit
            );
        }
        if !(0.0..=1.0).contains(&recommendations.diversity_factor) {
            bail!(
                "recommendations.diversity_factor must be within [0, 1], got {}",
                recommendations.diversity_factor
            );
        }

        let extractor_defaults = ExtractorSettings::default();
        let analysis_file = file.analysis.unwrap_or_default();
        let analysis = ExtractorSettings {
            max_dimension: analysis_file
                .max_dimension
                .unwrap_or(extractor_defaults.max_dimension),
            palette_size: analysis_file
                .palette_size
                .unwrap_or(extractor_defaults.palette_size),
            sharpness_normalizer: analysis_file
                .sharpness_normalizer
                .unwrap_or(extractor_defaults.sharpness_normalizer),
        };
        if analysis.max_dimension == 0 || analysis.palette_size == 0 {
            bail!("analysis.max_dimension and analysis.palette_size must be positive");
        }

        let job_defaults = JobsSettings::default();
        let jobs_file = file.jobs.unwrap_or_default();
        let jobs = JobsSettings {
            classification_batch_size: jobs_file
                .classification_batch_size
                .unwrap_or(job_defaults.classification_batch_size),
            decay_factor: jobs_file.decay_factor.unwrap_or(job_defaults.decay_factor),
        };
        if !(0.0..=1.0).contains(&jobs.decay_factor) {
            bail!("jobs.decay_factor must be within [0, 1], got {}", jobs.decay_factor);
        }

        Ok(Self {
            db_dir,
            media_path,
            graph_path,
            rng_seed,
            recommendations,
            analysis,
            jobs,
        })
    }

    pub fn catalog_db_path(&self) -> PathBuf {
        self.db_dir.join("catalog.db")
    }

    pub fn user_db_path(&self) -> PathBuf {
        self.db_dir.join("user.db")
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            top_affinities: self.recommendations.top_affinities,
            max_recommendations: self.recommendations.max_limit,
            extractor: self.analysis,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationSettings {
    pub default_limit: usize,
    pub max_limit: usize,
    pub top_affinities: usize,
    pub diversity_factor: f64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            top_affinities: 10,
            diversity_factor: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobsSettings {
    pub classification_batch_size: usize,
    pub decay_factor: f64,
}

impl Default for JobsSettings {
    fn default() -> Self {
        Self {
            classification_batch_size: 64,
            decay_factor: 0.95,
        }
    }
}
