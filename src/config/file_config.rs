use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_dir: Option<String>,
    pub media_path: Option<String>,
    pub graph_path: Option<String>,
    pub rng_seed: Option<u64>,

    // Feature configs
    pub recommendations: Option<RecommendationsConfig>,
    pub analysis: Option<AnalysisConfig>,
    pub jobs: Option<JobsConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RecommendationsConfig {
    pub default_limit: Option<usize>,
    pub max_limit: Option<usize>,
    pub top_affinities: Option<usize>,
    pub diversity_factor: Option<f64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    pub max_dimension: Option<u32>,
    pub palette_size: Option<usize>,
    pub sharpness_normalizer: Option<f64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct JobsConfig {
    pub classification_batch_size: Option<usize>,
    pub decay_factor: Option<f64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sections() {
        let config: FileConfig = toml::from_str(
            r#"
            db_dir = "/data"

            [recommendations]
            default_limit = 30
            diversity_factor = 0.5

            [analysis]
            palette_size = 8

            [jobs]
            decay_factor = 0.9
            "#,
        )
        .unwrap();
        assert_eq!(config.db_dir.as_deref(), Some("/data"));
        let recommendations = config.recommendations.unwrap();
        assert_eq!(recommendations.default_limit, Some(30));
        assert_eq!(recommendations.max_limit, None);
        assert_eq!(config.analysis.unwrap().palette_size, Some(8));
        assert_eq!(config.jobs.unwrap().decay_factor, Some(0.9));
    }

    #[test]
    fn load_reports_bad_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "db_dir = [").unwrap();
        let err = FileConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
