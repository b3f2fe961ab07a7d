//! Classifies artworks whose images have arrived but were never analyzed.

use crate::analysis::{ArtworkAnalysis, ImageSource, VisualFeatureExtractor};
use crate::background_jobs::{
    context::JobContext,
    job::{BackgroundJob, JobError},
};
use crate::catalog::{Artwork, CatalogStore};
use crate::metrics;
use anyhow::{anyhow, Result};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Outcome of one classification run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClassificationReport {
    pub classified: usize,
    pub failed: usize,
}

pub struct ArtworkClassificationJob {
    images: Arc<dyn ImageSource>,
    extractor: VisualFeatureExtractor,
    batch_size: usize,
}

impl ArtworkClassificationJob {
    pub fn new(
        images: Arc<dyn ImageSource>,
        extractor: VisualFeatureExtractor,
        batch_size: usize,
    ) -> Self {
        Self {
            images,
            extractor,
            batch_size: batch_size.max(1),
        }
    }

    fn analyze(&self, artwork: &Artwork) -> Result<ArtworkAnalysis> {
        let image_ref = artwork
            .image_ref
            .as_deref()
            .ok_or_else(|| anyhow!("artwork {} has no image", artwork.id))?;
        let image = self.images.load(image_ref)?;
        self.extractor.analyze(&image)
    }

    /// Runs one batch and reports how many artworks were written back.
    /// Image failures are counted and skipped; the artwork stays pending.
    pub fn run_batch(&self, ctx: &JobContext) -> Result<ClassificationReport, JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }
        let pending = ctx
            .catalog_store
            .list_artworks_needing_analysis(self.batch_size)
            .map_err(|e| JobError::ExecutionFailed(e.to_string()))?;
        if pending.is_empty() {
            debug!("No artworks waiting for classification");
            return Ok(ClassificationReport::default());
        }

        let start = Instant::now();
        let results: Vec<(String, Result<ArtworkAnalysis>)> = pending
            .par_iter()
            .map(|artwork| (artwork.id.clone(), self.analyze(artwork)))
            .collect();
        let per_item = start.elapsed() / results.len() as u32;

        let mut report = ClassificationReport::default();
        for (artwork_id, result) in results {
            if ctx.is_cancelled() {
                return Err(JobError::Cancelled);
            }
            match result {
                Ok(analysis) => {
                    ctx.catalog_store
                        .update_artwork_analysis(&artwork_id, &analysis.to_update())
                        .map_err(|e| {
                            metrics::record_classification("job", "store_error", per_item);
                            JobError::ExecutionFailed(e.to_string())
                        })?;
                    metrics::record_classification("job", "success", per_item);
                    report.classified += 1;
                }
                Err(e) => {
                    metrics::record_classification("job", "image_error", per_item);
                    warn!("Skipping artwork {}: {:#}", artwork_id, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Classified {} artworks ({} failed) in {:?}",
            report.classified,
            report.failed,
            start.elapsed()
        );
        Ok(report)
    }
}

impl BackgroundJob for ArtworkClassificationJob {
    fn id(&self) -> &'static str {
        "artwork_classification"
    }

    fn name(&self) -> &'static str {
        "Artwork Classification"
    }

    fn description(&self) -> &'static str {
        "Extract visual features and personality tags for newly crawled artworks"
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        self.run_batch(ctx).map(|_| ())
    }
}
