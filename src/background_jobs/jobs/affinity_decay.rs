//! Fades every affinity so old tastes weigh less than new ones.

use crate::background_jobs::{
    context::JobContext,
    job::{BackgroundJob, JobError},
};
use crate::user_store::AffinityStore;
use tracing::info;

pub struct AffinityDecayJob {
    factor: f64,
}

impl AffinityDecayJob {
    /// `factor` is clamped into [0, 1].
    pub fn new(factor: f64) -> Self {
        Self {
            factor: factor.clamp(0.0, 1.0),
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl BackgroundJob for AffinityDecayJob {
    fn id(&self) -> &'static str {
        "affinity_decay"
    }

    fn name(&self) -> &'static str {
        "Affinity Decay"
    }

    fn description(&self) -> &'static str {
        "Multiply all user affinity scores by the configured decay factor"
    }

    fn execute(&self, ctx: &JobContext) -> Result<(), JobError> {
        if ctx.is_cancelled() {
            return Err(JobError::Cancelled);
        }
        let touched = ctx
            .user_store
            .decay_affinities(self.factor)
            .map_err(|e| JobError::ExecutionFailed(e.to_string()))?;
        info!("Decayed {} affinities by factor {}", touched, self.factor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SqliteCatalogStore;
    use crate::user_store::{
        AffinityDimension, AffinityStore, AffinityUpdate, SqliteUserStore, UserStore,
    };
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn halves_scores() {
        let dir = TempDir::new().unwrap();
        let users = Arc::new(SqliteUserStore::new(dir.path().join("user.db")).unwrap());
        let catalog = Arc::new(SqliteCatalogStore::new(dir.path().join("catalog.db")).unwrap());
        let user = users.create_user("u", None).unwrap();
        users
            .apply_affinity_updates(
                user,
                &[AffinityUpdate::direct(AffinityDimension::Genre, "abstract", 8.0)],
            )
            .unwrap();
        let ctx = JobContext::new(CancellationToken::new(), catalog, users.clone());

        AffinityDecayJob::new(0.5)
            .execute(&ctx)
            .unwrap();
        let affinity = users
            .get_affinity(user, AffinityDimension::Genre, "abstract")
            .unwrap()
            .unwrap();
        assert_eq!(affinity.score, 4.0);
    }

    #[test]
    fn factor_is_clamped() {
        assert_eq!(AffinityDecayJob::new(1.7).factor(), 1.0);
        assert_eq!(AffinityDecayJob::new(-0.2).factor(), 0.0);
    }
}
