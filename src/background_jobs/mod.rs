//! Catalog and affinity maintenance jobs, run on demand.

mod context;
mod job;
pub mod jobs;

pub use context::JobContext;
pub use job::{BackgroundJob, JobError};

use crate::metrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Runs one job on the blocking pool, logging and counting the outcome.
pub async fn run_job(job: Arc<dyn BackgroundJob>, ctx: JobContext) -> Result<(), JobError> {
    let job_id = job.id();
    let start_time = Instant::now();
    let worker = Arc::clone(&job);
    let result = tokio::task::spawn_blocking(move || worker.execute(&ctx)).await;
    let elapsed = start_time.elapsed();

    match result {
        Ok(Ok(())) => {
            info!("Job {} completed successfully in {:?}", job_id, elapsed);
            metrics::record_job_execution(job_id, "success");
            Ok(())
        }
        Ok(Err(JobError::Cancelled)) => {
            info!("Job {} was cancelled after {:?}", job_id, elapsed);
            metrics::record_job_execution(job_id, "cancelled");
            Err(JobError::Cancelled)
        }
        Ok(Err(e)) => {
            error!("Job {} failed after {:?}: {}", job_id, elapsed, e);
            metrics::record_job_execution(job_id, "failed");
            Err(e)
        }
        Err(e) => {
            error!("Job {} panicked after {:?}: {}", job_id, elapsed, e);
            metrics::record_job_execution(job_id, "panic");
            Err(JobError::ExecutionFailed(format!("Task panic: {}", e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SqliteCatalogStore;
    use crate::user_store::SqliteUserStore;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    struct FailingJob;

    impl BackgroundJob for FailingJob {
        fn id(&self) -> &'static str {
            "failing"
        }
        fn name(&self) -> &'static str {
            "Failing"
        }
        fn description(&self) -> &'static str {
            "Always fails"
        }
        fn execute(&self, _ctx: &JobContext) -> Result<(), JobError> {
            Err(JobError::ExecutionFailed("boom".to_string()))
        }
    }

    #[tokio::test]
    async fn failures_are_returned() {
        let dir = TempDir::new().unwrap();
        let ctx = JobContext::new(
            CancellationToken::new(),
            Arc::new(SqliteCatalogStore::new(dir.path().join("catalog.db")).unwrap()),
            Arc::new(SqliteUserStore::new(dir.path().join("user.db")).unwrap()),
        );
        let result = run_job(Arc::new(FailingJob), ctx).await;
        assert!(matches!(result, Err(JobError::ExecutionFailed(msg)) if msg == "boom"));
    }
}
