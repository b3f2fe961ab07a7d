use super::context::JobContext;

/// Errors that can occur during job execution.
#[derive(Debug)]
pub enum JobError {
    ExecutionFailed(String),
    Cancelled,
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobError::ExecutionFailed(msg) => write!(f, "Execution failed: {}", msg),
            JobError::Cancelled => write!(f, "Job was cancelled"),
        }
    }
}

impl std::error::Error for JobError {}

/// Trait for background jobs.
///
/// Jobs are executed synchronously in a blocking context.
/// Long-running work should check for cancellation between batches.
pub trait BackgroundJob: Send + Sync {
    /// Unique identifier for this job.
    fn id(&self) -> &'static str;

    /// Human-readable name for this job.
    fn name(&self) -> &'static str;

    /// Description of what this job does.
    fn description(&self) -> &'static str;

    /// Execute the job.
    ///
    /// Called from a blocking context using `spawn_blocking`. Implementations
    /// should check `ctx.is_cancelled()` between units of work and return
    /// `JobError::Cancelled` when it is set.
    fn execute(&self, ctx: &JobContext) -> Result<(), JobError>;
}
