use crate::catalog::CatalogStore;
use crate::user_store::FullUserStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Context provided to jobs during execution.
#[derive(Clone)]
pub struct JobContext {
    /// Token to check for cancellation/shutdown requests.
    pub cancellation_token: CancellationToken,

    /// Access to the artwork catalog database.
    pub catalog_store: Arc<dyn CatalogStore>,

    /// Access to users, interactions and affinities.
    pub user_store: Arc<dyn FullUserStore>,
}

impl JobContext {
    pub fn new(
        cancellation_token: CancellationToken,
        catalog_store: Arc<dyn CatalogStore>,
        user_store: Arc<dyn FullUserStore>,
    ) -> Self {
        Self {
            cancellation_token,
            catalog_store,
            user_store,
        }
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
