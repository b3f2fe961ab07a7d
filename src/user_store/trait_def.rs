use super::models::{
    AffinityDimension, AffinityUpdate, Endorsement, InteractionEvent, SharedAffinities, User,
    UserAffinity,
};
use anyhow::Result;

pub trait UserStore: Send + Sync {
    /// Creates a user and returns its id. Fails if the handle is taken.
    fn create_user(&self, user_handle: &str, personality_type: Option<&str>) -> Result<usize>;

    /// Returns Ok(None) if the user does not exist.
    fn get_user(&self, user_id: usize) -> Result<Option<User>>;

    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>>;

    /// Returns Ok(false) if the user does not exist.
    fn set_user_personality_type(&self, user_id: usize, personality_type: &str) -> Result<bool>;
}

pub trait InteractionStore: Send + Sync {
    /// Appends the event and applies every affinity update in one transaction.
    /// Returns the id assigned to the event.
    fn record_interaction(&self, event: &InteractionEvent, updates: &[AffinityUpdate])
        -> Result<usize>;

    /// Most recent first.
    fn get_user_interactions(&self, user_id: usize, limit: usize) -> Result<Vec<InteractionEvent>>;

    /// Artworks the user has a `view` event for.
    fn get_viewed_artwork_ids(&self, user_id: usize) -> Result<Vec<String>>;

    /// Artworks the user has any event for.
    fn get_interacted_artwork_ids(&self, user_id: usize) -> Result<Vec<String>>;

    /// Distinct likes and saves by any of the given users.
    fn get_endorsements(&self, user_ids: &[usize]) -> Result<Vec<Endorsement>>;
}

pub trait AffinityStore: Send + Sync {
    /// Adds each update onto its `(user, dimension, value)` row, creating the
    /// row when missing. All updates land atomically or not at all.
    fn apply_affinity_updates(&self, user_id: usize, updates: &[AffinityUpdate]) -> Result<()>;

    /// Highest scores first, ties by value.
    fn get_top_affinities(
        &self,
        user_id: usize,
        dimension: AffinityDimension,
        k: usize,
    ) -> Result<Vec<UserAffinity>>;

    fn get_affinity(
        &self,
        user_id: usize,
        dimension: AffinityDimension,
        value: &str,
    ) -> Result<Option<UserAffinity>>;

    /// Other users sharing at least `min_shared` values of `dimension` with
    /// `user_id`, with the co-rated scores.
    fn find_users_sharing_affinities(
        &self,
        user_id: usize,
        dimension: AffinityDimension,
        min_shared: usize,
    ) -> Result<Vec<SharedAffinities>>;

    /// Multiplies every affinity score by `factor`. Returns the rows touched.
    fn decay_affinities(&self, factor: f64) -> Result<usize>;
}

/// Combined trait for user, interaction and affinity storage
pub trait FullUserStore: UserStore + InteractionStore + AffinityStore {}

impl<T: UserStore + InteractionStore + AffinityStore> FullUserStore for T {}
