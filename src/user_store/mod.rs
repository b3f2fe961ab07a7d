//! Users, the append-only interaction log and per-user affinity scores.

mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{
    ActionType, AffinityDimension, AffinityUpdate, Endorsement, InteractionEvent,
    SharedAffinities, User, UserAffinity,
};
pub use store::SqliteUserStore;
pub use trait_def::{AffinityStore, FullUserStore, InteractionStore, UserStore};
