mod propagator;
mod scorer;

pub use propagator::{
    cold_start_updates, PreferencePropagator, COLD_START_SCORE, INFLUENCED_BY_WEIGHT,
    PARENT_GENRE_WEIGHT, RELATED_ARTIST_WEIGHT, RELATED_GENRE_WEIGHT,
};
pub use scorer::{base_score, dwell_bonus, interaction_score};
