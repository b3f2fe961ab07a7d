//! Job implementations.

mod affinity_decay;
mod artwork_classification;

pub use affinity_decay::AffinityDecayJob;
pub use artwork_classification::{
    ArtworkClassificationJob, ClassificationReport, DEFAULT_BATCH_SIZE,
};
