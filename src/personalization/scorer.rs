//! Turns one user action into an affinity delta.

use crate::user_store::ActionType;

pub fn base_score(action: ActionType) -> f64 {
    match action {
        ActionType::View => 1.0,
        ActionType::Like => 3.0,
        ActionType::Save => 5.0,
        ActionType::Share => 4.0,
        ActionType::Purchase => 10.0,
    }
}

/// Only the highest tier crossed applies.
pub fn dwell_bonus(dwell_secs: f64) -> f64 {
    if dwell_secs > 180.0 {
        3.0
    } else if dwell_secs > 60.0 {
        2.0
    } else if dwell_secs > 30.0 {
        1.0
    } else {
        0.0
    }
}

/// Base score plus dwell bonus plus `rating - 3`. Unbounded above; a low
/// rating can push the result below zero. Ratings are validated by callers.
pub fn interaction_score(action: ActionType, dwell_secs: Option<f64>, rating: Option<u8>) -> f64 {
    let mut score = base_score(action);
    if let Some(dwell) = dwell_secs {
        score += dwell_bonus(dwell);
    }
    if let Some(rating) = rating {
        score += rating as f64 - 3.0;
    }
    score
}
