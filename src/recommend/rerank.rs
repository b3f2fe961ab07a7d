use super::models::{RecommendationCandidate, UserProfile};
use std::collections::{HashMap, HashSet};

pub const QUALITY_WEIGHT: f64 = 0.2;
pub const SEED_ARTIST_BONUS: f64 = 0.3;
pub const SEED_GENRE_BONUS: f64 = 0.2;

/// Keeps the most relevant copy of each artwork, in order of first appearance.
fn dedupe(candidates: Vec<RecommendationCandidate>) -> Vec<RecommendationCandidate> {
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<RecommendationCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match position.get(&candidate.artwork.id) {
            Some(&index) => {
                if candidate.relevance > unique[index].relevance {
                    unique[index] = candidate;
                }
            }
            None => {
                position.insert(candidate.artwork.id.clone(), unique.len());
                unique.push(candidate);
            }
        }
    }
    unique
}

pub fn final_score(candidate: &RecommendationCandidate, profile: &UserProfile) -> f64 {
    let mut score = candidate.relevance * candidate.strategy.weight()
        + candidate.artwork.quality_score * QUALITY_WEIGHT;
    if profile.seed_has_artist(&candidate.artwork.artist_key) {
        score += SEED_ARTIST_BONUS;
    }
    if profile.seed_has_genre(candidate.artwork.genre.as_deref()) {
        score += SEED_GENRE_BONUS;
    }
    score
}

/// Scores and orders candidates. With a positive `diversity_factor`, one
/// greedy pass discounts artworks whose artist or genre already appeared
/// higher up, then the list is re-sorted on the discounted score.
///
/// Both sorts are stable, so equal scores keep their incoming order.
pub fn rerank(
    candidates: Vec<RecommendationCandidate>,
    profile: &UserProfile,
    diversity_factor: f64,
) -> Vec<RecommendationCandidate> {
    let mut ranked = dedupe(candidates);
    for candidate in ranked.iter_mut() {
        candidate.final_score = final_score(candidate, profile);
        candidate.diversity_score = candidate.final_score;
    }
    ranked.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));

    let diversity_factor = diversity_factor.clamp(0.0, 1.0);
    if diversity_factor <= 0.0 {
        return ranked;
    }

    let mut seen_artists: HashSet<String> = HashSet::new();
    let mut seen_genres: HashSet<String> = HashSet::new();
    for candidate in ranked.iter_mut() {
        let artwork = &candidate.artwork;
        if !seen_artists.insert(artwork.artist_key.clone()) {
            candidate.diversity_score *= 1.0 - diversity_factor;
        }
        if let Some(genre) = &artwork.genre {
            if !seen_genres.insert(genre.clone()) {
                candidate.diversity_score *= 1.0 - diversity_factor * 0.5;
            }
        }
    }
    ranked.sort_by(|a, b| b.diversity_score.total_cmp(&a.diversity_score));
    ranked
}
