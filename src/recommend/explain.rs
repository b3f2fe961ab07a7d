use super::models::{RecommendationCandidate, Strategy, UserProfile};

/// One-line reason shown next to a recommendation.
pub fn explain(candidate: &RecommendationCandidate, profile: &UserProfile) -> String {
    let artwork = &candidate.artwork;
    let mut reason = match candidate.strategy {
        Strategy::ArtistBased => format!("Because you enjoy works by {}", artwork.artist),
        Strategy::GenreBased => match &artwork.genre {
            Some(genre) => format!("Matches your interest in {}", genre),
            None => "Matches genres you like".to_string(),
        },
        Strategy::Collaborative => "Liked by collectors with similar taste".to_string(),
        Strategy::Exploratory => match (&artwork.period, &artwork.style) {
            (Some(period), _) => format!("Something new for you from the {} period", period),
            (None, Some(style)) => format!("Something new for you in {} style", style),
            (None, None) => "Something new for you to explore".to_string(),
        },
    };

    let seed_match = profile.seed_has_artist(&artwork.artist_key)
        || profile.seed_has_genre(artwork.genre.as_deref());
    if seed_match {
        match &profile.personality_type {
            Some(code) => reason.push_str(&format!(", and it suits your {} profile", code)),
            None => reason.push_str(", and it suits your profile"),
        }
    }
    reason
}
