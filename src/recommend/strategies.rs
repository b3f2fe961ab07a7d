//! The four retrieval strategies. Each is read-only over the stores and
//! returns an empty list when it has nothing to offer.

use super::models::{RecommendationCandidate, Strategy, UserProfile};
use crate::catalog::{Artwork, ArtworkQuery, CatalogStore, NoveltyFilter};
use crate::preference_graph::PreferenceGraph;
use crate::user_store::{AffinityDimension, AffinityStore, FullUserStore, InteractionStore};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

pub const TOP_AFFINITIES: usize = 10;
pub const EXACT_ARTIST_RELEVANCE: f64 = 1.0;
pub const RELATED_ARTIST_RELEVANCE: f64 = 0.7;
pub const GENRE_MIN_QUALITY: f64 = 0.6;
pub const MIN_SHARED_ARTISTS: usize = 3;
pub const MAX_SIMILAR_USERS: usize = 10;
pub const EXPLORATORY_MIN_QUALITY: f64 = 0.8;
pub const UNSEEN_PERIOD_NOVELTY: f64 = 0.3;
pub const UNSEEN_STYLE_NOVELTY: f64 = 0.2;
pub const UNSEEN_GENRE_NOVELTY: f64 = 0.1;

/// Upper bound on genre and period affinities read to build exposure.
const EXPOSURE_SCAN: usize = 500;

fn by_score_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Artworks by the user's top artists (relevance 1.0) or by artists the graph
/// relates to them (0.7), ordered by relevance, affinity, then quality.
pub fn artist_based(
    catalog: &dyn CatalogStore,
    graph: &PreferenceGraph,
    profile: &UserProfile,
    excluded: &[String],
    quota: usize,
) -> Result<Vec<RecommendationCandidate>> {
    if quota == 0 {
        return Ok(Vec::new());
    }

    // artist key -> (relevance, affinity)
    let mut targets: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    let liked: Vec<_> = profile
        .top_artists
        .iter()
        .filter(|a| a.score > 0.0)
        .take(TOP_AFFINITIES)
        .collect();
    for affinity in &liked {
        targets.insert(affinity.value.clone(), (EXACT_ARTIST_RELEVANCE, affinity.score));
    }
    for affinity in &liked {
        for related in graph.related_artists_of(&affinity.value) {
            let entry = targets
                .entry(related.clone())
                .or_insert((RELATED_ARTIST_RELEVANCE, affinity.score));
            if entry.0 == RELATED_ARTIST_RELEVANCE && entry.1 < affinity.score {
                entry.1 = affinity.score;
            }
        }
    }

    let mut scored: Vec<(Artwork, f64, f64)> = Vec::new();
    for (artist_key, (relevance, affinity)) in &targets {
        let query = ArtworkQuery::active(quota)
            .by_artists(vec![artist_key.clone()])
            .excluding(excluded.to_vec());
        for artwork in catalog.query_artworks(&query)? {
            scored.push((artwork, *relevance, *affinity));
        }
    }

    scored.sort_by(|(a, a_rel, a_aff), (b, b_rel, b_aff)| {
        by_score_desc(*a_rel, *b_rel)
            .then(by_score_desc(*a_aff, *b_aff))
            .then(by_score_desc(a.quality_score, b.quality_score))
            .then(a.id.cmp(&b.id))
    });
    scored.truncate(quota);
    debug!(
        "artist_based: {} candidates from {} artists",
        scored.len(),
        targets.len()
    );
    Ok(scored
        .into_iter()
        .map(|(artwork, relevance, _)| {
            RecommendationCandidate::new(artwork, Strategy::ArtistBased, relevance)
        })
        .collect())
}

/// Artworks of quality >= 0.6 in the user's favourite genres, ordered by
/// genre affinity then quality with a random tiebreak. Relevance is the
/// genre's score relative to the user's best genre.
pub fn genre_based(
    catalog: &dyn CatalogStore,
    profile: &UserProfile,
    excluded: &[String],
    quota: usize,
    rng: &mut StdRng,
) -> Result<Vec<RecommendationCandidate>> {
    if quota == 0 {
        return Ok(Vec::new());
    }
    let genres: Vec<_> = profile
        .top_genres
        .iter()
        .filter(|g| g.score > 0.0)
        .take(TOP_AFFINITIES)
        .collect();
    let best = genres.iter().map(|g| g.score).fold(0.0, f64::max);
    if best <= 0.0 {
        return Ok(Vec::new());
    }

    let mut scored: Vec<(Artwork, f64, u64)> = Vec::new();
    for genre in &genres {
        let query = ArtworkQuery::active(quota)
            .by_genres(vec![genre.value.clone()])
            .min_quality(GENRE_MIN_QUALITY)
            .excluding(excluded.to_vec());
        for artwork in catalog.query_artworks(&query)? {
            scored.push((artwork, genre.score, rng.random()));
        }
    }

    scored.sort_by(|(a, a_aff, a_key), (b, b_aff, b_key)| {
        by_score_desc(*a_aff, *b_aff)
            .then(by_score_desc(a.quality_score, b.quality_score))
            .then(a_key.cmp(b_key))
    });
    scored.truncate(quota);
    Ok(scored
        .into_iter()
        .map(|(artwork, affinity, _)| {
            RecommendationCandidate::new(artwork, Strategy::GenreBased, affinity / best)
        })
        .collect())
}

/// Cosine similarity of two users' scores over their shared dimensions.
/// Zero when either side has no magnitude.
pub fn cosine_similarity(pairs: &[(f64, f64)]) -> f64 {
    let (dot, norm_a, norm_b) = pairs
        .iter()
        .fold((0.0, 0.0, 0.0), |(dot, na, nb), (a, b)| {
            (dot + a * b, na + a * a, nb + b * b)
        });
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Likes and saves of the most similar users, ranked by how many of them
/// endorsed the artwork then by their mean similarity.
pub fn collaborative(
    catalog: &dyn CatalogStore,
    users: &dyn FullUserStore,
    profile: &UserProfile,
    excluded: &[String],
    quota: usize,
) -> Result<Vec<RecommendationCandidate>> {
    if quota == 0 {
        return Ok(Vec::new());
    }
    let shared = users.find_users_sharing_affinities(
        profile.user_id,
        AffinityDimension::Artist,
        MIN_SHARED_ARTISTS,
    )?;
    let mut similar: Vec<(usize, f64)> = shared
        .iter()
        .map(|s| (s.user_id, cosine_similarity(&s.pairs)))
        .filter(|(_, similarity)| *similarity > 0.0)
        .collect();
    similar.sort_by(|a, b| by_score_desc(a.1, b.1).then(a.0.cmp(&b.0)));
    similar.truncate(MAX_SIMILAR_USERS);
    if similar.is_empty() {
        debug!("collaborative: no similar users for {}", profile.user_id);
        return Ok(Vec::new());
    }

    let similarity: HashMap<usize, f64> = similar.iter().copied().collect();
    let user_ids: Vec<usize> = similar.iter().map(|(id, _)| *id).collect();
    let excluded: HashSet<&str> = excluded.iter().map(String::as_str).collect();

    // artwork id -> (endorsing users, similarity sum)
    let mut endorsed: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for endorsement in users.get_endorsements(&user_ids)? {
        if excluded.contains(endorsement.artwork_id.as_str()) {
            continue;
        }
        let entry = endorsed.entry(endorsement.artwork_id).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += similarity.get(&endorsement.user_id).copied().unwrap_or(0.0);
    }

    let ids: Vec<String> = endorsed.keys().cloned().collect();
    let mut scored: Vec<(Artwork, usize, f64)> = catalog
        .get_artworks(&ids)?
        .into_iter()
        .filter(|artwork| artwork.is_active)
        .filter_map(|artwork| {
            let (count, sum) = endorsed.get(&artwork.id).copied()?;
            Some((artwork, count, sum / count as f64))
        })
        .collect();
    scored.sort_by(|(a, a_count, a_sim), (b, b_count, b_sim)| {
        b_count
            .cmp(a_count)
            .then(by_score_desc(*a_sim, *b_sim))
            .then(a.id.cmp(&b.id))
    });
    scored.truncate(quota);
    Ok(scored
        .into_iter()
        .map(|(artwork, _, similarity)| {
            RecommendationCandidate::new(artwork, Strategy::Collaborative, similarity)
        })
        .collect())
}

/// Periods, styles and genres the user has already met, through
/// interactions or accumulated affinities.
#[derive(Debug, Default)]
pub struct Exposure {
    pub periods: HashSet<String>,
    pub styles: HashSet<String>,
    pub genres: HashSet<String>,
}

impl Exposure {
    pub fn load(catalog: &dyn CatalogStore, users: &dyn FullUserStore, user_id: usize) -> Result<Self> {
        let mut exposure = Exposure::default();
        let interacted = users.get_interacted_artwork_ids(user_id)?;
        for artwork in catalog.get_artworks(&interacted)? {
            exposure.periods.extend(artwork.period);
            exposure.styles.extend(artwork.style);
            exposure.genres.extend(artwork.genre);
        }
        for affinity in users.get_top_affinities(user_id, AffinityDimension::Period, EXPOSURE_SCAN)? {
            exposure.periods.insert(affinity.value);
        }
        for affinity in users.get_top_affinities(user_id, AffinityDimension::Genre, EXPOSURE_SCAN)? {
            exposure.genres.insert(affinity.value);
        }
        Ok(exposure)
    }

    /// Catalog-side filter selecting works with at least one unseen attribute.
    pub fn to_filter(&self) -> NoveltyFilter {
        let sorted = |set: &HashSet<String>| {
            let mut values: Vec<String> = set.iter().cloned().collect();
            values.sort();
            values
        };
        NoveltyFilter {
            seen_periods: sorted(&self.periods),
            seen_styles: sorted(&self.styles),
            seen_genres: sorted(&self.genres),
            period_weight: UNSEEN_PERIOD_NOVELTY,
            style_weight: UNSEEN_STYLE_NOVELTY,
            genre_weight: UNSEEN_GENRE_NOVELTY,
        }
    }

    /// Additive novelty of an artwork; zero means nothing new.
    pub fn novelty(&self, artwork: &Artwork) -> f64 {
        let unseen = |value: &Option<String>, seen: &HashSet<String>| {
            value.as_ref().is_some_and(|v| !seen.contains(v))
        };
        let mut novelty = 0.0;
        if unseen(&artwork.period, &self.periods) {
            novelty += UNSEEN_PERIOD_NOVELTY;
        }
        if unseen(&artwork.style, &self.styles) {
            novelty += UNSEEN_STYLE_NOVELTY;
        }
        if unseen(&artwork.genre, &self.genres) {
            novelty += UNSEEN_GENRE_NOVELTY;
        }
        novelty
    }
}

/// High-quality artworks from periods, styles or genres the user has not met,
/// ordered by novelty then quality with a random tiebreak.
pub fn exploratory(
    catalog: &dyn CatalogStore,
    users: &dyn FullUserStore,
    profile: &UserProfile,
    excluded: &[String],
    limit: usize,
    rng: &mut StdRng,
) -> Result<Vec<RecommendationCandidate>> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let exposure = Exposure::load(catalog, users, profile.user_id)?;
    let query = ArtworkQuery::active(limit)
        .min_quality(EXPLORATORY_MIN_QUALITY)
        .excluding(excluded.to_vec())
        .novel(exposure.to_filter());

    let mut scored: Vec<(Artwork, f64, u64)> = catalog
        .query_artworks(&query)?
        .into_iter()
        .filter_map(|artwork| {
            let novelty = exposure.novelty(&artwork);
            (novelty > 0.0).then_some((artwork, novelty))
        })
        .map(|(artwork, novelty)| (artwork, novelty, rng.random()))
        .collect();

    scored.sort_by(|(a, a_novelty, a_key), (b, b_novelty, b_key)| {
        by_score_desc(*a_novelty, *b_novelty)
            .then(by_score_desc(a.quality_score, b.quality_score))
            .then(a_key.cmp(b_key))
    });
    scored.truncate(limit);
    Ok(scored
        .into_iter()
        .map(|(artwork, novelty, _)| {
            RecommendationCandidate::new(artwork, Strategy::Exploratory, novelty)
        })
        .collect())
}
