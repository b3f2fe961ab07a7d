//! Fans an interaction's score out across the preference graph.

use crate::catalog::Artwork;
use crate::preference_graph::{PreferenceGraph, SeedPreferences};
use crate::user_store::{AffinityDimension, AffinityUpdate};
use std::sync::Arc;
use tracing::debug;

pub const RELATED_ARTIST_WEIGHT: f64 = 0.5;
pub const INFLUENCED_BY_WEIGHT: f64 = 0.3;
pub const PARENT_GENRE_WEIGHT: f64 = 0.4;
pub const RELATED_GENRE_WEIGHT: f64 = 0.3;
pub const COLD_START_SCORE: f64 = 5.0;

#[derive(Clone)]
pub struct PreferencePropagator {
    graph: Arc<PreferenceGraph>,
}

impl PreferencePropagator {
    pub fn new(graph: Arc<PreferenceGraph>) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &PreferenceGraph {
        &self.graph
    }

    /// Direct updates for the artwork's own artist, genre and period come
    /// first, followed by one level of inferred updates. Nothing recurses
    /// past the immediate neighbours.
    pub fn updates_for(&self, artwork: &Artwork, score: f64) -> Vec<AffinityUpdate> {
        let mut updates = vec![AffinityUpdate::direct(
            AffinityDimension::Artist,
            artwork.artist_key.clone(),
            score,
        )];
        if let Some(genre) = &artwork.genre {
            updates.push(AffinityUpdate::direct(
                AffinityDimension::Genre,
                genre.clone(),
                score,
            ));
        }
        if let Some(period) = &artwork.period {
            updates.push(AffinityUpdate::direct(
                AffinityDimension::Period,
                period.clone(),
                score,
            ));
        }

        match self.graph.artist(&artwork.artist_key) {
            Some(node) => {
                updates.extend(node.related.iter().map(|related| {
                    AffinityUpdate::inferred(
                        AffinityDimension::Artist,
                        related.clone(),
                        score * RELATED_ARTIST_WEIGHT,
                    )
                }));
                updates.extend(node.influenced_by.iter().map(|influence| {
                    AffinityUpdate::inferred(
                        AffinityDimension::Artist,
                        influence.clone(),
                        score * INFLUENCED_BY_WEIGHT,
                    )
                }));
            }
            None => debug!("Artist '{}' not in preference graph", artwork.artist_key),
        }

        if let Some(genre) = &artwork.genre {
            match self.graph.locate_genre(genre) {
                Some(location) => {
                    if let Some(parent) = location.parent {
                        updates.push(AffinityUpdate::inferred(
                            AffinityDimension::Genre,
                            parent,
                            score * PARENT_GENRE_WEIGHT,
                        ));
                    }
                    updates.extend(location.related.iter().map(|related| {
                        AffinityUpdate::inferred(
                            AffinityDimension::Genre,
                            related.clone(),
                            score * RELATED_GENRE_WEIGHT,
                        )
                    }));
                }
                None => debug!("Genre '{}' not in preference graph", genre),
            }
        }

        updates
    }
}

/// Initial affinities for a user who picked a seed type.
pub fn cold_start_updates(seed: &SeedPreferences) -> Vec<AffinityUpdate> {
    let artists = seed.artists.iter().map(|artist| {
        AffinityUpdate::initial(AffinityDimension::Artist, artist.clone(), COLD_START_SCORE)
    });
    let genres = seed.genres.iter().map(|genre| {
        AffinityUpdate::initial(AffinityDimension::Genre, genre.clone(), COLD_START_SCORE)
    });
    artists.chain(genres).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn propagator() -> PreferencePropagator {
        PreferencePropagator::new(Arc::new(PreferenceGraph::curated()))
    }

    fn total(updates: &[AffinityUpdate]) -> HashMap<(AffinityDimension, String), f64> {
        let mut acc = HashMap::new();
        for u in updates {
            *acc.entry((u.dimension, u.value.clone())).or_insert(0.0) += u.score;
        }
        acc
    }

    #[test]
    fn van_gogh_portrait_fans_out() {
        let artwork = Artwork::new("1", "Self Portrait", "Van Gogh")
            .with_genre("portrait")
            .with_period("19th-century");
        let updates = propagator().updates_for(&artwork, 10.0);

        assert_eq!(updates[0], AffinityUpdate::direct(AffinityDimension::Artist, "van-gogh", 10.0));
        assert_eq!(updates[1], AffinityUpdate::direct(AffinityDimension::Genre, "portrait", 10.0));
        assert_eq!(
            updates[2],
            AffinityUpdate::direct(AffinityDimension::Period, "19th-century", 10.0)
        );
        assert!(updates[3..].iter().all(|u| u.is_inferred));

        let totals = total(&updates);
        assert_eq!(totals[&(AffinityDimension::Artist, "gauguin".to_string())], 5.0);
        assert_eq!(totals[&(AffinityDimension::Artist, "millet".to_string())], 3.0);
        assert_eq!(totals[&(AffinityDimension::Genre, "figurative".to_string())], 4.0);
        assert_eq!(totals[&(AffinityDimension::Genre, "genre-painting".to_string())], 3.0);
        // 3 direct + 3 related + 3 influenced_by + parent + 2 related genres
        assert_eq!(updates.len(), 12);
    }

    #[test]
    fn picasso_shared_neighbour_accumulates() {
        // cezanne is not in picasso's related set but is in influenced_by
        let artwork = Artwork::new("2", "Guitar", "picasso");
        let updates = propagator().updates_for(&artwork, 10.0);
        let totals = total(&updates);
        assert_eq!(totals[&(AffinityDimension::Artist, "cezanne".to_string())], 3.0);
        assert_eq!(totals[&(AffinityDimension::Artist, "braque".to_string())], 5.0);
    }

    #[test]
    fn top_level_genre_has_no_parent_update() {
        let artwork = Artwork::new("3", "Haystacks", "nobody").with_genre("landscape");
        let updates = propagator().updates_for(&artwork, 2.0);
        let genres: Vec<_> = updates
            .iter()
            .filter(|u| u.dimension == AffinityDimension::Genre && u.is_inferred)
            .map(|u| (u.value.as_str(), u.score))
            .collect();
        assert_eq!(
            genres,
            vec![("marine", 0.6), ("veduta", 0.6), ("topographical", 0.6)]
        );
    }

    #[test]
    fn unknown_artist_and_genre_emit_only_direct_updates() {
        let artwork = Artwork::new("4", "Untitled", "Anonymous").with_genre("ukiyo-e");
        let updates = propagator().updates_for(&artwork, 3.0);
        assert_eq!(updates.len(), 2);
        assert!(updates.iter().all(|u| !u.is_inferred));
    }

    #[test]
    fn propagation_order_does_not_change_totals() {
        let artwork = Artwork::new("5", "Night Watch", "rembrandt").with_genre("group-portrait");
        let updates = propagator().updates_for(&artwork, 7.0);
        let forward = total(&updates);
        let mut reversed = updates.clone();
        reversed.reverse();
        assert_eq!(forward, total(&reversed));
    }

    #[test]
    fn cold_start_seeds_artists_and_genres() {
        let graph = PreferenceGraph::curated();
        let updates = cold_start_updates(graph.seed("LAMC").unwrap());
        assert_eq!(updates.len(), 9);
        assert!(updates.iter().all(|u| u.is_initial && !u.is_inferred));
        assert!(updates.iter().all(|u| u.score == COLD_START_SCORE));
        assert_eq!(updates[0].value, "chardin");
        assert_eq!(updates[5].dimension, AffinityDimension::Genre);
    }
}
