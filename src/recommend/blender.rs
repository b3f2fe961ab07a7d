use super::models::{RecommendationCandidate, Strategy, UserProfile};
use super::quotas::StrategyQuotas;
use super::strategies;
use crate::catalog::CatalogStore;
use crate::preference_graph::PreferenceGraph;
use crate::user_store::FullUserStore;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Inputs for one blend.
#[derive(Debug, Clone)]
pub struct BlendRequest {
    pub profile: UserProfile,
    pub limit: usize,
    /// Artwork ids no strategy may return.
    pub excluded: Vec<String>,
    /// Drives every random tiebreak of this request.
    pub seed: u64,
}

/// Runs the four retrieval strategies and merges their output into at most
/// `limit` candidates, handing unused quota to exploratory.
pub struct Blender {
    catalog: Arc<dyn CatalogStore>,
    users: Arc<dyn FullUserStore>,
    graph: Arc<PreferenceGraph>,
}

impl Blender {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        users: Arc<dyn FullUserStore>,
        graph: Arc<PreferenceGraph>,
    ) -> Self {
        Self {
            catalog,
            users,
            graph,
        }
    }

    pub async fn blend(&self, request: BlendRequest) -> Result<Vec<RecommendationCandidate>> {
        let quotas = StrategyQuotas::for_limit(request.limit);
        let mut rng = StdRng::seed_from_u64(request.seed);
        let genre_seed: u64 = rng.random();
        let explore_seed: u64 = rng.random();
        let limit = request.limit;
        let profile = Arc::new(request.profile);
        let excluded = Arc::new(request.excluded);

        let artist_task = {
            let catalog = Arc::clone(&self.catalog);
            let graph = Arc::clone(&self.graph);
            let profile = Arc::clone(&profile);
            let excluded = Arc::clone(&excluded);
            tokio::task::spawn_blocking(move || {
                strategies::artist_based(
                    catalog.as_ref(),
                    &graph,
                    &profile,
                    &excluded,
                    quotas.artist_based,
                )
            })
        };
        let genre_task = {
            let catalog = Arc::clone(&self.catalog);
            let profile = Arc::clone(&profile);
            let excluded = Arc::clone(&excluded);
            tokio::task::spawn_blocking(move || {
                let mut rng = StdRng::seed_from_u64(genre_seed);
                strategies::genre_based(
                    catalog.as_ref(),
                    &profile,
                    &excluded,
                    quotas.genre_based,
                    &mut rng,
                )
            })
        };
        let collaborative_task = {
            let catalog = Arc::clone(&self.catalog);
            let users = Arc::clone(&self.users);
            let profile = Arc::clone(&profile);
            let excluded = Arc::clone(&excluded);
            tokio::task::spawn_blocking(move || {
                strategies::collaborative(
                    catalog.as_ref(),
                    users.as_ref(),
                    &profile,
                    &excluded,
                    quotas.collaborative,
                )
            })
        };
        // Exploratory asks for the whole limit; it is cut down below once the
        // other strategies' yield is known.
        let exploratory_task = {
            let catalog = Arc::clone(&self.catalog);
            let users = Arc::clone(&self.users);
            let profile = Arc::clone(&profile);
            let excluded = Arc::clone(&excluded);
            tokio::task::spawn_blocking(move || {
                let mut rng = StdRng::seed_from_u64(explore_seed);
                strategies::exploratory(
                    catalog.as_ref(),
                    users.as_ref(),
                    &profile,
                    &excluded,
                    limit,
                    &mut rng,
                )
            })
        };

        let (artist, genre, collaborative, exploratory) = tokio::try_join!(
            artist_task,
            genre_task,
            collaborative_task,
            exploratory_task
        )?;
        let (artist, genre, collaborative, exploratory) =
            (artist?, genre?, collaborative?, exploratory?);

        let mut blended = Vec::with_capacity(limit);
        blended.extend(artist);
        blended.extend(genre);
        blended.extend(collaborative);

        let taken: HashSet<String> = blended.iter().map(|c| c.artwork.id.clone()).collect();
        let remaining = limit.saturating_sub(taken.len());
        let exploratory: Vec<_> = exploratory
            .into_iter()
            .filter(|c| !taken.contains(&c.artwork.id))
            .take(remaining)
            .collect();

        debug!(
            "blend for user {}: quotas {:?}, {} exploratory fill",
            profile.user_id,
            quotas,
            exploratory.len()
        );
        blended.extend(exploratory);
        Ok(blended)
    }
}

/// Number of candidates each strategy contributed.
pub fn strategy_counts(candidates: &[RecommendationCandidate]) -> [(Strategy, usize); 4] {
    Strategy::ALL.map(|strategy| {
        let count = candidates.iter().filter(|c| c.strategy == strategy).count();
        (strategy, count)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Artwork, SqliteCatalogStore};
    use crate::user_store::{AffinityDimension, AffinityStore, AffinityUpdate, SqliteUserStore, UserStore};
    use tempfile::TempDir;

    fn blender(dir: &TempDir) -> (Blender, Arc<SqliteCatalogStore>, Arc<SqliteUserStore>) {
        let catalog = Arc::new(SqliteCatalogStore::new(dir.path().join("catalog.db")).unwrap());
        let users = Arc::new(SqliteUserStore::new(dir.path().join("user.db")).unwrap());
        let blender = Blender::new(
            catalog.clone(),
            users.clone(),
            Arc::new(PreferenceGraph::curated()),
        );
        (blender, catalog, users)
    }

    #[tokio::test]
    async fn unused_quota_flows_to_exploratory() {
        let dir = TempDir::new().unwrap();
        let (blender, catalog, users) = blender(&dir);
        let user = users.create_user("fresh", None).unwrap();
        for i in 0..30 {
            catalog
                .insert_artwork(
                    &Artwork::new(format!("art-{:02}", i), "Untitled", format!("Artist {}", i))
                        .with_period(format!("period-{}", i % 5))
                        .with_quality(0.85),
                )
                .unwrap();
        }

        let request = BlendRequest {
            profile: UserProfile {
                user_id: user,
                ..Default::default()
            },
            limit: 10,
            excluded: vec![],
            seed: 11,
        };
        let result = blender.blend(request).await.unwrap();
        assert_eq!(result.len(), 10);
        assert!(result.iter().all(|c| c.strategy == Strategy::Exploratory));
    }

    #[tokio::test]
    async fn strategies_share_the_limit() {
        let dir = TempDir::new().unwrap();
        let (blender, catalog, users) = blender(&dir);
        let user = users.create_user("fan", None).unwrap();
        users
            .apply_affinity_updates(
                user,
                &[
                    AffinityUpdate::direct(AffinityDimension::Artist, "monet", 5.0),
                    AffinityUpdate::direct(AffinityDimension::Genre, "landscape", 5.0),
                ],
            )
            .unwrap();
        for i in 0..10 {
            catalog
                .insert_artwork(
                    &Artwork::new(format!("monet-{}", i), "Study", "Monet")
                        .with_genre("seascape")
                        .with_quality(0.5),
                )
                .unwrap();
            catalog
                .insert_artwork(
                    &Artwork::new(format!("land-{}", i), "View", "Corot")
                        .with_genre("landscape")
                        .with_quality(0.7),
                )
                .unwrap();
            catalog
                .insert_artwork(
                    &Artwork::new(format!("new-{}", i), "Novel", "Someone")
                        .with_period("renaissance")
                        .with_quality(0.9),
                )
                .unwrap();
        }

        let profile = UserProfile {
            user_id: user,
            top_artists: users.get_top_affinities(user, AffinityDimension::Artist, 10).unwrap(),
            top_genres: users.get_top_affinities(user, AffinityDimension::Genre, 10).unwrap(),
            ..Default::default()
        };
        let request = BlendRequest {
            profile,
            limit: 10,
            excluded: vec![],
            seed: 5,
        };
        let result = blender.blend(request).await.unwrap();
        assert_eq!(result.len(), 10);
        let counts = strategy_counts(&result);
        assert_eq!(counts[0], (Strategy::ArtistBased, 4));
        assert_eq!(counts[1], (Strategy::GenreBased, 3));
        assert_eq!(counts[2], (Strategy::Collaborative, 0));
        assert_eq!(counts[3], (Strategy::Exploratory, 3));

        let ids: HashSet<_> = result.iter().map(|c| c.artwork.id.as_str()).collect();
        assert_eq!(ids.len(), 10);
    }

    #[tokio::test]
    async fn zero_limit_is_empty() {
        let dir = TempDir::new().unwrap();
        let (blender, _, _) = blender(&dir);
        let request = BlendRequest {
            profile: UserProfile::default(),
            limit: 0,
            excluded: vec![],
            seed: 0,
        };
        assert!(blender.blend(request).await.unwrap().is_empty());
    }
}
