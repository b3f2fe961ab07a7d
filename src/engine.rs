//! The engine API: record interactions, serve recommendations, classify
//! artworks and seed new users.

use crate::analysis::{
    ArtworkAnalysis, ExtractorSettings, ImageSource, PersonalityProfile, VisualFeatureExtractor,
};
use crate::catalog::CatalogStore;
use crate::metrics;
use crate::personalization::{cold_start_updates, interaction_score, PreferencePropagator};
use crate::preference_graph::PreferenceGraph;
use crate::recommend::{
    explain, rerank, strategy_counts, BlendRequest, Blender, RecommendationCandidate, UserProfile,
};
use crate::user_store::{
    ActionType, AffinityDimension, AffinityStore, FullUserStore, InteractionEvent, InteractionStore,
    User, UserStore,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Image transport or decoding failed; nothing was classified.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Affinities per dimension fed to the strategies.
    pub top_affinities: usize,
    /// Upper bound on a single request's limit.
    pub max_recommendations: usize,
    pub extractor: ExtractorSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            top_affinities: 10,
            max_recommendations: 100,
            extractor: ExtractorSettings::default(),
        }
    }
}

pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogStore>,
    users: Arc<dyn FullUserStore>,
    graph: Arc<PreferenceGraph>,
    propagator: PreferencePropagator,
    blender: Blender,
    extractor: VisualFeatureExtractor,
    images: Option<Arc<dyn ImageSource>>,
    rng: Mutex<StdRng>,
    settings: EngineSettings,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        users: Arc<dyn FullUserStore>,
        graph: Arc<PreferenceGraph>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            propagator: PreferencePropagator::new(Arc::clone(&graph)),
            blender: Blender::new(Arc::clone(&catalog), Arc::clone(&users), Arc::clone(&graph)),
            extractor: VisualFeatureExtractor::new(settings.extractor),
            catalog,
            users,
            graph,
            images: None,
            rng: Mutex::new(StdRng::from_os_rng()),
            settings,
        }
    }

    /// Makes every random tiebreak reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_image_source(mut self, images: Arc<dyn ImageSource>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogStore> {
        &self.catalog
    }

    pub fn users(&self) -> &Arc<dyn FullUserStore> {
        &self.users
    }

    pub fn graph(&self) -> &PreferenceGraph {
        &self.graph
    }

    fn require_user(&self, user_id: usize) -> EngineResult<User> {
        self.users
            .get_user(user_id)?
            .ok_or_else(|| EngineError::NotFound(format!("user {}", user_id)))
    }

    /// Scores the event, fans it out over the preference graph and stores the
    /// event together with every affinity update. Returns the event id.
    pub fn record_interaction(
        &self,
        user_id: usize,
        artwork_id: &str,
        action: ActionType,
        dwell_secs: Option<f64>,
        rating: Option<u8>,
    ) -> EngineResult<usize> {
        if let Some(rating) = rating {
            if !(1..=5).contains(&rating) {
                return Err(EngineError::InvalidInput(format!(
                    "rating must be between 1 and 5, got {}",
                    rating
                )));
            }
        }
        if let Some(dwell) = dwell_secs {
            if !dwell.is_finite() || dwell < 0.0 {
                return Err(EngineError::InvalidInput(format!(
                    "dwell time must be a non-negative number of seconds, got {}",
                    dwell
                )));
            }
        }

        self.require_user(user_id)?;
        let artwork = self
            .catalog
            .get_artwork(artwork_id)?
            .ok_or_else(|| EngineError::NotFound(format!("artwork {}", artwork_id)))?;

        let score = interaction_score(action, dwell_secs, rating);
        let updates = self.propagator.updates_for(&artwork, score);
        let event = InteractionEvent::new(user_id, artwork_id, action)
            .with_dwell(dwell_secs)
            .with_rating(rating);
        let event_id = self.users.record_interaction(&event, &updates)?;

        let inferred = updates.iter().filter(|u| u.is_inferred).count();
        metrics::record_interaction(action.as_str(), updates.len() - inferred, inferred);
        debug!(
            "Recorded {} by user {} on {} (score {:.2}, {} affinity updates)",
            action,
            user_id,
            artwork_id,
            score,
            updates.len()
        );
        Ok(event_id)
    }

    fn load_profile(&self, user: &User) -> EngineResult<UserProfile> {
        let k = self.settings.top_affinities;
        let seed = user
            .personality_type
            .as_deref()
            .and_then(|code| self.graph.seed(code))
            .cloned();
        Ok(UserProfile {
            user_id: user.id,
            personality_type: user.personality_type.clone(),
            top_artists: self
                .users
                .get_top_affinities(user.id, AffinityDimension::Artist, k)?,
            top_genres: self
                .users
                .get_top_affinities(user.id, AffinityDimension::Genre, k)?,
            seed,
        })
    }

    /// Blends the four strategies and re-ranks the result. Returns at most
    /// `limit` candidates, best first.
    pub async fn get_recommendations(
        &self,
        user_id: usize,
        limit: usize,
        diversity_factor: f64,
        exclude_viewed: bool,
    ) -> EngineResult<Vec<RecommendationCandidate>> {
        if diversity_factor.is_nan() {
            return Err(EngineError::InvalidInput(
                "diversity factor must be a number".to_string(),
            ));
        }
        let diversity_factor = diversity_factor.clamp(0.0, 1.0);
        let limit = limit.min(self.settings.max_recommendations);

        let user = self.require_user(user_id)?;
        if limit == 0 {
            return Ok(Vec::new());
        }
        let start = Instant::now();
        let profile = self.load_profile(&user)?;
        let excluded = if exclude_viewed {
            self.users.get_viewed_artwork_ids(user_id)?
        } else {
            Vec::new()
        };
        let seed = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| anyhow::anyhow!("recommendation rng poisoned"))?;
            rng.random::<u64>()
        };

        let candidates = self
            .blender
            .blend(BlendRequest {
                profile: profile.clone(),
                limit,
                excluded,
                seed,
            })
            .await?;
        let mut ranked = rerank(candidates, &profile, diversity_factor);
        ranked.truncate(limit);

        let counts = strategy_counts(&ranked);
        let per_strategy: Vec<(&str, usize)> =
            counts.iter().map(|(s, n)| (s.as_str(), *n)).collect();
        metrics::record_recommendations(&per_strategy, start.elapsed());
        info!(
            "Served {} recommendations to user {} in {:?} ({:?})",
            ranked.len(),
            user_id,
            start.elapsed(),
            per_strategy
        );
        Ok(ranked)
    }

    /// Loads and analyzes one image. Fails closed: any image problem is an
    /// `UpstreamUnavailable` and no analysis is returned.
    pub fn classify_image(&self, image_ref: &str) -> EngineResult<ArtworkAnalysis> {
        let start = Instant::now();
        let images = self.images.as_ref().ok_or_else(|| {
            EngineError::UpstreamUnavailable("no image source configured".to_string())
        })?;
        let analysis = images
            .load(image_ref)
            .and_then(|image| self.extractor.analyze(&image));
        match analysis {
            Ok(analysis) => {
                metrics::record_classification("engine", "success", start.elapsed());
                Ok(analysis)
            }
            Err(e) => {
                metrics::record_classification("engine", "image_error", start.elapsed());
                warn!("Could not classify image {}: {:#}", image_ref, e);
                Err(EngineError::UpstreamUnavailable(format!("{}: {:#}", image_ref, e)))
            }
        }
    }

    /// Classifies an artwork's image and writes tags, palette and quality
    /// back to the catalog.
    pub fn classify_artwork(&self, artwork_id: &str) -> EngineResult<PersonalityProfile> {
        let artwork = self
            .catalog
            .get_artwork(artwork_id)?
            .ok_or_else(|| EngineError::NotFound(format!("artwork {}", artwork_id)))?;
        let image_ref = artwork.image_ref.as_deref().ok_or_else(|| {
            EngineError::InvalidInput(format!("artwork {} has no image", artwork_id))
        })?;

        let analysis = self.classify_image(image_ref)?;
        if !self
            .catalog
            .update_artwork_analysis(artwork_id, &analysis.to_update())?
        {
            return Err(EngineError::NotFound(format!("artwork {}", artwork_id)));
        }
        info!(
            "Classified artwork {} as {} (confidence {:.2})",
            artwork_id, analysis.profile.type_code, analysis.profile.confidence
        );
        Ok(analysis.profile)
    }

    /// Seeds a new user's artist and genre affinities from the cold-start
    /// table and stores the resolved seed type on the user.
    pub fn initialize_cold_start(&self, user_id: usize, seed_type: &str) -> EngineResult<()> {
        let code = self
            .graph
            .canonical_seed_type(seed_type)
            .ok_or_else(|| EngineError::InvalidInput(format!("unknown seed type {}", seed_type)))?;
        let seed = self
            .graph
            .seed(&code)
            .ok_or_else(|| EngineError::InvalidInput(format!("unknown seed type {}", seed_type)))?;
        self.require_user(user_id)?;

        let updates = cold_start_updates(seed);
        self.users.apply_affinity_updates(user_id, &updates)?;
        self.users.set_user_personality_type(user_id, &code)?;
        info!(
            "Cold start for user {} with seed {} ({} affinities)",
            user_id,
            code,
            updates.len()
        );
        Ok(())
    }

    pub fn explain(&self, candidate: &RecommendationCandidate, user_id: usize) -> EngineResult<String> {
        let user = self.require_user(user_id)?;
        let profile = self.load_profile(&user)?;
        Ok(explain(candidate, &profile))
    }
}
