//! Test fixture creation for the catalog, user store and engine

use super::constants::*;
use anyhow::Result;
use art_discovery_engine::analysis::{encode_ppm, PixelBuffer, PpmImageSource};
use art_discovery_engine::user_store::UserStore;
use art_discovery_engine::{
    Artwork, CatalogStore, EngineSettings, PreferenceGraph, RecommendationEngine,
    SqliteCatalogStore, SqliteUserStore,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// An engine over fresh temporary databases and media directory, with the
/// built-in preference graph and a fixed RNG seed.
pub struct TestEngine {
    pub engine: RecommendationEngine,
    pub catalog: Arc<SqliteCatalogStore>,
    pub users: Arc<SqliteUserStore>,
    pub media_path: PathBuf,
    _dir: TempDir,
}

#[allow(dead_code)]
impl TestEngine {
    pub fn new() -> Self {
        Self::with_graph(PreferenceGraph::curated())
    }

    pub fn with_graph(graph: PreferenceGraph) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let media_path = dir.path().join("media");
        fs::create_dir_all(&media_path).expect("Failed to create media dir");

        let catalog = Arc::new(
            SqliteCatalogStore::new(dir.path().join("catalog.db"))
                .expect("Failed to open catalog store"),
        );
        let users = Arc::new(
            SqliteUserStore::new(dir.path().join("user.db")).expect("Failed to open user store"),
        );
        let engine = RecommendationEngine::new(
            catalog.clone(),
            users.clone(),
            Arc::new(graph),
            EngineSettings::default(),
        )
        .with_rng_seed(RNG_SEED)
        .with_image_source(Arc::new(PpmImageSource::new(media_path.clone())));

        Self {
            engine,
            catalog,
            users,
            media_path,
            _dir: dir,
        }
    }

    /// Writes `view` events for every id straight into the user database in
    /// one transaction, for histories too long to record one at a time.
    pub fn bulk_record_views(&self, user_id: usize, artwork_ids: &[String]) {
        let conn = rusqlite::Connection::open(self._dir.path().join("user.db"))
            .expect("Failed to open user db");
        let tx = conn
            .unchecked_transaction()
            .expect("Failed to start transaction");
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO interactions (user_id, artwork_id, action, timestamp)
                     VALUES (?1, ?2, 'view', cast(strftime('%s','now') as int))",
                )
                .expect("Failed to prepare insert");
            for id in artwork_ids {
                stmt.execute(rusqlite::params![user_id, id])
                    .expect("Failed to insert view");
            }
        }
        tx.commit().expect("Failed to commit views");
    }

    pub fn add_user(&self, handle: &str) -> usize {
        self.users
            .create_user(handle, None)
            .expect("Failed to create user")
    }

    pub fn add_artwork(&self, artwork: Artwork) {
        self.catalog
            .insert_artwork(&artwork)
            .expect("Failed to insert artwork");
    }

    pub fn write_image(&self, image_ref: &str, image: &PixelBuffer) {
        write_ppm(&self.media_path.join(image_ref), image).expect("Failed to write image");
    }
}

pub fn write_ppm(path: &Path, image: &PixelBuffer) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, encode_ppm(image))?;
    Ok(())
}

/// Populates a catalog that lets every non-collaborative strategy fill its
/// quota for a user seeded with the collector type:
/// - two works by each seed artist, in genres outside the seed
/// - still-life works by other artists, good enough for genre matching
/// - high-quality renaissance works for exploration
#[allow(dead_code)]
pub fn seed_collector_catalog(catalog: &dyn CatalogStore) -> Result<()> {
    let genres = ["landscape", "abstract"];
    for artist in SEED_ARTISTS {
        for i in 0..WORKS_PER_SEED_ARTIST {
            catalog.insert_artwork(
                &Artwork::new(
                    format!("{}-{}", artist.to_lowercase(), i),
                    format!("{} study {}", artist, i),
                    artist,
                )
                .with_genre(genres[i % genres.len()])
                .with_quality(0.6 + 0.05 * i as f64),
            )?;
        }
    }
    for i in 0..STILL_LIFE_WORKS {
        catalog.insert_artwork(
            &Artwork::new(
                format!("still-life-{}", i),
                format!("Still life {}", i),
                format!("Dutch Master {}", i),
            )
            .with_genre("still-life")
            .with_period("golden-age")
            .with_quality(0.65 + 0.01 * i as f64),
        )?;
    }
    for i in 0..UNSEEN_PERIOD_WORKS {
        catalog.insert_artwork(
            &Artwork::new(
                format!("renaissance-{}", i),
                format!("Annunciation {}", i),
                format!("Florentine Painter {}", i),
            )
            .with_genre("religious")
            .with_period("renaissance")
            .with_style("tempera")
            .with_quality(0.82 + 0.01 * i as f64),
        )?;
    }
    Ok(())
}
