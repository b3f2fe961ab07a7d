//! SQLite-backed artwork catalog.

use super::models::{Artwork, ArtworkAnalysisUpdate, ArtworkQuery, PaletteEntry, ProcessingStatus};
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::CatalogStore;
use crate::sqlite_persistence::{
    fill_temp_set, lock_conn, open_versioned_db, placeholders, MAX_BOUND_IDS,
};
use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

const ARTWORK_COLUMNS: &str = "id, title, artist, artist_key, genre, period, style, quality_score,
    palette, emotion_tags, personality_tags, processing_status, image_ref, is_active";

const EXCLUDED_IDS_TABLE: &str = "query_excluded_ids";
const SEEN_PERIODS_TABLE: &str = "query_seen_periods";
const SEEN_STYLES_TABLE: &str = "query_seen_styles";
const SEEN_GENRES_TABLE: &str = "query_seen_genres";

/// True when `column` holds a value missing from the temp set `seen_table`.
fn unseen_condition(column: &str, seen_table: &str) -> String {
    format!(
        "({column} IS NOT NULL AND {column} NOT IN (SELECT value FROM temp.{seen_table}))"
    )
}

#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned_db(db_path.as_ref(), CATALOG_VERSIONED_SCHEMAS, "catalog")?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on catalog connection")?;

        let count: usize = conn.query_row("SELECT COUNT(*) FROM artworks", [], |r| r.get(0))?;
        info!("Catalog store ready: {} artworks", count);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("Failed to serialize catalog column")
}

fn parse_json_list<T: serde::de::DeserializeOwned>(raw: Option<String>) -> Vec<T> {
    raw.map(|json| {
        serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!("Malformed JSON array in catalog db: {}: {}", json, e);
            Vec::new()
        })
    })
    .unwrap_or_default()
}

fn row_to_artwork(row: &Row) -> rusqlite::Result<Artwork> {
    let status: String = row.get(11)?;
    let status = status.parse().unwrap_or_else(|e| {
        warn!("{}; treating artwork as pending", e);
        ProcessingStatus::Pending
    });
    let palette: Vec<PaletteEntry> = parse_json_list(row.get(8)?);
    Ok(Artwork {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        artist_key: row.get(3)?,
        genre: row.get(4)?,
        period: row.get(5)?,
        style: row.get(6)?,
        quality_score: row.get(7)?,
        palette,
        emotion_tags: parse_json_list(row.get(9)?),
        personality_tags: parse_json_list(row.get(10)?),
        status,
        image_ref: row.get(12)?,
        is_active: row.get::<_, i32>(13)? != 0,
    })
}

impl CatalogStore for SqliteCatalogStore {
    fn insert_artwork(&self, artwork: &Artwork) -> Result<()> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            &format!(
                "INSERT INTO artworks ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                ARTWORK_COLUMNS
            ),
            params![
                artwork.id,
                artwork.title,
                artwork.artist,
                artwork.artist_key,
                artwork.genre,
                artwork.period,
                artwork.style,
                artwork.quality_score,
                to_json(&artwork.palette)?,
                to_json(&artwork.emotion_tags)?,
                to_json(&artwork.personality_tags)?,
                artwork.status.as_str(),
                artwork.image_ref,
                artwork.is_active as i32,
            ],
        )
        .with_context(|| format!("Failed to insert artwork {}", artwork.id))?;
        Ok(())
    }

    fn get_artwork(&self, id: &str) -> Result<Option<Artwork>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM artworks WHERE id = ?1",
            ARTWORK_COLUMNS
        ))?;
        Ok(stmt.query_row(params![id], row_to_artwork).optional()?)
    }

    fn get_artworks(&self, ids: &[String]) -> Result<Vec<Artwork>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = lock_conn(&self.conn)?;
        let mut artworks = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_BOUND_IDS) {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {} FROM artworks WHERE id IN ({})",
                ARTWORK_COLUMNS,
                placeholders(chunk.len())
            ))?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), row_to_artwork)?;
            for row in rows {
                artworks.push(row?);
            }
        }
        Ok(artworks)
    }

    fn query_artworks(&self, query: &ArtworkQuery) -> Result<Vec<Artwork>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(artist_keys) = &query.artist_keys {
            if artist_keys.is_empty() {
                return Ok(Vec::new());
            }
            clauses.push(format!("artist_key IN ({})", placeholders(artist_keys.len())));
            values.extend(artist_keys.iter().cloned().map(Value::Text));
        }
        if let Some(genres) = &query.genres {
            if genres.is_empty() {
                return Ok(Vec::new());
            }
            clauses.push(format!("genre IN ({})", placeholders(genres.len())));
            values.extend(genres.iter().cloned().map(Value::Text));
        }
        if let Some(min_quality) = query.min_quality {
            clauses.push("quality_score >= ?".to_string());
            values.push(Value::Real(min_quality));
        }
        if query.active_only {
            clauses.push("is_active = 1".to_string());
        }

        let conn = lock_conn(&self.conn)?;

        if !query.exclude_ids.is_empty() {
            fill_temp_set(&conn, EXCLUDED_IDS_TABLE, &query.exclude_ids)?;
            clauses.push(format!(
                "id NOT IN (SELECT value FROM temp.{})",
                EXCLUDED_IDS_TABLE
            ));
        }

        let mut order_by = "quality_score DESC, id ASC".to_string();
        if let Some(novelty) = &query.novelty {
            fill_temp_set(&conn, SEEN_PERIODS_TABLE, &novelty.seen_periods)?;
            fill_temp_set(&conn, SEEN_STYLES_TABLE, &novelty.seen_styles)?;
            fill_temp_set(&conn, SEEN_GENRES_TABLE, &novelty.seen_genres)?;
            let unseen = [
                unseen_condition("period", SEEN_PERIODS_TABLE),
                unseen_condition("style", SEEN_STYLES_TABLE),
                unseen_condition("genre", SEEN_GENRES_TABLE),
            ];
            clauses.push(format!("({})", unseen.join(" OR ")));
            let score = unseen
                .iter()
                .map(|condition| format!("(CASE WHEN {} THEN ? ELSE 0.0 END)", condition))
                .collect::<Vec<_>>()
                .join(" + ");
            order_by = format!("{} DESC, {}", score, order_by);
            values.push(Value::Real(novelty.period_weight));
            values.push(Value::Real(novelty.style_weight));
            values.push(Value::Real(novelty.genre_weight));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        values.push(Value::Integer(query.limit as i64));

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM artworks {} ORDER BY {} LIMIT ?",
            ARTWORK_COLUMNS, where_clause, order_by
        ))?;
        let rows = stmt.query_map(params_from_iter(values), row_to_artwork)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn list_artworks_needing_analysis(&self, limit: usize) -> Result<Vec<Artwork>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM artworks
             WHERE processing_status IN ('pending', 'crawled')
               AND image_ref IS NOT NULL
               AND is_active = 1
             ORDER BY created DESC, rowid DESC
             LIMIT ?1",
            ARTWORK_COLUMNS
        ))?;
        let rows = stmt.query_map(params![limit as i64], row_to_artwork)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn update_artwork_analysis(&self, id: &str, update: &ArtworkAnalysisUpdate) -> Result<bool> {
        let conn = lock_conn(&self.conn)?;
        let changed = conn.execute(
            "UPDATE artworks SET
                personality_tags = ?1,
                emotion_tags = ?2,
                palette = ?3,
                quality_score = ?4,
                processing_status = ?5,
                analyzed_at = cast(strftime('%s','now') as int)
             WHERE id = ?6",
            params![
                to_json(&update.personality_tags)?,
                to_json(&update.emotion_tags)?,
                to_json(&update.palette)?,
                update.quality_score,
                ProcessingStatus::Processed.as_str(),
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    fn mark_image_changed(&self, id: &str, image_ref: &str) -> Result<bool> {
        let conn = lock_conn(&self.conn)?;
        let changed = conn.execute(
            "UPDATE artworks SET image_ref = ?1, processing_status = ?2 WHERE id = ?3",
            params![image_ref, ProcessingStatus::Crawled.as_str(), id],
        )?;
        Ok(changed > 0)
    }

    fn count_artworks(&self) -> Result<usize> {
        let conn = lock_conn(&self.conn)?;
        Ok(conn.query_row("SELECT COUNT(*) FROM artworks", [], |r| r.get(0))?)
    }
}
