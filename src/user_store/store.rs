//! SQLite-backed users, interaction log and affinity store.

use super::models::{
    ActionType, AffinityDimension, AffinityUpdate, Endorsement, InteractionEvent,
    SharedAffinities, User, UserAffinity,
};
use super::schema::USER_VERSIONED_SCHEMAS;
use super::trait_def::{AffinityStore, InteractionStore, UserStore};
use crate::sqlite_persistence::{lock_conn, open_versioned_db, placeholders};
use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

#[derive(Clone)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned_db(db_path.as_ref(), USER_VERSIONED_SCHEMAS, "user")?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on user connection")?;

        let users: usize = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
        let affinities: usize =
            conn.query_row("SELECT COUNT(*) FROM affinities", [], |r| r.get(0))?;
        info!(
            "User store ready: {} users, {} affinity rows",
            users, affinities
        );

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

/// Accumulates `updates` onto the user's affinity rows. Provenance flags
/// survive only while every contribution carried them.
fn upsert_affinities(conn: &Connection, user_id: usize, updates: &[AffinityUpdate]) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO affinities (user_id, dimension, value, score, is_inferred, is_initial, updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, cast(strftime('%s','now') as int))
         ON CONFLICT(user_id, dimension, value) DO UPDATE SET
            score = score + excluded.score,
            is_inferred = is_inferred AND excluded.is_inferred,
            is_initial = is_initial AND excluded.is_initial,
            updated = excluded.updated",
    )?;
    for update in updates {
        stmt.execute(params![
            user_id,
            update.dimension.as_str(),
            update.value,
            update.score,
            update.is_inferred as i32,
            update.is_initial as i32,
        ])
        .with_context(|| {
            format!(
                "Failed to apply {} affinity '{}' for user {}",
                update.dimension, update.value, user_id
            )
        })?;
    }
    Ok(())
}

fn row_to_affinity(row: &Row) -> rusqlite::Result<UserAffinity> {
    let dimension: String = row.get(1)?;
    let dimension: AffinityDimension = dimension.parse().map_err(|e: anyhow::Error| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(UserAffinity {
        user_id: row.get(0)?,
        dimension,
        value: row.get(2)?,
        score: row.get(3)?,
        is_inferred: row.get::<_, i32>(4)? != 0,
        is_initial: row.get::<_, i32>(5)? != 0,
        updated: row.get::<_, Option<i64>>(6)?.unwrap_or_default(),
    })
}

fn row_to_event(row: &Row) -> rusqlite::Result<InteractionEvent> {
    let action: String = row.get(3)?;
    let action: ActionType = action.parse().map_err(|e: anyhow::Error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(InteractionEvent {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        artwork_id: row.get(2)?,
        action,
        dwell_secs: row.get(4)?,
        rating: row.get(5)?,
        timestamp: row.get(6)?,
    })
}

impl UserStore for SqliteUserStore {
    fn create_user(&self, user_handle: &str, personality_type: Option<&str>) -> Result<usize> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT INTO users (handle, personality_type) VALUES (?1, ?2)",
            params![user_handle, personality_type],
        )
        .with_context(|| format!("Failed to create user {}", user_handle))?;
        let id = conn.last_insert_rowid() as usize;
        info!("Created user {} with id {}", user_handle, id);
        Ok(id)
    }

    fn get_user(&self, user_id: usize) -> Result<Option<User>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, handle, personality_type, created FROM users WHERE id = ?1",
        )?;
        let user = stmt
            .query_row(params![user_id], |row| {
                Ok(User {
                    id: row.get(0)?,
                    handle: row.get(1)?,
                    personality_type: row.get(2)?,
                    created: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
                })
            })
            .optional()?;
        Ok(user)
    }

    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>> {
        let conn = lock_conn(&self.conn)?;
        Ok(conn
            .query_row(
                "SELECT id FROM users WHERE handle = ?1",
                params![user_handle],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set_user_personality_type(&self, user_id: usize, personality_type: &str) -> Result<bool> {
        let conn = lock_conn(&self.conn)?;
        let changed = conn.execute(
            "UPDATE users SET personality_type = ?1 WHERE id = ?2",
            params![personality_type, user_id],
        )?;
        Ok(changed > 0)
    }
}

impl InteractionStore for SqliteUserStore {
    fn record_interaction(
        &self,
        event: &InteractionEvent,
        updates: &[AffinityUpdate],
    ) -> Result<usize> {
        let mut conn = lock_conn(&self.conn)?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO interactions (user_id, artwork_id, action, dwell_secs, rating, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                event.user_id,
                event.artwork_id,
                event.action.as_str(),
                event.dwell_secs,
                event.rating,
                event.timestamp,
            ],
        )
        .with_context(|| format!("Failed to log interaction for user {}", event.user_id))?;
        let event_id = tx.last_insert_rowid() as usize;
        upsert_affinities(&tx, event.user_id, updates)?;
        tx.commit()?;
        debug!(
            "Recorded {} on {} for user {} with {} affinity updates",
            event.action,
            event.artwork_id,
            event.user_id,
            updates.len()
        );
        Ok(event_id)
    }

    fn get_user_interactions(&self, user_id: usize, limit: usize) -> Result<Vec<InteractionEvent>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, user_id, artwork_id, action, dwell_secs, rating, timestamp
             FROM interactions WHERE user_id = ?1
             ORDER BY timestamp DESC, id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit as i64], row_to_event)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn get_viewed_artwork_ids(&self, user_id: usize) -> Result<Vec<String>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare_cached(
            "SELECT DISTINCT artwork_id FROM interactions
             WHERE user_id = ?1 AND action = 'view' ORDER BY artwork_id",
        )?;
        let rows = stmt.query_map(params![user_id], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn get_interacted_artwork_ids(&self, user_id: usize) -> Result<Vec<String>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare_cached(
            "SELECT DISTINCT artwork_id FROM interactions WHERE user_id = ?1 ORDER BY artwork_id",
        )?;
        let rows = stmt.query_map(params![user_id], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn get_endorsements(&self, user_ids: &[usize]) -> Result<Vec<Endorsement>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT artwork_id, user_id FROM interactions
             WHERE action IN ('like', 'save') AND user_id IN ({})
             ORDER BY artwork_id, user_id",
            placeholders(user_ids.len())
        ))?;
        let rows = stmt.query_map(params_from_iter(user_ids.iter()), |row| {
            Ok(Endorsement {
                artwork_id: row.get(0)?,
                user_id: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl AffinityStore for SqliteUserStore {
    fn apply_affinity_updates(&self, user_id: usize, updates: &[AffinityUpdate]) -> Result<()> {
        let mut conn = lock_conn(&self.conn)?;
        let tx = conn.transaction()?;
        upsert_affinities(&tx, user_id, updates)?;
        tx.commit()?;
        Ok(())
    }

    fn get_top_affinities(
        &self,
        user_id: usize,
        dimension: AffinityDimension,
        k: usize,
    ) -> Result<Vec<UserAffinity>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare_cached(
            "SELECT user_id, dimension, value, score, is_inferred, is_initial, updated
             FROM affinities WHERE user_id = ?1 AND dimension = ?2
             ORDER BY score DESC, value ASC LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![user_id, dimension.as_str(), k as i64],
            row_to_affinity,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn get_affinity(
        &self,
        user_id: usize,
        dimension: AffinityDimension,
        value: &str,
    ) -> Result<Option<UserAffinity>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare_cached(
            "SELECT user_id, dimension, value, score, is_inferred, is_initial, updated
             FROM affinities WHERE user_id = ?1 AND dimension = ?2 AND value = ?3",
        )?;
        Ok(stmt
            .query_row(params![user_id, dimension.as_str(), value], row_to_affinity)
            .optional()?)
    }

    fn find_users_sharing_affinities(
        &self,
        user_id: usize,
        dimension: AffinityDimension,
        min_shared: usize,
    ) -> Result<Vec<SharedAffinities>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare_cached(
            "SELECT other.user_id, mine.score, other.score
             FROM affinities mine
             JOIN affinities other
               ON other.dimension = mine.dimension
              AND other.value = mine.value
              AND other.user_id != mine.user_id
             WHERE mine.user_id = ?1 AND mine.dimension = ?2
             ORDER BY other.user_id, other.value",
        )?;
        let rows = stmt.query_map(params![user_id, dimension.as_str()], |row| {
            Ok((
                row.get::<_, usize>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?;

        let mut shared: Vec<SharedAffinities> = Vec::new();
        for row in rows {
            let (other, mine_score, other_score) = row?;
            match shared.last_mut() {
                Some(last) if last.user_id == other => last.pairs.push((mine_score, other_score)),
                _ => shared.push(SharedAffinities {
                    user_id: other,
                    pairs: vec![(mine_score, other_score)],
                }),
            }
        }
        shared.retain(|s| s.pairs.len() >= min_shared);
        Ok(shared)
    }

    fn decay_affinities(&self, factor: f64) -> Result<usize> {
        let conn = lock_conn(&self.conn)?;
        let touched = conn.execute(
            "UPDATE affinities SET score = score * ?1",
            params![factor],
        )?;
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::TempDir;

    fn create_tmp_store() -> (SqliteUserStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteUserStore::new(temp_dir.path().join("user.db")).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn creates_and_finds_users() {
        let (store, _dir) = create_tmp_store();
        let id = store.create_user("ada", None).unwrap();
        assert_eq!(store.get_user_id("ada").unwrap(), Some(id));
        assert!(store.create_user("ada", None).is_err());
        assert!(store.set_user_personality_type(id, "LAMC").unwrap());
        let user = store.get_user(id).unwrap().unwrap();
        assert_eq!(user.personality_type.as_deref(), Some("LAMC"));
        assert!(store.get_user(id + 100).unwrap().is_none());
        assert!(!store.set_user_personality_type(id + 100, "LAMC").unwrap());
    }

    #[test]
    fn affinity_updates_accumulate() {
        let (store, _dir) = create_tmp_store();
        let id = store.create_user("bo", None).unwrap();
        store
            .apply_affinity_updates(
                id,
                &[
                    AffinityUpdate::direct(AffinityDimension::Artist, "monet", 3.0),
                    AffinityUpdate::inferred(AffinityDimension::Artist, "renoir", 1.5),
                ],
            )
            .unwrap();
        store
            .apply_affinity_updates(
                id,
                &[
                    AffinityUpdate::direct(AffinityDimension::Artist, "monet", 2.0),
                    AffinityUpdate::inferred(AffinityDimension::Artist, "renoir", 1.0),
                ],
            )
            .unwrap();

        let monet = store
            .get_affinity(id, AffinityDimension::Artist, "monet")
            .unwrap()
            .unwrap();
        assert!((monet.score - 5.0).abs() < 1e-9);
        assert!(!monet.is_inferred);

        let renoir = store
            .get_affinity(id, AffinityDimension::Artist, "renoir")
            .unwrap()
            .unwrap();
        assert!((renoir.score - 2.5).abs() < 1e-9);
        assert!(renoir.is_inferred);

        let top = store
            .get_top_affinities(id, AffinityDimension::Artist, 10)
            .unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].value, "monet");
    }

    #[test]
    fn direct_contribution_clears_inferred_flag() {
        let (store, _dir) = create_tmp_store();
        let id = store.create_user("cy", None).unwrap();
        store
            .apply_affinity_updates(
                id,
                &[AffinityUpdate::initial(AffinityDimension::Genre, "still-life", 5.0)],
            )
            .unwrap();
        let row = store
            .get_affinity(id, AffinityDimension::Genre, "still-life")
            .unwrap()
            .unwrap();
        assert!(row.is_initial);

        store
            .apply_affinity_updates(
                id,
                &[AffinityUpdate::inferred(AffinityDimension::Genre, "still-life", 1.0)],
            )
            .unwrap();
        let row = store
            .get_affinity(id, AffinityDimension::Genre, "still-life")
            .unwrap()
            .unwrap();
        assert!(!row.is_initial);
        assert!(!row.is_inferred);
        assert!((row.score - 6.0).abs() < 1e-9);
    }

    #[test]
    fn concurrent_writes_never_lose_updates() {
        let (store, _dir) = create_tmp_store();
        let id = store.create_user("dee", None).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        store
                            .apply_affinity_updates(
                                id,
                                &[AffinityUpdate::direct(AffinityDimension::Artist, "klee", 1.0)],
                            )
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let row = store
            .get_affinity(id, AffinityDimension::Artist, "klee")
            .unwrap()
            .unwrap();
        assert!((row.score - 200.0).abs() < 1e-9);
    }

    #[test]
    fn record_interaction_logs_event_and_updates() {
        let (store, _dir) = create_tmp_store();
        let id = store.create_user("eve", None).unwrap();
        let event = InteractionEvent::new(id, "art-1", ActionType::Like).with_rating(Some(5));
        let event_id = store
            .record_interaction(
                &event,
                &[AffinityUpdate::direct(AffinityDimension::Artist, "monet", 5.0)],
            )
            .unwrap();

        let events = store.get_user_interactions(id, 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, Some(event_id));
        assert_eq!(events[0].rating, Some(5));
        assert!(store.get_viewed_artwork_ids(id).unwrap().is_empty());
        assert_eq!(store.get_interacted_artwork_ids(id).unwrap(), vec!["art-1"]);
        assert_eq!(
            store.get_endorsements(&[id]).unwrap(),
            vec![Endorsement {
                artwork_id: "art-1".to_string(),
                user_id: id
            }]
        );
        assert!(store
            .get_affinity(id, AffinityDimension::Artist, "monet")
            .unwrap()
            .is_some());
    }

    #[test]
    fn failed_interaction_writes_nothing() {
        let (store, _dir) = create_tmp_store();
        // No such user: the foreign key rejects the event.
        let event = InteractionEvent::new(999, "art-1", ActionType::View);
        let result = store.record_interaction(
            &event,
            &[AffinityUpdate::direct(AffinityDimension::Artist, "monet", 1.0)],
        );
        assert!(result.is_err());
        assert!(store
            .get_affinity(999, AffinityDimension::Artist, "monet")
            .unwrap()
            .is_none());
    }

    #[test]
    fn finds_users_with_shared_affinities() {
        let (store, _dir) = create_tmp_store();
        let me = store.create_user("me", None).unwrap();
        let twin = store.create_user("twin", None).unwrap();
        let stranger = store.create_user("stranger", None).unwrap();

        let artists = ["a", "b", "c", "d"];
        let mine: Vec<_> = artists
            .iter()
            .map(|a| AffinityUpdate::direct(AffinityDimension::Artist, *a, 2.0))
            .collect();
        store.apply_affinity_updates(me, &mine).unwrap();
        store.apply_affinity_updates(twin, &mine[..3]).unwrap();
        store.apply_affinity_updates(stranger, &mine[..2]).unwrap();

        let shared = store
            .find_users_sharing_affinities(me, AffinityDimension::Artist, 3)
            .unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].user_id, twin);
        assert_eq!(shared[0].pairs, vec![(2.0, 2.0); 3]);
    }

    #[test]
    fn decay_scales_scores() {
        let (store, _dir) = create_tmp_store();
        let id = store.create_user("fay", None).unwrap();
        store
            .apply_affinity_updates(
                id,
                &[
                    AffinityUpdate::direct(AffinityDimension::Artist, "x", 10.0),
                    AffinityUpdate::direct(AffinityDimension::Period, "baroque", 4.0),
                ],
            )
            .unwrap();
        assert_eq!(store.decay_affinities(0.5).unwrap(), 2);
        let row = store
            .get_affinity(id, AffinityDimension::Artist, "x")
            .unwrap()
            .unwrap();
        assert!((row.score - 5.0).abs() < 1e-9);
    }
}
