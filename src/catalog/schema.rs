//! SQLite schema definitions for the artwork catalog.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};
use rusqlite::Connection;

/// V 0
const ARTWORKS_TABLE_V_0: Table = Table {
    name: "artworks",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("artist_key", &SqlType::Text, non_null = true),
        sqlite_column!("genre", &SqlType::Text),
        sqlite_column!("period", &SqlType::Text),
        sqlite_column!("style", &SqlType::Text),
        sqlite_column!(
            "quality_score",
            &SqlType::Real,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("palette", &SqlType::Text), // JSON array
        sqlite_column!("emotion_tags", &SqlType::Text), // JSON array
        sqlite_column!("personality_tags", &SqlType::Text), // JSON array
        sqlite_column!(
            "processing_status",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'pending'")
        ),
        sqlite_column!("image_ref", &SqlType::Text),
        sqlite_column!(
            "is_active",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("1")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_artworks_artist_key", "artist_key"),
        ("idx_artworks_genre", "genre"),
        ("idx_artworks_status", "processing_status"),
    ],
    unique_constraints: &[],
};

/// V 1: track when the classifier last touched a record.
pub const ARTWORKS_TABLE_V_1: Table = Table {
    name: "artworks",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("artist_key", &SqlType::Text, non_null = true),
        sqlite_column!("genre", &SqlType::Text),
        sqlite_column!("period", &SqlType::Text),
        sqlite_column!("style", &SqlType::Text),
        sqlite_column!(
            "quality_score",
            &SqlType::Real,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("palette", &SqlType::Text),
        sqlite_column!("emotion_tags", &SqlType::Text),
        sqlite_column!("personality_tags", &SqlType::Text),
        sqlite_column!(
            "processing_status",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'pending'")
        ),
        sqlite_column!("image_ref", &SqlType::Text),
        sqlite_column!(
            "is_active",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("1")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("analyzed_at", &SqlType::Integer),
    ],
    indices: &[
        ("idx_artworks_artist_key", "artist_key"),
        ("idx_artworks_genre", "genre"),
        ("idx_artworks_status", "processing_status"),
    ],
    unique_constraints: &[],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[ARTWORKS_TABLE_V_0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[ARTWORKS_TABLE_V_1],
        migration: Some(|conn: &Connection| {
            conn.execute("ALTER TABLE artworks ADD COLUMN analyzed_at INTEGER", [])?;
            Ok(())
        }),
    },
];

#[cfg(test)]
pub(super) fn create_v0(conn: &Connection) -> anyhow::Result<()> {
    CATALOG_VERSIONED_SCHEMAS[0].create(conn)
}
