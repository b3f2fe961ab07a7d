use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

/// V 0
const USERS_TABLE_V_0: Table = Table {
    name: "users",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("handle", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("personality_type", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_users_handle", "handle")],
    unique_constraints: &[],
};

const INTERACTIONS_TABLE_V_0: Table = Table {
    name: "interactions",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "users",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("artwork_id", &SqlType::Text, non_null = true),
        sqlite_column!("action", &SqlType::Text, non_null = true),
        sqlite_column!("dwell_secs", &SqlType::Real),
        sqlite_column!("rating", &SqlType::Integer),
        sqlite_column!("timestamp", &SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_interactions_user", "user_id"),
        ("idx_interactions_user_action", "user_id, action"),
    ],
    unique_constraints: &[],
};

const AFFINITIES_TABLE_V_0: Table = Table {
    name: "affinities",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "users",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("dimension", &SqlType::Text, non_null = true),
        sqlite_column!("value", &SqlType::Text, non_null = true),
        sqlite_column!(
            "score",
            &SqlType::Real,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "is_inferred",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "is_initial",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "updated",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_affinities_user_dimension", "user_id, dimension, score")],
    unique_constraints: &[&["user_id", "dimension", "value"]],
};

pub const USER_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[USERS_TABLE_V_0, INTERACTIONS_TABLE_V_0, AFFINITIES_TABLE_V_0],
    migration: None,
}];
