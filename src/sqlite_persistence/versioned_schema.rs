use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use tracing::info;

/// Offset added to every schema version stored in `PRAGMA user_version`, so a
/// database created by an unrelated tool is never mistaken for version 0.
pub const BASE_DB_VERSION: usize = 77000;

pub const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                is_unique: false,
                default_value: None,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }

    fn from_sql(s: &str) -> Option<&'static SqlType> {
        match s {
            "TEXT" => Some(&SqlType::Text),
            "INTEGER" => Some(&SqlType::Integer),
            "REAL" => Some(&SqlType::Real),
            _ => None,
        }
    }
}

#[allow(unused)]
pub enum ForeignKeyOnChange {
    NoAction,
    Cascade,
}

impl ForeignKeyOnChange {
    fn as_sql(&self) -> &'static str {
        match self {
            ForeignKeyOnChange::NoAction => "NO ACTION",
            ForeignKeyOnChange::Cascade => "CASCADE",
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
    pub on_delete: ForeignKeyOnChange,
}

pub struct Column<'a> {
    pub name: &'static str,
    pub sql_type: &'a SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub is_unique: bool,
    pub default_value: Option<&'static str>,
    pub foreign_key: Option<&'a ForeignKey>,
}

/// Static description of a table. Indices are `(name, column list)` pairs where
/// the column list may name several comma separated columns.
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<'static>],
    pub indices: &'static [(&'static str, &'static str)],
    pub unique_constraints: &'static [&'static [&'static str]],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut parts: Vec<String> = Vec::with_capacity(self.columns.len());
        for column in self.columns {
            let mut def = format!("{} {}", column.name, column.sql_type.as_sql());
            if column.is_primary_key {
                def.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                def.push_str(" NOT NULL");
            }
            if column.is_unique {
                def.push_str(" UNIQUE");
            }
            if let Some(default_value) = column.default_value {
                def.push_str(&format!(" DEFAULT {}", default_value));
            }
            if let Some(fk) = column.foreign_key {
                def.push_str(&format!(
                    " REFERENCES {}({}) ON DELETE {}",
                    fk.foreign_table,
                    fk.foreign_column,
                    fk.on_delete.as_sql()
                ));
            }
            parts.push(def);
        }
        for unique in self.unique_constraints {
            parts.push(format!("UNIQUE ({})", unique.join(", ")));
        }

        conn.execute(
            &format!("CREATE TABLE {} ({});", self.name, parts.join(", ")),
            params![],
        )
        .with_context(|| format!("Failed to create table {}", self.name))?;

        for (index_name, columns) in self.indices {
            conn.execute(
                &format!("CREATE INDEX {} ON {}({});", index_name, self.name, columns),
                params![],
            )?;
        }
        Ok(())
    }

    fn validate(&self, conn: &Connection) -> Result<()> {
        struct ActualColumn {
            name: String,
            sql_type: String,
            non_null: bool,
            is_primary_key: bool,
        }

        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let actual: Vec<ActualColumn> = stmt
            .query_map([], |row| {
                Ok(ActualColumn {
                    name: row.get(1)?,
                    sql_type: row.get(2)?,
                    non_null: row.get::<_, i32>(3)? == 1,
                    is_primary_key: row.get::<_, i32>(5)? == 1,
                })
            })?
            .collect::<Result<_, _>>()?;

        if actual.len() != self.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}",
                self.name,
                actual.len(),
                self.columns.len()
            );
        }

        for (found, expected) in actual.iter().zip(self.columns.iter()) {
            if found.name != expected.name {
                bail!(
                    "Table {} column name mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    found.name
                );
            }
            if SqlType::from_sql(&found.sql_type) != Some(expected.sql_type) {
                bail!(
                    "Table {} column {} type mismatch: expected {:?}, got {}",
                    self.name,
                    expected.name,
                    expected.sql_type,
                    found.sql_type
                );
            }
            if found.non_null != expected.non_null
                || found.is_primary_key != expected.is_primary_key
            {
                bail!(
                    "Table {} column {} constraint mismatch",
                    self.name,
                    expected.name
                );
            }
        }

        for (index_name, _) in self.indices {
            let exists: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name=?1 AND tbl_name=?2",
                params![index_name, self.name],
                |row| row.get(0),
            )?;
            if exists == 0 {
                bail!("Table {} is missing index '{}'", self.name, index_name);
            }
        }

        if !self.unique_constraints.is_empty() {
            let unique_sets = unique_index_columns(conn, self.name)?;
            for expected in self.unique_constraints {
                let mut expected: Vec<&str> = expected.to_vec();
                expected.sort_unstable();
                let found = unique_sets
                    .iter()
                    .any(|cols| cols.iter().map(String::as_str).eq(expected.iter().copied()));
                if !found {
                    bail!(
                        "Table {} is missing unique constraint on ({})",
                        self.name,
                        expected.join(", ")
                    );
                }
            }
        }
        Ok(())
    }
}

fn unique_index_columns(conn: &Connection, table: &str) -> Result<Vec<Vec<String>>> {
    let mut stmt = conn.prepare(&format!("PRAGMA index_list({})", table))?;
    let names: Vec<String> = stmt
        .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, i32>(2)?)))?
        .filter_map(|r| r.ok())
        .filter(|(_, unique)| *unique == 1)
        .map(|(name, _)| name)
        .collect();

    let mut sets = Vec::with_capacity(names.len());
    for name in names {
        let mut info = conn.prepare(&format!("PRAGMA index_info({})", name))?;
        let mut cols: Vec<String> = info
            .query_map([], |row| row.get::<_, String>(2))?
            .filter_map(|r| r.ok())
            .collect();
        cols.sort();
        sets.push(cols);
    }
    Ok(sets)
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub migration: Option<fn(&Connection) -> Result<()>>,
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys = ON;", params![])?;
        for table in self.tables {
            table.create(conn)?;
        }
        conn.pragma_update(None, "user_version", BASE_DB_VERSION + self.version)?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.validate(conn)?;
        }
        Ok(())
    }
}

/// Opens (or creates) a database described by `schemas`, validating the stored
/// version and running any pending forward migrations in one transaction.
pub fn open_versioned_db(
    db_path: &Path,
    schemas: &'static [VersionedSchema],
    label: &str,
) -> Result<Connection> {
    let latest = schemas
        .last()
        .context("At least one schema version is required")?;

    let mut conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open {} database at {:?}", label, db_path))?;

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;

    if table_count == 0 {
        info!("Creating {} db schema at version {}", label, latest.version);
        latest.create(&conn)?;
        return Ok(conn);
    }

    conn.execute("PRAGMA foreign_keys = ON;", params![])?;
    let stored: i64 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .context("Failed to read database version")?;
    let version = stored - BASE_DB_VERSION as i64;
    if version < 0 {
        bail!(
            "{} database version {} predates base version {}",
            label,
            stored,
            BASE_DB_VERSION
        );
    }
    let version = version as usize;
    let current = schemas
        .get(version)
        .with_context(|| format!("{} database version {} is too new", label, version))?;

    #[cfg(not(feature = "no_checks"))]
    current.validate(&conn)?;

    if version < latest.version {
        let tx = conn.transaction()?;
        let mut reached = current.version;
        for schema in schemas.iter().skip(version + 1) {
            if let Some(migration) = schema.migration {
                info!("Migrating {} db from version {} to {}", label, reached, schema.version);
                migration(&tx)?;
            }
            reached = schema.version;
        }
        tx.pragma_update(None, "user_version", BASE_DB_VERSION + reached)?;
        tx.commit()?;
    }

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite_column;
    use tempfile::TempDir;

    const PLAIN_TABLE: Table = Table {
        name: "plain",
        columns: &[
            sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
            sqlite_column!("owner", &SqlType::Text, non_null = true),
            sqlite_column!("value", &SqlType::Real, non_null = true),
        ],
        indices: &[("idx_plain_owner", "owner")],
        unique_constraints: &[&["value", "owner"]],
    };

    const SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
        version: 0,
        tables: &[PLAIN_TABLE],
        migration: None,
    }];

    #[test]
    fn creates_and_reopens_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.db");
        {
            let conn = open_versioned_db(&path, SCHEMAS, "plain").unwrap();
            let version: i64 = conn
                .query_row("PRAGMA user_version;", [], |row| row.get(0))
                .unwrap();
            assert_eq!(version, BASE_DB_VERSION as i64);
        }
        assert!(open_versioned_db(&path, SCHEMAS, "plain").is_ok());
    }

    #[test]
    fn validate_detects_missing_index() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE plain (id INTEGER PRIMARY KEY, owner TEXT NOT NULL, value REAL NOT NULL, UNIQUE (owner, value))",
            [],
        )
        .unwrap();
        let err = PLAIN_TABLE.validate(&conn).unwrap_err();
        assert!(err.to_string().contains("missing index"));
    }

    #[test]
    fn validate_unique_constraint_is_column_order_independent() {
        let conn = Connection::open_in_memory().unwrap();
        PLAIN_TABLE.create(&conn).unwrap();
        assert!(PLAIN_TABLE.validate(&conn).is_ok());
    }

    #[test]
    fn validate_detects_missing_unique_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE plain (id INTEGER PRIMARY KEY, owner TEXT NOT NULL, value REAL NOT NULL)",
            [],
        )
        .unwrap();
        conn.execute("CREATE INDEX idx_plain_owner ON plain(owner)", [])
            .unwrap();
        let err = PLAIN_TABLE.validate(&conn).unwrap_err();
        assert!(err.to_string().contains("unique constraint"));
    }

    #[test]
    fn rejects_database_from_the_future() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("future.db");
        {
            let conn = Connection::open(&path).unwrap();
            PLAIN_TABLE.create(&conn).unwrap();
            conn.pragma_update(None, "user_version", BASE_DB_VERSION + 5)
                .unwrap();
        }
        let err = open_versioned_db(&path, SCHEMAS, "plain").unwrap_err();
        assert!(err.to_string().contains("too new"));
    }
}
