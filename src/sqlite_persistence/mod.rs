mod versioned_schema;

use anyhow::{anyhow, Result};
use std::sync::{Mutex, MutexGuard};

pub use versioned_schema::{
    open_versioned_db, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    BASE_DB_VERSION, DEFAULT_TIMESTAMP,
};

/// Locks a shared connection, turning a poisoned mutex into an error.
pub(crate) fn lock_conn<T>(conn: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    conn.lock()
        .map_err(|_| anyhow!("Database connection mutex poisoned"))
}

/// `?, ?, ?` with `n` placeholders.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Upper bound on `?` parameters bound by a single `IN (...)` list.
pub(crate) const MAX_BOUND_IDS: usize = 500;

/// Replaces the contents of the one-column temp table `table` with `values`.
/// Lets queries filter against arbitrarily large sets through
/// `IN (SELECT value FROM temp.<table>)` instead of binding one parameter each.
pub(crate) fn fill_temp_set(
    conn: &rusqlite::Connection,
    table: &str,
    values: &[String],
) -> Result<()> {
    conn.execute_batch(&format!(
        "CREATE TEMP TABLE IF NOT EXISTS {table} (value TEXT PRIMARY KEY);
         DELETE FROM temp.{table};"
    ))?;
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt =
            tx.prepare_cached(&format!("INSERT OR IGNORE INTO temp.{table} (value) VALUES (?1)"))?;
        for value in values {
            stmt.execute([value])?;
        }
    }
    tx.commit()?;
    Ok(())
}
