//! Named record collections on top of the `buckets`/`records` tables.
//!
//! # Responsibility
//! - Create and look up buckets by name.
//! - Provide key/value get, put, delete and ordered iteration.
//! - Own each bucket's atomic sequence counter.
//!
//! # Invariants
//! - Keys iterate in bytewise order.
//! - A sequence value is never handed out twice, even after records are
//!   deleted; only a rolled-back transaction returns it to the counter.
//!
//! All functions run against whatever transaction is active on `conn`.

use super::{DbError, DbResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Creates the bucket row if it is absent. Existing records are untouched.
pub fn create_bucket_if_not_exists(conn: &Connection, name: &str) -> DbResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO buckets (name) VALUES (?1);",
        [name],
    )?;
    Ok(())
}

/// Looks up a bucket by name.
pub fn bucket<'a>(conn: &'a Connection, name: &'a str) -> DbResult<Option<Bucket<'a>>> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM buckets WHERE name = ?1);",
        [name],
        |row| row.get(0),
    )?;
    Ok((exists == 1).then_some(Bucket { conn, name }))
}

/// Handle to one existing bucket.
#[derive(Debug)]
pub struct Bucket<'a> {
    conn: &'a Connection,
    name: &'a str,
}

impl Bucket<'_> {
    pub fn name(&self) -> &str {
        self.name
    }

    /// Increments and returns the bucket sequence. The first value is 1.
    pub fn next_sequence(&self) -> DbResult<u64> {
        let value: i64 = self.conn.query_row(
            "UPDATE buckets
             SET sequence = sequence + 1
             WHERE name = ?1
             RETURNING sequence;",
            [self.name],
            |row| row.get(0),
        )?;
        u64::try_from(value).map_err(|_| {
            DbError::InvalidData(format!(
                "negative sequence `{value}` in buckets.sequence for `{}`",
                self.name
            ))
        })
    }

    pub fn get(&self, key: &[u8]) -> DbResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM records WHERE bucket = ?1 AND key = ?2;",
                params![self.name, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Inserts or replaces the value stored under `key`.
    pub fn put(&self, key: &[u8], value: &[u8]) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO records (bucket, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (bucket, key) DO UPDATE SET value = excluded.value;",
            params![self.name, key, value],
        )?;
        Ok(())
    }

    /// Removes `key`; returns whether a record existed.
    pub fn delete(&self, key: &[u8]) -> DbResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM records WHERE bucket = ?1 AND key = ?2;",
            params![self.name, key],
        )?;
        Ok(changed > 0)
    }

    /// Visits every record in key order. An error from `visit` stops the
    /// iteration and is returned unchanged.
    pub fn for_each<E, F>(&self, mut visit: F) -> Result<(), E>
    where
        E: From<DbError>,
        F: FnMut(&[u8], &[u8]) -> Result<(), E>,
    {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM records WHERE bucket = ?1 ORDER BY key ASC;")
            .map_err(DbError::from)?;
        let mut rows = stmt.query([self.name]).map_err(DbError::from)?;
        while let Some(row) = rows.next().map_err(DbError::from)? {
            let key: Vec<u8> = row.get(0).map_err(DbError::from)?;
            let value: Vec<u8> = row.get(1).map_err(DbError::from)?;
            visit(&key, &value)?;
        }
        Ok(())
    }
}
