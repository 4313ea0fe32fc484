//! Store file bootstrap.
//!
//! # Responsibility
//! - Create the store file with owner-only permissions when allowed.
//! - Take the process-exclusive file lock, failing fast on contention.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned file connections run in `locking_mode=EXCLUSIVE` and already
//!   hold the lock.
//! - Returned connections have `foreign_keys=ON` and migrations applied.
//! - A connection that fails bootstrap is dropped (released) before the
//!   error is returned.

use super::migrations::apply_migrations;
use super::DbResult;
use crate::options::EngineOptions;
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens (and optionally creates) a store file, locks it and migrates it.
///
/// # Side effects
/// - May create the file at `path`.
/// - Emits `store_open` logging events with duration and status.
pub fn open_store(path: impl AsRef<Path>, options: &EngineOptions) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=store_open module=db status=start mode=file");

    let mut conn = match open_file(path, options) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=store_open module=db status=error mode=file duration_ms={} error_code=store_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
    };

    match lock_and_bootstrap(&mut conn, options.lock_timeout) {
        Ok(()) => {
            info!(
                "event=store_open module=db status=ok mode=file duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            let error_code = if err.is_lock_contention() {
                "store_locked"
            } else {
                "store_bootstrap_failed"
            };
            error!(
                "event=store_open module=db status=error mode=file duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                error_code,
                err
            );
            Err(err)
        }
    }
}

/// Opens a private in-memory store and applies all migrations.
pub fn open_store_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=store_open module=db status=start mode=memory");

    let mut conn = Connection::open_in_memory()?;
    match bootstrap(&mut conn) {
        Ok(()) => {
            info!(
                "event=store_open module=db status=ok mode=memory duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=store_open module=db status=error mode=memory duration_ms={} error_code=store_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn open_file(path: &Path, options: &EngineOptions) -> DbResult<Connection> {
    let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    if options.create_if_missing {
        precreate_store_file(path, options.file_mode)?;
        flags |= OpenFlags::SQLITE_OPEN_CREATE;
    }
    Ok(Connection::open_with_flags(path, flags)?)
}

#[cfg(unix)]
fn precreate_store_file(path: &Path, mode: u32) -> DbResult<()> {
    use std::os::unix::fs::OpenOptionsExt;

    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(mode)
        .open(path)
    {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(not(unix))]
fn precreate_store_file(_path: &Path, _mode: u32) -> DbResult<()> {
    Ok(())
}

fn lock_and_bootstrap(conn: &mut Connection, lock_timeout: Duration) -> DbResult<()> {
    let _mode: String =
        conn.query_row("PRAGMA locking_mode = EXCLUSIVE;", [], |row| row.get(0))?;
    conn.busy_timeout(lock_timeout)?;
    // Exclusive locking mode keeps this lock until the connection closes.
    conn.execute_batch("BEGIN EXCLUSIVE; COMMIT;")?;
    bootstrap(conn)
}

fn bootstrap(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    apply_migrations(conn)?;
    Ok(())
}
