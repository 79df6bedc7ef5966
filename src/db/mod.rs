// Database layer: SQLite storage for places, hashtags, and their embeddings.
//
// We use rusqlite with the "bundled" feature so there's no system SQLite
// dependency. The database file lives wherever PLACETAG_DB_PATH points
// (defaults to ./placetag.db).

pub mod models;
#[cfg(feature = "sqlite")]
pub mod queries;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

pub use traits::PlaceStore;

#[cfg(feature = "sqlite")]
use anyhow::{Context, Result};
#[cfg(feature = "sqlite")]
use rusqlite::Connection;
#[cfg(feature = "sqlite")]
use std::path::Path;
#[cfg(feature = "sqlite")]
use std::sync::Arc;

/// Open (or create) the database and run migrations.
///
/// Called by `placetag init` and `placetag import`.
#[cfg(feature = "sqlite")]
pub fn initialize(db_path: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {}", db_path))?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Open an existing database (fails if it doesn't exist yet).
#[cfg(feature = "sqlite")]
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        anyhow::bail!(
            "Database not found at {}. Run `placetag init` first.",
            db_path
        );
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    // Older files may predate the region_code migration.
    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Initialize and wrap in a shareable store.
#[cfg(feature = "sqlite")]
pub fn initialize_store(db_path: &str) -> Result<Arc<dyn PlaceStore>> {
    let conn = initialize(db_path)?;
    Ok(Arc::new(sqlite::SqliteStore::new(conn)))
}

/// Open an existing database as a shareable store.
#[cfg(feature = "sqlite")]
pub fn open_store(db_path: &str) -> Result<Arc<dyn PlaceStore>> {
    let conn = open(db_path)?;
    Ok(Arc::new(sqlite::SqliteStore::new(conn)))
}
