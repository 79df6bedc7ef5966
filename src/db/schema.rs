// Database schema: table creation and migrations.
//
// We use a simple version-based migration approach: a `schema_version` table
// tracks which migrations have run, and each migration is a function that
// executes SQL statements.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// This is idempotent and safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Points of interest. Ids are unique across categories.
        CREATE TABLE IF NOT EXISTS places (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT NOT NULL,            -- canonical Category::as_str()
            name TEXT NOT NULL,
            x REAL NOT NULL,                   -- longitude / map x
            y REAL NOT NULL,                   -- latitude / map y
            address TEXT,
            open_time TEXT,
            close_time TEXT,
            image_url TEXT                     -- JSON list, legacy concatenation, or CSV
        );

        -- Hashtags with their precomputed embeddings
        CREATE TABLE IF NOT EXISTS hashtags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL UNIQUE,
            embedding TEXT                     -- raw; decoded (and validated) at query time
        );

        -- Many-to-many place <-> hashtag association
        CREATE TABLE IF NOT EXISTS place_hashtags (
            place_id INTEGER NOT NULL REFERENCES places(id) ON DELETE CASCADE,
            hashtag_id INTEGER NOT NULL REFERENCES hashtags(id) ON DELETE CASCADE,
            PRIMARY KEY (place_id, hashtag_id)
        );

        -- Viewport queries filter by category then bounding box
        CREATE INDEX IF NOT EXISTS idx_places_category_xy
            ON places(category, x, y);

        -- Reverse lookup from hashtag to places
        CREATE INDEX IF NOT EXISTS idx_place_hashtags_hashtag
            ON place_hashtags(hashtag_id);
        ",
    )
    .context("Failed to create database tables")?;

    // Record initial schema version if not already set
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    // Migration v2: region codes on places, for region-wide hashtag unions.
    run_migration(conn, 2, |c| {
        c.execute_batch(
            "ALTER TABLE places ADD COLUMN region_code INTEGER;
             CREATE INDEX IF NOT EXISTS idx_places_region ON places(region_code);",
        )
    })?;

    Ok(())
}

/// Run a migration if it hasn't been applied yet.
/// The migration function receives the connection and should execute its SQL.
fn run_migration<F>(conn: &Connection, version: i64, migrate: F) -> Result<()>
where
    F: FnOnce(&Connection) -> rusqlite::Result<()>,
{
    let already_applied: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM schema_version WHERE version = ?1",
        [version],
        |row| row.get(0),
    )?;

    if !already_applied {
        migrate(conn).with_context(|| format!("Migration v{version} failed"))?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
    }

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();

        let versions: Vec<i64> = conn
            .prepare("SELECT version FROM schema_version ORDER BY version")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(versions, vec![1, 2]);
    }

    #[test]
    fn test_table_count() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        // schema_version, places, hashtags, place_hashtags
        assert_eq!(table_count(&conn).unwrap(), 4);
    }

    #[test]
    fn test_migration_v2_adds_region_code() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn.execute(
            "INSERT INTO places (category, name, x, y, region_code) VALUES ('cafe', 'A', 1.0, 2.0, 7)",
            [],
        )
        .unwrap();
        let code: i64 = conn
            .query_row("SELECT region_code FROM places WHERE name = 'A'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(code, 7);
    }

    #[test]
    fn test_hashtag_text_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn.execute("INSERT INTO hashtags (text) VALUES ('#sea')", []).unwrap();
        assert!(conn
            .execute("INSERT INTO hashtags (text) VALUES ('#sea')", [])
            .is_err());
    }
}
