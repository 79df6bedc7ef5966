// Database queries: CRUD operations for all tables.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.
//
// Embeddings come back undecoded (RawEmbedding); validating them is the
// codec's job so that one bad row never fails a whole query here.

use anyhow::Result;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::models::{
    Category, HashtagRecord, Place, PlaceHashtagRow, PlaceSeed, PlaceSummary, RawEmbedding,
    RegionHashtagRow, StoreStats,
};
use crate::spatial::Viewport;

/// Stay well under SQLite's bound-parameter limit for `IN (...)` lists.
const MAX_IN_PARAMS: usize = 500;

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Category::parse(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown category {text:?}").into()))
    }
}

const PLACE_COLUMNS: &str =
    "id, name, category, x, y, address, open_time, close_time, image_url, region_code";

fn place_from_row(row: &Row<'_>) -> rusqlite::Result<Place> {
    Ok(Place {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        x: row.get(3)?,
        y: row.get(4)?,
        address: row.get(5)?,
        open_time: row.get(6)?,
        close_time: row.get(7)?,
        image_url: row.get(8)?,
        region_code: row.get(9)?,
    })
}

/// Whatever the embedding column holds, as an undecoded value. Never fails:
/// bytes that aren't UTF-8 come back as `Null` and get dropped downstream.
fn raw_embedding(value: ValueRef<'_>) -> RawEmbedding {
    match value {
        ValueRef::Null => RawEmbedding::Null,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => RawEmbedding::Text(text.to_string()),
            Err(_) => RawEmbedding::Null,
        },
        ValueRef::Integer(i) => RawEmbedding::Values(vec![i as f64]),
        ValueRef::Real(f) => RawEmbedding::Values(vec![f]),
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

// --- Writes (import) ---

/// Insert a place and return its id.
pub fn insert_place(conn: &Connection, category: Category, seed: &PlaceSeed) -> Result<i64> {
    conn.execute(
        "INSERT INTO places (category, name, x, y, address, open_time, close_time, image_url, region_code)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            category.as_str(),
            seed.name,
            seed.x,
            seed.y,
            seed.address,
            seed.open_time,
            seed.close_time,
            seed.image_url,
            seed.region_code,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert or update a hashtag by text and return its id.
///
/// A `None` embedding never overwrites an existing one. Linking a place to
/// an already-known tag shouldn't erase its vector.
pub fn upsert_hashtag(conn: &Connection, text: &str, embedding: Option<&str>) -> Result<i64> {
    let id = conn.query_row(
        "INSERT INTO hashtags (text, embedding) VALUES (?1, ?2)
         ON CONFLICT(text) DO UPDATE SET embedding = COALESCE(excluded.embedding, hashtags.embedding)
         RETURNING id",
        params![text, embedding],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Link a place to a hashtag. Re-linking an existing pair is a no-op.
pub fn link_place_hashtag(conn: &Connection, place_id: i64, hashtag_id: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO place_hashtags (place_id, hashtag_id) VALUES (?1, ?2)",
        params![place_id, hashtag_id],
    )?;
    Ok(())
}

// --- Places ---

/// Places of one category inside the viewport (inclusive), by id.
pub fn fetch_candidate_places(
    conn: &Connection,
    category: Category,
    viewport: &Viewport,
) -> Result<Vec<PlaceSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, x, y FROM places
         WHERE category = ?1
           AND x BETWEEN ?2 AND ?3
           AND y BETWEEN ?4 AND ?5
         ORDER BY id",
    )?;

    let rows = stmt.query_map(
        params![
            category.as_str(),
            viewport.min_x,
            viewport.max_x,
            viewport.min_y,
            viewport.max_y
        ],
        |row| {
            Ok(PlaceSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                x: row.get(2)?,
                y: row.get(3)?,
            })
        },
    )?;

    let mut places = Vec::new();
    for row in rows {
        places.push(row?);
    }
    Ok(places)
}

/// Full place records for the given ids, by id.
pub fn fetch_places_by_ids(conn: &Connection, ids: &[i64]) -> Result<Vec<Place>> {
    let mut places = Vec::new();
    for chunk in ids.chunks(MAX_IN_PARAMS) {
        let sql = format!(
            "SELECT {PLACE_COLUMNS} FROM places WHERE id IN ({}) ORDER BY id",
            placeholders(chunk.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(chunk.iter()), place_from_row)?;
        for row in rows {
            places.push(row?);
        }
    }
    places.sort_by_key(|p| p.id);
    Ok(places)
}

/// Look a place up by name: trimmed case-insensitive exact match first,
/// then the lowest-id partial match.
pub fn fetch_place_by_name(conn: &Connection, name: &str) -> Result<Option<Place>> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }

    let exact_sql = format!(
        "SELECT {PLACE_COLUMNS} FROM places
         WHERE lower(trim(name)) = lower(?1)
         ORDER BY id LIMIT 1"
    );
    let exact = conn
        .query_row(&exact_sql, params![name], place_from_row)
        .optional()?;
    if exact.is_some() {
        return Ok(exact);
    }

    let partial_sql = format!(
        "SELECT {PLACE_COLUMNS} FROM places
         WHERE instr(lower(name), lower(?1)) > 0
         ORDER BY id LIMIT 1"
    );
    let partial = conn
        .query_row(&partial_sql, params![name], place_from_row)
        .optional()?;
    Ok(partial)
}

// --- Hashtags ---

/// Every hashtag linked to any of the given places, with embeddings.
pub fn fetch_place_hashtags(conn: &Connection, place_ids: &[i64]) -> Result<Vec<PlaceHashtagRow>> {
    let mut out = Vec::new();
    for chunk in place_ids.chunks(MAX_IN_PARAMS) {
        let sql = format!(
            "SELECT ph.place_id, h.id, h.text, h.embedding
             FROM place_hashtags ph
             JOIN hashtags h ON h.id = ph.hashtag_id
             WHERE ph.place_id IN ({})
             ORDER BY ph.place_id, h.id",
            placeholders(chunk.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
            Ok(PlaceHashtagRow {
                place_id: row.get(0)?,
                hashtag_id: row.get(1)?,
                text: row.get(2)?,
                embedding: raw_embedding(row.get_ref(3)?),
            })
        })?;
        for row in rows {
            out.push(row?);
        }
    }
    Ok(out)
}

fn hashtag_from_row(row: &Row<'_>) -> rusqlite::Result<HashtagRecord> {
    Ok(HashtagRecord {
        id: row.get(0)?,
        text: row.get(1)?,
        embedding: raw_embedding(row.get_ref(2)?),
    })
}

/// Exact text match, else the lowest-id hashtag containing `text`
/// (case-insensitive).
pub fn fetch_hashtag_by_text(conn: &Connection, text: &str) -> Result<Option<HashtagRecord>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let exact = conn
        .query_row(
            "SELECT id, text, embedding FROM hashtags WHERE text = ?1",
            params![text],
            hashtag_from_row,
        )
        .optional()?;
    if exact.is_some() {
        return Ok(exact);
    }

    let partial = conn
        .query_row(
            "SELECT id, text, embedding FROM hashtags
             WHERE instr(lower(text), lower(?1)) > 0
             ORDER BY id LIMIT 1",
            params![text],
            hashtag_from_row,
        )
        .optional()?;
    Ok(partial)
}

/// Hashtags attached to any place in the region, tagged with the place's category.
pub fn fetch_region_hashtags(conn: &Connection, region_code: u16) -> Result<Vec<RegionHashtagRow>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT p.category, h.text
         FROM places p
         JOIN place_hashtags ph ON ph.place_id = p.id
         JOIN hashtags h ON h.id = ph.hashtag_id
         WHERE p.region_code = ?1
         ORDER BY p.category, h.text",
    )?;
    let rows = stmt.query_map(params![region_code], |row| {
        Ok(RegionHashtagRow {
            category: row.get(0)?,
            text: row.get(1)?,
        })
    })?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

// --- Stats ---

pub fn store_stats(conn: &Connection) -> Result<StoreStats> {
    let count = |table: &str| -> Result<i64> {
        let n = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(n)
    };
    Ok(StoreStats {
        places: count("places")?,
        hashtags: count("hashtags")?,
        links: count("place_hashtags")?,
    })
}
