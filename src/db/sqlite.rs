// SqliteStore: rusqlite backend implementing the PlaceStore trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Send.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across .await points.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{
    Category, HashtagRecord, Place, PlaceHashtagRow, PlaceSeed, PlaceSummary, RegionHashtagRow,
    StoreStats,
};
use super::traits::PlaceStore;
use crate::spatial::Viewport;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl PlaceStore for SqliteStore {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock().await;
        super::queries::store_stats(&conn)
    }

    async fn insert_place(&self, category: Category, seed: &PlaceSeed) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::insert_place(&conn, category, seed)
    }

    async fn upsert_hashtag(&self, text: &str, embedding: Option<&str>) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::upsert_hashtag(&conn, text, embedding)
    }

    async fn link_place_hashtag(&self, place_id: i64, hashtag_id: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::link_place_hashtag(&conn, place_id, hashtag_id)
    }

    async fn fetch_candidate_places(
        &self,
        category: Category,
        viewport: &Viewport,
    ) -> Result<Vec<PlaceSummary>> {
        let conn = self.conn.lock().await;
        super::queries::fetch_candidate_places(&conn, category, viewport)
    }

    async fn fetch_places_by_ids(&self, ids: &[i64]) -> Result<Vec<Place>> {
        let conn = self.conn.lock().await;
        super::queries::fetch_places_by_ids(&conn, ids)
    }

    async fn fetch_place_by_name(&self, name: &str) -> Result<Option<Place>> {
        let conn = self.conn.lock().await;
        super::queries::fetch_place_by_name(&conn, name)
    }

    async fn fetch_place_hashtags(&self, place_ids: &[i64]) -> Result<Vec<PlaceHashtagRow>> {
        let conn = self.conn.lock().await;
        super::queries::fetch_place_hashtags(&conn, place_ids)
    }

    async fn fetch_hashtag_by_text(&self, text: &str) -> Result<Option<HashtagRecord>> {
        let conn = self.conn.lock().await;
        super::queries::fetch_hashtag_by_text(&conn, text)
    }

    async fn fetch_region_hashtags(&self, region_code: u16) -> Result<Vec<RegionHashtagRow>> {
        let conn = self.conn.lock().await;
        super::queries::fetch_region_hashtags(&conn, region_code)
    }
}
