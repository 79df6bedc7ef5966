// Place store trait: async interface over the place/hashtag data.
//
// Implementors: SqliteStore (wraps rusqlite). The methods are async so the
// web server and CLI share one `Arc<dyn PlaceStore>` regardless of backend.
//
// The trait mirrors the queries.rs function signatures.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{
    Category, HashtagRecord, Place, PlaceHashtagRow, PlaceSeed, PlaceSummary, RegionHashtagRow,
    StoreStats,
};
use crate::spatial::Viewport;

#[async_trait]
pub trait PlaceStore: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    /// Row counts for places, hashtags, and links.
    async fn stats(&self) -> Result<StoreStats>;

    // --- Import ---

    /// Insert a place and return its id.
    async fn insert_place(&self, category: Category, seed: &PlaceSeed) -> Result<i64>;

    /// Insert or update a hashtag (keyed by text) and return its id.
    async fn upsert_hashtag(&self, text: &str, embedding: Option<&str>) -> Result<i64>;

    /// Attach a hashtag to a place. Idempotent.
    async fn link_place_hashtag(&self, place_id: i64, hashtag_id: i64) -> Result<()>;

    // --- Places ---

    /// Places of one category inside the viewport, bounds inclusive.
    async fn fetch_candidate_places(
        &self,
        category: Category,
        viewport: &Viewport,
    ) -> Result<Vec<PlaceSummary>>;

    async fn fetch_places_by_ids(&self, ids: &[i64]) -> Result<Vec<Place>>;

    /// Exact (trimmed, case-insensitive) name match first, then partial.
    async fn fetch_place_by_name(&self, name: &str) -> Result<Option<Place>>;

    // --- Hashtags ---

    /// Hashtag links (with text and raw embedding) for a set of places.
    async fn fetch_place_hashtags(&self, place_ids: &[i64]) -> Result<Vec<PlaceHashtagRow>>;

    /// Exact text match first, then the lowest-id partial match.
    async fn fetch_hashtag_by_text(&self, text: &str) -> Result<Option<HashtagRecord>>;

    /// Hashtags linked to places in a region, across all categories.
    async fn fetch_region_hashtags(&self, region_code: u16) -> Result<Vec<RegionHashtagRow>>;
}
