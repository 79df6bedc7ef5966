// Recommender: the caller-facing operations.
//
// Each operation resolves and validates its input, pulls rows from the
// PlaceStore, then hands off to the pure components (spatial filter, codec,
// aggregator, ranker). All store I/O happens before any ranking starts.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::db::models::{Category, PlaceSummary};
use crate::db::PlaceStore;
use crate::embeddings::codec;
use crate::error::{RecommendError, Result};
use crate::hashtags::frequency::{aggregate, AggregationMode, Decomposition, HashtagSummary};
use crate::hashtags::region::{resolve_region_code, union_region_hashtags};
use crate::ranking::config::{QueryMode, RankConfig, DEFAULT_MAX_TOP_K};
use crate::ranking::ranker::{CandidateVector, SimilarityRanker};
use crate::session::{CategoryHints, RequestContext};
use crate::spatial::{CandidateSet, Viewport, ViewportInput};

/// A tag-driven recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRequest {
    pub category: String,
    #[serde(default)]
    pub selected_hashtags: Vec<String>,
    #[serde(flatten)]
    pub viewport: ViewportInput,
    /// Falls back to the configured default, then clamps to the maximum.
    #[serde(default)]
    pub k: Option<usize>,
    #[serde(default)]
    pub query_mode: Option<QueryMode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecommendation {
    pub place_id: i64,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetail {
    pub id: i64,
    pub name: String,
    pub category: Category,
    pub x: f64,
    pub y: f64,
    pub address: Option<String>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub image_urls: Vec<String>,
    pub region_code: Option<u16>,
}

pub struct Recommender {
    store: Arc<dyn PlaceStore>,
    defaults: RankConfig,
    max_top_k: usize,
    hints: Arc<CategoryHints>,
}

impl Recommender {
    pub fn new(store: Arc<dyn PlaceStore>) -> Self {
        Self {
            store,
            defaults: RankConfig::default(),
            max_top_k: DEFAULT_MAX_TOP_K,
            hints: Arc::new(CategoryHints::new()),
        }
    }

    /// Build with the ranking defaults from the loaded config.
    pub fn from_config(store: Arc<dyn PlaceStore>, config: &Config) -> Self {
        Self::new(store)
            .with_defaults(config.rank_config())
            .with_max_top_k(config.max_top_k)
    }

    pub fn with_defaults(mut self, defaults: RankConfig) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_max_top_k(mut self, max_top_k: usize) -> Self {
        self.max_top_k = max_top_k;
        self
    }

    pub fn with_hints(mut self, hints: Arc<CategoryHints>) -> Self {
        self.hints = hints;
        self
    }

    pub fn store(&self) -> &Arc<dyn PlaceStore> {
        &self.store
    }

    pub fn hints(&self) -> &CategoryHints {
        &self.hints
    }

    /// The category this session last browsed, if any.
    pub fn category_hint(&self, ctx: &RequestContext) -> Option<Category> {
        self.hints.get(ctx)
    }

    /// Hashtags attached to in-viewport places of a category.
    pub async fn compute_hashtag_frequency(
        &self,
        category: &str,
        viewport: &ViewportInput,
        mode: AggregationMode,
        decomposition: Decomposition,
        ctx: &RequestContext,
    ) -> Result<HashtagSummary> {
        let category = resolve_category(category)?;
        let viewport = viewport.parse()?;
        self.hints.record(ctx, category);

        let candidates = self.candidates(category, &viewport).await?;
        if candidates.is_empty() {
            return Ok(aggregate(std::iter::empty(), mode, decomposition));
        }

        let rows = self.store.fetch_place_hashtags(&candidates.ids()).await?;
        let summary = aggregate(
            rows.iter()
                .filter(|row| candidates.contains(row.place_id))
                .map(|row| row.text.as_str()),
            mode,
            decomposition,
        );

        info!(
            category = %category,
            candidates = candidates.len(),
            hashtags = summary.len(),
            "Aggregated viewport hashtags"
        );
        Ok(summary)
    }

    /// Rank in-viewport places of a category by similarity to the selected tags.
    ///
    /// An empty viewport, unknown tags, or unusable embeddings all give an
    /// empty list rather than an error.
    pub async fn rank_by_hashtag_similarity(
        &self,
        request: &RankRequest,
        ctx: &RequestContext,
    ) -> Result<Vec<PlaceRecommendation>> {
        let category = resolve_category(&request.category)?;
        let viewport = request.viewport.parse()?;
        self.hints.record(ctx, category);

        let candidates = self.candidates(category, &viewport).await?;
        if candidates.is_empty() {
            debug!(category = %category, "No candidates in viewport");
            return Ok(Vec::new());
        }

        let queries = self.query_vectors(&request.selected_hashtags).await?;
        if queries.is_empty() {
            debug!(
                selected = request.selected_hashtags.len(),
                "No selected hashtag has a usable embedding"
            );
            return Ok(Vec::new());
        }

        let rows = self.store.fetch_place_hashtags(&candidates.ids()).await?;
        let mut vectors = Vec::with_capacity(rows.len());
        for row in rows {
            if !candidates.contains(row.place_id) {
                continue;
            }
            match codec::decode(&row.embedding) {
                Some(vector) => vectors.push(CandidateVector::new(row.place_id, vector)),
                None => debug!(
                    place_id = row.place_id,
                    hashtag_id = row.hashtag_id,
                    "Skipping malformed hashtag embedding"
                ),
            }
        }

        let config = self
            .defaults
            .with_top_k(request.k.unwrap_or(self.defaults.top_k).min(self.max_top_k))
            .with_query_mode(request.query_mode.unwrap_or(self.defaults.query_mode));
        let ranked = SimilarityRanker::new(config).rank(&queries, &vectors);
        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = ranked.iter().map(|r| r.place_id).collect();
        let records: HashMap<i64, PlaceSummary> = self
            .store
            .fetch_places_by_ids(&ids)
            .await?
            .iter()
            .map(|place| (place.id, PlaceSummary::from(place)))
            .collect();

        let recommendations: Vec<PlaceRecommendation> = ranked
            .into_iter()
            .filter_map(|r| {
                let place = records
                    .get(&r.place_id)
                    .or_else(|| candidates.get(r.place_id))?;
                Some(PlaceRecommendation {
                    place_id: r.place_id,
                    name: place.name.clone(),
                    x: place.x,
                    y: place.y,
                    similarity: r.similarity,
                })
            })
            .collect();

        info!(
            category = %category,
            candidates = candidates.len(),
            queries = queries.len(),
            results = recommendations.len(),
            "Ranked places by hashtag similarity"
        );
        Ok(recommendations)
    }

    /// Sorted union of hashtags across every category in the named region.
    pub async fn resolve_region_hashtags(&self, region_name: &str) -> Result<Vec<String>> {
        let code = resolve_region_code(region_name)?;
        let rows = self.store.fetch_region_hashtags(code.0).await?;
        let hashtags = union_region_hashtags(&rows);
        if hashtags.is_empty() {
            return Err(RecommendError::RegionNotFound {
                name: region_name.trim().to_string(),
                code: code.0,
            });
        }
        debug!(region = %code, hashtags = hashtags.len(), "Resolved region hashtags");
        Ok(hashtags)
    }

    /// Every place of a category inside the viewport, by id.
    pub async fn places_in_viewport(
        &self,
        category: &str,
        viewport: &ViewportInput,
        ctx: &RequestContext,
    ) -> Result<Vec<PlaceSummary>> {
        let category = resolve_category(category)?;
        let viewport = viewport.parse()?;
        self.hints.record(ctx, category);

        let candidates = self.candidates(category, &viewport).await?;
        Ok(candidates.places().cloned().collect())
    }

    /// Look a place up by name; exact matches win over partial ones.
    pub async fn place_detail(&self, name: &str) -> Result<PlaceDetail> {
        let place = self
            .store
            .fetch_place_by_name(name)
            .await?
            .ok_or_else(|| RecommendError::PlaceNotFound(name.trim().to_string()))?;

        Ok(PlaceDetail {
            image_urls: codec::decode_image_urls(place.image_url.as_deref()),
            id: place.id,
            name: place.name,
            category: place.category,
            x: place.x,
            y: place.y,
            address: place.address,
            open_time: place.open_time,
            close_time: place.close_time,
            region_code: place.region_code,
        })
    }

    async fn candidates(&self, category: Category, viewport: &Viewport) -> Result<CandidateSet> {
        let places = self.store.fetch_candidate_places(category, viewport).await?;
        Ok(CandidateSet::from_places(viewport, places))
    }

    /// Decode the embedding behind each selected tag. Tags that resolve to
    /// the same stored hashtag contribute one query.
    async fn query_vectors(&self, selected: &[String]) -> Result<Vec<Vec<f64>>> {
        let mut seen_ids = HashSet::new();
        let mut queries = Vec::new();
        for tag in selected {
            let Some(record) = self.store.fetch_hashtag_by_text(tag).await? else {
                debug!(tag = %tag, "Selected hashtag not found");
                continue;
            };
            if !seen_ids.insert(record.id) {
                continue;
            }
            match codec::decode(&record.embedding) {
                Some(vector) => queries.push(vector),
                None => debug!(
                    hashtag_id = record.id,
                    tag = %record.text,
                    "Skipping malformed query embedding"
                ),
            }
        }
        Ok(queries)
    }
}

fn resolve_category(name: &str) -> Result<Category> {
    Category::parse(name).ok_or_else(|| RecommendError::UnknownCategory(name.to_string()))
}
