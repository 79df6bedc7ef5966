// Viewport handlers.
//
// POST /api/maps/hashtags: hashtag aggregation for a category + viewport
// POST /api/maps/recommend: tag-driven similarity ranking
// POST /api/maps/places: plain listing of in-viewport places
//
// Bounds may be numbers or numeric strings; both are flattened into the
// request body next to `category`.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::hashtags::frequency::{AggregationMode, Decomposition, HashtagSummary};
use crate::service::RankRequest;
use crate::spatial::ViewportInput;
use crate::web::{request_context, AppState};

#[derive(Deserialize)]
pub struct HashtagsBody {
    pub category: String,
    #[serde(flatten)]
    pub viewport: ViewportInput,
    #[serde(default)]
    pub mode: AggregationMode,
    #[serde(default)]
    pub decomposition: Decomposition,
}

#[derive(Deserialize)]
pub struct PlacesBody {
    pub category: String,
    #[serde(flatten)]
    pub viewport: ViewportInput,
}

/// POST /api/maps/hashtags
pub async fn post_hashtags(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<HashtagsBody>,
) -> Response {
    let ctx = request_context(&headers);
    let summary = match state
        .recommender
        .compute_hashtag_frequency(
            &body.category,
            &body.viewport,
            body.mode,
            body.decomposition,
            &ctx,
        )
        .await
    {
        Ok(summary) => summary,
        Err(e) => return e.into_response(),
    };

    let hashtags = match &summary {
        HashtagSummary::Ranked(counts) => serde_json::to_value(counts).unwrap_or_default(),
        HashtagSummary::Unique(_) => serde_json::json!(summary.tags()),
    };

    Json(serde_json::json!({
        "category": body.category,
        "mode": body.mode,
        "hashtags": hashtags,
    }))
    .into_response()
}

/// POST /api/maps/recommend
pub async fn post_recommend(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RankRequest>,
) -> Response {
    let ctx = request_context(&headers);
    match state.recommender.rank_by_hashtag_similarity(&request, &ctx).await {
        Ok(results) => Json(serde_json::json!({
            "category": request.category,
            "results": results,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/maps/places
pub async fn post_places(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<PlacesBody>,
) -> Response {
    let ctx = request_context(&headers);
    match state
        .recommender
        .places_in_viewport(&body.category, &body.viewport, &ctx)
        .await
    {
        Ok(places) => Json(serde_json::json!({ "places": places })).into_response(),
        Err(e) => e.into_response(),
    }
}
