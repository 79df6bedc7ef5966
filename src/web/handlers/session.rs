// GET /api/session/category: the category this session last browsed.
// Sessions without a hint (or requests without `x-session-id`) get null.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;

use crate::web::{request_context, AppState};

pub async fn get_category_hint(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let ctx = request_context(&headers);
    Json(serde_json::json!({
        "category": state.recommender.category_hint(&ctx),
    }))
}
