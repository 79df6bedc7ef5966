// GET /api/regions/{name}/hashtags: union of hashtags across every category
// of places in the named region. Unknown names are 400; a known region with
// no hashtags is 404.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::web::AppState;

pub async fn get_region_hashtags(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    match state.recommender.resolve_region_hashtags(&name).await {
        Ok(hashtags) => Json(serde_json::json!({
            "region": name,
            "hashtags": hashtags,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}
