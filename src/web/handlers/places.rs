// GET /api/places/{name}: place detail by name (exact match preferred).

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::web::AppState;

pub async fn get_place(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.recommender.place_detail(&name).await {
        Ok(detail) => Json(detail).into_response(),
        Err(e) => e.into_response(),
    }
}
