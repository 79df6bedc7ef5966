// Web server: thin Axum JSON layer over the Recommender.
//
// Handlers do routing and marshaling only. Every domain error maps onto a
// status code through `RecommendError`'s IntoResponse impl:
// bad input → 400, not found → 404, store failure → 503.
//
// Sessions are whatever the client puts in the `x-session-id` header. They
// only key the per-session category hint; nothing here authenticates.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::db::PlaceStore;
use crate::error::{ErrorKind, RecommendError};
use crate::service::Recommender;
use crate::session::RequestContext;

pub mod handlers;

pub const SESSION_HEADER: &str = "x-session-id";

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn PlaceStore>) -> Self {
        let recommender = Recommender::from_config(store, &config);
        Self {
            recommender: Arc::new(recommender),
            config: Arc::new(config),
        }
    }
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(
    config: Config,
    store: Arc<dyn PlaceStore>,
    port: u16,
    bind: &str,
) -> Result<()> {
    let app = build_router(AppState::new(config, store));

    let addr = format!("{bind}:{port}");
    info!("placetag API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/maps/hashtags", post(handlers::maps::post_hashtags))
        .route("/api/maps/recommend", post(handlers::maps::post_recommend))
        .route("/api/maps/places", post(handlers::maps::post_places))
        .route(
            "/api/regions/{name}/hashtags",
            get(handlers::regions::get_region_hashtags),
        )
        .route("/api/places/{name}", get(handlers::places::get_place))
        .route(
            "/api/session/category",
            get(handlers::session::get_category_hint),
        );

    Router::new()
        .merge(api)
        .route("/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(SESSION_HEADER)]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check. Always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Build the request context from the session header, if present.
pub fn request_context(headers: &HeaderMap) -> RequestContext {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(RequestContext::for_session)
        .unwrap_or_default()
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str, kind: ErrorKind) -> Response {
    (
        status,
        axum::Json(serde_json::json!({ "error": message, "kind": kind.as_str() })),
    )
        .into_response()
}

impl IntoResponse for RecommendError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = match kind {
            ErrorKind::BadInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unavailable => {
                error!(error = %self, "Place store error");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        api_error(status, &self.to_string(), kind)
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use rusqlite::Connection;
    use tower::ServiceExt;

    use crate::db::models::{Category, PlaceSeed};
    use crate::db::schema::create_tables;
    use crate::db::sqlite::SqliteStore;

    async fn test_app() -> Router {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        let store = SqliteStore::new(conn);

        let seed = PlaceSeed {
            name: "Sea Cafe".to_string(),
            category: "cafe".to_string(),
            x: 1.0,
            y: 1.0,
            address: Some("12 Beach Rd".to_string()),
            open_time: None,
            close_time: None,
            image_url: Some(r#"["https://img/a.jpg"]["https://img/b.jpg"]"#.to_string()),
            region_code: Some(7),
            hashtags: vec![],
        };
        let place = store.insert_place(Category::Cafe, &seed).await.unwrap();
        let tag = store.upsert_hashtag("#ocean", Some("[1.0, 0.0]")).await.unwrap();
        store.link_place_hashtag(place, tag).await.unwrap();

        build_router(AppState::new(Config::default(), Arc::new(store)))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(SESSION_HEADER, "s1")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app().await;
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_recommend_with_string_bounds() {
        let app = test_app().await;
        let body = serde_json::json!({
            "category": "카페",
            "selected_hashtags": ["#ocean"],
            "min_x": "0", "min_y": 0, "max_x": "10", "max_y": 10.0
        });
        let (status, json) = send(app, post_json("/api/maps/recommend", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["results"][0]["name"], "Sea Cafe");
        assert_eq!(json["results"][0]["similarity"], 1.0);
    }

    #[tokio::test]
    async fn test_bad_bound_is_400() {
        let app = test_app().await;
        let body = serde_json::json!({
            "category": "cafe",
            "min_x": "west", "min_y": 0, "max_x": 10, "max_y": 10
        });
        let (status, json) = send(app, post_json("/api/maps/hashtags", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "bad_input");
    }

    #[tokio::test]
    async fn test_null_or_missing_bound_is_json_400() {
        let bounds = [
            serde_json::Value::Null,
            serde_json::json!(true),
            serde_json::json!([1]),
        ];
        for bound in bounds {
            let app = test_app().await;
            let body = serde_json::json!({
                "category": "cafe",
                "min_x": bound, "min_y": 0, "max_x": 10, "max_y": 10
            });
            let (status, json) = send(app, post_json("/api/maps/hashtags", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["kind"], "bad_input");
        }

        let app = test_app().await;
        let body = serde_json::json!({
            "category": "cafe",
            "selected_hashtags": ["#ocean"],
            "min_x": 0, "min_y": 0, "max_x": 10
        });
        let (status, json) = send(app, post_json("/api/maps/recommend", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("max_y"));
    }

    #[tokio::test]
    async fn test_hashtags_frequency() {
        let app = test_app().await;
        let body = serde_json::json!({
            "category": "cafe",
            "min_x": 0, "min_y": 0, "max_x": 10, "max_y": 10
        });
        let (status, json) = send(app, post_json("/api/maps/hashtags", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["hashtags"][0]["tag"], "#ocean");
        assert_eq!(json["hashtags"][0]["count"], 1);
    }

    #[tokio::test]
    async fn test_region_routes() {
        let app = test_app().await;
        let req = Request::builder()
            .uri("/api/regions/jeju/hashtags")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["hashtags"], serde_json::json!(["#ocean"]));

        let req = Request::builder()
            .uri("/api/regions/seoul/hashtags")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["kind"], "not_found");

        let req = Request::builder()
            .uri("/api/regions/atlantis/hashtags")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("atlantis"));
    }

    #[tokio::test]
    async fn test_place_detail_route() {
        let app = test_app().await;
        let req = Request::builder()
            .uri("/api/places/sea%20cafe")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["image_urls"],
            serde_json::json!(["https://img/a.jpg", "https://img/b.jpg"])
        );

        let req = Request::builder()
            .uri("/api/places/nowhere")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_category_hint() {
        let app = test_app().await;
        let body = serde_json::json!({
            "category": "cafe",
            "min_x": 0, "min_y": 0, "max_x": 10, "max_y": 10
        });
        let (status, _) = send(app.clone(), post_json("/api/maps/places", body)).await;
        assert_eq!(status, StatusCode::OK);

        let req = Request::builder()
            .uri("/api/session/category")
            .header(SESSION_HEADER, "s1")
            .body(Body::empty())
            .unwrap();
        let (_, json) = send(app.clone(), req).await;
        assert_eq!(json["category"], "cafe");

        let req = Request::builder()
            .uri("/api/session/category")
            .body(Body::empty())
            .unwrap();
        let (_, json) = send(app, req).await;
        assert!(json["category"].is_null());
    }
}
