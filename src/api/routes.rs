//! API Routes
//!
//! Configures the Axum router with all verdict service endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_clear_handler, cache_stats_handler, health_handler, quota_handler, verdict_handler,
    AppState,
};

/// Path prefix shared by the versioned endpoints
pub const API_PREFIX: &str = "/api/happyScroll/v1";

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /api/happyScroll/v1/verdict` - Combined safety verdict for a video
/// - `GET /api/happyScroll/v1/cache/stats` - Cache effectiveness
/// - `POST /api/happyScroll/v1/cache/clear` - Drop every cached verdict
/// - `GET /api/happyScroll/v1/quota` - Daily quota usage
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin, so browser extensions can call the API
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/verdict", post(verdict_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache/clear", post(cache_clear_handler))
        .route("/quota", get(quota_handler));

    Router::new()
        .nest(API_PREFIX, api)
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        create_router(AppState::from_config(&Config::default()))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = create_test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/happyScroll/v1/cache/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_verdict_rejects_non_youtube_url() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/happyScroll/v1/verdict")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"video_url":"https://example.com/video"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_verdict_rejects_malformed_json() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/happyScroll/v1/verdict")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_verdict_requires_post() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/happyScroll/v1/verdict")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
