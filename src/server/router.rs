use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{health, review};
use crate::state::AppState;

/// Creates the application router.
///
/// - `POST /`: report (PDF download)
/// - `POST /answer`: two-phase answer (JSON)
/// - `GET /health`
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state);
    Router::new()
        .route("/", post(review::report))
        .route("/answer", post(review::answer))
        .route("/health", get(health::health))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins = resolve_allowed_origins(&state.config.server.cors_allowed_origins)
        .into_iter()
        .filter_map(|origin| HeaderValue::from_str(&origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION])
}

fn resolve_allowed_origins(configured: &[String]) -> Vec<String> {
    let origins = configured
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect::<Vec<_>>();

    if origins.is_empty() {
        return default_local_origins();
    }

    origins
}

fn default_local_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://127.0.0.1".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::core::config::{AppConfig, RenderConfig};
    use crate::report::render::{NativePdfRenderer, PageGeometry};
    use crate::review::testing::{record, Reply, ScriptedCompleter, ScriptedEmbedder, StaticIndex};

    fn app(completer: ScriptedCompleter) -> Router {
        let index = StaticIndex::new().with(
            "prior_patent",
            vec![record("P1", json!({"registration": "R1", "name": "Spring Widget"}))],
        );
        let renderer = NativePdfRenderer::new(PageGeometry::from_config(&RenderConfig::default()).unwrap());
        let state = AppState::from_parts(
            AppConfig::default(),
            Arc::new(ScriptedEmbedder::new(vec![0.1, 0.9])),
            Arc::new(index),
            Arc::new(completer),
            Arc::new(renderer),
        );
        router(state)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn submission() -> Value {
        json!({
            "date": "2024-01-01",
            "organization": "Acme",
            "name": "Jane Doe",
            "description": "A widget with a spring"
        })
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn report_route_returns_a_pdf_attachment() {
        let app = app(ScriptedCompleter::texts(&["Likely registrable."]));

        let response = app.oneshot(post_json("/", submission())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=report.pdf"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn zero_choices_is_a_structured_bad_gateway() {
        let app = app(ScriptedCompleter::new(vec![Reply::NoChoices]));

        let response = app.oneshot(post_json("/", submission())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "completion_error");
        assert!(body["error"].as_str().unwrap().contains("no choices"));
    }

    #[tokio::test]
    async fn korean_submission_reports_native_render_limit() {
        let app = app(ScriptedCompleter::texts(&["등록 가능성이 높습니다."]));
        let mut body = submission();
        body["name"] = json!("홍길동");

        let response = app.oneshot(post_json("/", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "render_error");
        assert!(body["error"].as_str().unwrap().contains("render.backend"));
    }

    #[tokio::test]
    async fn answer_route_returns_assistant_message() {
        let app = app(ScriptedCompleter::texts(&["tech", "law"]));

        let response = app.oneshot(post_json("/answer", submission())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body, json!({"role": "assistant", "content": "law"}));
    }

    #[tokio::test]
    async fn non_object_body_is_rejected() {
        let app = app(ScriptedCompleter::texts(&["x"]));

        let response = app.oneshot(post_json("/", json!([1, 2]))).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["kind"], "invalid_submission");
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let app = app(ScriptedCompleter::texts(&["x"]));
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["kind"], "bad_request");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = app(ScriptedCompleter::texts(&["x"]));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"status": "ok"}));
    }

    #[test]
    fn blank_origin_list_falls_back_to_local_defaults() {
        assert_eq!(resolve_allowed_origins(&[" ".to_string()]), default_local_origins());
        assert_eq!(
            resolve_allowed_origins(&["https://review.example.com".to_string()]),
            vec!["https://review.example.com".to_string()]
        );
    }
}
