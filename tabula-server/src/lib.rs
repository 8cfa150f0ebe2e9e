//! Thin HTTP surface over the query engine.
//!
//! One route: `POST /tables/:table/query` binds a JSON [`TableRequest`],
//! hands it to the engine and maps the outcome's status classification onto
//! an HTTP status code. No routing logic lives anywhere else.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use tabula_core::{Status, TableRequest, TableResult};
use tabula_query::{Backend, Engine};
use tower_http::trace::TraceLayer;

pub fn router<B: Backend + 'static>(engine: Arc<Engine<B>>) -> Router {
    Router::new()
        .route("/tables/:table/query", post(query_table::<B>))
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

pub fn status_code(status: Status) -> StatusCode {
    match status {
        Status::Ok => StatusCode::OK,
        Status::BadRequest => StatusCode::BAD_REQUEST,
        Status::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn query_table<B: Backend + 'static>(
    State(engine): State<Arc<Engine<B>>>,
    Path(table): Path<String>,
    Json(req): Json<TableRequest>,
) -> (StatusCode, Json<TableResult>) {
    let (result, status) = engine.fetch_result(&table, &req).await;
    (status_code(status), Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tabula_core::Value;
    use tabula_query::MemoryBackend;
    use tower::ServiceExt;

    fn app() -> Router {
        let backend = MemoryBackend::new();
        backend.create_table("files", &[("name", "TEXT"), ("size", "INT8")]);
        backend
            .insert(
                "files",
                vec![Value::String("report.doc".into()), Value::Int(420)],
            )
            .unwrap();
        router(Arc::new(Engine::new(backend)))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_query_ok() {
        let response = app()
            .oneshot(post_json(
                "/tables/files/query",
                r#"{"page": 1, "perPage": 10}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let result: TableResult = serde_json::from_slice(&body).unwrap();
        assert!(result.success);
        assert_eq!(result.data.total, 1);
        assert_eq!(result.data.rows[0]["name"], Value::String("report.doc".into()));
    }

    #[tokio::test]
    async fn test_validation_maps_to_400() {
        let response = app()
            .oneshot(post_json(
                "/tables/files/query",
                r#"{"page": 0, "perPage": 10}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let result: TableResult = serde_json::from_slice(&body).unwrap();
        assert!(!result.success);
        assert!(result.error.is_some());
        assert!(result.data.rows.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_table_maps_to_500() {
        let response = app()
            .oneshot(post_json(
                "/tables/nope/query",
                r#"{"page": 1, "perPage": 10}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
