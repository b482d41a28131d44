//! HTTP API over the knowledge graph and the assistant.

pub mod handlers;
pub mod types;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{KgError, Result};
use crate::graph::KnowledgeGraph;
use crate::qa::Assistant;

pub use types::ApiResponse;

/// Check if a port is available by attempting to bind to it
async fn check_port_available(host: &str, port: u16) -> bool {
    tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .is_ok()
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub graph: Arc<KnowledgeGraph>,
    pub assistant: Arc<Assistant>,
    pub default_limit: usize,
}

/// HTTP API server
pub struct HttpServer {
    state: AppState,
    host: String,
    port: u16,
    allowed_origins: Vec<String>,
}

impl HttpServer {
    pub fn new(graph: Arc<KnowledgeGraph>, assistant: Arc<Assistant>, config: &Config) -> Self {
        Self {
            state: AppState {
                graph,
                assistant,
                default_limit: config.graph.default_limit,
            },
            host: config.http_server.host.clone(),
            port: config.http_server.port,
            allowed_origins: config.http_server.allowed_origins.clone(),
        }
    }

    /// Run the HTTP server until the process is stopped
    pub async fn run(&self) -> Result<()> {
        let app = self.create_router();
        let addr = format!("{}:{}", self.host, self.port);

        if !check_port_available(&self.host, self.port).await {
            return Err(KgError::Config(format!(
                "Port {} is already in use. Stop the other process or set http_server.port in config.toml",
                self.port
            )));
        }

        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            KgError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to bind to {}: {}", addr, e),
            ))
        })?;

        log::info!("frontkg API listening on http://{}", addr);
        log::info!("Graph endpoint: http://{}/api/graph-data", addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| KgError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP server error: {}", e),
            )))?;

        Ok(())
    }

    /// Create the axum router
    pub fn create_router(&self) -> Router {
        build_router(self.state.clone(), &self.allowed_origins)
    }
}

/// Routes, CORS and tracing around `state`.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    // No configured origins means local development: allow any
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let api = Router::new()
        .route("/graph-data", get(handlers::graph_data))
        .route("/graph-data/full", get(handlers::full_graph))
        .route("/graph-data/entity/:entity", get(handlers::entity_graph))
        .route("/graph-data/entity/fuzzy/:keyword", get(handlers::fuzzy_graph))
        .route("/qa", post(handlers::qa))
        .route("/entities", get(handlers::entities))
        .route("/recommendations/:entity", get(handlers::recommendations))
        .route("/learning-path/:entity", get(handlers::learning_path));

    Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use crate::qa::test_support::{sample_graph, StubModel};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn router(model: Arc<StubModel>) -> Router {
        let graph = sample_graph();
        let assistant = Arc::new(Assistant::new(graph.clone(), model, &LlmConfig::default(), 5));
        build_router(
            AppState {
                graph,
                assistant,
                default_limit: 3,
            },
            &[],
        )
    }

    async fn get_json(app: Router, uri: &str) -> Value {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> Value {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_graph_data_default_limit() {
        let body = get_json(router(StubModel::failing()), "/api/graph-data").await;
        assert_eq!(body["code"], 200);
        assert_eq!(body["msg"], "success");
        assert_eq!(body["data"]["nodes"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_graph_data_explicit_limit() {
        let body = get_json(router(StubModel::failing()), "/api/graph-data?limit=1").await;
        let nodes = body["data"]["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0]["id"], "Vue");
    }

    #[tokio::test]
    async fn test_graph_data_bad_limit() {
        let body = get_json(router(StubModel::failing()), "/api/graph-data?limit=lots").await;
        assert_eq!(body["code"], 400);
    }

    #[tokio::test]
    async fn test_full_graph() {
        let body = get_json(router(StubModel::failing()), "/api/graph-data/full").await;
        assert_eq!(body["data"]["nodes"].as_array().unwrap().len(), 6);
        assert_eq!(body["data"]["edges"].as_array().unwrap().len(), 5);
        assert_eq!(body["data"]["edges"][0]["label"], "evolves_to");
    }

    #[tokio::test]
    async fn test_entity_graph_decodes_path() {
        let body = get_json(
            router(StubModel::failing()),
            "/api/graph-data/entity/Composition%20API",
        )
        .await;
        assert_eq!(body["code"], 200);
        let nodes = body["data"]["nodes"].as_array().unwrap();
        assert_eq!(nodes[0]["id"], "Composition API");
        assert_eq!(nodes.len(), 2);
    }

    #[tokio::test]
    async fn test_entity_graph_rejects_object_string() {
        let body = get_json(
            router(StubModel::failing()),
            "/api/graph-data/entity/%5Bobject%20Object%5D",
        )
        .await;
        assert_eq!(body["code"], 400);
        assert!(body["data"]["nodes"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fuzzy_graph() {
        let body = get_json(router(StubModel::failing()), "/api/graph-data/entity/fuzzy/jsx").await;
        assert_eq!(body["code"], 200);
        let ids: Vec<_> = body["data"]["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["JSX", "React"]);
    }

    #[tokio::test]
    async fn test_fuzzy_graph_rejects_object_string() {
        let body = get_json(
            router(StubModel::failing()),
            "/api/graph-data/entity/fuzzy/%5Bobject%20Object%5D",
        )
        .await;
        assert_eq!(body["code"], 400);
        assert!(body["data"]["nodes"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entities() {
        let body = get_json(router(StubModel::failing()), "/api/entities").await;
        assert_eq!(body["data"][0], "Vue");
        assert_eq!(body["data"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_qa_fallback_is_success() {
        let body = post_json(
            router(StubModel::failing()),
            "/api/qa",
            serde_json::json!({"question": "What is React?", "mode": "deep"}),
        )
        .await;
        assert_eq!(body["code"], 200);
        assert!(body["data"]["answer"].as_str().unwrap().contains("<strong>uses</strong>"));
        assert_eq!(body["data"]["related_entities"][0], "React");
    }

    #[tokio::test]
    async fn test_qa_empty_question() {
        let body = post_json(
            router(StubModel::failing()),
            "/api/qa",
            serde_json::json!({"question": "   "}),
        )
        .await;
        assert_eq!(body["code"], 400);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_recommendations() {
        let body = get_json(router(StubModel::failing()), "/api/recommendations/Vue").await;
        let recs = body["data"].as_array().unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0]["entity"], "Vue3");
        assert_eq!(recs[0]["weight"], 9);
    }

    #[tokio::test]
    async fn test_learning_path_route() {
        let model = StubModel::replying("{\"prerequisites\":[],\"core\":[{\"name\":\"Vue\"}],\"next_steps\":[]}");
        let body = get_json(router(model), "/api/learning-path/Vue").await;
        assert_eq!(body["code"], 200);
        assert_eq!(body["data"]["core"][0]["name"], "Vue");
    }

    #[tokio::test]
    async fn test_health() {
        let body = get_json(router(StubModel::failing()), "/health").await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["relations"], 5);
    }
}
