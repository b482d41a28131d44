use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use super::types::{ApiResponse, LimitQuery, QaRequest};
use super::AppState;
use crate::graph::{GraphView, Recommendation};
use crate::qa::QaAnswer;

/// Frontends sometimes send a stringified JS object instead of a name.
fn is_invalid_name(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name.starts_with("[object")
}

/// `GET /api/graph-data[?limit=]`
pub async fn graph_data(State(state): State<AppState>, Query(query): Query<LimitQuery>) -> Response {
    let limit = match query.limit.as_deref().map(str::trim) {
        None | Some("") => state.default_limit,
        Some(raw) => match raw.parse::<usize>() {
            Ok(limit) => limit,
            Err(_) => {
                return ApiResponse::bad_request(
                    GraphView::default(),
                    format!("Invalid limit: {}", raw),
                )
                .into_response();
            }
        },
    };

    log::debug!("Top graph view, limit {}", limit);
    ApiResponse::ok(state.graph.top(limit)).into_response()
}

/// `GET /api/graph-data/full`
pub async fn full_graph(State(state): State<AppState>) -> Response {
    ApiResponse::ok(state.graph.full()).into_response()
}

/// `GET /api/graph-data/entity/{entity}`
pub async fn entity_graph(State(state): State<AppState>, Path(entity): Path<String>) -> Response {
    if is_invalid_name(&entity) {
        return ApiResponse::bad_request(GraphView::default(), "Invalid entity name").into_response();
    }
    ApiResponse::ok(state.graph.entity_view(&entity)).into_response()
}

/// `GET /api/graph-data/entity/fuzzy/{keyword}`
pub async fn fuzzy_graph(State(state): State<AppState>, Path(keyword): Path<String>) -> Response {
    if is_invalid_name(&keyword) {
        return ApiResponse::bad_request(GraphView::default(), "Keyword must not be empty")
            .into_response();
    }
    match state.graph.fuzzy_view(&keyword) {
        Ok(view) => ApiResponse::ok(view).into_response(),
        Err(e) => ApiResponse::bad_request(GraphView::default(), e.to_string()).into_response(),
    }
}

/// `GET /api/entities`
pub async fn entities(State(state): State<AppState>) -> Response {
    ApiResponse::ok(state.graph.entities()).into_response()
}

/// `POST /api/qa`
pub async fn qa(State(state): State<AppState>, Json(request): Json<QaRequest>) -> Response {
    let question = request.question.trim();
    if question.is_empty() {
        return ApiResponse::<Option<QaAnswer>>::bad_request(None, "Question must not be empty")
            .into_response();
    }
    let answer = state.assistant.answer(question, request.mode).await;
    ApiResponse::ok(Some(answer)).into_response()
}

/// `GET /api/recommendations/{entity}`
pub async fn recommendations(State(state): State<AppState>, Path(entity): Path<String>) -> Response {
    if is_invalid_name(&entity) {
        return ApiResponse::<Vec<Recommendation>>::bad_request(Vec::new(), "Entity must not be empty")
            .into_response();
    }
    let recs = state
        .graph
        .recommendations(&entity, state.assistant.recommendation_limit());
    ApiResponse::ok(recs).into_response()
}

/// `GET /api/learning-path/{entity}`
pub async fn learning_path(State(state): State<AppState>, Path(entity): Path<String>) -> Response {
    if is_invalid_name(&entity) {
        return ApiResponse::<Option<Value>>::bad_request(None, "Entity must not be empty")
            .into_response();
    }
    let path = state.assistant.learning_path(&entity).await;
    ApiResponse::ok(Some(path)).into_response()
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "frontkg",
            "version": env!("CARGO_PKG_VERSION"),
            "entities": state.graph.node_count(),
            "relations": state.graph.edge_count(),
        })),
    )
        .into_response()
}
