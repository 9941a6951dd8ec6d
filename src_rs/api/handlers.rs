// 목적:
// - 검색/상태 HTTP 핸들러와 공유 상태를 제공한다.
//
// 설명:
// - 핸들러는 쿼리 파라미터를 꺼내 QueryRouter에 위임하는 얇은 래퍼다.
// - indexed 모드의 인덱스 실패는 200 + {"error": ...}로 본문 안에서 보고한다.
// - /ready는 시작 시 동기화 작업의 상태를 그대로 노출한다.
//
// 디자인 패턴:
// - 파사드(Facade).
//
// 참조:
// - src_rs/core/query_router.rs
// - src_rs/core/index_sync.rs

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::watch;

use crate::api::errors::ApiError;
use crate::core::index_sync::SyncState;
use crate::core::model::{IndexedOutcome, SearchResponse};
use crate::core::query_router::QueryRouter;

#[derive(Clone)]
pub struct AppState {
    pub router: QueryRouter,
    pub sync_state: watch::Receiver<SyncState>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// GET /search
///
/// `query`가 없거나 비어 있으면 400이다. 공백만 있는 검색어도 의도적으로 400으로 거부한다.
pub async fn scan_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let response = state.router.scan_search(params.query.as_deref()).await?;
    Ok(Json(response))
}

/// GET /search/optimized
///
/// 검색어 검증은 /search와 같다(공백만 있는 검색어도 400).
pub async fn indexed_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let outcome = state.router.indexed_search(params.query.as_deref()).await?;

    let response = match outcome {
        IndexedOutcome::Found(response) => Json(response).into_response(),
        IndexedOutcome::Unavailable { message, .. } => {
            Json(json!({ "error": message })).into_response()
        }
    };
    Ok(response)
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

/// GET /ready
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<SyncState>) {
    let current = state.sync_state.borrow().clone();
    let status = if current.is_completed() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(current))
}
