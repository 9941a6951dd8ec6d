// 목적:
// - HTTP 경계 모듈을 선언하고 라우터를 구성한다.
//
// 설명:
// - 라우트 등록과 요청 추적 레이어만 담당하며, 검색 로직은 core 계층에 둔다.
//
// 디자인 패턴:
// - 모듈 분리(Module Separation).
//
// 참조:
// - src_rs/api/handlers.rs
// - src_rs/api/errors.rs

pub mod errors;
pub mod handlers;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// 전체 HTTP 라우터를 만든다.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/search", get(handlers::scan_search))
        .route("/search/optimized", get(handlers::indexed_search))
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
