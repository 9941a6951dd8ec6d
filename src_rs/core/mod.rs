// 목적:
// - 핵심 런타임 계층 모듈을 선언한다.
//
// 설명:
// - 동기화/검색 라우팅과 공통 오류 모델, 데이터 타입을 분리해 유지보수성을 높인다.
//
// 디자인 패턴:
// - 명시적 오류 모델(Explicit Error Model).
//
// 참조:
// - src_rs/core/errors.rs
// - src_rs/core/index_sync.rs
// - src_rs/core/query_router.rs

pub mod backend;
pub mod config;
pub mod errors;
pub mod index_sync;
pub mod model;
pub mod query_router;
pub mod response;
