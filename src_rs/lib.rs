// 목적:
// - 레코드 검색 서비스 라이브러리의 진입점을 제공한다.
//
// 설명:
// - PostgreSQL 직접 스캔(scan 모드)과 Elasticsearch 미러 조회(indexed 모드)를 제공한다.
// - 시작 시 1회 동기화가 PostgreSQL 레코드를 Elasticsearch로 미러링한다.
//
// 디자인 패턴:
// - 계층형 모듈 구조(api/core/index).
//
// 참조:
// - src_rs/core/index_sync.rs
// - src_rs/core/query_router.rs

pub mod api;
pub mod core;
pub mod index;
