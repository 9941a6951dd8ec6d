// 목적:
// - 외부 백엔드 어댑터 계층 모듈을 선언한다.
//
// 설명:
// - SQL 유틸, PostgreSQL 레코드 저장소, Elasticsearch 인덱스 구현을 분리한다.
//
// 디자인 패턴:
// - 저장소 패턴(Repository Pattern) + 어댑터(Adapter).
//
// 참조:
// - src_rs/index/sql.rs
// - src_rs/index/postgres_repo.rs
// - src_rs/index/elastic.rs

pub mod elastic;
pub mod postgres_repo;
pub mod sql;
