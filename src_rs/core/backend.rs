// 목적:
// - 기본 저장소와 검색 인덱스에 대한 좁은 능력 인터페이스를 정의한다.
//
// 설명:
// - 동기화기/라우터는 구체 클라이언트가 아니라 이 trait에만 의존한다.
// - 테스트에서는 메모리 구현으로 두 백엔드를 각각 대체한다.
// - 전체 스캔은 스트림으로 제공해 테이블 전체를 메모리에 올리지 않는다.
//
// 디자인 패턴:
// - 포트/어댑터(Ports and Adapters).
//
// 참조:
// - src_rs/index/postgres_repo.rs
// - src_rs/index/elastic.rs

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::core::errors::CoreResult;
use crate::core::model::Record;

/// 전체 스캔에서 읽힌 한 행. 행 단위 디코딩 실패는 내부 Err로 전달된다.
pub type ScannedRow = CoreResult<Record>;

/// 전체 스캔 스트림. 바깥 Err는 저장소 접근 자체의 실패이며 스캔을 중단시킨다.
pub type RowStream<'a> = BoxStream<'a, CoreResult<ScannedRow>>;

/// 스키마 생성 결과. 이미 존재하는 경우도 성공이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    Created,
    AlreadyExists,
}

/// 기본 저장소(읽기 전용).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 전체 레코드를 저장소 순서대로 스트리밍한다.
    fn scan_all(&self) -> RowStream<'_>;

    /// text에 term을 대소문자 구분 없이 부분 문자열로 포함하는 레코드를 반환한다.
    async fn scan_matching(&self, term: &str) -> CoreResult<Vec<Record>>;
}

/// 파생 캐시인 검색 인덱스.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn ensure_schema(&self) -> CoreResult<SchemaOutcome>;

    /// id를 문서 식별자로 사용해 덮어쓴다.
    /// 인덱스에 도달하지 못하면 CoreError::Connection, 문서가 거부되면 CoreError::Http다.
    async fn upsert(&self, record: &Record) -> CoreResult<()>;

    /// 관련도 순으로 최대 max_results건을 반환한다.
    async fn query(&self, term: &str, max_results: usize) -> CoreResult<Vec<Record>>;

    /// 최근 쓰기를 검색 가능 상태로 만든다.
    async fn refresh(&self) -> CoreResult<()>;

    async fn document_count(&self) -> CoreResult<u64>;
}
