// 목적:
// - 검색 요청을 검증하고 정확히 하나의 백엔드로 분기한다.
//
// 설명:
// - scan 모드는 기본 저장소를, indexed 모드는 검색 인덱스를 사용한다.
// - indexed 모드 실패는 오류가 아니라 IndexedOutcome::Unavailable 값으로 돌려준다.
// - 한 모드의 실패를 다른 모드 결과로 대체하지 않는다.
// - 모든 백엔드 호출은 제한 시간 안에서만 실행되며, 초과 시 future를 버린다.
//
// 디자인 패턴:
// - 라우터(Router) + 의존성 주입(Dependency Injection).
//
// 참조:
// - src_rs/core/backend.rs
// - src_rs/core/response.rs

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::core::backend::{RecordStore, SearchIndex};
use crate::core::errors::{CoreError, CoreResult};
use crate::core::model::{IndexedOutcome, SearchQuery, SearchResponse, UnavailableReason};
use crate::core::response::assemble;

pub const DEFAULT_INDEXED_MAX_RESULTS: usize = 100;
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(5_000);

const INDEX_UNAVAILABLE_MESSAGE: &str = "Elasticsearch search failed";
const INDEX_TIMEOUT_MESSAGE: &str = "Elasticsearch search timed out";

#[derive(Clone)]
pub struct QueryRouter {
    store: Arc<dyn RecordStore>,
    index: Arc<dyn SearchIndex>,
    max_results: usize,
    deadline: Duration,
}

impl QueryRouter {
    pub fn new(store: Arc<dyn RecordStore>, index: Arc<dyn SearchIndex>) -> Self {
        Self {
            store,
            index,
            max_results: DEFAULT_INDEXED_MAX_RESULTS,
            deadline: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// 기본 저장소를 직접 스캔한다. 백엔드 오류는 그대로 전파된다.
    pub async fn scan_search(&self, raw_term: Option<&str>) -> CoreResult<SearchResponse> {
        let query = SearchQuery::parse(raw_term)?;

        let rows = with_deadline(self.deadline, self.store.scan_matching(query.term())).await?;
        tracing::debug!(term = query.term(), hits = rows.len(), "scan search finished");

        Ok(assemble(&query, rows))
    }

    /// 검색 인덱스에 질의한다. Err는 검증 실패일 때만 반환된다.
    pub async fn indexed_search(&self, raw_term: Option<&str>) -> CoreResult<IndexedOutcome> {
        let query = SearchQuery::parse(raw_term)?;

        let outcome = match with_deadline(
            self.deadline,
            self.index.query(query.term(), self.max_results),
        )
        .await
        {
            Ok(rows) => {
                tracing::debug!(term = query.term(), hits = rows.len(), "indexed search finished");
                IndexedOutcome::Found(assemble(&query, rows))
            }
            Err(error) if error.is_timeout() => {
                tracing::warn!(term = query.term(), %error, "indexed search timed out");
                IndexedOutcome::Unavailable {
                    reason: UnavailableReason::Timeout,
                    message: INDEX_TIMEOUT_MESSAGE.to_string(),
                }
            }
            Err(error) => {
                tracing::warn!(term = query.term(), %error, "indexed search failed");
                IndexedOutcome::Unavailable {
                    reason: UnavailableReason::Backend,
                    message: INDEX_UNAVAILABLE_MESSAGE.to_string(),
                }
            }
        };

        Ok(outcome)
    }
}

async fn with_deadline<T, F>(deadline: Duration, call: F) -> CoreResult<T>
where
    F: Future<Output = CoreResult<T>>,
{
    tokio::time::timeout(deadline, call)
        .await
        .map_err(|_| CoreError::Timeout(deadline))?
}
