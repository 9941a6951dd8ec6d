// 목적:
// - 백엔드 결과를 공통 SearchResponse로 조립한다.
//
// 설명:
// - 부수 효과 없는 순수 함수만 둔다.
// - 백엔드 순서를 그대로 유지하고, 결과 없음은 빈 배열로 표현한다.
//
// 참조:
// - src_rs/core/query_router.rs

use crate::core::model::{Record, SearchQuery, SearchResponse};

/// 검증된 검색어와 백엔드 결과로 응답을 만든다.
pub fn assemble(query: &SearchQuery, rows: Vec<Record>) -> SearchResponse {
    SearchResponse {
        results: rows,
        query: query.term().to_string(),
    }
}
