// 목적:
// - 검색 서브시스템이 공유하는 데이터 타입을 정의한다.
//
// 설명:
// - Record는 저장소/인덱스 양쪽에서 같은 모양으로 오간다(인덱스 문서 본문 = Record).
// - SearchQuery는 검증을 통과한 검색어만 담는다.
// - IndexedOutcome은 "결과 0건"과 "인덱스 사용 불가"를 타입으로 구분한다.
//
// 디자인 패턴:
// - 값 객체(Value Object) + 생성 시 검증(Parse, don't validate).
//
// 참조:
// - src_rs/core/query_router.rs
// - src_rs/core/response.rs

use serde::{Deserialize, Serialize};

use crate::core::errors::{CoreError, CoreResult};

/// 기본 저장소의 레코드이자 인덱스 문서 본문이다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub text: String,
}

impl Record {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// 인덱스 문서 식별자. 같은 id는 항상 같은 문서를 덮어쓴다.
    pub fn document_id(&self) -> String {
        self.id.to_string()
    }
}

/// 검증을 통과한 검색어.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    term: String,
}

impl SearchQuery {
    /// 비어 있거나 공백뿐인 검색어를 거부한다.
    /// 공백뿐인 검색어는 모든 행에 매칭되므로 빈 검색어와 같이 취급한다.
    /// 통과한 검색어는 trim하지 않고 받은 그대로 보존한다.
    pub fn parse(raw: Option<&str>) -> CoreResult<Self> {
        match raw {
            Some(term) if !term.trim().is_empty() => Ok(Self {
                term: term.to_string(),
            }),
            _ => Err(CoreError::InvalidInput(
                "Missing 'query' parameter".to_string(),
            )),
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }
}

/// 두 검색 모드가 공통으로 반환하는 응답 형태다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<Record>,
    pub query: String,
}

/// 인덱스 검색이 실패한 이유.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    Backend,
    Timeout,
}

/// 인덱스 검색 결과. 실패는 예외가 아니라 값으로 전달된다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexedOutcome {
    Found(SearchResponse),
    Unavailable {
        reason: UnavailableReason,
        message: String,
    },
}

impl IndexedOutcome {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, IndexedOutcome::Unavailable { .. })
    }
}
