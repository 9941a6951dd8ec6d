// 목적:
// - Rust 코어 계층의 표준 오류 타입을 정의한다.
//
// 설명:
// - 입력/설정/DB/검색 인덱스 HTTP/연결/직렬화/타임아웃 오류를 명시적으로 구분한다.
// - Connection은 요청 자체가 전달되지 않은 경우, Http는 백엔드가 요청을 거부한 경우다.
// - HTTP 계층은 이 분류를 기준으로 상태 코드와 응답 본문을 결정한다.
//
// 디자인 패턴:
// - 도메인 오류 열거형(Domain Error Enum).
//
// 참조:
// - src_rs/core/query_router.rs
// - src_rs/core/index_sync.rs
// - src_rs/api/errors.rs

use std::time::Duration;

use thiserror::Error;

/// 코어 계층에서 공통으로 사용하는 오류 열거형이다.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("입력값이 유효하지 않습니다: {0}")]
    InvalidInput(String),
    #[error("설정값이 유효하지 않습니다: {0}")]
    InvalidConfig(String),
    #[error("데이터베이스 작업에 실패했습니다: {0}")]
    Db(String),
    #[error("검색 인덱스 HTTP 호출에 실패했습니다: {0}")]
    Http(String),
    #[error("백엔드에 연결할 수 없습니다: {0}")]
    Connection(String),
    #[error("직렬화/역직렬화에 실패했습니다: {0}")]
    Serialization(String),
    #[error("백엔드 호출이 제한 시간({0:?})을 초과했습니다")]
    Timeout(Duration),
    #[error("런타임 처리 중 오류가 발생했습니다: {0}")]
    Runtime(String),
}

impl CoreError {
    /// 호출자 입력 문제로 발생한 오류인지 여부를 반환한다.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::InvalidInput(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CoreError::Timeout(_))
    }

    /// 요청이 백엔드에 도달하지 못한 전송 계층 실패인지 여부를 반환한다.
    pub fn is_connection(&self) -> bool {
        matches!(self, CoreError::Connection(_))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
