// 목적:
// - HTTP 응답으로 변환되는 API 오류 타입을 정의한다.
//
// 설명:
// - 모든 오류 본문은 {"error": "message"} 형태다.
// - scan 모드 백엔드 오류는 내부 정보를 감추고 고정 메시지만 노출한다.
//
// 참조:
// - src_rs/core/errors.rs
// - src_rs/api/handlers.rs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::core::errors::CoreError;

const DATABASE_ERROR_MESSAGE: &str = "Database error";
const DATABASE_TIMEOUT_MESSAGE: &str = "Database timeout";

#[derive(Debug)]
pub enum ApiError {
    /// 400
    BadRequest(String),
    /// 504
    GatewayTimeout(String),
    /// 500
    Internal(String),
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::InvalidInput(message) => ApiError::BadRequest(message),
            CoreError::Timeout(deadline) => {
                tracing::error!(?deadline, "scan search timed out");
                ApiError::GatewayTimeout(DATABASE_TIMEOUT_MESSAGE.to_string())
            }
            other => {
                tracing::error!(error = %other, "error executing search");
                ApiError::Internal(DATABASE_ERROR_MESSAGE.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::GatewayTimeout(message) => (StatusCode::GATEWAY_TIMEOUT, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
