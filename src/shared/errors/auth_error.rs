use thiserror::Error;
use axum::{http::StatusCode, Json};
use serde_json::json;

/// 인증 관련 에러
/// Authentication-related errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// 토큰이 제공되지 않음
    /// Token not provided
    #[error("Missing authorization header")]
    MissingToken,

    /// 잘못된 Authorization 헤더 형식
    /// Malformed Authorization header
    #[error("Invalid authorization format. Expected: 'Bearer <token>'")]
    InvalidHeader,

    /// 잘못된 또는 만료된 토큰
    /// Invalid or expired token
    #[error("Invalid or expired token")]
    InvalidToken,

    /// 운영자 키 누락 또는 불일치
    /// Operator key missing or wrong
    #[error("Operator access denied")]
    OperatorDenied,

    /// 운영자 API가 설정되지 않음
    /// Operator API disabled by configuration
    #[error("Operator API is disabled")]
    OperatorDisabled,

    /// 내부 서버 에러
    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// AuthError를 HTTP 응답으로 변환
impl From<AuthError> for (StatusCode, Json<serde_json::Value>) {
    fn from(err: AuthError) -> Self {
        let (status, code) = match &err {
            AuthError::MissingToken | AuthError::InvalidHeader | AuthError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            }
            AuthError::OperatorDenied | AuthError::OperatorDisabled => {
                (StatusCode::FORBIDDEN, "FORBIDDEN")
            }
            AuthError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        (
            status,
            Json(json!({ "success": false, "error": err.to_string(), "code": code })),
        )
    }
}
