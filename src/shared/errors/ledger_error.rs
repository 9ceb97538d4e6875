use thiserror::Error;
use axum::{http::StatusCode, Json};
use rust_decimal::Decimal;
use serde_json::json;
use crate::domains::ledger::models::{Currency, TransactionStatus};

/// 원장 정산 관련 에러
/// Ledger settlement errors
///
/// 각 에러는 HTTP 상태 코드와 기계가 읽을 수 있는 code 문자열로 고정 매핑됩니다.
/// Datastore internals never appear in the message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// 잘못된 입력 (금액, 통화, 출금 주소 등)
    /// Rejected before touching the datastore
    #[error("Validation error: {0}")]
    Validation(String),

    /// 잔고 부족
    /// Insufficient balance
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        available: Decimal,
        requested: Decimal,
    },

    /// 지갑을 찾을 수 없음
    /// Wallet not found
    #[error("No {currency} wallet found for user {user_id}")]
    WalletNotFound { user_id: String, currency: Currency },

    /// 관리자 설정 없음
    /// Admin settings row missing
    #[error("Admin settings not found")]
    SettingsNotFound,

    /// 트랜잭션을 찾을 수 없음
    /// Transaction not found
    #[error("Transaction not found: id={id}")]
    TransactionNotFound { id: i64 },

    /// 현재 상태에서 허용되지 않는 전이
    /// Transition not allowed from the current status
    #[error("Transaction {id} is {status:?}, expected a pending withdrawal")]
    InvalidTransactionState { id: i64, status: TransactionStatus },

    /// 이미 정산된 참조 ID
    /// Idempotency guard triggered
    #[error("Reference {reference_id} has already been settled")]
    DuplicateSettlement { reference_id: String },

    /// 원자적 DB 작업 실패 (전체 롤백됨, 재시도 가능)
    /// Atomic datastore operation aborted and rolled back
    #[error("Settlement failed and was rolled back: {message}")]
    TransactionFailure { message: String },

    /// 외부 결제 레일 에러
    /// Payment rail rejected or errored
    #[error("{rail} error: {message}")]
    UpstreamRail { rail: String, message: String },

    /// 웹훅 서명 검증 실패
    /// Webhook signature did not verify
    #[error("Invalid webhook signature")]
    InvalidSignature,
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    pub fn upstream(rail: &str, err: impl std::fmt::Display) -> Self {
        LedgerError::UpstreamRail {
            rail: rail.to_string(),
            message: err.to_string(),
        }
    }

    /// Machine-readable code returned to clients.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Validation(_) => "VALIDATION_ERROR",
            LedgerError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            LedgerError::WalletNotFound { .. } => "WALLET_NOT_FOUND",
            LedgerError::SettingsNotFound => "SETTINGS_NOT_FOUND",
            LedgerError::TransactionNotFound { .. } => "TRANSACTION_NOT_FOUND",
            LedgerError::InvalidTransactionState { .. } => "INVALID_TRANSACTION_STATE",
            LedgerError::DuplicateSettlement { .. } => "DUPLICATE_SETTLEMENT",
            LedgerError::TransactionFailure { .. } => "TRANSACTION_FAILURE",
            LedgerError::UpstreamRail { .. } => "UPSTREAM_RAIL_ERROR",
            LedgerError::InvalidSignature => "INVALID_SIGNATURE",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::Validation(_) | LedgerError::InsufficientBalance { .. } => {
                StatusCode::BAD_REQUEST
            }
            LedgerError::WalletNotFound { .. }
            | LedgerError::SettingsNotFound
            | LedgerError::TransactionNotFound { .. } => StatusCode::NOT_FOUND,
            LedgerError::InvalidTransactionState { .. }
            | LedgerError::DuplicateSettlement { .. } => StatusCode::CONFLICT,
            LedgerError::TransactionFailure { .. } => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::UpstreamRail { .. } => StatusCode::BAD_GATEWAY,
            LedgerError::InvalidSignature => StatusCode::UNAUTHORIZED,
        }
    }

    /// 재시도 가능 여부 (롤백된 DB 실패만)
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::TransactionFailure { .. })
    }
}

/// LedgerError를 HTTP 응답으로 변환
impl From<LedgerError> for (StatusCode, Json<serde_json::Value>) {
    fn from(err: LedgerError) -> Self {
        let status = err.status_code();
        let mut body = json!({
            "success": false,
            "error": err.to_string(),
            "code": err.code(),
        });

        match &err {
            LedgerError::InsufficientBalance { available, requested } => {
                body["details"] = json!({
                    "available": available,
                    "requested": requested,
                });
            }
            LedgerError::TransactionFailure { .. } => {
                body["retryable"] = json!(true);
            }
            _ => {}
        }

        (status, Json(body))
    }
}
