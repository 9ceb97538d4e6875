use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use crate::domains::ledger::models::Currency;

// =====================================================
// Wallet / AdminWallet 모델
// =====================================================
// 역할: 사용자별·통화별 잔고, 그리고 플랫폼 수수료 적립 지갑
//
// 규칙:
// - (user_id, currency) 조합당 지갑은 최대 1개
// - 첫 입금/출금 시도 시 생성 (lazy), 삭제되지 않음
// - 잔고는 정산 엔진만 변경하며 음수가 될 수 없음
// - AdminWallet은 통화당 1개
// =====================================================

/// 사용자 지갑
/// Per-user, per-currency ledger wallet
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[schema(as = Wallet)]
pub struct Wallet {
    /// Wallet ID (BIGSERIAL)
    pub id: i64,

    /// Owner id issued by the identity provider
    /// 소유자 ID (외부 인증 제공자가 발급)
    #[schema(example = "8d0f5a4e-3c1b-4f7e-9a57-2b1d7f1c6e10")]
    pub user_id: String,

    pub currency: Currency,

    /// 잔고
    /// Current balance
    #[schema(value_type = String, example = "95.00")]
    pub balance: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 플랫폼 수수료 지갑 (통화당 1개)
/// Platform commission wallet, one per currency
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[schema(as = AdminWallet)]
pub struct AdminWallet {
    pub id: i64,

    pub currency: Currency,

    #[schema(value_type = String, example = "5.00")]
    pub balance: Decimal,

    /// 누적 수수료 수익
    /// Lifetime commission earned
    #[schema(value_type = String, example = "5.00")]
    pub total_earned: Decimal,

    /// 누적 출금액
    /// Lifetime amount withdrawn by the platform
    #[schema(value_type = String, example = "0")]
    pub total_withdrawn: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
