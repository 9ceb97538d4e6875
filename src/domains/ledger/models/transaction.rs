use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use crate::domains::ledger::models::Currency;

// =====================================================
// WalletTransaction 모델 (append-only 원장)
// =====================================================
// 역할: 잔고를 변경한 모든 이벤트의 감사 기록
//
// amount 부호:
// - 양수: 입금 (credit)
// - 음수: 출금 (debit)
//
// 상태 전이는 하나뿐:
// - 암호화폐 출금: pending → completed (운영자 승인) 또는 failed (거절, 잔고 복구)
// =====================================================

/// 트랜잭션 유형
/// Wallet transaction type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    TaskPayment,
    TaskRefund,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::TaskPayment => "task_payment",
            TransactionType::TaskRefund => "task_refund",
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(TransactionType::Deposit),
            "withdrawal" => Ok(TransactionType::Withdrawal),
            "task_payment" => Ok(TransactionType::TaskPayment),
            "task_refund" => Ok(TransactionType::TaskRefund),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

/// 트랜잭션 상태
/// Wallet transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,    // 운영자 승인 대기 (암호화폐 출금)
    Completed,  // 완료
    Failed,     // 실패/거절 (잔고에 반영되지 않음)
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }

    /// Whether the amount is reflected in the wallet balance.
    pub fn counts_toward_balance(&self) -> bool {
        !matches!(self, TransactionStatus::Failed)
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "completed" => Ok(TransactionStatus::Completed),
            "failed" => Ok(TransactionStatus::Failed),
            other => Err(format!("Unknown transaction status: {}", other)),
        }
    }
}

/// 지갑 트랜잭션 (DB에서 조회한 원장 기록)
/// Wallet transaction (ledger entry)
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[schema(as = WalletTransaction)]
pub struct WalletTransaction {
    pub id: i64,

    pub wallet_id: i64,

    pub transaction_type: TransactionType,

    /// Signed amount: positive credits, negative debits
    /// 부호 있는 금액 (양수: 입금, 음수: 출금)
    #[schema(value_type = String, example = "95.00")]
    pub amount: Decimal,

    /// 이 이벤트에서 플랫폼이 가져간 수수료
    /// Commission retained by the platform on this event
    #[schema(value_type = String, example = "5.00")]
    pub commission: Decimal,

    pub currency: Currency,

    pub status: TransactionStatus,

    /// External reference (PayPal order id, CoinPayments txn id, payout id)
    /// 외부 참조 ID
    pub reference_id: Option<String>,

    /// PayPal capture id, crypto txn id or payout address
    pub transaction_hash: Option<String>,

    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// 트랜잭션 생성용 내부 모델 (Repository에서 사용)
/// Internal model for inserting a ledger entry
#[derive(Debug, Clone)]
pub struct NewWalletTransaction {
    pub wallet_id: i64,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub commission: Decimal,
    pub currency: Currency,
    pub status: TransactionStatus,
    pub reference_id: Option<String>,
    pub transaction_hash: Option<String>,
    pub description: Option<String>,
}
