use serde::Serialize;
use utoipa::ToSchema;
use rust_decimal::Decimal;
use crate::domains::ledger::models::{
    CommissionSplit, Currency, PaymentRail, TransactionStatus, Wallet, WalletTransaction,
};

// =====================================================
// 정산 요청 / 결과
// =====================================================
// SettleDeposit: 결제 레일이 입금을 확정한 뒤에만 호출
// SettleWithdrawal: 인증된 사용자가 출금을 요청할 때 호출
// =====================================================

/// 입금 정산 요청
/// Deposit confirmed by a payment rail
#[derive(Debug, Clone)]
pub struct DepositRequest {
    /// 지갑 소유자 (항상 인증 정보나 서명된 웹훅에서 가져옴)
    pub user_id: String,
    pub currency: Currency,
    pub gross_amount: Decimal,
    /// PayPal order id / CoinPayments txn id (idempotency key)
    pub reference_id: String,
    pub rail: PaymentRail,
    pub transaction_hash: Option<String>,
}

/// 출금 정산 요청
/// User-initiated withdrawal
#[derive(Debug, Clone)]
pub struct WithdrawalRequest {
    pub user_id: String,
    pub currency: Currency,
    pub gross_amount: Decimal,
    /// PayPal e-mail or TRC-20 address
    pub payout_target: String,
}

/// 입금 정산 결과
/// Result of a settled deposit
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DepositReceipt {
    pub wallet: Wallet,
    pub transaction: WalletTransaction,
    pub split: CommissionSplit,
    /// true when the reference id had already been settled
    /// 이미 정산된 참조 ID였는지 여부 (재전송된 확인)
    pub duplicate: bool,
}

/// 출금 정산 결과
/// Result of a settled withdrawal
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WithdrawalReceipt {
    pub wallet: Wallet,
    pub transaction: WalletTransaction,
    pub split: CommissionSplit,
    /// 생성된 출금 참조 ID
    /// Generated payout reference id
    pub reference_id: String,
    pub rail: PaymentRail,
    pub status: TransactionStatus,
}

impl WithdrawalReceipt {
    /// Amount the payout rail is instructed to send.
    pub fn payout_amount(&self) -> Decimal {
        self.split.net_amount
    }
}

/// 원장 대사 결과
/// Wallet balance against the sum of its ledger entries
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Reconciliation {
    pub wallet_id: i64,
    pub currency: Currency,
    #[schema(value_type = String)]
    pub balance: Decimal,
    #[schema(value_type = String)]
    pub ledger_sum: Decimal,
    pub pending_withdrawals: usize,
}

impl Reconciliation {
    pub fn is_balanced(&self) -> bool {
        self.balance == self.ledger_sum
    }
}

/// 운영자 검토 결과 (승인 / 거절)
/// Withdrawal after an operator confirmed or rejected it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewedWithdrawal {
    pub wallet: Wallet,
    pub transaction: WalletTransaction,
}
