use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use rust_decimal::Decimal;
use crate::domains::ledger::models::{Currency, Wallet, WalletTransaction};

/// 지갑 목록 응답
/// Get wallets response
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = WalletsResponse)]
pub struct WalletsResponse {
    pub success: bool,
    pub wallets: Vec<Wallet>,
}

/// 트랜잭션 목록 쿼리 파라미터
/// Query parameters for wallet transactions
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct TransactionsQuery {
    /// 최대 조회 개수 (기본: 50, 최대: 100)
    /// Limit (default: 50, max: 100)
    #[serde(default)]
    pub limit: Option<i64>,
}

/// 트랜잭션 목록 응답
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = TransactionsResponse)]
pub struct TransactionsResponse {
    pub success: bool,
    pub currency: Currency,
    /// 최신순
    pub transactions: Vec<WalletTransaction>,
}

/// 출금 요청 (통화 공통)
/// Withdraw request for any supported currency
///
/// - USD: payout_target = PayPal 이메일
/// - USDT_TRC20: payout_target = TRC-20 지갑 주소
#[derive(Debug, Deserialize, ToSchema)]
#[schema(as = WithdrawRequest)]
pub struct WithdrawRequest {
    #[schema(value_type = String, example = "20.000000")]
    pub amount: Decimal,

    #[schema(example = "USDT_TRC20")]
    pub currency: Currency,

    #[serde(alias = "walletAddress", alias = "wallet_address", alias = "paypal_email")]
    #[schema(example = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t")]
    pub payout_target: String,
}
