use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use rust_decimal::Decimal;
use crate::domains::ledger::models::{
    AdminSettings, AdminWallet, Reconciliation, ReviewedWithdrawal, Wallet, WalletTransaction,
};

/// 관리자 설정 응답
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = SettingsResponse)]
pub struct SettingsResponse {
    pub success: bool,
    pub settings: AdminSettings,
}

/// 수수료율 변경 요청 (0 <= rate < 1)
/// Update commission rate request
#[derive(Debug, Deserialize, ToSchema)]
#[schema(as = UpdateCommissionRateRequest)]
pub struct UpdateCommissionRateRequest {
    #[serde(alias = "commissionRate")]
    #[schema(value_type = String, example = "0.05")]
    pub commission_rate: Decimal,
}

/// 관리자 지갑 목록 응답
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = AdminWalletsResponse)]
pub struct AdminWalletsResponse {
    pub success: bool,
    pub wallets: Vec<AdminWallet>,
}

/// 대기 중인 출금 조회 파라미터
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct PendingWithdrawalsQuery {
    /// 최대 조회 개수 (기본: 50, 최대: 100)
    #[serde(default)]
    pub limit: Option<i64>,
}

/// 대기 중인 출금 목록 (오래된 순)
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = PendingWithdrawalsResponse)]
pub struct PendingWithdrawalsResponse {
    pub success: bool,
    pub withdrawals: Vec<WalletTransaction>,
}

/// 출금 거절 요청
#[derive(Debug, Default, Deserialize, ToSchema)]
#[schema(as = RejectWithdrawalRequest)]
pub struct RejectWithdrawalRequest {
    #[serde(default)]
    #[schema(example = "Address flagged by compliance")]
    pub reason: Option<String>,
}

/// 출금 검토 응답
/// Operator review response
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = ReviewWithdrawalResponse)]
pub struct ReviewWithdrawalResponse {
    pub success: bool,
    pub message: String,
    pub wallet: Wallet,
    pub transaction: WalletTransaction,
}

impl ReviewWithdrawalResponse {
    pub fn new(message: &str, reviewed: ReviewedWithdrawal) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            wallet: reviewed.wallet,
            transaction: reviewed.transaction,
        }
    }
}

/// 원장 대사 조회 파라미터
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ReconcileQuery {
    pub user_id: String,
    /// USD or USDT_TRC20
    pub currency: String,
}

/// 원장 대사 응답
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = ReconcileResponse)]
pub struct ReconcileResponse {
    pub success: bool,
    pub balanced: bool,
    pub reconciliation: Reconciliation,
}
