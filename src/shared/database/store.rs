// Ledger store seam
// 정산 엔진이 사용하는 저장소 인터페이스
//
// LedgerStore::begin()이 반환하는 LedgerTx 하나가 정산 1건의 원자적 단위입니다.
// - commit() 전에 drop되면 모든 변경이 버려집니다 (롤백).
// - lock_* 메서드는 해당 행을 트랜잭션 종료까지 잠급니다 (SELECT ... FOR UPDATE).
// - 잠금 순서: 사용자 지갑 → 관리자 지갑 → 관리자 설정

use async_trait::async_trait;
use rust_decimal::Decimal;
use crate::domains::ledger::models::{
    AdminSettings, AdminWallet, Currency, NewWalletTransaction, TransactionStatus, Wallet,
    WalletTransaction,
};
use crate::shared::errors::LedgerError;

/// 원장 저장소
/// Datastore behind the settlement engine
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// 트랜잭션 시작
    /// Start an atomic unit of work
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, LedgerError>;

    /// Committed wallet state, no lock taken.
    async fn get_wallet(&self, user_id: &str, currency: Currency) -> Result<Option<Wallet>, LedgerError>;

    async fn list_wallets(&self, user_id: &str) -> Result<Vec<Wallet>, LedgerError>;

    /// 지갑의 트랜잭션 목록 (최신순)
    /// Ledger entries of a wallet, newest first
    async fn list_transactions(&self, wallet_id: i64, limit: i64) -> Result<Vec<WalletTransaction>, LedgerError>;

    async fn list_admin_wallets(&self) -> Result<Vec<AdminWallet>, LedgerError>;

    async fn list_pending_withdrawals(&self, limit: i64) -> Result<Vec<WalletTransaction>, LedgerError>;

    async fn get_settings(&self) -> Result<Option<AdminSettings>, LedgerError>;

    /// 참조 ID로 정산된 입금 조회
    /// Deposit previously settled under this reference id
    async fn find_deposit(&self, reference_id: &str) -> Result<Option<WalletTransaction>, LedgerError>;
}

/// 원장 트랜잭션 (정산 1건의 원자적 단위)
/// One atomic settlement unit
#[async_trait]
pub trait LedgerTx: Send {
    /// 사용자 지갑 잠금 (없으면 None)
    async fn lock_wallet(&mut self, user_id: &str, currency: Currency) -> Result<Option<Wallet>, LedgerError>;

    /// 사용자 지갑 잠금 (없으면 잔고 0으로 생성)
    async fn lock_or_create_wallet(&mut self, user_id: &str, currency: Currency) -> Result<Wallet, LedgerError>;

    async fn lock_wallet_by_id(&mut self, wallet_id: i64) -> Result<Option<Wallet>, LedgerError>;

    /// 잔고 증감 (delta가 음수면 차감)
    /// Add `delta` to the wallet balance
    async fn adjust_wallet_balance(&mut self, wallet_id: i64, delta: Decimal) -> Result<Wallet, LedgerError>;

    /// 참조 ID로 입금 조회 (트랜잭션 내부, 최신 커밋 기준)
    async fn find_deposit(&mut self, reference_id: &str) -> Result<Option<WalletTransaction>, LedgerError>;

    async fn lock_or_create_admin_wallet(&mut self, currency: Currency) -> Result<AdminWallet, LedgerError>;

    /// balance와 total_earned에 delta를 더함 (수수료 환원 시 음수)
    /// Add `delta` to both balance and total_earned
    async fn adjust_admin_commission(&mut self, admin_wallet_id: i64, delta: Decimal) -> Result<AdminWallet, LedgerError>;

    /// 설정 잠금 (없으면 default_rate로 생성)
    async fn lock_or_create_settings(&mut self, default_rate: Decimal) -> Result<AdminSettings, LedgerError>;

    async fn adjust_total_earnings(&mut self, delta: Decimal) -> Result<AdminSettings, LedgerError>;

    async fn set_commission_rate(&mut self, rate: Decimal) -> Result<AdminSettings, LedgerError>;

    async fn insert_transaction(&mut self, transaction: NewWalletTransaction) -> Result<WalletTransaction, LedgerError>;

    async fn lock_transaction(&mut self, transaction_id: i64) -> Result<Option<WalletTransaction>, LedgerError>;

    async fn set_transaction_status(
        &mut self,
        transaction_id: i64,
        status: TransactionStatus,
        description: Option<String>,
    ) -> Result<WalletTransaction, LedgerError>;

    /// 커밋 (성공 시에만 변경이 보임)
    async fn commit(self: Box<Self>) -> Result<(), LedgerError>;
}
