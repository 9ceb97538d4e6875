// PostgreSQL ledger store
// sqlx 트랜잭션 하나 = 정산 1건
//
// - begin 직후 SET LOCAL statement_timeout / lock_timeout 으로 대기 시간을 제한
// - commit 없이 drop되면 sqlx가 ROLLBACK을 보냄
// - DB 에러는 로그로만 남기고 호출자에게는 분류된 메시지만 전달

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use crate::domains::ledger::models::{
    AdminSettings, AdminWallet, Currency, NewWalletTransaction, TransactionStatus, Wallet,
    WalletTransaction,
};
use crate::shared::database::{
    AdminRepository, Database, LedgerStore, LedgerTx, WalletRepository, WalletTransactionRepository,
};
use crate::shared::errors::LedgerError;

const UNIQUE_VIOLATION: &str = "23505";
const LOCK_NOT_AVAILABLE: &str = "55P03";
const QUERY_CANCELED: &str = "57014";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// PostgreSQL 원장 저장소
/// LedgerStore backed by PostgreSQL
#[derive(Clone)]
pub struct PgLedgerStore {
    db: Database,
}

impl PgLedgerStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn connection(&self) -> Result<sqlx::pool::PoolConnection<Postgres>, LedgerError> {
        self.db.pool().acquire().await.map_err(|e| datastore_failure(e.into()))
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, LedgerError> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| datastore_failure(e.into()))?;

        // SET은 바인드 파라미터를 받지 않으므로 정수 ms로 직접 포맷
        let timeout_ms = self.db.statement_timeout().as_millis();
        for setting in ["statement_timeout", "lock_timeout"] {
            sqlx::query(&format!("SET LOCAL {} = {}", setting, timeout_ms))
                .execute(&mut *tx)
                .await
                .map_err(|e| datastore_failure(e.into()))?;
        }

        Ok(Box::new(PgLedgerTx { tx }))
    }

    async fn get_wallet(&self, user_id: &str, currency: Currency) -> Result<Option<Wallet>, LedgerError> {
        let mut conn = self.connection().await?;
        WalletRepository::new(&mut conn)
            .get_by_user_and_currency(user_id, currency)
            .await
            .map_err(datastore_failure)
    }

    async fn list_wallets(&self, user_id: &str) -> Result<Vec<Wallet>, LedgerError> {
        let mut conn = self.connection().await?;
        WalletRepository::new(&mut conn)
            .get_all_by_user(user_id)
            .await
            .map_err(datastore_failure)
    }

    async fn list_transactions(&self, wallet_id: i64, limit: i64) -> Result<Vec<WalletTransaction>, LedgerError> {
        let mut conn = self.connection().await?;
        WalletTransactionRepository::new(&mut conn)
            .get_by_wallet(wallet_id, limit)
            .await
            .map_err(datastore_failure)
    }

    async fn list_admin_wallets(&self) -> Result<Vec<AdminWallet>, LedgerError> {
        let mut conn = self.connection().await?;
        AdminRepository::new(&mut conn)
            .get_all_wallets()
            .await
            .map_err(datastore_failure)
    }

    async fn list_pending_withdrawals(&self, limit: i64) -> Result<Vec<WalletTransaction>, LedgerError> {
        let mut conn = self.connection().await?;
        WalletTransactionRepository::new(&mut conn)
            .get_pending_withdrawals(limit)
            .await
            .map_err(datastore_failure)
    }

    async fn get_settings(&self) -> Result<Option<AdminSettings>, LedgerError> {
        let mut conn = self.connection().await?;
        AdminRepository::new(&mut conn)
            .get_settings()
            .await
            .map_err(datastore_failure)
    }

    async fn find_deposit(&self, reference_id: &str) -> Result<Option<WalletTransaction>, LedgerError> {
        let mut conn = self.connection().await?;
        WalletTransactionRepository::new(&mut conn)
            .find_deposit_by_reference(reference_id)
            .await
            .map_err(datastore_failure)
    }
}

/// 진행 중인 PostgreSQL 트랜잭션
pub struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn lock_wallet(&mut self, user_id: &str, currency: Currency) -> Result<Option<Wallet>, LedgerError> {
        WalletRepository::new(&mut self.tx)
            .lock_by_user_and_currency(user_id, currency)
            .await
            .map_err(datastore_failure)
    }

    async fn lock_or_create_wallet(&mut self, user_id: &str, currency: Currency) -> Result<Wallet, LedgerError> {
        WalletRepository::new(&mut self.tx)
            .lock_or_create(user_id, currency)
            .await
            .map_err(datastore_failure)
    }

    async fn lock_wallet_by_id(&mut self, wallet_id: i64) -> Result<Option<Wallet>, LedgerError> {
        WalletRepository::new(&mut self.tx)
            .lock_by_id(wallet_id)
            .await
            .map_err(datastore_failure)
    }

    async fn adjust_wallet_balance(&mut self, wallet_id: i64, delta: Decimal) -> Result<Wallet, LedgerError> {
        WalletRepository::new(&mut self.tx)
            .adjust_balance(wallet_id, delta)
            .await
            .map_err(datastore_failure)
    }

    async fn find_deposit(&mut self, reference_id: &str) -> Result<Option<WalletTransaction>, LedgerError> {
        WalletTransactionRepository::new(&mut self.tx)
            .find_deposit_by_reference(reference_id)
            .await
            .map_err(datastore_failure)
    }

    async fn lock_or_create_admin_wallet(&mut self, currency: Currency) -> Result<AdminWallet, LedgerError> {
        AdminRepository::new(&mut self.tx)
            .lock_or_create_wallet(currency)
            .await
            .map_err(datastore_failure)
    }

    async fn adjust_admin_commission(&mut self, admin_wallet_id: i64, delta: Decimal) -> Result<AdminWallet, LedgerError> {
        AdminRepository::new(&mut self.tx)
            .adjust_commission(admin_wallet_id, delta)
            .await
            .map_err(datastore_failure)
    }

    async fn lock_or_create_settings(&mut self, default_rate: Decimal) -> Result<AdminSettings, LedgerError> {
        AdminRepository::new(&mut self.tx)
            .lock_or_create_settings(default_rate)
            .await
            .map_err(datastore_failure)
    }

    async fn adjust_total_earnings(&mut self, delta: Decimal) -> Result<AdminSettings, LedgerError> {
        AdminRepository::new(&mut self.tx)
            .adjust_total_earnings(delta)
            .await
            .map_err(datastore_failure)
    }

    async fn set_commission_rate(&mut self, rate: Decimal) -> Result<AdminSettings, LedgerError> {
        AdminRepository::new(&mut self.tx)
            .set_commission_rate(rate)
            .await
            .map_err(datastore_failure)
    }

    async fn insert_transaction(&mut self, transaction: NewWalletTransaction) -> Result<WalletTransaction, LedgerError> {
        WalletTransactionRepository::new(&mut self.tx)
            .insert(&transaction)
            .await
            .map_err(|e| {
                if sqlstate(&e).as_deref() == Some(UNIQUE_VIOLATION) {
                    if let Some(reference_id) = transaction.reference_id.clone() {
                        return LedgerError::DuplicateSettlement { reference_id };
                    }
                }
                datastore_failure(e)
            })
    }

    async fn lock_transaction(&mut self, transaction_id: i64) -> Result<Option<WalletTransaction>, LedgerError> {
        WalletTransactionRepository::new(&mut self.tx)
            .lock_by_id(transaction_id)
            .await
            .map_err(datastore_failure)
    }

    async fn set_transaction_status(
        &mut self,
        transaction_id: i64,
        status: TransactionStatus,
        description: Option<String>,
    ) -> Result<WalletTransaction, LedgerError> {
        WalletTransactionRepository::new(&mut self.tx)
            .update_status(transaction_id, status, description.as_deref())
            .await
            .map_err(datastore_failure)
    }

    async fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        let PgLedgerTx { tx } = *self;
        tx.commit().await.map_err(|e| datastore_failure(e.into()))
    }
}

fn sqlstate(err: &anyhow::Error) -> Option<String> {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db_err)) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// DB 에러를 재시도 가능한 TransactionFailure로 변환 (내부 정보는 로그로만)
fn datastore_failure(err: anyhow::Error) -> LedgerError {
    let message = match sqlstate(&err).as_deref() {
        Some(LOCK_NOT_AVAILABLE) => "lock wait timed out",
        Some(QUERY_CANCELED) => "statement timed out",
        Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => "concurrent update conflict",
        Some(_) => "datastore rejected the operation",
        None => "datastore unavailable",
    };
    tracing::error!(error = ?err, "Ledger datastore operation failed");
    LedgerError::TransactionFailure {
        message: message.to_string(),
    }
}
