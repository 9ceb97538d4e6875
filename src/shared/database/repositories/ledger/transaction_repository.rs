use sqlx::{PgConnection, Row};
use sqlx::postgres::PgRow;
use anyhow::{Context, Result};
use chrono::Utc;
use crate::domains::ledger::models::{NewWalletTransaction, TransactionStatus, WalletTransaction};

const TRANSACTION_COLUMNS: &str = "id, wallet_id, transaction_type, amount, commission, currency, \
     status, reference_id, transaction_hash, description, created_at";

/// 지갑 트랜잭션 Repository (append-only 원장)
/// Repository over `wallet_transactions`
pub struct WalletTransactionRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> WalletTransactionRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// 원장 기록 추가
    /// Append a ledger entry
    ///
    /// deposit 행의 reference_id는 부분 유니크 인덱스로 보호됩니다.
    /// 위반 시 sqlx 에러(23505)가 그대로 체인에 남아 호출자가 구분할 수 있습니다.
    pub async fn insert(&mut self, new: &NewWalletTransaction) -> Result<WalletTransaction> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO wallet_transactions (
                wallet_id, transaction_type, amount, commission, currency,
                status, reference_id, transaction_hash, description, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(new.wallet_id)
        .bind(new.transaction_type.as_str())
        .bind(new.amount)
        .bind(new.commission)
        .bind(new.currency.as_str())
        .bind(new.status.as_str())
        .bind(&new.reference_id)
        .bind(&new.transaction_hash)
        .bind(&new.description)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await
        .context("Failed to insert wallet transaction")?;

        row_to_transaction(&row)
    }

    /// 참조 ID로 완료된 입금 조회
    /// Completed deposit recorded under this reference id
    pub async fn find_deposit_by_reference(&mut self, reference_id: &str) -> Result<Option<WalletTransaction>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM wallet_transactions
            WHERE reference_id = $1 AND transaction_type = 'deposit' AND status = 'completed'
            LIMIT 1
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(reference_id)
        .fetch_optional(&mut *self.conn)
        .await
        .context("Failed to fetch deposit by reference")?;

        row.as_ref().map(row_to_transaction).transpose()
    }

    pub async fn lock_by_id(&mut self, transaction_id: i64) -> Result<Option<WalletTransaction>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM wallet_transactions WHERE id = $1 FOR UPDATE",
            TRANSACTION_COLUMNS
        ))
        .bind(transaction_id)
        .fetch_optional(&mut *self.conn)
        .await
        .context("Failed to lock wallet transaction")?;

        row.as_ref().map(row_to_transaction).transpose()
    }

    /// 상태 전이 (pending 출금의 승인/거절 전용)
    /// Status transition for reviewed withdrawals
    pub async fn update_status(
        &mut self,
        transaction_id: i64,
        status: TransactionStatus,
        description: Option<&str>,
    ) -> Result<WalletTransaction> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE wallet_transactions
            SET status = $1, description = COALESCE($2, description)
            WHERE id = $3
            RETURNING {}
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(status.as_str())
        .bind(description)
        .bind(transaction_id)
        .fetch_one(&mut *self.conn)
        .await
        .context("Failed to update wallet transaction status")?;

        row_to_transaction(&row)
    }

    /// 지갑의 트랜잭션 목록 (최신순)
    /// Entries of a wallet, newest first
    pub async fn get_by_wallet(&mut self, wallet_id: i64, limit: i64) -> Result<Vec<WalletTransaction>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM wallet_transactions
            WHERE wallet_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(wallet_id)
        .bind(limit)
        .fetch_all(&mut *self.conn)
        .await
        .context("Failed to fetch wallet transactions")?;

        rows.iter().map(row_to_transaction).collect()
    }

    /// 운영자 승인 대기 중인 출금 (오래된 순)
    /// Pending withdrawals, oldest first
    pub async fn get_pending_withdrawals(&mut self, limit: i64) -> Result<Vec<WalletTransaction>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM wallet_transactions
            WHERE transaction_type = 'withdrawal' AND status = 'pending'
            ORDER BY created_at ASC, id ASC
            LIMIT $1
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&mut *self.conn)
        .await
        .context("Failed to fetch pending withdrawals")?;

        rows.iter().map(row_to_transaction).collect()
    }
}

fn row_to_transaction(row: &PgRow) -> Result<WalletTransaction> {
    let transaction_type: String = row.try_get("transaction_type")?;
    let currency: String = row.try_get("currency")?;
    let status: String = row.try_get("status")?;
    Ok(WalletTransaction {
        id: row.try_get("id")?,
        wallet_id: row.try_get("wallet_id")?,
        transaction_type: transaction_type.parse().map_err(anyhow::Error::msg)?,
        amount: row.try_get("amount")?,
        commission: row.try_get("commission")?,
        currency: currency.parse().map_err(anyhow::Error::msg)?,
        status: status.parse().map_err(anyhow::Error::msg)?,
        reference_id: row.try_get("reference_id")?,
        transaction_hash: row.try_get("transaction_hash")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}
