use sqlx::{PgConnection, Row};
use sqlx::postgres::PgRow;
use anyhow::{Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use crate::domains::ledger::models::{Currency, Wallet};

const WALLET_COLUMNS: &str = "id, user_id, currency, balance, created_at, updated_at";

/// 사용자 지갑 Repository
/// Repository over the `wallets` table
///
/// 트랜잭션 안에서도 쓸 수 있도록 풀이 아니라 커넥션을 빌려 사용합니다.
pub struct WalletRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> WalletRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// 사용자 ID와 통화로 지갑 조회
    /// Get wallet by user and currency
    pub async fn get_by_user_and_currency(
        &mut self,
        user_id: &str,
        currency: Currency,
    ) -> Result<Option<Wallet>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM wallets WHERE user_id = $1 AND currency = $2",
            WALLET_COLUMNS
        ))
        .bind(user_id)
        .bind(currency.as_str())
        .fetch_optional(&mut *self.conn)
        .await
        .context("Failed to fetch wallet by user and currency")?;

        row.as_ref().map(row_to_wallet).transpose()
    }

    /// 지갑 조회 + 행 잠금 (SELECT ... FOR UPDATE)
    /// Get wallet and lock the row until the transaction ends
    pub async fn lock_by_user_and_currency(
        &mut self,
        user_id: &str,
        currency: Currency,
    ) -> Result<Option<Wallet>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM wallets WHERE user_id = $1 AND currency = $2 FOR UPDATE",
            WALLET_COLUMNS
        ))
        .bind(user_id)
        .bind(currency.as_str())
        .fetch_optional(&mut *self.conn)
        .await
        .context("Failed to lock wallet")?;

        row.as_ref().map(row_to_wallet).transpose()
    }

    pub async fn lock_by_id(&mut self, wallet_id: i64) -> Result<Option<Wallet>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM wallets WHERE id = $1 FOR UPDATE",
            WALLET_COLUMNS
        ))
        .bind(wallet_id)
        .fetch_optional(&mut *self.conn)
        .await
        .context("Failed to lock wallet by id")?;

        row.as_ref().map(row_to_wallet).transpose()
    }

    /// 지갑 생성 (이미 있으면 무시) 후 잠금
    /// Create the wallet if missing, then lock it
    ///
    /// ON CONFLICT DO NOTHING으로 동시 생성 경쟁을 흡수하고,
    /// 이어지는 FOR UPDATE가 승자 행을 잠급니다.
    pub async fn lock_or_create(&mut self, user_id: &str, currency: Currency) -> Result<Wallet> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO wallets (user_id, currency, balance, created_at, updated_at)
            VALUES ($1, $2, 0, $3, $3)
            ON CONFLICT (user_id, currency) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(currency.as_str())
        .bind(now)
        .execute(&mut *self.conn)
        .await
        .context("Failed to create wallet")?;

        self.lock_by_user_and_currency(user_id, currency)
            .await?
            .context("Wallet missing right after creation")
    }

    /// 잔고 증감
    /// Add delta to balance (negative delta debits)
    pub async fn adjust_balance(&mut self, wallet_id: i64, delta: Decimal) -> Result<Wallet> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE wallets
            SET balance = balance + $1, updated_at = $2
            WHERE id = $3
            RETURNING {}
            "#,
            WALLET_COLUMNS
        ))
        .bind(delta)
        .bind(Utc::now())
        .bind(wallet_id)
        .fetch_one(&mut *self.conn)
        .await
        .context("Failed to update wallet balance")?;

        row_to_wallet(&row)
    }

    /// 사용자의 모든 지갑
    /// All wallets of a user
    pub async fn get_all_by_user(&mut self, user_id: &str) -> Result<Vec<Wallet>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM wallets WHERE user_id = $1 ORDER BY currency ASC",
            WALLET_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await
        .context("Failed to fetch wallets by user")?;

        rows.iter().map(row_to_wallet).collect()
    }
}

fn row_to_wallet(row: &PgRow) -> Result<Wallet> {
    let currency: String = row.try_get("currency")?;
    Ok(Wallet {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        currency: currency.parse().map_err(anyhow::Error::msg)?,
        balance: row.try_get("balance")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
