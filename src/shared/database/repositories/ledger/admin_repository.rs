use sqlx::{PgConnection, Row};
use sqlx::postgres::PgRow;
use anyhow::{Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use crate::domains::ledger::models::{AdminSettings, AdminWallet, Currency};

const ADMIN_WALLET_COLUMNS: &str =
    "id, currency, balance, total_earned, total_withdrawn, created_at, updated_at";
const SETTINGS_COLUMNS: &str = "commission_rate, total_earnings, created_at, updated_at";

/// 관리자 지갑 / 관리자 설정 Repository
/// Repository over `admin_wallets` and the `admin_settings` singleton
pub struct AdminRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> AdminRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// 관리자 지갑 생성 (없으면) 후 잠금
    /// Create the admin wallet for a currency if missing, then lock it
    pub async fn lock_or_create_wallet(&mut self, currency: Currency) -> Result<AdminWallet> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO admin_wallets (currency, balance, total_earned, total_withdrawn, created_at, updated_at)
            VALUES ($1, 0, 0, 0, $2, $2)
            ON CONFLICT (currency) DO NOTHING
            "#,
        )
        .bind(currency.as_str())
        .bind(now)
        .execute(&mut *self.conn)
        .await
        .context("Failed to create admin wallet")?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM admin_wallets WHERE currency = $1 FOR UPDATE",
            ADMIN_WALLET_COLUMNS
        ))
        .bind(currency.as_str())
        .fetch_one(&mut *self.conn)
        .await
        .context("Failed to lock admin wallet")?;

        row_to_admin_wallet(&row)
    }

    /// 수수료 적립/환원 (balance, total_earned 동시 증감)
    /// Add commission delta to balance and total_earned
    pub async fn adjust_commission(&mut self, admin_wallet_id: i64, delta: Decimal) -> Result<AdminWallet> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE admin_wallets
            SET balance = balance + $1, total_earned = total_earned + $1, updated_at = $2
            WHERE id = $3
            RETURNING {}
            "#,
            ADMIN_WALLET_COLUMNS
        ))
        .bind(delta)
        .bind(Utc::now())
        .bind(admin_wallet_id)
        .fetch_one(&mut *self.conn)
        .await
        .context("Failed to update admin wallet")?;

        row_to_admin_wallet(&row)
    }

    pub async fn get_all_wallets(&mut self) -> Result<Vec<AdminWallet>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM admin_wallets ORDER BY currency ASC",
            ADMIN_WALLET_COLUMNS
        ))
        .fetch_all(&mut *self.conn)
        .await
        .context("Failed to fetch admin wallets")?;

        rows.iter().map(row_to_admin_wallet).collect()
    }

    /// 설정 조회 (잠금 없음)
    /// Get settings without locking
    pub async fn get_settings(&mut self) -> Result<Option<AdminSettings>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM admin_settings WHERE id = 1",
            SETTINGS_COLUMNS
        ))
        .fetch_optional(&mut *self.conn)
        .await
        .context("Failed to fetch admin settings")?;

        row.as_ref().map(row_to_settings).transpose()
    }

    /// 설정 생성 (없으면 기본 수수료율로) 후 잠금
    /// Create the singleton with the default rate if missing, then lock it
    pub async fn lock_or_create_settings(&mut self, default_rate: Decimal) -> Result<AdminSettings> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO admin_settings (id, commission_rate, total_earnings, created_at, updated_at)
            VALUES (1, $1, 0, $2, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(default_rate)
        .bind(now)
        .execute(&mut *self.conn)
        .await
        .context("Failed to create admin settings")?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM admin_settings WHERE id = 1 FOR UPDATE",
            SETTINGS_COLUMNS
        ))
        .fetch_one(&mut *self.conn)
        .await
        .context("Failed to lock admin settings")?;

        row_to_settings(&row)
    }

    pub async fn adjust_total_earnings(&mut self, delta: Decimal) -> Result<AdminSettings> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE admin_settings
            SET total_earnings = total_earnings + $1, updated_at = $2
            WHERE id = 1
            RETURNING {}
            "#,
            SETTINGS_COLUMNS
        ))
        .bind(delta)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await
        .context("Failed to update total earnings")?;

        row_to_settings(&row)
    }

    pub async fn set_commission_rate(&mut self, rate: Decimal) -> Result<AdminSettings> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE admin_settings
            SET commission_rate = $1, updated_at = $2
            WHERE id = 1
            RETURNING {}
            "#,
            SETTINGS_COLUMNS
        ))
        .bind(rate)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await
        .context("Failed to update commission rate")?;

        row_to_settings(&row)
    }
}

fn row_to_admin_wallet(row: &PgRow) -> Result<AdminWallet> {
    let currency: String = row.try_get("currency")?;
    Ok(AdminWallet {
        id: row.try_get("id")?,
        currency: currency.parse().map_err(anyhow::Error::msg)?,
        balance: row.try_get("balance")?,
        total_earned: row.try_get("total_earned")?,
        total_withdrawn: row.try_get("total_withdrawn")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_settings(row: &PgRow) -> Result<AdminSettings> {
    Ok(AdminSettings {
        commission_rate: row.try_get("commission_rate")?,
        total_earnings: row.try_get("total_earnings")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
