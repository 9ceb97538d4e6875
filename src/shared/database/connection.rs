use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use anyhow::{Context, Result};
use std::time::Duration;
use crate::shared::config::DatabaseSettings;

// 데이터베이스 연결 풀
// 프로세스 시작 시 한 번 생성하여 AppState로 주입합니다 (전역 싱글톤 없음).
// Database connection pool for PostgreSQL
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    statement_timeout: Duration,
}

impl Database {
    // 데이터베이스 연결 생성
    // Create database connection
    pub async fn new(settings: &DatabaseSettings) -> Result<Self> {
        let statement_timeout = Duration::from_secs(settings.statement_timeout_secs);
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(statement_timeout)
            .connect(&settings.url)
            .await
            .context("Failed to connect to database")?;

        Ok(Self { pool, statement_timeout })
    }

    // 연결 풀 반환
    // Get connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Upper bound for any statement or lock wait inside a settlement.
    pub fn statement_timeout(&self) -> Duration {
        self.statement_timeout
    }

    // 마이그레이션 실행
    // Run migrations from migrations/ folder
    pub async fn initialize(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(self.pool())
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database migrations completed successfully");
        Ok(())
    }
}
