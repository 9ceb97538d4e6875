use std::sync::Arc;
use anyhow::{Context, Result};
use axum::http::{HeaderName, HeaderValue, Method};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use taskinn_ledger::routes::build_app;
use taskinn_ledger::shared::clients::{CoinPaymentsClient, PayPalClient};
use taskinn_ledger::shared::config::Settings;
use taskinn_ledger::shared::database::{Database, PgLedgerStore};
use taskinn_ledger::shared::middleware::ADMIN_KEY_HEADER;
use taskinn_ledger::shared::services::AppState;
use taskinn_ledger::shared::telemetry::init_logging;

// Import models for OpenAPI schema
use taskinn_ledger::domains::admin::models::*;
use taskinn_ledger::domains::ledger::models::*;
use taskinn_ledger::domains::payments::models::*;
use taskinn_ledger::domains::wallet::models::*;
use taskinn_ledger::shared::clients::{CreatedOrder, CryptoCheckout};

// OpenAPI 스키마 정의: Swagger 문서 자동 생성
#[derive(OpenApi)]
#[openapi(
    paths(
        taskinn_ledger::domains::payments::handlers::paypal_handler::create_order,
        taskinn_ledger::domains::payments::handlers::paypal_handler::capture_order,
        taskinn_ledger::domains::payments::handlers::paypal_handler::withdraw,
        taskinn_ledger::domains::payments::handlers::coinpayments_handler::create_deposit,
        taskinn_ledger::domains::payments::handlers::coinpayments_handler::ipn,
        taskinn_ledger::domains::wallet::handlers::wallet_handler::get_wallets,
        taskinn_ledger::domains::wallet::handlers::wallet_handler::get_transactions,
        taskinn_ledger::domains::wallet::handlers::wallet_handler::withdraw,
        taskinn_ledger::domains::admin::handlers::admin_handler::get_settings,
        taskinn_ledger::domains::admin::handlers::admin_handler::update_commission_rate,
        taskinn_ledger::domains::admin::handlers::admin_handler::get_admin_wallets,
        taskinn_ledger::domains::admin::handlers::admin_handler::get_pending_withdrawals,
        taskinn_ledger::domains::admin::handlers::admin_handler::confirm_withdrawal,
        taskinn_ledger::domains::admin::handlers::admin_handler::reject_withdrawal,
        taskinn_ledger::domains::admin::handlers::admin_handler::reconcile
    ),
    components(schemas(
        Currency,
        PaymentRail,
        TransactionType,
        TransactionStatus,
        Wallet,
        AdminWallet,
        AdminSettings,
        WalletTransaction,
        CommissionSplit,
        Reconciliation,
        CreatePayPalOrderRequest,
        CreatePayPalOrderResponse,
        CapturePayPalOrderRequest,
        DepositResponse,
        PayPalWithdrawRequest,
        WithdrawResponse,
        CryptoDepositRequest,
        CryptoDepositResponse,
        CreatedOrder,
        CryptoCheckout,
        WalletsResponse,
        TransactionsResponse,
        WithdrawRequest,
        SettingsResponse,
        UpdateCommissionRateRequest,
        AdminWalletsResponse,
        PendingWithdrawalsResponse,
        RejectWithdrawalRequest,
        ReviewWithdrawalResponse,
        ReconcileResponse
    )),
    modifiers(
        &SecurityAddon
    ),
    tags(
        (name = "Payments", description = "PayPal and CoinPayments deposit / withdrawal flows"),
        (name = "Wallets", description = "User wallets and ledger history"),
        (name = "Admin", description = "Commission settings and withdrawal review")
    ),
    info(
        title = "TaskInn Wallet Ledger",
        description = "Wallet ledger and commission settlement API",
        version = "1.0.0"
    )
)]
struct ApiDoc;

// Security scheme 정의: Swagger UI에서 "Authorize" 버튼 추가
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "AdminKey",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new(ADMIN_KEY_HEADER),
                    ),
                ),
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 설정 / 로깅
    let settings = Settings::load().context("Failed to load configuration")?;
    init_logging(&settings.log).context("Failed to initialize logging")?;
    if settings.auth.uses_default_secret() {
        tracing::warn!("auth.jwt_secret is the built-in development default; set TASKINN__AUTH__JWT_SECRET");
    }
    if settings.admin.api_key.is_empty() {
        tracing::warn!("admin.api_key is empty; admin API is disabled");
    }

    // DB 연결 + 마이그레이션
    let db = Database::new(&settings.database).await?;
    db.initialize().await?;

    // 결제 레일
    let card_rail = Arc::new(PayPalClient::new(&settings.paypal)?);
    let crypto_rail = Arc::new(CoinPaymentsClient::new(
        &settings.coinpayments,
        &settings.server.public_url,
    )?);

    // AppState 생성 (모든 Service 초기화)
    let app_state = AppState::new(&settings, Arc::new(PgLedgerStore::new(db)), card_rail, crypto_rail)?;

    // CORS 설정
    let origin = settings
        .server
        .cors_origin
        .parse::<HeaderValue>()
        .context("Invalid server.cors_origin")?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
            HeaderName::from_static("x-admin-key"),
        ])
        .allow_credentials(true);

    // Router 생성
    let app = build_app(app_state)
        .merge(SwaggerUi::new("/api").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    let address = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!(address = %address, "Server running");
    tracing::info!("Swagger UI available at {}/api", settings.server.public_url);

    // 서버 실행
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
