use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use crate::domains::ledger::models::{Currency, WithdrawalRequest};
use crate::domains::payments::models::WithdrawResponse;
use crate::domains::wallet::models::{
    TransactionsQuery, TransactionsResponse, WalletsResponse, WithdrawRequest,
};
use crate::shared::errors::LedgerError;
use crate::shared::middleware::AuthenticatedUser;
use crate::shared::services::AppState;

/// 내 지갑 목록 조회 핸들러
/// Get the caller's wallets
/// Note: user_id는 JWT 토큰에서 추출
#[utoipa::path(
    get,
    path = "/api/wallets",
    responses(
        (status = 200, description = "Wallets retrieved successfully", body = WalletsResponse),
        (status = 401, description = "Unauthorized (missing or invalid token)"),
        (status = 503, description = "Datastore unavailable")
    ),
    tag = "Wallets",
    security(("BearerAuth" = []))
)]
pub async fn get_wallets(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<Json<WalletsResponse>, (StatusCode, Json<serde_json::Value>)> {
    let wallets = app_state
        .ledger_state
        .ledger_service
        .wallets(&authenticated_user.user_id)
        .await
        .map_err(|e: LedgerError| -> (StatusCode, Json<serde_json::Value>) { e.into() })?;

    Ok(Json(WalletsResponse { success: true, wallets }))
}

/// 지갑 트랜잭션 내역 조회 핸들러
/// Get transaction history of one of the caller's wallets
#[utoipa::path(
    get,
    path = "/api/wallets/{currency}/transactions",
    params(
        ("currency" = String, Path, description = "USD or USDT_TRC20"),
        TransactionsQuery
    ),
    responses(
        (status = 200, description = "Transactions retrieved successfully", body = TransactionsResponse),
        (status = 400, description = "Unsupported currency"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Wallet not found")
    ),
    tag = "Wallets",
    security(("BearerAuth" = []))
)]
pub async fn get_transactions(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Path(currency): Path<String>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<TransactionsResponse>, (StatusCode, Json<serde_json::Value>)> {
    let currency: Currency = currency
        .parse()
        .map_err(|e: String| -> (StatusCode, Json<serde_json::Value>) { LedgerError::Validation(e).into() })?;

    let transactions = app_state
        .ledger_state
        .ledger_service
        .transactions(&authenticated_user.user_id, currency, query.limit)
        .await
        .map_err(|e: LedgerError| -> (StatusCode, Json<serde_json::Value>) { e.into() })?;

    Ok(Json(TransactionsResponse {
        success: true,
        currency,
        transactions,
    }))
}

/// 출금 핸들러 (USD / USDT_TRC20)
/// Withdraw handler
///
/// USDT_TRC20 출금은 Pending으로 기록된 뒤 운영자 승인을 기다립니다.
#[utoipa::path(
    post,
    path = "/api/wallets/withdraw",
    request_body = WithdrawRequest,
    responses(
        (status = 200, description = "Withdrawal settled", body = WithdrawResponse),
        (status = 400, description = "Validation error or insufficient balance"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Wallet not found"),
        (status = 503, description = "Settlement rolled back, retry")
    ),
    tag = "Wallets",
    security(("BearerAuth" = []))
)]
pub async fn withdraw(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(request): Json<WithdrawRequest>,
) -> Result<Json<WithdrawResponse>, (StatusCode, Json<serde_json::Value>)> {
    let receipt = app_state
        .payments_state
        .payments_service
        .withdraw(WithdrawalRequest {
            user_id: authenticated_user.user_id,
            currency: request.currency,
            gross_amount: request.amount,
            payout_target: request.payout_target,
        })
        .await
        .map_err(|e: LedgerError| -> (StatusCode, Json<serde_json::Value>) { e.into() })?;

    Ok(Json(receipt.into()))
}
