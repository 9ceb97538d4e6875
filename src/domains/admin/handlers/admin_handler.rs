use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use crate::domains::admin::models::{
    AdminWalletsResponse, PendingWithdrawalsQuery, PendingWithdrawalsResponse, ReconcileQuery,
    ReconcileResponse, RejectWithdrawalRequest, ReviewWithdrawalResponse, SettingsResponse,
    UpdateCommissionRateRequest,
};
use crate::domains::ledger::models::Currency;
use crate::shared::errors::LedgerError;
use crate::shared::middleware::AdminOperator;
use crate::shared::services::AppState;

type ApiError = (StatusCode, Json<serde_json::Value>);

// =====================================================
// 관리자 API (X-Admin-Key 필요)
// =====================================================

/// 관리자 설정 조회 핸들러
/// Get admin settings (commission rate, total earnings)
#[utoipa::path(
    get,
    path = "/api/admin/settings",
    responses(
        (status = 200, description = "Settings", body = SettingsResponse),
        (status = 403, description = "Operator key missing or wrong"),
        (status = 404, description = "Settings not created yet")
    ),
    tag = "Admin",
    security(("AdminKey" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    _operator: AdminOperator,
) -> Result<Json<SettingsResponse>, ApiError> {
    let settings = app_state
        .ledger_state
        .ledger_service
        .settings()
        .await
        .map_err(|e: LedgerError| -> ApiError { e.into() })?;

    Ok(Json(SettingsResponse { success: true, settings }))
}

/// 수수료율 변경 핸들러
/// Update commission rate (applies to settlements that start afterwards)
#[utoipa::path(
    put,
    path = "/api/admin/settings/commission-rate",
    request_body = UpdateCommissionRateRequest,
    responses(
        (status = 200, description = "Commission rate updated", body = SettingsResponse),
        (status = 400, description = "Rate outside [0, 1)"),
        (status = 403, description = "Operator key missing or wrong")
    ),
    tag = "Admin",
    security(("AdminKey" = []))
)]
pub async fn update_commission_rate(
    State(app_state): State<AppState>,
    _operator: AdminOperator,
    Json(request): Json<UpdateCommissionRateRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let settings = app_state
        .ledger_state
        .ledger_service
        .update_commission_rate(request.commission_rate)
        .await
        .map_err(|e: LedgerError| -> ApiError { e.into() })?;

    Ok(Json(SettingsResponse { success: true, settings }))
}

/// 관리자 지갑 (통화별 수수료 적립) 조회 핸들러
#[utoipa::path(
    get,
    path = "/api/admin/wallets",
    responses(
        (status = 200, description = "Admin wallets", body = AdminWalletsResponse),
        (status = 403, description = "Operator key missing or wrong")
    ),
    tag = "Admin",
    security(("AdminKey" = []))
)]
pub async fn get_admin_wallets(
    State(app_state): State<AppState>,
    _operator: AdminOperator,
) -> Result<Json<AdminWalletsResponse>, ApiError> {
    let wallets = app_state
        .ledger_state
        .ledger_service
        .admin_wallets()
        .await
        .map_err(|e: LedgerError| -> ApiError { e.into() })?;

    Ok(Json(AdminWalletsResponse { success: true, wallets }))
}

/// 대기 중인 출금 목록 핸들러
#[utoipa::path(
    get,
    path = "/api/admin/withdrawals/pending",
    params(PendingWithdrawalsQuery),
    responses(
        (status = 200, description = "Pending withdrawals, oldest first", body = PendingWithdrawalsResponse),
        (status = 403, description = "Operator key missing or wrong")
    ),
    tag = "Admin",
    security(("AdminKey" = []))
)]
pub async fn get_pending_withdrawals(
    State(app_state): State<AppState>,
    _operator: AdminOperator,
    Query(query): Query<PendingWithdrawalsQuery>,
) -> Result<Json<PendingWithdrawalsResponse>, ApiError> {
    let withdrawals = app_state
        .ledger_state
        .ledger_service
        .pending_withdrawals(query.limit)
        .await
        .map_err(|e: LedgerError| -> ApiError { e.into() })?;

    Ok(Json(PendingWithdrawalsResponse { success: true, withdrawals }))
}

/// 출금 승인 핸들러
/// Confirm a pending withdrawal after the payout went out
#[utoipa::path(
    post,
    path = "/api/admin/withdrawals/{id}/confirm",
    params(("id" = i64, Path, description = "Wallet transaction ID")),
    responses(
        (status = 200, description = "Withdrawal confirmed", body = ReviewWithdrawalResponse),
        (status = 403, description = "Operator key missing or wrong"),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Not a pending withdrawal")
    ),
    tag = "Admin",
    security(("AdminKey" = []))
)]
pub async fn confirm_withdrawal(
    State(app_state): State<AppState>,
    _operator: AdminOperator,
    Path(transaction_id): Path<i64>,
) -> Result<Json<ReviewWithdrawalResponse>, ApiError> {
    let reviewed = app_state
        .ledger_state
        .ledger_service
        .confirm_withdrawal(transaction_id)
        .await
        .map_err(|e: LedgerError| -> ApiError { e.into() })?;

    Ok(Json(ReviewWithdrawalResponse::new("Withdrawal confirmed", reviewed)))
}

/// 출금 거절 핸들러
/// Reject a pending withdrawal: refunds the user and reverses the commission
#[utoipa::path(
    post,
    path = "/api/admin/withdrawals/{id}/reject",
    params(("id" = i64, Path, description = "Wallet transaction ID")),
    request_body = RejectWithdrawalRequest,
    responses(
        (status = 200, description = "Withdrawal rejected and refunded", body = ReviewWithdrawalResponse),
        (status = 403, description = "Operator key missing or wrong"),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Not a pending withdrawal")
    ),
    tag = "Admin",
    security(("AdminKey" = []))
)]
pub async fn reject_withdrawal(
    State(app_state): State<AppState>,
    _operator: AdminOperator,
    Path(transaction_id): Path<i64>,
    request: Option<Json<RejectWithdrawalRequest>>,
) -> Result<Json<ReviewWithdrawalResponse>, ApiError> {
    let Json(request) = request.unwrap_or_default();

    let reviewed = app_state
        .ledger_state
        .ledger_service
        .reject_withdrawal(transaction_id, request.reason)
        .await
        .map_err(|e: LedgerError| -> ApiError { e.into() })?;

    Ok(Json(ReviewWithdrawalResponse::new("Withdrawal rejected and refunded", reviewed)))
}

/// 원장 대사 핸들러
/// Compare a wallet balance with the sum of its ledger entries
#[utoipa::path(
    get,
    path = "/api/admin/reconcile",
    params(ReconcileQuery),
    responses(
        (status = 200, description = "Reconciliation result", body = ReconcileResponse),
        (status = 403, description = "Operator key missing or wrong"),
        (status = 404, description = "Wallet not found")
    ),
    tag = "Admin",
    security(("AdminKey" = []))
)]
pub async fn reconcile(
    State(app_state): State<AppState>,
    _operator: AdminOperator,
    Query(query): Query<ReconcileQuery>,
) -> Result<Json<ReconcileResponse>, ApiError> {
    let currency: Currency = query
        .currency
        .parse()
        .map_err(|e: String| -> ApiError { LedgerError::Validation(e).into() })?;

    let reconciliation = app_state
        .ledger_state
        .ledger_service
        .reconcile(&query.user_id, currency)
        .await
        .map_err(|e: LedgerError| -> ApiError { e.into() })?;

    if !reconciliation.is_balanced() {
        tracing::error!(
            wallet_id = reconciliation.wallet_id,
            balance = %reconciliation.balance,
            ledger_sum = %reconciliation.ledger_sum,
            "Wallet balance does not match its ledger"
        );
    }

    Ok(Json(ReconcileResponse {
        success: true,
        balanced: reconciliation.is_balanced(),
        reconciliation,
    }))
}
