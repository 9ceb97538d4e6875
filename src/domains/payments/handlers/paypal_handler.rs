use axum::{extract::State, http::StatusCode, Json};
use crate::domains::ledger::models::{Currency, WithdrawalRequest};
use crate::domains::payments::models::{
    CapturePayPalOrderRequest, CreatePayPalOrderRequest, CreatePayPalOrderResponse,
    DepositResponse, PayPalWithdrawRequest, WithdrawResponse,
};
use crate::shared::errors::LedgerError;
use crate::shared::middleware::AuthenticatedUser;
use crate::shared::services::AppState;

/// PayPal 주문 생성 핸들러
/// Create a PayPal checkout order (no balance change)
#[utoipa::path(
    post,
    path = "/api/payments/paypal/create-order",
    request_body = CreatePayPalOrderRequest,
    responses(
        (status = 200, description = "Order created", body = CreatePayPalOrderResponse),
        (status = 400, description = "Invalid amount"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "PayPal error")
    ),
    tag = "Payments",
    security(("BearerAuth" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(request): Json<CreatePayPalOrderRequest>,
) -> Result<Json<CreatePayPalOrderResponse>, (StatusCode, Json<serde_json::Value>)> {
    let order = app_state
        .payments_state
        .payments_service
        .create_paypal_order(&authenticated_user.user_id, request.amount)
        .await
        .map_err(|e: LedgerError| -> (StatusCode, Json<serde_json::Value>) { e.into() })?;

    tracing::info!(user_id = %authenticated_user.user_id, order_id = %order.order_id, "PayPal order created");

    Ok(Json(CreatePayPalOrderResponse {
        success: true,
        order_id: order.order_id,
        status: order.status,
        approval_url: order.approval_url,
    }))
}

/// PayPal 주문 캡처 핸들러
/// Capture an approved order and credit the USD wallet net of commission
///
/// 같은 order_id로 다시 호출하면 잔고 변화 없이 기존 결과를 돌려줍니다 (duplicate: true).
#[utoipa::path(
    post,
    path = "/api/payments/paypal/capture",
    request_body = CapturePayPalOrderRequest,
    responses(
        (status = 200, description = "Deposit settled (or already settled)", body = DepositResponse),
        (status = 400, description = "Validation error or order created by another user"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Order settled for another user"),
        (status = 502, description = "PayPal error"),
        (status = 503, description = "Settlement rolled back, retry")
    ),
    tag = "Payments",
    security(("BearerAuth" = []))
)]
pub async fn capture_order(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(request): Json<CapturePayPalOrderRequest>,
) -> Result<Json<DepositResponse>, (StatusCode, Json<serde_json::Value>)> {
    let receipt = app_state
        .payments_state
        .payments_service
        .capture_paypal_order(&authenticated_user.user_id, &request.order_id)
        .await
        .map_err(|e: LedgerError| -> (StatusCode, Json<serde_json::Value>) { e.into() })?;

    Ok(Json(receipt.into()))
}

/// PayPal 출금 핸들러
/// Withdraw USD to a PayPal account
#[utoipa::path(
    post,
    path = "/api/payments/paypal/withdraw",
    request_body = PayPalWithdrawRequest,
    responses(
        (status = 200, description = "Withdrawal processed", body = WithdrawResponse),
        (status = 400, description = "Validation error or insufficient balance"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "USD wallet not found"),
        (status = 503, description = "Settlement rolled back, retry")
    ),
    tag = "Payments",
    security(("BearerAuth" = []))
)]
pub async fn withdraw(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(request): Json<PayPalWithdrawRequest>,
) -> Result<Json<WithdrawResponse>, (StatusCode, Json<serde_json::Value>)> {
    let receipt = app_state
        .payments_state
        .payments_service
        .withdraw(WithdrawalRequest {
            user_id: authenticated_user.user_id,
            currency: Currency::Usd,
            gross_amount: request.amount,
            payout_target: request.paypal_email,
        })
        .await
        .map_err(|e: LedgerError| -> (StatusCode, Json<serde_json::Value>) { e.into() })?;

    Ok(Json(receipt.into()))
}
