use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use crate::domains::payments::models::{CryptoDepositRequest, CryptoDepositResponse};
use crate::domains::payments::services::IpnOutcome;
use crate::shared::errors::LedgerError;
use crate::shared::middleware::AuthenticatedUser;
use crate::shared::services::AppState;

/// CoinPayments 입금 생성 핸들러
/// Create a USDT TRC-20 checkout (no balance change until the IPN arrives)
#[utoipa::path(
    post,
    path = "/api/payments/coinpayments/deposit",
    request_body = CryptoDepositRequest,
    responses(
        (status = 200, description = "Checkout created", body = CryptoDepositResponse),
        (status = 400, description = "Invalid amount"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "CoinPayments error")
    ),
    tag = "Payments",
    security(("BearerAuth" = []))
)]
pub async fn create_deposit(
    State(app_state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(request): Json<CryptoDepositRequest>,
) -> Result<Json<CryptoDepositResponse>, (StatusCode, Json<serde_json::Value>)> {
    let checkout = app_state
        .payments_state
        .payments_service
        .create_crypto_deposit(
            &authenticated_user.user_id,
            request.amount,
            authenticated_user.email.as_deref(),
        )
        .await
        .map_err(|e: LedgerError| -> (StatusCode, Json<serde_json::Value>) { e.into() })?;

    Ok(Json(CryptoDepositResponse {
        success: true,
        checkout,
    }))
}

/// CoinPayments IPN 핸들러
/// Instant payment notification webhook (no bearer token; authenticated by HMAC)
///
/// 정산 완료, 이미 정산됨, 미완료 상태 모두 "IPN OK"로 응답합니다.
/// 그 외 에러는 상태 코드와 함께 돌려주어 CoinPayments가 재전송하도록 합니다.
#[utoipa::path(
    post,
    path = "/api/payments/coinpayments/ipn",
    request_body(content = String, content_type = "application/x-www-form-urlencoded"),
    params(
        ("HMAC" = String, Header, description = "hex HMAC-SHA512 of the raw body")
    ),
    responses(
        (status = 200, description = "IPN OK"),
        (status = 400, description = "Malformed notification"),
        (status = 401, description = "Invalid signature"),
        (status = 503, description = "Settlement rolled back, retry")
    ),
    tag = "Payments"
)]
pub async fn ipn(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let hmac = headers.get("HMAC").and_then(|value| value.to_str().ok());

    let result = app_state
        .payments_state
        .payments_service
        .handle_ipn(&body, hmac)
        .await;

    match result {
        Ok(IpnOutcome::Settled(receipt)) => {
            tracing::info!(
                transaction_id = receipt.transaction.id,
                duplicate = receipt.duplicate,
                "IPN processed"
            );
            (StatusCode::OK, "IPN OK").into_response()
        }
        Ok(IpnOutcome::Ignored { .. }) => (StatusCode::OK, "IPN OK").into_response(),
        // 다른 사용자로 이미 정산된 txn_id: 재전송해도 결과가 같으므로 수신 확인만
        Err(LedgerError::DuplicateSettlement { reference_id }) => {
            tracing::warn!(reference_id = %reference_id, "IPN for a reference settled elsewhere");
            (StatusCode::OK, "IPN OK").into_response()
        }
        Err(e) => {
            let response: (StatusCode, Json<serde_json::Value>) = e.into();
            response.into_response()
        }
    }
}
