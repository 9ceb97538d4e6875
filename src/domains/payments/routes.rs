// Payments domain routes
// 결제 도메인 라우터
use axum::{routing::post, Router};
use crate::domains::payments::handlers::{coinpayments_handler, paypal_handler};
use crate::shared::services::AppState;

/// Create payments router
/// 결제 라우터 생성
pub fn create_payments_router() -> Router<AppState> {
    Router::new()
        .route("/paypal/create-order", post(paypal_handler::create_order))  // 인증 필요
        .route("/paypal/capture", post(paypal_handler::capture_order))  // 인증 필요
        .route("/paypal/withdraw", post(paypal_handler::withdraw))  // 인증 필요
        .route("/coinpayments/deposit", post(coinpayments_handler::create_deposit))  // 인증 필요
        .route("/coinpayments/ipn", post(coinpayments_handler::ipn))  // HMAC 서명
}
