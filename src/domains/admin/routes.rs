// Admin domain routes
// 관리자 라우터 (운영자 키 필요)
use axum::{routing::{get, post, put}, Router};
use crate::domains::admin::handlers::admin_handler;
use crate::shared::services::AppState;

/// Create admin router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/settings", get(admin_handler::get_settings))
        .route("/settings/commission-rate", put(admin_handler::update_commission_rate))
        .route("/wallets", get(admin_handler::get_admin_wallets))
        .route("/withdrawals/pending", get(admin_handler::get_pending_withdrawals))
        .route("/withdrawals/:id/confirm", post(admin_handler::confirm_withdrawal))
        .route("/withdrawals/:id/reject", post(admin_handler::reject_withdrawal))
        .route("/reconcile", get(admin_handler::reconcile))
}
