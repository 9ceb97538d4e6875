// Routes module: 라우팅 설정
// 역할: 모든 도메인의 라우터를 조합
// Routes module: combines all domain routers

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use crate::shared::services::AppState;

// 각 도메인의 routes import
use crate::domains::payments::routes::create_payments_router;
use crate::domains::wallet::routes::create_wallet_router;
use crate::domains::admin::routes::create_admin_router;

/// Create main router (combines all domain routers)
/// 메인 라우터 생성 (모든 도메인 라우터 조합)
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/payments", create_payments_router())
        .nest("/api/wallets", create_wallet_router())
        .nest("/api/admin", create_admin_router())
}

/// 상태가 주입된 애플리케이션 (요청 로그 포함)
/// Application with state and request tracing
pub fn build_app(app_state: AppState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn health() -> Json<Value> {
    Json(json!({ "success": true, "status": "ok" }))
}
