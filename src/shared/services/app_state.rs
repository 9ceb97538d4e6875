use std::sync::Arc;
use anyhow::Result;
use crate::domains::auth::services::{AuthState, JwtService};
use crate::domains::ledger::services::LedgerState;
use crate::domains::payments::services::PaymentsState;
use crate::shared::clients::{CardRail, CryptoRail};
use crate::shared::config::Settings;
use crate::shared::database::LedgerStore;

/// Application state (combines all domain states)
/// 애플리케이션 상태 (모든 도메인 상태를 조합)
///
/// 저장소와 결제 레일은 밖에서 주입합니다.
/// 운영 환경은 PgLedgerStore + PayPal/CoinPayments, 테스트는 InMemoryLedgerStore + stub 레일.
#[derive(Clone)]
pub struct AppState {
    pub auth_state: AuthState,
    pub ledger_state: LedgerState,
    pub payments_state: PaymentsState,
}

impl AppState {
    /// 모든 도메인 State를 초기화하고 조합
    pub fn new(
        settings: &Settings,
        store: Arc<dyn LedgerStore>,
        card_rail: Arc<dyn CardRail>,
        crypto_rail: Arc<dyn CryptoRail>,
    ) -> Result<Self> {
        // 1. 공유 서비스 생성 (JWT)
        let jwt_service = JwtService::new(&settings.auth.jwt_secret, settings.auth.access_token_minutes);

        // 2. 각 도메인 State 생성
        let auth_state = AuthState::new(jwt_service, &settings.admin.api_key);
        let ledger_state = LedgerState::new(store, settings.ledger.commission_rate()?);
        let payments_state = PaymentsState::new(
            ledger_state.ledger_service.clone(),
            card_rail,
            crypto_rail,
            &settings.server.public_url,
        );

        Ok(Self {
            auth_state,
            ledger_state,
            payments_state,
        })
    }
}
