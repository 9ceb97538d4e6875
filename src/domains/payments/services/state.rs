// Payments domain state
// 결제 도메인 상태
use std::sync::Arc;
use crate::domains::ledger::services::LedgerService;
use crate::domains::payments::services::PaymentsService;
use crate::shared::clients::{CardRail, CryptoRail};

/// Payments domain state
/// 결제 레일과 정산 엔진을 묶은 상태
#[derive(Clone)]
pub struct PaymentsState {
    pub payments_service: PaymentsService,
}

impl PaymentsState {
    pub fn new(
        ledger: LedgerService,
        card_rail: Arc<dyn CardRail>,
        crypto_rail: Arc<dyn CryptoRail>,
        public_url: &str,
    ) -> Self {
        Self {
            payments_service: PaymentsService::new(ledger, card_rail, crypto_rail, public_url),
        }
    }
}
