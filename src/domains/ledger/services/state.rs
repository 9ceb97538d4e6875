// Ledger domain state
// 원장 도메인 상태
use std::sync::Arc;
use rust_decimal::Decimal;
use crate::domains::ledger::services::LedgerService;
use crate::shared::database::LedgerStore;

/// Ledger domain state
/// 정산 엔진을 포함하는 상태 (payments / wallet / admin 핸들러가 공유)
#[derive(Clone)]
pub struct LedgerState {
    pub ledger_service: LedgerService,
}

impl LedgerState {
    /// LedgerState 생성 (저장소와 기본 수수료율 필요)
    pub fn new(store: Arc<dyn LedgerStore>, default_commission_rate: Decimal) -> Self {
        Self {
            ledger_service: LedgerService::new(store, default_commission_rate),
        }
    }
}
