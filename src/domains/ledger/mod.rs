// Ledger domain module
// 지갑 잔고, 수수료, 원장 기록을 다루는 정산 엔진
pub mod models;
pub mod services;

pub use models::*;
pub use services::*;
