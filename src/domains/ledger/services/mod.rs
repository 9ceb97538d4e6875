// Ledger domain services
pub mod ledger_service;
pub mod state;
pub mod validation;

pub use ledger_service::*;
pub use state::*;
