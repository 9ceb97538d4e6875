// Ledger repositories
pub mod wallet_repository;
pub mod admin_repository;
pub mod transaction_repository;

pub use wallet_repository::*;
pub use admin_repository::*;
pub use transaction_repository::*;
