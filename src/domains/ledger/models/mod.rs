// Ledger domain models
pub mod currency;
pub mod wallet;
pub mod settings;
pub mod transaction;
pub mod commission;
pub mod settlement;

pub use currency::*;
pub use wallet::*;
pub use settings::*;
pub use transaction::*;
pub use commission::*;
pub use settlement::*;
