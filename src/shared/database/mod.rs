// Database module
pub mod connection;
pub mod store;
pub mod repositories;
pub mod pg_ledger_store;
pub mod in_memory;

pub use connection::*;
pub use store::*;
pub use repositories::*;
pub use pg_ledger_store::*;
pub use in_memory::*;
