// Payments domain services
pub mod payments_service;
pub mod state;

pub use payments_service::*;
pub use state::*;
