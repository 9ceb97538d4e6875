// Auth domain services
pub mod jwt_service;
pub mod state;

pub use jwt_service::*;
pub use state::*;
