// Request extractors (bearer user, operator key)
pub mod auth;
pub mod admin;

pub use auth::*;
pub use admin::*;
