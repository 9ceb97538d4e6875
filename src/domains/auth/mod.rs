// Auth domain module
// 외부 인증 서비스가 발급한 JWT 검증
pub mod services;
pub mod models;

pub use services::*;
pub use models::*;
