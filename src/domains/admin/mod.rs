// Admin domain module
// 수수료 설정, 관리자 지갑, 출금 검토
pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::*;
pub use models::*;
pub use routes::*;
