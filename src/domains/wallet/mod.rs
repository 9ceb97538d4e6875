// Wallet domain module
// 사용자 지갑 조회 / 출금
pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::*;
pub use models::*;
pub use routes::*;
