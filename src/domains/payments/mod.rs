// Payments domain module
// PayPal / CoinPayments 결제 흐름
pub mod handlers;
pub mod models;
pub mod services;
pub mod routes;

pub use handlers::*;
pub use models::*;
pub use services::*;
pub use routes::*;
