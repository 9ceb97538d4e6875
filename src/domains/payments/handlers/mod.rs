// Payments handlers module
pub mod paypal_handler;
pub mod coinpayments_handler;

pub use paypal_handler::*;
pub use coinpayments_handler::*;
