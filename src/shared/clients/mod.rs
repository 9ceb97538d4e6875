// External API clients
pub mod rails;
pub mod paypal;
pub mod coinpayments;

pub use rails::*;
pub use paypal::*;
pub use coinpayments::*;
