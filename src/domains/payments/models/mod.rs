// Payments domain models
pub mod payment;

pub use payment::*;
