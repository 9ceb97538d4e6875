// Domains module
pub mod auth;
pub mod ledger;
pub mod payments;
pub mod wallet;
pub mod admin;
