// TaskInn wallet ledger: commission settlement engine and payment API
pub mod domains;
pub mod shared;
pub mod routes;
