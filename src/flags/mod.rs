//! Flag reconciliation: translate, reset and filter by flag codes
//!
//! After the QC tests have run, these operations collapse the flag columns
//! into their final state ([`replace`]) and cut the table down to the
//! parameters and rows a consumer wants ([`filter`]).

pub mod filter;
pub mod replace;
