//! bidsignal — structural bid confirmation over a bid/ask ledger.
//!
//! Hexagonal architecture: the pure confirmation engine and its types live in
//! [`domain`], port traits in [`ports`], concrete CSV/INI/HTTP implementations
//! in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
