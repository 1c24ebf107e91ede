//! Core domain types and logic.

pub mod ledger;
pub mod confirmation;
pub mod config_validation;
pub mod error;
