//! Port traits decoupling the domain from its data sources.

pub mod config_port;
pub mod ledger_port;
