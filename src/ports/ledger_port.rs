//! Ledger source port trait.

use crate::domain::error::BidSignalError;
use crate::domain::ledger::LedgerRow;

pub use crate::domain::ledger::RejectedRow;

/// Rows accepted from a ledger source plus the ones that were dropped.
#[derive(Debug, Clone, Default)]
pub struct LedgerLoad {
    pub rows: Vec<LedgerRow>,
    pub rejected: Vec<RejectedRow>,
}

pub trait LedgerPort {
    /// Reads the full ledger snapshot. Rows are returned in source order.
    fn load(&self) -> Result<LedgerLoad, BidSignalError>;
}
