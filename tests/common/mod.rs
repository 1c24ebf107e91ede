#![allow(dead_code)]

use chrono::NaiveDate;
use bidsignal::domain::error::BidSignalError;
pub use bidsignal::domain::ledger::LedgerRow;
use bidsignal::ports::ledger_port::{LedgerLoad, LedgerPort, RejectedRow};
use std::io::Write;

pub struct MockLedgerPort {
    pub rows: Vec<LedgerRow>,
    pub rejected: Vec<RejectedRow>,
    pub error: Option<String>,
}

impl MockLedgerPort {
    pub fn new(rows: Vec<LedgerRow>) -> Self {
        Self {
            rows,
            rejected: Vec::new(),
            error: None,
        }
    }

    pub fn with_rejected(mut self, line: usize, reason: &str) -> Self {
        self.rejected.push(RejectedRow {
            line,
            reason: reason.to_string(),
        });
        self
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            rows: Vec::new(),
            rejected: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl LedgerPort for MockLedgerPort {
    fn load(&self) -> Result<LedgerLoad, BidSignalError> {
        if let Some(reason) = &self.error {
            return Err(BidSignalError::LedgerRead {
                path: "mock".to_string(),
                reason: reason.clone(),
            });
        }
        Ok(LedgerLoad {
            rows: self.rows.clone(),
            rejected: self.rejected.clone(),
        })
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_row(d: &str, price: f64, bid: f64, ask: f64) -> LedgerRow {
    LedgerRow::new(date(d), price, bid, ask)
}

/// The three-row ledger used throughout the scenario tests.
pub fn sample_ledger() -> Vec<LedgerRow> {
    vec![
        make_row("2026-02-01", 10.0, 80.0, 20.0),
        make_row("2026-02-05", 10.2, 90.0, 10.0),
        make_row("2026-02-10", 10.5, 60.0, 40.0),
    ]
}

pub const SAMPLE_CSV: &str = "date,price,bid_volume,ask_volume\n\
    2026-02-01,10.0,80,20\n\
    2026-02-05,10.2,90,10\n\
    2026-02-10,10.5,60,40\n";

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
