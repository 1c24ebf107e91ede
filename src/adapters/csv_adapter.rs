//! CSV ledger adapter.
//!
//! Expects a header row naming `date, price, bid_volume, ask_volume`; columns
//! are matched by name so extra columns and reordering are tolerated.

use crate::domain::error::BidSignalError;
use crate::domain::ledger::LedgerRow;
use crate::ports::ledger_port::{LedgerLoad, LedgerPort, RejectedRow};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub const REQUIRED_COLUMNS: [&str; 4] = ["date", "price", "bid_volume", "ask_volume"];

#[derive(Debug, Deserialize)]
struct RawRow {
    date: String,
    price: String,
    bid_volume: String,
    ask_volume: String,
}

pub struct CsvLedgerAdapter {
    path: PathBuf,
    strict: bool,
}

impl CsvLedgerAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            strict: false,
        }
    }

    /// In strict mode the first malformed row fails the whole load.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl LedgerPort for CsvLedgerAdapter {
    fn load(&self) -> Result<LedgerLoad, BidSignalError> {
        let source = self.path.display().to_string();
        let content = fs::read_to_string(&self.path).map_err(|e| BidSignalError::LedgerRead {
            path: source.clone(),
            reason: e.to_string(),
        })?;

        let load = parse_ledger(content.as_bytes(), &source, self.strict)?;
        tracing::info!(
            path = %source,
            rows = load.rows.len(),
            rejected = load.rejected.len(),
            "loaded ledger"
        );
        Ok(load)
    }
}

/// Parses CSV ledger text. `source` names the input in error messages.
pub fn parse_ledger<R: std::io::Read>(
    reader: R,
    source: &str,
    strict: bool,
) -> Result<LedgerLoad, BidSignalError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| BidSignalError::LedgerRead {
            path: source.to_string(),
            reason: format!("CSV header error: {}", e),
        })?
        .clone();

    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h.eq_ignore_ascii_case(col)))
    {
        return Err(BidSignalError::LedgerRead {
            path: source.to_string(),
            reason: format!("missing {} column", missing),
        });
    }
    let headers = csv::StringRecord::from(
        headers
            .iter()
            .map(|h| h.to_ascii_lowercase())
            .collect::<Vec<_>>(),
    );

    let mut load = LedgerLoad::default();

    for result in rdr.records() {
        let record = result.map_err(|e| BidSignalError::LedgerRead {
            path: source.to_string(),
            reason: format!("CSV parse error: {}", e),
        })?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

        let parsed = if record.len() != headers.len() {
            Err(format!(
                "expected {} fields, found {}",
                headers.len(),
                record.len()
            ))
        } else {
            record
                .deserialize::<RawRow>(Some(&headers))
                .map_err(|e| e.to_string())
                .and_then(|raw| coerce(&raw))
        };

        match parsed {
            Ok(row) => load.rows.push(row),
            Err(reason) if strict => {
                return Err(BidSignalError::MalformedRow { line, reason });
            }
            Err(reason) => {
                tracing::warn!(path = %source, line, %reason, "dropping malformed ledger row");
                load.rejected.push(RejectedRow { line, reason });
            }
        }
    }

    Ok(load)
}

fn coerce(raw: &RawRow) -> Result<LedgerRow, String> {
    let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d")
        .map_err(|e| format!("invalid date {:?}: {}", raw.date, e))?;
    let row = LedgerRow {
        date,
        price: parse_number("price", &raw.price)?,
        bid_volume: parse_number("bid_volume", &raw.bid_volume)?,
        ask_volume: parse_number("ask_volume", &raw.ask_volume)?,
    };
    row.check()?;
    Ok(row)
}

fn parse_number(field: &str, value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .map_err(|e| format!("invalid {} value {:?}: {}", field, value, e))
}
