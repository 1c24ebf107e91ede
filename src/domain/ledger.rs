//! Bid/ask ledger rows and ledger normalization.

use chrono::NaiveDate;
use serde::Serialize;

/// One dated observation in the bid/ask ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub price: f64,
    pub bid_volume: f64,
    pub ask_volume: f64,
}

impl LedgerRow {
    pub fn new(date: NaiveDate, price: f64, bid_volume: f64, ask_volume: f64) -> Self {
        Self {
            date,
            price,
            bid_volume,
            ask_volume,
        }
    }

    /// bid / (bid + ask), or 0.5 when both sides are empty. Always in [0, 1]
    /// for rows that pass `check`, including volumes whose sum overflows.
    pub fn bid_ratio(&self) -> f64 {
        let total = self.bid_volume + self.ask_volume;
        if total.is_finite() {
            return if total > 0.0 {
                self.bid_volume / total
            } else {
                0.5
            };
        }
        let scale = self.bid_volume.max(self.ask_volume);
        let bid = self.bid_volume / scale;
        bid / (bid + self.ask_volume / scale)
    }

    /// Checks the numeric invariants a row must hold before evaluation.
    pub fn check(&self) -> Result<(), String> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(format!("price must be positive, got {}", self.price));
        }
        if !self.bid_volume.is_finite() || self.bid_volume < 0.0 {
            return Err(format!(
                "bid_volume must be non-negative, got {}",
                self.bid_volume
            ));
        }
        if !self.ask_volume.is_finite() || self.ask_volume < 0.0 {
            return Err(format!(
                "ask_volume must be non-negative, got {}",
                self.ask_volume
            ));
        }
        Ok(())
    }
}

/// A row dropped before evaluation, kept so callers can report the gap.
/// `line` is the source line for file ledgers and the 1-based position for
/// in-memory ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub line: usize,
    pub reason: String,
}

/// Sorts rows by date and collapses duplicate dates, keeping the row that
/// appeared last in the input.
pub fn normalize(rows: &[LedgerRow]) -> Vec<LedgerRow> {
    let mut sorted = rows.to_vec();
    // Stable, so equal dates keep input order and the last one survives below.
    sorted.sort_by_key(|r| r.date);

    let mut out: Vec<LedgerRow> = Vec::with_capacity(sorted.len());
    for row in sorted {
        match out.last_mut() {
            Some(prev) if prev.date == row.date => *prev = row,
            _ => out.push(row),
        }
    }
    out
}

/// Coverage of a ledger after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub duplicates_collapsed: usize,
}

impl LedgerSummary {
    pub fn of(rows: &[LedgerRow]) -> Self {
        let normalized = normalize(rows);
        Self {
            rows: normalized.len(),
            first_date: normalized.first().map(|r| r.date),
            last_date: normalized.last().map(|r| r.date),
            duplicates_collapsed: rows.len() - normalized.len(),
        }
    }
}
