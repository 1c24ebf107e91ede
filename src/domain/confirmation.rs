//! Structural bid confirmation engine.
//!
//! Evaluates whether a ledger shows sustained bid-side dominance over a
//! trailing window ending at an anchor date. The engine is a pure function
//! of its inputs: it never reads files or holds configuration, so callers
//! inject the ledger, the anchor date and an [`EvaluationConfig`] on every
//! call.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::error::BidSignalError;
use crate::domain::ledger::{normalize, LedgerRow, RejectedRow};

pub const DEFAULT_WINDOW_SIZE: u32 = 10;
pub const DEFAULT_MIN_BID_RATIO: f64 = 0.55;
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;

/// How in-window rows contribute to confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    /// Every row counts once.
    #[default]
    Uniform,
    /// Extension: a row `k` days before the anchor weighs `window_size - k`,
    /// so the anchor day weighs `window_size` and the oldest day weighs 1.
    Recency,
}

impl fmt::Display for Weighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weighting::Uniform => write!(f, "uniform"),
            Weighting::Recency => write!(f, "recency"),
        }
    }
}

impl FromStr for Weighting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uniform" => Ok(Weighting::Uniform),
            "recency" => Ok(Weighting::Recency),
            other => Err(format!(
                "unknown weighting {other:?} (expected uniform or recency)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationConfig {
    /// Lookback length in calendar days, anchor day included.
    pub window_size: u32,
    pub min_bid_ratio: f64,
    pub min_confidence: f64,
    pub weighting: Weighting,
    /// Fail on malformed rows and empty ledgers instead of degrading.
    pub strict: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            min_bid_ratio: DEFAULT_MIN_BID_RATIO,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            weighting: Weighting::Uniform,
            strict: false,
        }
    }
}

impl EvaluationConfig {
    pub fn validate(&self) -> Result<(), BidSignalError> {
        if self.window_size == 0 {
            return Err(invalid("window_size", "window_size must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.min_bid_ratio) {
            return Err(invalid(
                "min_bid_ratio",
                "min_bid_ratio must be between 0 and 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(invalid(
                "min_confidence",
                "min_confidence must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: &str) -> BidSignalError {
    BidSignalError::ConfigInvalid {
        section: "evaluation".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// A window row whose bid ratio met the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub date: NaiveDate,
    pub price: f64,
    pub bid_volume: f64,
    pub ask_volume: f64,
    pub bid_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationResult {
    pub anchor_date: NaiveDate,
    pub confirmed: bool,
    pub confidence: f64,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub evidence: Vec<Evidence>,
}

impl ConfirmationResult {
    fn unconfirmed(anchor_date: NaiveDate) -> Self {
        Self {
            anchor_date,
            confirmed: false,
            confidence: 0.0,
            window_start: anchor_date,
            window_end: anchor_date,
            evidence: Vec::new(),
        }
    }
}

/// Parses an ISO-8601 calendar date (`YYYY-MM-DD`).
pub fn parse_anchor_date(input: &str) -> Result<NaiveDate, BidSignalError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        BidSignalError::InvalidAnchor {
            input: input.to_string(),
        }
    })
}

/// Evaluates the structural bid pattern as of `anchor_date`.
pub fn evaluate(
    ledger: &[LedgerRow],
    anchor_date: NaiveDate,
    config: &EvaluationConfig,
) -> Result<ConfirmationResult, BidSignalError> {
    evaluate_with_rejects(ledger, anchor_date, config).map(|(result, _)| result)
}

/// Like [`evaluate`], also returning the rows dropped as malformed in
/// lenient mode. `line` on each rejected row is its 1-based position in
/// `ledger`.
pub fn evaluate_with_rejects(
    ledger: &[LedgerRow],
    anchor_date: NaiveDate,
    config: &EvaluationConfig,
) -> Result<(ConfirmationResult, Vec<RejectedRow>), BidSignalError> {
    config.validate()?;
    let (rows, rejected) = prepare(ledger, config)?;
    let result = evaluate_prepared(&rows, anchor_date, config)?;
    Ok((result, rejected))
}

/// Like [`evaluate`], with the anchor date still in its string form.
pub fn evaluate_at(
    ledger: &[LedgerRow],
    anchor: &str,
    config: &EvaluationConfig,
) -> Result<ConfirmationResult, BidSignalError> {
    let anchor_date = parse_anchor_date(anchor)?;
    evaluate(ledger, anchor_date, config)
}

/// Evaluates several anchor dates against one ledger, normalizing it once.
/// Results follow the order of `anchors`.
pub fn evaluate_many(
    ledger: &[LedgerRow],
    anchors: &[NaiveDate],
    config: &EvaluationConfig,
) -> Result<Vec<ConfirmationResult>, BidSignalError> {
    config.validate()?;
    let (rows, _) = prepare(ledger, config)?;
    anchors
        .iter()
        .map(|&anchor| evaluate_prepared(&rows, anchor, config))
        .collect()
}

/// Every calendar day from `from` to `to`, inclusive. Empty if `from > to`.
pub fn anchor_range(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|d| *d <= to).collect()
}

fn prepare(
    ledger: &[LedgerRow],
    config: &EvaluationConfig,
) -> Result<(Vec<LedgerRow>, Vec<RejectedRow>), BidSignalError> {
    let mut valid = Vec::with_capacity(ledger.len());
    let mut rejected = Vec::new();
    for (idx, row) in ledger.iter().enumerate() {
        let line = idx + 1;
        match row.check() {
            Ok(()) => valid.push(row.clone()),
            Err(reason) if config.strict => {
                return Err(BidSignalError::MalformedRow { line, reason });
            }
            Err(reason) => {
                tracing::warn!(row = line, date = %row.date, %reason, "dropping malformed ledger row");
                rejected.push(RejectedRow { line, reason });
            }
        }
    }

    if config.strict && valid.is_empty() {
        return Err(BidSignalError::EmptyLedger {
            reason: "ledger has no usable rows".to_string(),
        });
    }

    Ok((normalize(&valid), rejected))
}

fn evaluate_prepared(
    rows: &[LedgerRow],
    anchor_date: NaiveDate,
    config: &EvaluationConfig,
) -> Result<ConfirmationResult, BidSignalError> {
    let window_size = config.window_size;
    let lower = anchor_date.checked_sub_days(Days::new(u64::from(window_size)));

    let window: Vec<&LedgerRow> = rows
        .iter()
        .filter(|r| r.date <= anchor_date && lower.is_none_or(|lo| r.date > lo))
        .collect();

    let (Some(first), Some(last)) = (window.first(), window.last()) else {
        if config.strict {
            return Err(BidSignalError::EmptyLedger {
                reason: format!(
                    "no rows in the {window_size}-day window ending {anchor_date}"
                ),
            });
        }
        tracing::debug!(%anchor_date, "no ledger rows in window");
        return Ok(ConfirmationResult::unconfirmed(anchor_date));
    };
    let (window_start, window_end) = (first.date, last.date);

    let mut total_weight = 0.0;
    let mut passing_weight = 0.0;
    let mut evidence = Vec::new();

    for row in &window {
        let weight = match config.weighting {
            Weighting::Uniform => 1.0,
            Weighting::Recency => {
                let days_before = (anchor_date - row.date).num_days();
                (i64::from(window_size) - days_before) as f64
            }
        };
        total_weight += weight;

        let ratio = row.bid_ratio();
        if ratio >= config.min_bid_ratio {
            passing_weight += weight;
            evidence.push(Evidence {
                date: row.date,
                price: row.price,
                bid_volume: row.bid_volume,
                ask_volume: row.ask_volume,
                bid_ratio: ratio,
            });
        }
    }

    let confidence = passing_weight / total_weight;
    let confirmed = confidence >= config.min_confidence;

    tracing::debug!(
        %anchor_date,
        rows = window.len(),
        passing = evidence.len(),
        confidence,
        confirmed,
        "evaluated structural bid window"
    );

    Ok(ConfirmationResult {
        anchor_date,
        confirmed,
        confidence,
        window_start,
        window_end,
        evidence,
    })
}
