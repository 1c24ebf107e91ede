//! Configuration validation.
//!
//! Validates INI values before any ledger is loaded and builds the typed
//! settings the engine and adapters consume.

use crate::domain::confirmation::{parse_anchor_date, EvaluationConfig, Weighting};
use crate::domain::error::BidSignalError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";
pub const DEFAULT_ANCHOR_DATE: &str = "2026-02-10";

pub fn validate_evaluation_config(config: &dyn ConfigPort) -> Result<(), BidSignalError> {
    build_evaluation_config(config)?.validate()
}

pub fn validate_web_config(config: &dyn ConfigPort) -> Result<(), BidSignalError> {
    listen_addr(config)?;
    default_anchor_date(config)?;
    Ok(())
}

/// Reads `[evaluation]`, applying defaults for absent keys. Present keys that
/// do not parse are rejected rather than silently defaulted.
pub fn build_evaluation_config(
    config: &dyn ConfigPort,
) -> Result<EvaluationConfig, BidSignalError> {
    let defaults = EvaluationConfig::default();
    let built = EvaluationConfig {
        window_size: parse_key(config, "evaluation", "window_size", defaults.window_size)?,
        min_bid_ratio: parse_key(config, "evaluation", "min_bid_ratio", defaults.min_bid_ratio)?,
        min_confidence: parse_key(
            config,
            "evaluation",
            "min_confidence",
            defaults.min_confidence,
        )?,
        weighting: parse_key(config, "evaluation", "weighting", Weighting::Uniform)?,
        strict: config.get_bool("evaluation", "strict", defaults.strict),
    };
    built.validate()?;
    Ok(built)
}

pub fn ledger_path(config: &dyn ConfigPort) -> Result<String, BidSignalError> {
    match config.get_string("ledger", "path") {
        Some(p) if !p.trim().is_empty() => Ok(p.trim().to_string()),
        _ => Err(BidSignalError::ConfigMissing {
            section: "ledger".to_string(),
            key: "path".to_string(),
        }),
    }
}

pub fn listen_addr(config: &dyn ConfigPort) -> Result<std::net::SocketAddr, BidSignalError> {
    let raw = config
        .get_string("web", "listen")
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    raw.trim()
        .parse()
        .map_err(|_| BidSignalError::ConfigInvalid {
            section: "web".to_string(),
            key: "listen".to_string(),
            reason: format!("invalid socket address {:?}", raw),
        })
}

pub fn default_anchor_date(config: &dyn ConfigPort) -> Result<NaiveDate, BidSignalError> {
    let raw = config
        .get_string("web", "default_anchor_date")
        .unwrap_or_else(|| DEFAULT_ANCHOR_DATE.to_string());
    parse_anchor_date(&raw).map_err(|_| BidSignalError::ConfigInvalid {
        section: "web".to_string(),
        key: "default_anchor_date".to_string(),
        reason: "invalid date format, expected YYYY-MM-DD".to_string(),
    })
}

fn parse_key<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, BidSignalError>
where
    T: FromStr,
{
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| BidSignalError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("cannot parse {:?}", raw),
            }),
    }
}
