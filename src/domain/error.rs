//! Domain error types.

/// Top-level error type for bidsignal.
#[derive(Debug, thiserror::Error)]
pub enum BidSignalError {
    #[error("invalid anchor date {input:?}: expected YYYY-MM-DD")]
    InvalidAnchor { input: String },

    #[error("malformed ledger row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("empty ledger: {reason}")]
    EmptyLedger { reason: String },

    #[error("failed to read ledger {path}: {reason}")]
    LedgerRead { path: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BidSignalError> for std::process::ExitCode {
    fn from(err: &BidSignalError) -> Self {
        let code: u8 = match err {
            BidSignalError::Io(_) | BidSignalError::LedgerRead { .. } => 1,
            BidSignalError::ConfigParse { .. }
            | BidSignalError::ConfigMissing { .. }
            | BidSignalError::ConfigInvalid { .. } => 2,
            BidSignalError::InvalidAnchor { .. } => 3,
            BidSignalError::MalformedRow { .. } => 4,
            BidSignalError::EmptyLedger { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
