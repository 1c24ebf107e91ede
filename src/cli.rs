//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvLedgerAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    build_evaluation_config, ledger_path, validate_evaluation_config, validate_web_config,
};
use crate::domain::confirmation::{
    anchor_range, evaluate, evaluate_many, parse_anchor_date, ConfirmationResult,
    EvaluationConfig, Weighting,
};
use crate::domain::error::BidSignalError;
use crate::domain::ledger::{LedgerRow, LedgerSummary};
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::{LedgerLoad, LedgerPort};

#[derive(Parser, Debug)]
#[command(name = "bidsignal", about = "Structural bid confirmation over a bid/ask ledger")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Ledger and engine options shared by the evaluating commands. Flags
/// override values from `--config`.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Ledger CSV (defaults to [ledger] path from the config)
    #[arg(short, long)]
    pub ledger: Option<PathBuf>,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub window_size: Option<u32>,
    #[arg(long)]
    pub min_bid_ratio: Option<f64>,
    #[arg(long)]
    pub min_confidence: Option<f64>,
    /// Weight rows closer to the anchor date more heavily
    #[arg(long)]
    pub recency: bool,
    /// Fail on malformed rows and empty windows
    #[arg(long)]
    pub strict: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate the structural bid signal as of one anchor date
    Evaluate {
        #[arg(short, long)]
        anchor_date: String,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Evaluate every day in a date range, one JSON line per anchor
    Scan {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Show ledger coverage and malformed rows
    Info {
        #[arg(short, long)]
        ledger: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Start the HTTP signal server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Evaluate {
            anchor_date,
            engine,
        } => run_evaluate(&anchor_date, &engine),
        Command::Scan { from, to, engine } => run_scan(&from, &to, &engine),
        Command::Info { ledger, config } => run_info(ledger.as_ref(), config.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::Serve { config } => run_serve(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BidSignalError> {
    tracing::info!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Config file values first, then CLI flag overrides, then validation.
pub fn resolve_evaluation_config(
    args: &EngineArgs,
    config: Option<&dyn ConfigPort>,
) -> Result<EvaluationConfig, BidSignalError> {
    let mut resolved = match config {
        Some(c) => build_evaluation_config(c)?,
        None => EvaluationConfig::default(),
    };

    if let Some(w) = args.window_size {
        resolved.window_size = w;
    }
    if let Some(r) = args.min_bid_ratio {
        resolved.min_bid_ratio = r;
    }
    if let Some(c) = args.min_confidence {
        resolved.min_confidence = c;
    }
    if args.recency {
        resolved.weighting = Weighting::Recency;
    }
    resolved.strict |= args.strict;

    resolved.validate()?;
    Ok(resolved)
}

pub fn resolve_ledger_path(
    ledger_override: Option<&PathBuf>,
    config: Option<&dyn ConfigPort>,
) -> Result<PathBuf, BidSignalError> {
    if let Some(p) = ledger_override {
        return Ok(p.clone());
    }
    match config {
        Some(c) => ledger_path(c).map(PathBuf::from),
        None => Err(BidSignalError::ConfigMissing {
            section: "ledger".to_string(),
            key: "path".to_string(),
        }),
    }
}

fn ledger_strict(config: Option<&dyn ConfigPort>, evaluation: &EvaluationConfig) -> bool {
    evaluation.strict || config.is_some_and(|c| c.get_bool("ledger", "strict", false))
}

fn load_ledger(path: &Path, strict: bool) -> Result<LedgerLoad, BidSignalError> {
    CsvLedgerAdapter::new(path).with_strict(strict).load()
}

/// Loads config, ledger and engine settings for an evaluating command.
pub fn prepare_engine(
    args: &EngineArgs,
) -> Result<(Vec<LedgerRow>, EvaluationConfig), BidSignalError> {
    let file_config = args.config.as_deref().map(load_config).transpose()?;
    let config = file_config.as_ref().map(|c| c as &dyn ConfigPort);

    let evaluation = resolve_evaluation_config(args, config)?;
    let path = resolve_ledger_path(args.ledger.as_ref(), config)?;
    let load = load_ledger(&path, ledger_strict(config, &evaluation))?;
    Ok((load.rows, evaluation))
}

pub fn evaluate_command(
    anchor_date: &str,
    args: &EngineArgs,
) -> Result<ConfirmationResult, BidSignalError> {
    let anchor = parse_anchor_date(anchor_date)?;
    let (rows, evaluation) = prepare_engine(args)?;
    evaluate(&rows, anchor, &evaluation)
}

pub fn scan_command(
    from: &str,
    to: &str,
    args: &EngineArgs,
) -> Result<Vec<ConfirmationResult>, BidSignalError> {
    let from = parse_anchor_date(from)?;
    let to = parse_anchor_date(to)?;
    let (rows, evaluation) = prepare_engine(args)?;
    let anchors: Vec<NaiveDate> = anchor_range(from, to);
    tracing::info!("Scanning {} anchor dates, {} to {}", anchors.len(), from, to);
    evaluate_many(&rows, &anchors, &evaluation)
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, BidSignalError> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    out.map_err(|e| BidSignalError::Io(std::io::Error::other(e)))
}

fn run_evaluate(anchor_date: &str, args: &EngineArgs) -> Result<(), BidSignalError> {
    let result = evaluate_command(anchor_date, args)?;
    println!("{}", to_json(&result, true)?);
    Ok(())
}

fn run_scan(from: &str, to: &str, args: &EngineArgs) -> Result<(), BidSignalError> {
    let results = scan_command(from, to, args)?;
    let confirmed = results.iter().filter(|r| r.confirmed).count();
    for result in &results {
        println!("{}", to_json(result, false)?);
    }
    tracing::info!("{} of {} anchor dates confirmed", confirmed, results.len());
    Ok(())
}

pub fn info_command(
    ledger_override: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
) -> Result<(LedgerSummary, LedgerLoad), BidSignalError> {
    let file_config = config_path.map(|p| load_config(p)).transpose()?;
    let config = file_config.as_ref().map(|c| c as &dyn ConfigPort);
    let path = resolve_ledger_path(ledger_override, config)?;
    let load = load_ledger(&path, false)?;
    Ok((LedgerSummary::of(&load.rows), load))
}

fn run_info(
    ledger_override: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
) -> Result<(), BidSignalError> {
    let (summary, load) = info_command(ledger_override, config_path)?;
    match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => println!(
            "{} rows, {} to {} ({} duplicate dates collapsed)",
            summary.rows, first, last, summary.duplicates_collapsed
        ),
        _ => println!("ledger has no usable rows"),
    }
    if !load.rejected.is_empty() {
        println!("{} malformed rows:", load.rejected.len());
        for rejected in &load.rejected {
            println!("  line {}: {}", rejected.line, rejected.reason);
        }
    }
    Ok(())
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), BidSignalError> {
    ledger_path(config)?;
    validate_evaluation_config(config)?;
    validate_web_config(config)?;
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), BidSignalError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;
    let evaluation = build_evaluation_config(&config)?;
    println!(
        "window_size = {}, min_bid_ratio = {}, min_confidence = {}, weighting = {}, strict = {}",
        evaluation.window_size,
        evaluation.min_bid_ratio,
        evaluation.min_confidence,
        evaluation.weighting,
        evaluation.strict,
    );
    println!("Configuration is valid.");
    Ok(())
}

fn run_serve(config_path: &Path) -> Result<(), BidSignalError> {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, build_router};
        use crate::domain::config_validation::{default_anchor_date, listen_addr};
        use std::sync::Arc;

        let config = load_config(config_path)?;
        validate_config(&config)?;

        let evaluation = build_evaluation_config(&config)?;
        let path = ledger_path(&config)?;
        let ledger_port = CsvLedgerAdapter::new(&path)
            .with_strict(ledger_strict(Some(&config as &dyn ConfigPort), &evaluation));
        let addr = listen_addr(&config)?;

        let state = AppState {
            ledger_port: Arc::new(ledger_port),
            evaluation,
            default_anchor: default_anchor_date(&config)?,
        };
        let router = build_router(state);

        tracing::info!("Serving ledger {} on {}", path, addr);
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router).await
        })?;
        Ok(())
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        Err(BidSignalError::ConfigInvalid {
            section: "web".to_string(),
            key: "feature".to_string(),
            reason: "bidsignal was built without the web feature".to_string(),
        })
    }
}
