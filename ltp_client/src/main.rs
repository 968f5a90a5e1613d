//! LTP Client: polls a running LTP proxy for currency pair prices and logs
//! every received price until interrupted.
//!
//! Usage example (CLI):
//! ```bash
//! ltp_client --server http://192.168.0.10:8080 --pairs BTC/USD,BTC/EUR --interval-ms 5000
//! ltp_client --path ./pairs.txt
//! ```
//!
//! Pairs given with `--pairs` and read from `--path` are combined; with neither,
//! the proxy's default set is requested.
#![warn(missing_docs)]
mod args;
mod poller;

use crate::args::Args;
use crate::poller::LtpPoller;
use clap::Parser;
use log::{info, warn};
use ltp_common::ProxyError;
use ltp_common::Result;
use ltp_common::pairs::{Pair, PairParser};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

fn main() -> Result<(), ProxyError> {
    init_logger();
    let args = Args::parse();
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down client...");
            shutdown.store(true, Ordering::SeqCst);
        })
        .map_err(|e| ProxyError::Format(format!("failed to set Ctrl+C handler: {}", e)))?;
    }

    let mut pairs = args.pairs.clone();
    if let Some(raw_path) = &args.path {
        let file_path = normalize_path(raw_path);
        if !is_file_exist(&file_path) {
            return Err(ProxyError::Format(format!(
                "pairs file not found: {}",
                file_path.display()
            )));
        }
        let file = File::open(&file_path)?;
        pairs.extend(Pair::parse_from_file(BufReader::new(file))?);
    }

    if pairs.is_empty() {
        warn!("No pairs given, requesting the server's default set");
    } else {
        info!("Pairs: {:?}", pairs);
    }

    let poller = LtpPoller::new(&args.server, &pairs)?;
    info!("Client is running against {}. Press Ctrl+C to exit.", poller.url());
    poller.run(Duration::from_millis(args.interval_ms), shutdown);
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &PathBuf) -> bool {
    path.exists() && path.is_file()
}
