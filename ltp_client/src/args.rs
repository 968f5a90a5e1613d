//! Command-line arguments for the LTP client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use ltp_common::net::{DEFAULT_PORT, addr};
use ltp_common::pairs::Pair;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Base URL of the running proxy.
    #[clap(long, default_value_t = format!("http://{}", addr("127.0.0.1", DEFAULT_PORT)))]
    pub server: String,

    /// Comma-separated pairs to poll (e.g. `BTC/USD,BTC/EUR`).
    #[clap(long, value_delimiter = ',')]
    pub pairs: Vec<Pair>,

    /// Path to a text file with pairs to poll, separated by commas or new lines.
    #[clap(long)]
    pub path: Option<String>,

    /// Delay between two polls, in milliseconds.
    #[clap(long, default_value_t = 2000)]
    pub interval_ms: u64,
}
