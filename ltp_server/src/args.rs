//! Command-line arguments for the LTP proxy server.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::time::Duration;

use clap::Parser;
use ltp_common::ProxyError;
use ltp_common::net::{DEFAULT_PORT, DEFAULT_UPSTREAM_URL, addr};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address to bind the HTTP listener to.
    #[clap(long, default_value_t = addr("0.0.0.0", DEFAULT_PORT))]
    pub bind: String,

    /// Base URL of the upstream price API.
    #[clap(long, default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    /// Seconds a fetched price is served from cache before it is refetched.
    #[clap(long, default_value_t = 30)]
    pub cache_ttl_secs: u64,

    /// Seconds after which an upstream request is abandoned.
    #[clap(long, default_value_t = 10)]
    pub upstream_timeout_secs: u64,
}

impl Args {
    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ProxyError> {
        if self.cache_ttl_secs == 0 {
            return Err(ProxyError::Format("--cache-ttl-secs must be greater than 0".into()));
        }
        if self.upstream_timeout_secs == 0 {
            return Err(ProxyError::Format(
                "--upstream-timeout-secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Cache time-to-live.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Upstream request timeout.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}
