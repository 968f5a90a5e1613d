//! LTP caching proxy server.
//!
//! This binary serves last traded prices for currency pairs over HTTP. It wires
//! together:
//!
//! - `KrakenClient`: blocking upstream adapter with a fixed request timeout.
//! - `QuoteCache`: per-pair price store with a fixed time-to-live, so a pair is
//!   fetched from the upstream at most once per ttl.
//! - `QuoteService`: resolves a batch of pairs through the cache, skipping the
//!   ones that fail.
//! - `routes::serve`: `tiny_http` accept loop that handles each request on its
//!   own thread.
//!
//! Shutdown: Ctrl+C unblocks the accept loop; in-flight requests are not waited for.
#![warn(missing_docs)]
use clap::Parser;
use log::{info, warn};
use ltp_common::ProxyError;
use ltp_common::Result;
use ltp_server::args::Args;
use ltp_server::routes;
use ltp_server::{KrakenClient, QuoteCache, QuoteService};
use std::sync::Arc;
use tiny_http::Server;

fn main() -> Result<(), ProxyError> {
    init_logger();
    let args = Args::parse();
    args.validate()?;

    let upstream = KrakenClient::new(&args.upstream_url, args.upstream_timeout())?;
    let cache = QuoteCache::new(args.cache_ttl());
    let ttl = cache.ttl();
    let service = Arc::new(QuoteService::new(upstream, cache));

    let server = Arc::new(
        Server::http(&args.bind)
            .map_err(|e| ProxyError::Http(format!("failed to bind {}: {}", args.bind, e)))?,
    );

    {
        let server = Arc::clone(&server);
        ctrlc::set_handler(move || {
            warn!("Ctrl+C received. Shutting down server...");
            server.unblock();
        })
        .map_err(|e| ProxyError::Format(format!("failed to set Ctrl+C handler: {}", e)))?;
    }

    info!("Starting server on {}", args.bind);
    info!(
        "Upstream: {} (timeout {:?}), cache ttl {:?}",
        args.upstream_url,
        args.upstream_timeout(),
        ttl
    );
    info!("Endpoints:");
    info!("  GET /api/v1/ltp - Get all pairs");
    info!("  GET /api/v1/ltp?pair=BTC/USD - Get single pair");
    info!("  GET /api/v1/ltp?pairs=BTC/USD,BTC/EUR - Get multiple pairs");
    info!("  GET /health - Health check");

    routes::serve(server, service);
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
