//! Polling the proxy for last traded prices.
//!
//! `LtpPoller` builds the lookup URL once, then repeatedly issues blocking GET
//! requests and decodes the JSON body into `PairLtp` values.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use chrono::Local;
use log::{error, info};
use ltp_common::net::LTP_PATH;
use ltp_common::pairs::Pair;
use ltp_common::{LtpResponse, PairLtp, ProxyError};

/// Blocking client for the proxy's lookup endpoint.
pub struct LtpPoller {
    http: reqwest::blocking::Client,
    url: String,
}

impl LtpPoller {
    /// Create a poller for `server` asking for `pairs` (all pairs when empty).
    pub fn new(server: &str, pairs: &[Pair]) -> Result<Self, ProxyError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ProxyError::Http(e.to_string()))?;

        Ok(Self {
            http,
            url: lookup_url(server, pairs),
        })
    }

    /// Lookup URL used on every poll.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one lookup.
    pub fn poll_once(&self) -> Result<Vec<PairLtp>, ProxyError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .map_err(|e| ProxyError::Http(e.to_string()))?;

        let status = response.status();
        let body = response.text().map_err(|e| ProxyError::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(ProxyError::Http(format!("HTTP {}: {}", status.as_u16(), body.trim())));
        }

        let decoded: LtpResponse = serde_json::from_str(&body)?;
        Ok(decoded.ltp)
    }

    /// Poll every `interval` until `shutdown` is set, logging each price.
    pub fn run(&self, interval: Duration, shutdown: Arc<AtomicBool>) {
        info!("Polling {} every {:?}", self.url, interval);

        while !shutdown.load(Ordering::Relaxed) {
            match self.poll_once() {
                Ok(ltp) => {
                    let now = Local::now().format("%Y-%m-%d %H:%M:%S");
                    for entry in ltp {
                        info!("LTP: {} Amount={:.2} Time={}", entry.pair, entry.amount, now);
                    }
                }
                Err(e) => error!("Lookup failed: {}", e),
            }
            thread::sleep(interval);
        }
        info!("Poller stopping...");
    }
}

/// `{server}/api/v1/ltp`, with `?pairs=` when specific pairs are requested.
pub fn lookup_url(server: &str, pairs: &[Pair]) -> String {
    let base = format!("{}{}", server.trim_end_matches('/'), LTP_PATH);
    if pairs.is_empty() {
        return base;
    }

    let list: Vec<String> = pairs.iter().map(|p| p.to_string()).collect();
    format!("{}?pairs={}", base, list.join(","))
}
