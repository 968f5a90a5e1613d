//! Upstream price source.
//!
//! `PriceSource` is the seam between the quote service and whatever answers
//! "what was the last traded price of this vendor pair". `KrakenClient` is the
//! production implementation: it calls the public Ticker endpoint and takes the
//! first element of the `c` (last trade closed) array.
//!
//! Ticker payload (fields other than `c` are ignored):
//! ```json
//! {"error":[],"result":{"XXBTZUSD":{"c":["45000.00000","0.00150000"]}}}
//! ```

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use ltp_common::{FetchError, ProxyError};
use serde::Deserialize;

/// Something that can price a vendor pair.
pub trait PriceSource: Send + Sync {
    /// Last traded price for `vendor_pair` (e.g. `XXBTZUSD`).
    fn last_price(&self, vendor_pair: &str) -> Result<f64, FetchError>;
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: HashMap<String, TickerData>,
}

#[derive(Debug, Deserialize)]
struct TickerData {
    /// Close price as `[price, lot volume]`.
    #[serde(default)]
    c: Vec<String>,
}

/// Blocking client for the Kraken public Ticker endpoint.
pub struct KrakenClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl KrakenClient {
    /// Build a client for `base_url` (e.g. `https://api.kraken.com`) whose
    /// requests give up after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProxyError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProxyError::Http(format!("failed to build upstream client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Ticker URL for `vendor_pair`.
    pub fn ticker_url(&self, vendor_pair: &str) -> String {
        format!("{}/0/public/Ticker?pair={}", self.base_url, vendor_pair)
    }
}

impl PriceSource for KrakenClient {
    fn last_price(&self, vendor_pair: &str) -> Result<f64, FetchError> {
        let url = self.ticker_url(vendor_pair);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().map_err(|e| {
            if e.is_timeout() {
                FetchError::Transport(e.to_string())
            } else {
                FetchError::Decode(e.to_string())
            }
        })?;

        parse_ticker(&body, vendor_pair)
    }
}

/// Extract the last close price of `vendor_pair` from a Ticker response body.
pub fn parse_ticker(body: &[u8], vendor_pair: &str) -> Result<f64, FetchError> {
    let response: TickerResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if !response.error.is_empty() {
        return Err(FetchError::Upstream(response.error));
    }

    let data = response
        .result
        .get(vendor_pair)
        .ok_or_else(|| FetchError::MissingPair(vendor_pair.to_string()))?;

    let price = data
        .c
        .first()
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| FetchError::MissingPrice(vendor_pair.to_string()))?;

    let value = price
        .parse::<f64>()
        .map_err(|e| FetchError::InvalidPrice(format!("{:?}: {}", price, e)))?;
    if !value.is_finite() {
        return Err(FetchError::InvalidPrice(format!("{:?}: not a finite number", price)));
    }
    Ok(value)
}
