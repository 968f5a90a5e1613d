//! Batch lookup of last traded prices.
//!
//! `QuoteService` normalizes each requested symbol, asks the `QuoteCache` for a
//! price and supplies the upstream call as the fetch closure. Per-symbol
//! failures are logged and skipped; only a batch where nothing resolved is an
//! error.

use log::{debug, warn};
use ltp_common::pairs::{normalize_symbol, vendor_pair};
use ltp_common::{FetchError, PairLtp, ProxyError, Result};

use crate::cache::QuoteCache;
use crate::upstream::PriceSource;

/// Resolves symbols to prices through a cache in front of a `PriceSource`.
pub struct QuoteService<S> {
    source: S,
    cache: QuoteCache,
}

impl<S: PriceSource> QuoteService<S> {
    /// Create a service that owns `cache` and fetches misses from `source`.
    pub fn new(source: S, cache: QuoteCache) -> Self {
        Self { source, cache }
    }

    /// The cache backing this service.
    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }

    /// Resolve `symbols` in order.
    ///
    /// Output keeps input order and duplicates. Returns `ProxyError::NoData`
    /// when no symbol could be resolved.
    pub fn resolve<I, T>(&self, symbols: I) -> Result<Vec<PairLtp>>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let symbols = symbols.into_iter();
        let mut resolved = Vec::with_capacity(symbols.size_hint().0);

        for raw in symbols {
            let pair = normalize_symbol(raw.as_ref());

            let looked_up = self
                .cache
                .get_or_fetch(&pair, || self.fetch_last_price(&pair));
            match looked_up {
                Ok(amount) => resolved.push(PairLtp { pair, amount }),
                Err(e) => {
                    warn!("Error fetching LTP for {} ({}): {}", pair, failure_kind(&e), e);
                    if let Some(stale) = self.cache.cached(&pair) {
                        debug!(
                            "Keeping stale {} = {} fetched {:?} ago",
                            pair,
                            stale.value,
                            stale.fetched_at.elapsed()
                        );
                    }
                }
            }
        }

        if resolved.is_empty() {
            return Err(ProxyError::NoData);
        }
        Ok(resolved)
    }

    /// Map `pair` to its vendor identifier and ask the upstream for a price.
    pub fn fetch_last_price(&self, pair: &str) -> Result<f64, FetchError> {
        let vendor = vendor_pair(pair)
            .ok_or_else(|| FetchError::UnsupportedPair(pair.to_string()))?;
        self.source.last_price(vendor)
    }
}

/// Short tag for a failed lookup: connection problem, bad upstream answer, or
/// a request the proxy refused on its own.
fn failure_kind(err: &FetchError) -> &'static str {
    if err.is_transport() {
        "transport"
    } else if err.is_protocol() {
        "upstream"
    } else {
        "request"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Fixed prices per vendor pair, recording every call.
    struct StubSource {
        prices: HashMap<&'static str, f64>,
        calls: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn new(prices: &[(&'static str, f64)]) -> Self {
            Self {
                prices: prices.iter().copied().collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PriceSource for StubSource {
        fn last_price(&self, vendor_pair: &str) -> Result<f64, FetchError> {
            self.calls.lock()?.push(vendor_pair.to_string());
            self.prices
                .get(vendor_pair)
                .copied()
                .ok_or_else(|| FetchError::Upstream(vec!["EQuery:Unknown asset pair".into()]))
        }
    }

    fn service(prices: &[(&'static str, f64)]) -> QuoteService<StubSource> {
        QuoteService::new(StubSource::new(prices), QuoteCache::new(Duration::from_secs(30)))
    }

    #[test]
    fn resolves_in_input_order_with_normalization() {
        let service = service(&[("XXBTZUSD", 45000.0), ("XXBTZEUR", 42000.0)]);
        let result = service.resolve([" btc/eur", "BTC/USD "]).unwrap();

        assert_eq!(
            result,
            vec![
                PairLtp { pair: "BTC/EUR".into(), amount: 42000.0 },
                PairLtp { pair: "BTC/USD".into(), amount: 45000.0 },
            ]
        );
    }

    #[test]
    fn duplicates_are_kept_and_fetched_once() {
        let service = service(&[("XXBTZUSD", 45000.0)]);
        let result = service.resolve(["BTC/USD", "btc/usd", "BTC/USD"]).unwrap();

        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|ltp| ltp.pair == "BTC/USD" && ltp.amount == 45000.0));
        assert_eq!(service.source.calls(), vec!["XXBTZUSD"]);
    }

    #[test]
    fn skips_failed_symbols() {
        let service = service(&[("XXBTZUSD", 45000.0)]);
        let result = service.resolve(["BTC/USD", "INVALID", "BTC/CHF"]).unwrap();

        assert_eq!(result, vec![PairLtp { pair: "BTC/USD".into(), amount: 45000.0 }]);
        // INVALID never reaches the upstream; BTC/CHF does and fails there.
        assert_eq!(service.source.calls(), vec!["XXBTZUSD", "XBTCHF"]);
    }

    #[test]
    fn all_failed_is_no_data() {
        let service = service(&[]);
        let err = service.resolve(["INVALID", "ETH/USD"]).unwrap_err();

        assert!(matches!(err, ProxyError::NoData));
        assert!(service.source.calls().is_empty());
    }

    #[test]
    fn empty_batch_is_no_data() {
        let service = service(&[("XXBTZUSD", 45000.0)]);
        assert!(matches!(service.resolve(Vec::<String>::new()), Err(ProxyError::NoData)));
    }

    #[test]
    fn unsupported_pair_is_reported_by_fetch() {
        let service = service(&[]);
        assert_eq!(
            service.fetch_last_price("DOGE/USD"),
            Err(FetchError::UnsupportedPair("DOGE/USD".into()))
        );
    }

    #[test]
    fn failures_are_tagged_by_kind() {
        assert_eq!(failure_kind(&FetchError::Transport("timed out".into())), "transport");
        assert_eq!(failure_kind(&FetchError::Status(503)), "upstream");
        assert_eq!(failure_kind(&FetchError::InvalidPrice("\"NaN\"".into())), "upstream");
        assert_eq!(failure_kind(&FetchError::UnsupportedPair("ETH/USD".into())), "request");
        assert_eq!(failure_kind(&FetchError::Abandoned("BTC/USD".into())), "request");
    }

    #[test]
    fn failed_symbols_are_retried_on_next_batch() {
        let service = service(&[]);
        let _ = service.resolve(["BTC/USD"]);
        let _ = service.resolve(["BTC/USD"]);

        assert_eq!(service.source.calls(), vec!["XXBTZUSD", "XXBTZUSD"]);
        assert!(service.cache().is_empty());
    }
}
