//! Read-through price cache with a fixed time-to-live.
//!
//! `QuoteCache` keeps the last successfully fetched price per key together with
//! the instant it was obtained. It exposes one core operation:
//!
//! - `QuoteCache::get_or_fetch(key, fetch)`: return the stored price if it is
//!   younger than the ttl, otherwise run `fetch` and store its result.
//!
//! Concurrency:
//! - The whole mapping sits behind one `Mutex`, which is never held while
//!   `fetch` runs, so a slow upstream call does not block other keys.
//! - Lookups are single-flight per key: the first caller that finds a key
//!   missing or stale runs `fetch`; callers arriving for the same key while it
//!   is running wait on a `crossbeam_channel` and receive the same outcome.
//! - If the fetching caller unwinds without an outcome, the in-flight marker is
//!   cleared and its waiters get `FetchError::Abandoned`.
//!
//! Entries are never evicted. A failed fetch leaves any stored entry untouched,
//! and a stale entry is only replaced by the next successful fetch.

use crossbeam_channel::{Receiver, Sender, bounded};
use log::{debug, warn};
use ltp_common::FetchError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

type FetchResult = Result<f64, FetchError>;

/// Last known price for a key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheEntry {
    /// Price returned by the last successful fetch.
    pub value: f64,
    /// When that fetch completed.
    pub fetched_at: Instant,
}

impl CacheEntry {
    /// Fresh iff `now - fetched_at < ttl`.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

#[derive(Default)]
struct Slot {
    entry: Option<CacheEntry>,
    /// `Some` while a fetch for this key is running; holds the waiting callers.
    in_flight: Option<Vec<Sender<FetchResult>>>,
}

/// Thread-safe price cache keyed by normalized symbol.
pub struct QuoteCache {
    slots: Mutex<HashMap<String, Slot>>,
    ttl: Duration,
}

enum Lookup {
    Hit(f64),
    Wait(Receiver<FetchResult>),
    Lead,
}

impl QuoteCache {
    /// Create an empty cache whose entries stay fresh for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the fresh price for `key`, or run `fetch` and remember its result.
    ///
    /// `fetch` is invoked at most once, and not at all when a fresh entry exists
    /// or another caller is already fetching the same key. Errors from `fetch`
    /// are returned unchanged and never modify the stored entry.
    pub fn get_or_fetch<F>(&self, key: &str, fetch: F) -> FetchResult
    where
        F: FnOnce() -> FetchResult,
    {
        match self.lookup(key)? {
            Lookup::Hit(value) => {
                debug!("Cache hit for {}", key);
                Ok(value)
            }
            Lookup::Wait(rx) => {
                debug!("Joining in-flight fetch for {}", key);
                match rx.recv() {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Abandoned(key.to_string())),
                }
            }
            Lookup::Lead => {
                debug!("Cache miss for {}, fetching", key);
                let flight = Flight {
                    cache: self,
                    key,
                    settled: false,
                };
                let result = fetch();
                flight.settle(&result);
                result
            }
        }
    }

    /// Stored entry for `key`, fresh or not.
    pub fn cached(&self, key: &str) -> Option<CacheEntry> {
        self.lock().get(key).and_then(|slot| slot.entry)
    }

    /// Number of keys holding a price.
    pub fn len(&self) -> usize {
        self.lock().values().filter(|slot| slot.entry.is_some()).count()
    }

    /// `true` when no price has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &str) -> Result<Lookup, FetchError> {
        let mut slots = self.slots.lock()?;
        let slot = slots.entry(key.to_string()).or_default();

        if let Some(entry) = slot.entry {
            if entry.is_fresh(Instant::now(), self.ttl) {
                return Ok(Lookup::Hit(entry.value));
            }
        }

        if let Some(waiters) = slot.in_flight.as_mut() {
            let (tx, rx) = bounded(1);
            waiters.push(tx);
            return Ok(Lookup::Wait(rx));
        }

        slot.in_flight = Some(Vec::new());
        Ok(Lookup::Lead)
    }

    /// Close the flight for `key`: store a successful value, drop slots that
    /// never held one, and hand `outcome` to every waiter.
    ///
    /// With `outcome == None` the waiters' senders are dropped, which
    /// disconnects their receivers.
    fn complete(&self, key: &str, outcome: Option<&FetchResult>) {
        let waiters = {
            let mut slots = self.lock();
            let Some(slot) = slots.get_mut(key) else {
                return;
            };

            if let Some(Ok(value)) = outcome {
                slot.entry = Some(CacheEntry {
                    value: *value,
                    fetched_at: Instant::now(),
                });
            }
            let waiters = slot.in_flight.take().unwrap_or_default();
            if slot.entry.is_none() {
                slots.remove(key);
            }
            waiters
        };

        if let Some(result) = outcome {
            for tx in waiters {
                let _ = tx.send(result.clone());
            }
        }
    }

    /// Lock the mapping where an error cannot be propagated (accessors, `Drop`).
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| {
            warn!("Quote cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

/// In-flight marker owned by the caller running `fetch`.
struct Flight<'a> {
    cache: &'a QuoteCache,
    key: &'a str,
    settled: bool,
}

impl Flight<'_> {
    fn settle(mut self, result: &FetchResult) {
        self.settled = true;
        self.cache.complete(self.key, Some(result));
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.cache.complete(self.key, None);
        }
    }
}
