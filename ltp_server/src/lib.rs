//! Read-through caching proxy for last traded prices.
//!
//! The server answers `GET /api/v1/ltp` lookups for currency pairs by asking an
//! upstream price API, keeping each price for a fixed time-to-live so repeated
//! lookups do not hit the upstream. Building blocks:
//!
//! - `cache`: `QuoteCache`, the ttl-bounded, single-flight price store.
//! - `upstream`: `PriceSource` trait and the `KrakenClient` adapter.
//! - `service`: `QuoteService`, batch resolution with partial-failure tolerance.
//! - `routes`: HTTP routing and the thread-per-request accept loop.
//! - `args`: command-line configuration.
#![warn(missing_docs)]
pub mod args;
pub mod cache;
pub mod routes;
pub mod service;
pub mod upstream;

pub use cache::QuoteCache;
pub use service::QuoteService;
pub use upstream::{KrakenClient, PriceSource};
