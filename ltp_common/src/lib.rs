//!
//! Common types and utilities shared by the LTP proxy server and client.
//!
//! This crate aggregates:
//! - `error`: `FetchError` for per-pair lookups and the unified `ProxyError`.
//! - `result`: handy `Result<T, ProxyError>` alias.
//! - `pairs`: supported currency pairs and their upstream identifiers.
//! - `model`: JSON payloads exchanged between the proxy and its clients.
//! - `net`: networking constants and small helpers.
#![warn(missing_docs)]
pub mod error;
pub mod model;
pub mod net;
pub mod pairs;
pub mod result;

pub use error::{FetchError, ProxyError};
pub use model::{LtpResponse, PairLtp};
pub use result::Result;
