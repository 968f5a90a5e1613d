//! Error types shared between client and server.
//!
//! Two layers are kept apart:
//! - `FetchError` describes why a single pair could not be priced. It is
//!   cloneable so one upstream outcome can be handed to every caller that was
//!   waiting on the same lookup.
//! - `ProxyError` is the process/request level error that crosses function and
//!   HTTP boundaries. A batch in which every pair failed surfaces as
//!   `ProxyError::NoData`.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Reason a single pair lookup failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// No upstream identifier exists for the requested symbol.
    #[error("unsupported pair: {0}")]
    UnsupportedPair(String),

    /// Connection, TLS or timeout failure while talking to the upstream.
    #[error("failed to fetch from upstream: {0}")]
    Transport(String),

    /// The upstream answered with a non-2xx status code.
    #[error("upstream returned HTTP {0}")]
    Status(u16),

    /// The upstream body could not be read or decoded.
    #[error("failed to parse response: {0}")]
    Decode(String),

    /// The upstream reported one or more errors in its payload.
    #[error("upstream API error: {0:?}")]
    Upstream(Vec<String>),

    /// The response did not contain the requested pair.
    #[error("no data for pair {0}")]
    MissingPair(String),

    /// The pair was present but carried no close price.
    #[error("no close price for pair {0}")]
    MissingPrice(String),

    /// The close price was not a number.
    #[error("failed to parse price: {0}")]
    InvalidPrice(String),

    /// The in-flight lookup this caller joined ended without a result.
    #[error("in-flight fetch for {0} was abandoned")]
    Abandoned(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl FetchError {
    /// `true` for connection level failures (network, timeout).
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }

    /// `true` when the upstream answered but the answer was unusable.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            FetchError::Status(_)
                | FetchError::Decode(_)
                | FetchError::Upstream(_)
                | FetchError::MissingPair(_)
                | FetchError::MissingPrice(_)
                | FetchError::InvalidPrice(_)
        )
    }
}

impl<T> From<PoisonError<T>> for FetchError {
    fn from(err: PoisonError<T>) -> Self {
        FetchError::MutexLock(err.to_string())
    }
}

/// Unified error type shared by client and server.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// I/O error originating from the standard library or sockets/files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// HTTP server or client setup/request failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A single pair lookup failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Every pair of a batch failed.
    #[error("failed to fetch any LTP data")]
    NoData,

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Error while parsing a pairs file into `Pair` values.
    #[error("Parse pairs file error: {0}")]
    ParsePairsFile(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for ProxyError {
    fn from(err: PoisonError<T>) -> Self {
        ProxyError::MutexLock(err.to_string())
    }
}
