//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `ProxyError`, so functions can simply return `Result<T>`.
use crate::error::ProxyError;

/// Workspace-wide `Result` alias with `ProxyError` as the default error.
pub type Result<T, E = ProxyError> = std::result::Result<T, E>;
