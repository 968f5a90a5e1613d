//! Shared networking constants and helpers used by server and client.

/// Default HTTP port the proxy listens on.
pub const DEFAULT_PORT: u16 = 8080;
/// Last-traded-price lookup endpoint.
pub const LTP_PATH: &str = "/api/v1/ltp";
/// Liveness endpoint.
pub const HEALTH_PATH: &str = "/health";
/// Base URL of the upstream price API.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.kraken.com";

/// Helper to format an address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_joins_host_and_port() {
        assert_eq!(addr("0.0.0.0", DEFAULT_PORT), "0.0.0.0:8080");
    }
}
