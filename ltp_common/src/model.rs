//! JSON payloads served by the proxy and read by the client.
//!
//! The lookup endpoint answers with
//! `{"ltp":[{"pair":"BTC/USD","amount":52000.1}, ...]}`, one entry per resolved
//! pair in request order.

use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

/// Last traded price of a single pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairLtp {
    /// Normalized pair symbol (e.g. `BTC/USD`).
    pub pair: String,
    /// Last traded price.
    pub amount: f64,
}

/// Body of a successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LtpResponse {
    /// Resolved pairs in request order.
    pub ltp: Vec<PairLtp>,
}

impl LtpResponse {
    /// Encode the response to JSON bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ProxyError> {
        let json = serde_json::to_vec(self)?;
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_wire_shape() {
        let response = LtpResponse {
            ltp: vec![PairLtp {
                pair: "BTC/USD".into(),
                amount: 45000.5,
            }],
        };
        let bytes = response.to_json_bytes().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"ltp":[{"pair":"BTC/USD","amount":45000.5}]}"#
        );
    }
}
