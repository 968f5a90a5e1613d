//! Currency pairs supported by the proxy and their upstream identifiers.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::ProxyError;

/// Trait providing file parsing for pairs.
pub trait PairParser {
    /// Parses pairs from a buffered reader.
    ///
    /// Pairs may be separated by new lines or commas; blank entries are
    /// skipped. Returns an error if any entry is not a supported pair.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Pair>, ProxyError>;
}

impl PairParser for Pair {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Self>, ProxyError> {
        let mut pairs = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(ProxyError::Io)?;
            for raw in line.split(',') {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match trimmed.parse::<Self>() {
                    Ok(pair) => pairs.push(pair),
                    Err(e) => {
                        return Err(ProxyError::ParsePairsFile(format!("{}: {}", trimmed, e)));
                    }
                }
            }
        }
        Ok(pairs)
    }
}

/// Set of supported currency pairs.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Hash,
    Eq,
    PartialEq,
)]
#[strum(ascii_case_insensitive)]
pub enum Pair {
    /// Bitcoin priced in US dollars.
    #[strum(to_string = "BTC/USD")]
    #[serde(rename = "BTC/USD")]
    BtcUsd,
    /// Bitcoin priced in Swiss francs.
    #[strum(to_string = "BTC/CHF")]
    #[serde(rename = "BTC/CHF")]
    BtcChf,
    /// Bitcoin priced in euros.
    #[strum(to_string = "BTC/EUR")]
    #[serde(rename = "BTC/EUR")]
    BtcEur,
}

impl Pair {
    /// Identifier the upstream price API uses for this pair.
    pub fn vendor_id(&self) -> &'static str {
        match self {
            Pair::BtcUsd => "XXBTZUSD",
            Pair::BtcChf => "XBTCHF",
            Pair::BtcEur => "XXBTZEUR",
        }
    }
}

/// Map a symbol such as `btc/usd` to its upstream identifier.
///
/// Matching ignores ASCII case and surrounding whitespace. Returns `None` for
/// anything outside the supported table.
pub fn vendor_pair(symbol: &str) -> Option<&'static str> {
    symbol.trim().parse::<Pair>().ok().map(|pair| pair.vendor_id())
}

/// Canonical form of a requested symbol, used as cache key and in responses.
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Every supported pair in table order.
pub fn default_pairs() -> Vec<String> {
    Pair::iter().map(|pair| pair.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn maps_supported_pairs_case_insensitively() {
        let cases = [
            ("BTC/USD", Some("XXBTZUSD")),
            ("btc/usd", Some("XXBTZUSD")),
            ("BTC/CHF", Some("XBTCHF")),
            ("Btc/Eur", Some("XXBTZEUR")),
            (" BTC/EUR ", Some("XXBTZEUR")),
            ("INVALID", None),
            ("ETH/USD", None),
            ("", None),
        ];

        for (input, expected) in cases {
            assert_eq!(vendor_pair(input), expected, "input {:?}", input);
        }
    }

    #[test]
    fn normalizes_symbols() {
        assert_eq!(normalize_symbol("  btc/usd\t"), "BTC/USD");
        assert_eq!(normalize_symbol("INVALID"), "INVALID");
    }

    #[test]
    fn default_set_lists_every_pair_in_order() {
        assert_eq!(default_pairs(), vec!["BTC/USD", "BTC/CHF", "BTC/EUR"]);
    }

    #[test]
    fn parses_pairs_file_with_lines_and_commas() {
        let input = "BTC/USD, btc/eur\n\n  BTC/CHF  \n";
        let pairs = Pair::parse_from_file(Cursor::new(input)).unwrap();
        assert_eq!(pairs, vec![Pair::BtcUsd, Pair::BtcEur, Pair::BtcChf]);
    }

    #[test]
    fn rejects_unknown_pair_in_file() {
        let err = Pair::parse_from_file(Cursor::new("BTC/USD\nDOGE/USD\n")).unwrap_err();
        assert!(matches!(err, ProxyError::ParsePairsFile(msg) if msg.starts_with("DOGE/USD")));
    }
}
