//! HTTP surface of the proxy.
//!
//! Routing is kept apart from the socket layer: `route` turns a method and a
//! request target into an `HttpReply`, and `serve` runs the `tiny_http` accept
//! loop, handing every request to its own thread.
//!
//! Endpoints:
//! - `GET /api/v1/ltp`: every supported pair.
//! - `GET /api/v1/ltp?pair=BTC/USD`: one pair (`pair` wins over `pairs`).
//! - `GET /api/v1/ltp?pairs=BTC/USD,BTC/EUR`: comma-separated list.
//! - `GET /health`: liveness, always `200 OK`.

use std::sync::Arc;
use std::thread;

use log::{debug, error, info};
use ltp_common::net::{HEALTH_PATH, LTP_PATH};
use ltp_common::pairs::default_pairs;
use ltp_common::LtpResponse;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use url::form_urlencoded;

use crate::service::QuoteService;
use crate::upstream::PriceSource;

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Status, content type and body of a response, independent of the server crate.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Value of the `Content-Type` header.
    pub content_type: &'static str,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpReply {
    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_TEXT,
            body: body.into().into_bytes(),
        }
    }

    fn json(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: CONTENT_TYPE_JSON,
            body,
        }
    }

    /// Body as UTF-8 text, lossy.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Dispatch one request. `target` is the request target as sent by the client
/// (path plus optional query string).
pub fn route<S: PriceSource>(
    service: &QuoteService<S>,
    method: &Method,
    target: &str,
) -> HttpReply {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    match path {
        LTP_PATH => handle_ltp(service, method, query),
        HEALTH_PATH => handle_health(),
        _ => HttpReply::text(404, "Not found"),
    }
}

fn handle_ltp<S: PriceSource>(
    service: &QuoteService<S>,
    method: &Method,
    query: &str,
) -> HttpReply {
    if *method != Method::Get {
        return HttpReply::text(405, "Method not allowed");
    }

    let pairs = requested_pairs(query);
    debug!("LTP lookup for {:?}", pairs);

    let ltp = match service.resolve(&pairs) {
        Ok(ltp) => ltp,
        Err(e) => return HttpReply::text(500, format!("Error fetching LTP: {}", e)),
    };

    match (LtpResponse { ltp }).to_json_bytes() {
        Ok(body) => HttpReply::json(body),
        Err(e) => {
            error!("Error encoding response: {}", e);
            HttpReply::text(500, "Error encoding response")
        }
    }
}

fn handle_health() -> HttpReply {
    HttpReply::text(200, "OK")
}

/// Pairs named by the query: `pair`, else `pairs` split on commas, else the
/// default set. Empty parameters count as absent.
pub fn requested_pairs(query: &str) -> Vec<String> {
    let mut pair = None;
    let mut pairs = None;

    for (name, value) in form_urlencoded::parse(query.as_bytes()) {
        match name.as_ref() {
            "pair" if pair.is_none() => pair = Some(value.into_owned()),
            "pairs" if pairs.is_none() => pairs = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(single) = pair.filter(|p| !p.is_empty()) {
        return vec![single];
    }
    if let Some(list) = pairs.filter(|p| !p.is_empty()) {
        return list.split(',').map(str::to_string).collect();
    }
    default_pairs()
}

/// Accept requests until the server is unblocked, one thread per request.
pub fn serve<S>(server: Arc<Server>, service: Arc<QuoteService<S>>)
where
    S: PriceSource + 'static,
{
    for request in server.incoming_requests() {
        let service = Arc::clone(&service);
        thread::spawn(move || respond(request, &service));
    }
    info!("HTTP accept loop stopped");
}

fn respond<S: PriceSource>(request: Request, service: &QuoteService<S>) {
    let reply = route(service, request.method(), request.url());
    debug!(
        "{} {} -> {}",
        request.method(),
        request.url(),
        reply.status
    );

    let mut response = Response::from_data(reply.body).with_status_code(StatusCode(reply.status));
    match Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        Ok(header) => response.add_header(header),
        Err(()) => error!("Invalid Content-Type header: {}", reply.content_type),
    }

    if let Err(e) = request.respond(response) {
        error!("Failed to write HTTP response: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::QuoteCache;
    use ltp_common::{FetchError, PairLtp};
    use std::time::Duration;

    struct FixedSource;

    impl PriceSource for FixedSource {
        fn last_price(&self, vendor_pair: &str) -> Result<f64, FetchError> {
            match vendor_pair {
                "XXBTZUSD" => Ok(45000.0),
                "XBTCHF" => Ok(41000.0),
                "XXBTZEUR" => Ok(42000.0),
                other => Err(FetchError::MissingPair(other.to_string())),
            }
        }
    }

    fn service() -> QuoteService<FixedSource> {
        QuoteService::new(FixedSource, QuoteCache::new(Duration::from_secs(30)))
    }

    fn decode(reply: &HttpReply) -> Vec<PairLtp> {
        assert_eq!(reply.content_type, CONTENT_TYPE_JSON);
        serde_json::from_slice::<LtpResponse>(&reply.body).unwrap().ltp
    }

    #[test]
    fn query_precedence() {
        assert_eq!(requested_pairs("pair=BTC/USD&pairs=BTC/EUR,BTC/CHF"), vec!["BTC/USD"]);
        assert_eq!(requested_pairs("pairs=BTC/EUR,BTC/CHF"), vec!["BTC/EUR", "BTC/CHF"]);
        assert_eq!(requested_pairs("pair=&pairs=BTC/EUR"), vec!["BTC/EUR"]);
        assert_eq!(requested_pairs(""), vec!["BTC/USD", "BTC/CHF", "BTC/EUR"]);
        assert_eq!(requested_pairs("other=1"), default_pairs());
    }

    #[test]
    fn query_values_are_percent_decoded() {
        assert_eq!(requested_pairs("pair=BTC%2FUSD"), vec!["BTC/USD"]);
        assert_eq!(requested_pairs("pairs=BTC%2FUSD,%20btc/eur"), vec!["BTC/USD", " btc/eur"]);
    }

    #[test]
    fn all_pairs_by_default() {
        let reply = route(&service(), &Method::Get, "/api/v1/ltp");
        assert_eq!(reply.status, 200);

        let pairs: Vec<String> = decode(&reply).into_iter().map(|ltp| ltp.pair).collect();
        assert_eq!(pairs, vec!["BTC/USD", "BTC/CHF", "BTC/EUR"]);
    }

    #[test]
    fn single_pair() {
        let reply = route(&service(), &Method::Get, "/api/v1/ltp?pair=btc/usd");
        assert_eq!(reply.status, 200);
        assert_eq!(
            decode(&reply),
            vec![PairLtp { pair: "BTC/USD".into(), amount: 45000.0 }]
        );
    }

    #[test]
    fn partial_failure_returns_successful_subset() {
        let reply = route(&service(), &Method::Get, "/api/v1/ltp?pairs=BTC/USD,INVALID");
        assert_eq!(reply.status, 200);
        assert_eq!(
            decode(&reply),
            vec![PairLtp { pair: "BTC/USD".into(), amount: 45000.0 }]
        );
    }

    #[test]
    fn total_failure_is_500() {
        let reply = route(&service(), &Method::Get, "/api/v1/ltp?pairs=INVALID,ETH/USD");
        assert_eq!(reply.status, 500);
        assert_eq!(reply.content_type, CONTENT_TYPE_TEXT);
        assert_eq!(reply.body_text(), "Error fetching LTP: failed to fetch any LTP data");
    }

    #[test]
    fn non_get_is_405_before_any_lookup() {
        let service = service();
        for method in [Method::Post, Method::Put, Method::Delete, Method::Head] {
            let reply = route(&service, &method, "/api/v1/ltp?pair=BTC/USD");
            assert_eq!(reply.status, 405);
            assert_eq!(reply.body_text(), "Method not allowed");
        }
        assert!(service.cache().is_empty());
    }

    #[test]
    fn health_is_always_ok() {
        let reply = route(&service(), &Method::Get, "/health");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body_text(), "OK");
    }

    #[test]
    fn unknown_path_is_404() {
        assert_eq!(route(&service(), &Method::Get, "/api/v2/ltp").status, 404);
    }
}
