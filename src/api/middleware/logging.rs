//! Access log middleware

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, MatchedPath},
    http::{header, HeaderMap, HeaderName, Request},
    middleware::Next,
    response::Response,
};
use tracing::info;

use crate::api::context::RequestContext;

/// Logs one line when a request arrives and one when its response leaves.
///
/// The first line carries the method, uri, matched route, client address,
/// request id and an allow-listed set of headers with credentials masked. The
/// second carries the final status and the elapsed time.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let path = extract_path(&request);
    let request_id = extract_request_id(&request);
    let remote_addr = extract_remote_addr(&request);

    let headers_log = loggable_headers(request.headers());

    info!(
        method = %method,
        path = %path,
        uri = %uri,
        remote_addr = %remote_addr,
        request_id = %request_id,
        headers = %headers_log,
        "Started {} {}",
        method,
        uri
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        request_id = %request_id,
        "Completed with {} {} in {:?}",
        status.as_u16(),
        status.canonical_reason().unwrap_or(""),
        duration
    );

    response
}

fn extract_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

fn extract_request_id(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_else(|| "-".to_string())
}

fn extract_remote_addr(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Headers worth an access log entry
const LOGGED_HEADERS: [HeaderName; 7] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::ACCEPT,
    header::ORIGIN,
    header::USER_AGENT,
    header::AUTHORIZATION,
    header::COOKIE,
];

/// Logged with the value replaced by `MASK`
const MASKED_HEADERS: [HeaderName; 2] = [header::AUTHORIZATION, header::COOKIE];

const MASK: &str = "***";

fn loggable_headers(headers: &HeaderMap) -> String {
    LOGGED_HEADERS
        .iter()
        .flat_map(|name| headers.get_all(name).iter().map(move |value| (name, value)))
        .map(|(name, value)| {
            let shown = if MASKED_HEADERS.contains(name) {
                MASK
            } else {
                value.to_str().unwrap_or("<binary>")
            };
            format!("{}={}", name, shown)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loggable_headers_masks_credentials() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        headers.insert(header::COOKIE, "apiserver_session=abc.def".parse().unwrap());
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        headers.insert(header::CACHE_CONTROL, "no-cache".parse().unwrap());

        let logged = loggable_headers(&headers);

        assert!(logged.contains("content-type=application/json"));
        assert!(logged.contains("cookie=***"));
        assert!(logged.contains("authorization=***"));
        assert!(!logged.contains("abc.def"));
        assert!(!logged.contains("dXNlcjpwYXNz"));
        assert!(!logged.contains("cache-control"));
    }

    #[test]
    fn test_loggable_headers_keeps_allow_list_order() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, "curl/8.0".parse().unwrap());
        headers.insert(header::ACCEPT, "*/*".parse().unwrap());

        assert_eq!(loggable_headers(&headers), "accept=*/* user-agent=curl/8.0");
        assert_eq!(loggable_headers(&HeaderMap::new()), "");
    }

    #[test]
    fn test_extract_request_id_and_remote_addr() {
        let addr: SocketAddr = "10.0.0.1:5000".parse().unwrap();
        let request = Request::builder()
            .extension(RequestContext::new("req-42"))
            .extension(ConnectInfo(addr))
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract_request_id(&request), "req-42");
        assert_eq!(extract_remote_addr(&request), "10.0.0.1:5000");
    }

    #[test]
    fn test_missing_context_falls_back_to_dash() {
        let request = Request::builder().body(Body::empty()).unwrap();

        assert_eq!(extract_request_id(&request), "-");
        assert_eq!(extract_remote_addr(&request), "-");
    }
}
