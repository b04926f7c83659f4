//! Best-effort client IP resolution.
//!
//! Proxies report the original client in request headers. The precedence,
//! highest first, is `Forwarded`, `X-Forwarded-For`, `X-Real-IP`, and finally
//! the transport peer address. Only the highest-precedence source that is
//! present is consulted; if its value cannot be parsed the result is empty.

use std::net::{IpAddr, SocketAddr};
use std::sync::OnceLock;

use http::header::{HeaderName, FORWARDED};
use http::HeaderMap;
use regex::Regex;
use url::{Host, Url};

/// `X-Forwarded-For`
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// `X-Real-IP`
pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

fn forwarded_for() -> &'static Regex {
    static FORWARDED_FOR: OnceLock<Regex> = OnceLock::new();
    FORWARDED_FOR.get_or_init(|| Regex::new(r#"for=[\[\]a-fA-F0-9:"\.]*;"#).expect("valid regex"))
}

/// Collects every value of `name`, with spaces removed and split on commas.
fn split_values(headers: &HeaderMap, name: &HeaderName) -> Vec<String> {
    headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| {
            value
                .replace(' ', "")
                .split(',')
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Extracts the address from the first `Forwarded` element.
///
/// IPv6 brackets are kept so that a `[addr]:port` node still splits into
/// host and port in [`host_of`].
fn forwarded_candidate(first: &str) -> String {
    forwarded_for()
        .find(first)
        .map(|m| m.as_str().replace("for=", "").replace([';', '"'], ""))
        .unwrap_or_default()
}

/// Reduces `candidate` to its host component.
///
/// Accepts bare IPv4 and IPv6 addresses, `ip:port` forms, and hostnames.
fn host_of(candidate: &str) -> String {
    if let Ok(ip) = candidate.parse::<IpAddr>() {
        return ip.to_string();
    }
    if let Ok(addr) = candidate.parse::<SocketAddr>() {
        return addr.ip().to_string();
    }
    match Url::parse(&format!("http://{candidate}")) {
        Ok(url) => match url.host() {
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            Some(Host::Domain(domain)) => domain.to_string(),
            None => String::new(),
        },
        Err(err) => {
            tracing::debug!(candidate, error = %err, "unparseable client address");
            String::new()
        }
    }
}

/// Resolves the client IP for a request.
///
/// # Example
///
/// ```
/// use prate_core::client_ip;
/// use http::HeaderMap;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "1.2.3.4, 5.6.7.8".parse().unwrap());
/// assert_eq!(client_ip::resolve(&headers, None), "1.2.3.4");
///
/// let peer = "10.0.0.1:443".parse().ok();
/// assert_eq!(client_ip::resolve(&HeaderMap::new(), peer), "10.0.0.1");
/// ```
#[must_use]
pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = split_values(headers, &FORWARDED);
    if let Some(first) = forwarded.first() {
        tracing::debug!(forwarded = ?forwarded, "resolving client ip from Forwarded");
        return host_of(&forwarded_candidate(first));
    }

    let candidate = split_values(headers, &X_FORWARDED_FOR)
        .into_iter()
        .next()
        .or_else(|| split_values(headers, &X_REAL_IP).into_iter().next());

    match (candidate, peer) {
        (Some(candidate), _) => host_of(&candidate),
        (None, Some(peer)) => peer.ip().to_string(),
        (None, None) => String::new(),
    }
}
