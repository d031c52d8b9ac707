//! Request helpers: client address resolution and lenient query parsing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::HeaderMap;

use guestbook_core::fingerprint::UNKNOWN_ADDRESS;

/// Headers consulted for the client address, most trusted first.
const ADDRESS_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-forwarded-for", "x-real-ip"];

/// Best-effort client address: proxy headers first, then the TCP peer.
pub fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    for name in ADDRESS_HEADERS {
        let value = headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            // X-Forwarded-For lists the original client first.
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(addr) = value {
            return addr.to_string();
        }
    }
    peer.map(|p| p.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string())
}

/// Parse a query parameter, falling back to `default` when absent or invalid.
pub fn query_param<T: FromStr>(params: &HashMap<String, String>, key: &str, default: T) -> T {
    params
        .get(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse an unsigned count that saturates at `u64::MAX` instead of failing.
///
/// Anything that is not a plain run of digits, including negative numbers,
/// falls back to `default`.
pub fn saturating_param(params: &HashMap<String, String>, key: &str, default: u64) -> u64 {
    match params.get(key).map(|v| v.trim()) {
        Some(v) if !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()) => {
            v.parse().unwrap_or(u64::MAX)
        }
        _ => default,
    }
}
