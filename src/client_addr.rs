// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client address resolution from proxy headers.
//!
//! Precedence: first hop of `X-Forwarded-For`, then `X-Real-IP`, then
//! `CF-Connecting-IP`, then the literal `unknown`. These headers are only
//! trustworthy behind a proxy or CDN that overwrites them; a client talking to
//! the origin directly can forge any of them.

use axum::http::HeaderMap;

/// Value used when no header identifies the client.
pub const UNKNOWN_CLIENT: &str = "unknown";

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const CF_CONNECTING_IP: &str = "cf-connecting-ip";

/// Resolve the submitting client's address.
pub fn resolve_client_address(headers: &HeaderMap) -> String {
    let first_hop = header_value(headers, FORWARDED_FOR)
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty());

    first_hop
        .or_else(|| header_value(headers, REAL_IP))
        .or_else(|| header_value(headers, CF_CONNECTING_IP))
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_forwarded_for_first_hop_wins() {
        let h = headers(&[
            ("x-forwarded-for", " 203.0.113.5 , 10.0.0.1, 10.0.0.2"),
            ("x-real-ip", "198.51.100.1"),
            ("cf-connecting-ip", "192.0.2.9"),
        ]);
        assert_eq!(resolve_client_address(&h), "203.0.113.5");
    }

    #[test]
    fn test_real_ip_before_cdn_header() {
        let h = headers(&[("x-real-ip", "198.51.100.1"), ("cf-connecting-ip", "192.0.2.9")]);
        assert_eq!(resolve_client_address(&h), "198.51.100.1");
    }

    #[test]
    fn test_cdn_header_fallback() {
        let h = headers(&[("cf-connecting-ip", "192.0.2.9")]);
        assert_eq!(resolve_client_address(&h), "192.0.2.9");
    }

    #[test]
    fn test_empty_first_hop_falls_through() {
        let h = headers(&[("x-forwarded-for", " , 10.0.0.1"), ("x-real-ip", "198.51.100.1")]);
        assert_eq!(resolve_client_address(&h), "198.51.100.1");
    }

    #[test]
    fn test_unknown_without_headers() {
        assert_eq!(resolve_client_address(&HeaderMap::new()), UNKNOWN_CLIENT);
    }
}
