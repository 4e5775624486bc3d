use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use axum::http::HeaderMap;

pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const REAL_IP: &str = "x-real-ip";

/// Header values and connection address a client address is derived from.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressSources<'a> {
    pub peer: Option<IpAddr>,
    pub forwarded_for: Option<&'a str>,
    pub real_ip: Option<&'a str>,
}

impl<'a> AddressSources<'a> {
    pub fn from_headers(headers: &'a HeaderMap, peer: Option<IpAddr>) -> Self {
        Self {
            peer,
            forwarded_for: header_str(headers, FORWARDED_FOR),
            real_ip: header_str(headers, REAL_IP),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Picks the client address: first `X-Forwarded-For` token, then `X-Real-IP`,
/// then the connection address. Private addresses are replaced by `fallback`.
///
/// Values that do not parse as an IP address are passed through untouched.
pub fn resolve_client_address(sources: &AddressSources<'_>, fallback: &str) -> String {
    let forwarded = sources
        .forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let real_ip = sources
        .real_ip
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let candidate = match (forwarded, real_ip, sources.peer) {
        (Some(first), _, _) => first.to_string(),
        (None, Some(real), _) => real.to_string(),
        (None, None, Some(peer)) => peer.to_string(),
        (None, None, None) => return fallback.to_string(),
    };

    if is_private_address(&candidate) {
        tracing::debug!("Replacing private address {} with {}", candidate, fallback);
        fallback.to_string()
    } else {
        candidate
    }
}

/// Returns false for anything that fails to parse.
pub fn is_private_address(address: &str) -> bool {
    match address.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => is_private_v4(v4),
        Ok(IpAddr::V6(v6)) => is_private_v6(v6),
        Err(_) => false,
    }
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || a == 0
        // 100.64.0.0/10 shared address space
        || (a == 100 && (b & 0xc0) == 64)
        // 192.0.0.0/24 IETF protocol assignments
        || (a == 192 && b == 0 && c == 0)
        // 198.18.0.0/15 benchmarking
        || (a == 198 && (b & 0xfe) == 18)
        // 240.0.0.0/4 reserved, includes broadcast
        || a >= 240
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_private_v4(mapped);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link local
        || (first & 0xffc0) == 0xfe80
}
