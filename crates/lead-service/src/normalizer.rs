//! Request metadata extraction

use axum::http::{header, HeaderMap};

use crate::models::ClientMeta;

/// Proxy headers checked for the client address, in order
const IP_HEADERS: [&str; 4] = [FORWARDED_FOR, "x-real-ip", "x-client-ip", "x-vercel-ip"];

const FORWARDED_FOR: &str = "x-forwarded-for";

pub const UNKNOWN: &str = "unknown";

/// Extract the client address from proxy headers.
///
/// Only the first hop of `x-forwarded-for` is used; the other headers hold a
/// single address and are taken whole. IPv6 loopback is reported as
/// `127.0.0.1`.
pub fn client_ip(headers: &HeaderMap) -> String {
    let ip = IP_HEADERS
        .iter()
        .filter_map(|&name| {
            let value = headers.get(name)?.to_str().ok()?;
            let value = if name == FORWARDED_FOR {
                value.split(',').next().unwrap_or_default()
            } else {
                value
            };
            Some(value.trim())
        })
        .find(|value| !value.is_empty())
        .unwrap_or(UNKNOWN);

    if ip == "::1" {
        "127.0.0.1".to_string()
    } else {
        ip.to_string()
    }
}

pub fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

pub fn client_meta(headers: &HeaderMap) -> ClientMeta {
    ClientMeta {
        ip: client_ip(headers),
        user_agent: user_agent(headers),
    }
}
