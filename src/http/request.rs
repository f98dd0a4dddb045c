//! Request preparation before encoding.
//!
//! # Responsibilities
//! - Append X-Forwarded-For, X-Forwarded-Proto, X-Forwarded-Port
//!
//! # Design Decisions
//! - Values are appended, so client-supplied X-Forwarded-* come first
//! - The client IP is reported without its port

use std::net::SocketAddr;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_FORWARDED_PORT: HeaderName = HeaderName::from_static("x-forwarded-port");

/// Add the proxy headers an ALB would add.
pub fn append_forwarded_headers(headers: &mut HeaderMap, client: SocketAddr, listener_port: u16) {
    headers.append(X_FORWARDED_FOR, client_ip(client));
    headers.append(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
    headers.append(X_FORWARDED_PORT, HeaderValue::from(listener_port));
}

fn client_ip(client: SocketAddr) -> HeaderValue {
    // IP addresses always render as visible ASCII.
    HeaderValue::from_str(&client.ip().to_string()).unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_all_three() {
        let mut headers = HeaderMap::new();
        let client: SocketAddr = "192.0.2.10:53211".parse().unwrap();
        append_forwarded_headers(&mut headers, client, 8080);

        assert_eq!(headers.get(&X_FORWARDED_FOR).unwrap(), "192.0.2.10");
        assert_eq!(headers.get(&X_FORWARDED_PROTO).unwrap(), "http");
        assert_eq!(headers.get(&X_FORWARDED_PORT).unwrap(), "8080");
    }

    #[test]
    fn existing_values_are_kept_first() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.7"));
        let client: SocketAddr = "[::1]:4000".parse().unwrap();
        append_forwarded_headers(&mut headers, client, 3000);

        let values: Vec<_> = headers.get_all(&X_FORWARDED_FOR).iter().collect();
        assert_eq!(values, vec!["203.0.113.7", "::1"]);
    }
}
