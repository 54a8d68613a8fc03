use crate::error::ShortenerError;
use axum::http::HeaderMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::net::{IpAddr, SocketAddr};
use url::Url;

pub const GENERATED_ID_LENGTH: usize = 6;
pub const MAX_SHORTCODE_LENGTH: usize = 20;

pub const LOCAL_NETWORK: &str = "Local Network";
pub const UNKNOWN_LOCATION: &str = "Unknown";

pub fn get_header(name: &str, headers: &HeaderMap) -> Option<String> {
    headers
        .get(name)
        .map(|value| value.to_str().unwrap_or_default().to_string())
}

pub fn parse_url(text: &str) -> Result<String, ShortenerError> {
    let text = text.trim();
    Url::parse(text)
        .map(|url| url.to_string())
        .map_err(|err| ShortenerError::InvalidUrl(format!("{text} ({err})")))
}

pub fn is_valid_shortcode(code: &str) -> bool {
    (1..=MAX_SHORTCODE_LENGTH).contains(&code.len())
        && code.bytes().all(|byte| byte.is_ascii_alphanumeric())
}

pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Client address as seen by the service: the first `X-Forwarded-For` hop when
/// present, otherwise the TCP peer.
pub fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    get_header("X-Forwarded-For", headers)
        .and_then(|forwarded| {
            forwarded
                .split(',')
                .next()
                .and_then(|hop| hop.trim().parse::<IpAddr>().ok())
        })
        .or_else(|| peer.map(|addr| addr.ip()))
}

pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_private_or_local(&IpAddr::V4(v4)),
            None => {
                v6.is_loopback()
                    || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7
                    || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10
            }
        },
    }
}

/// Placeholder location; no real geolocation is performed.
pub fn classify_location(address: Option<IpAddr>) -> &'static str {
    match address {
        Some(ip) if is_private_or_local(&ip) => LOCAL_NETWORK,
        _ => UNKNOWN_LOCATION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn parse_url_accepts_absolute_urls() {
        assert_eq!(
            parse_url("  https://example.com/path?q=1 ").unwrap(),
            "https://example.com/path?q=1"
        );
        assert!(parse_url("mailto:someone@example.com").is_ok());
    }

    #[test]
    fn parse_url_rejects_relative_and_garbage() {
        for text in ["not-a-url", "/relative/path", "", "http://"] {
            assert!(
                matches!(parse_url(text), Err(ShortenerError::InvalidUrl(_))),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn shortcode_format() {
        assert!(is_valid_shortcode("a"));
        assert!(is_valid_shortcode("abc123XYZ"));
        assert!(is_valid_shortcode(&"a".repeat(20)));
        assert!(!is_valid_shortcode(""));
        assert!(!is_valid_shortcode(&"a".repeat(21)));
        assert!(!is_valid_shortcode("bad code!"));
        assert!(!is_valid_shortcode("with-dash"));
        assert!(!is_valid_shortcode("ünïcode"));
    }

    #[test]
    fn generated_ids_are_valid_shortcodes() {
        for _ in 0..1_000 {
            let id = generate_id();
            assert_eq!(id.len(), GENERATED_ID_LENGTH);
            assert!(is_valid_shortcode(&id), "invalid id {id}");
        }
    }

    #[test]
    fn forwarded_address_wins_over_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Forwarded-For",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        assert_eq!(
            client_address(&headers, Some(peer)),
            Some("203.0.113.7".parse().unwrap())
        );
        assert_eq!(
            client_address(&HeaderMap::new(), Some(peer)),
            Some(peer.ip())
        );
        assert_eq!(client_address(&HeaderMap::new(), None), None);
    }

    #[test]
    fn location_classification() {
        let local_addresses = [
            "127.0.0.1",
            "192.168.1.20",
            "10.1.2.3",
            "::1",
            "fd00::1",
            "::ffff:192.168.0.1",
        ];
        for local in local_addresses {
            assert_eq!(
                classify_location(Some(local.parse().unwrap())),
                LOCAL_NETWORK,
                "{local}"
            );
        }
        assert_eq!(
            classify_location(Some("8.8.8.8".parse().unwrap())),
            UNKNOWN_LOCATION
        );
        assert_eq!(classify_location(None), UNKNOWN_LOCATION);
    }
}
