//! Query string and path decoding.

use percent_encoding::percent_decode_str;
use url::form_urlencoded;

use crate::gateway::error::QueryError;
use crate::gateway::multimap::QueryMultimap;

/// Parse a raw query string into an ordered multimap.
///
/// Pairs are separated by `&` only; a `;` inside a pair and malformed `%`
/// escapes are rejected. `+` decodes to a space.
pub fn parse_query(raw: &str) -> Result<QueryMultimap, QueryError> {
    for pair in raw.split('&').filter(|p| !p.is_empty()) {
        if pair.contains(';') {
            return Err(QueryError::Semicolon);
        }
        check_escapes(pair)?;
    }

    let mut params = QueryMultimap::new();
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        params.entry(key.into_owned()).or_default().push(value.into_owned());
    }
    Ok(params)
}

/// Percent-decode a request path. `+` is kept literally.
pub fn decode_path(raw: &str) -> Result<String, QueryError> {
    check_escapes(raw)?;
    Ok(percent_decode_str(raw).decode_utf8_lossy().into_owned())
}

fn check_escapes(s: &str) -> Result<(), QueryError> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                let end = (i + 3).min(bytes.len());
                return Err(QueryError::InvalidEscape(
                    String::from_utf8_lossy(&bytes[i..end]).into_owned(),
                ));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_keys_keep_order() {
        let params = parse_query("a=1&a=2&b=3").unwrap();
        let keys: Vec<_> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(params["a"], vec!["1", "2"]);
        assert_eq!(params["b"], vec!["3"]);
    }

    #[test]
    fn decodes_escapes_and_plus() {
        let params = parse_query("q=hello+world&name=%E2%9C%93&flag").unwrap();
        assert_eq!(params["q"], vec!["hello world"]);
        assert_eq!(params["name"], vec!["✓"]);
        assert_eq!(params["flag"], vec![""]);
    }

    #[test]
    fn empty_query_is_empty_map() {
        assert!(parse_query("").unwrap().is_empty());
        assert!(parse_query("&&").unwrap().is_empty());
    }

    #[test]
    fn rejects_semicolons() {
        assert!(matches!(parse_query("a=1;b=2"), Err(QueryError::Semicolon)));
    }

    #[test]
    fn rejects_bad_escapes() {
        match parse_query("a=%zz") {
            Err(QueryError::InvalidEscape(esc)) => assert_eq!(esc, "%zz"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(parse_query("a=%4").is_err());
        assert!(parse_query("a=%").is_err());
    }

    #[test]
    fn path_decoding() {
        assert_eq!(decode_path("/foo%20bar/a+b").unwrap(), "/foo bar/a+b");
        assert_eq!(decode_path("/plain").unwrap(), "/plain");
        assert!(decode_path("/bad%g1").is_err());
        assert_eq!(decode_path("/caf%C3%A9/%2F").unwrap(), "/café//");
        assert_eq!(decode_path("/bad%FFutf8").unwrap(), "/bad\u{FFFD}utf8");
    }
}
