//! Body reading and text/binary framing.
//!
//! # Responsibilities
//! - Drain a request body into one buffer (bounded)
//! - Decide whether a body travels as text or as base64 by its media type
//!
//! # Design Decisions
//! - Anything that is not positively known to be text is treated as binary
//! - An unparsable `Content-Type` is binary, never an error

use axum::body::{Body, Bytes};
use base64::{
    alphabet,
    engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD},
    engine::DecodePaddingMode,
    Engine as _,
};

use crate::gateway::error::{CodecError, CodecResult};
use crate::gateway::multimap::{HeaderKey, HeaderMultimap};

/// Media types carried as text besides `text/*`.
const TEXT_MEDIA_TYPES: [&str; 3] = ["application/json", "application/javascript", "application/xml"];

/// Decoder for response bodies: padding required, non-zero trailing bits tolerated.
const RESPONSE_BODY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

/// A body as carried inside a gateway event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBody {
    pub body: String,
    pub is_base64_encoded: bool,
}

impl EventBody {
    /// Frame raw bytes for the event.
    pub fn encode(bytes: &[u8], as_text: bool) -> Self {
        if as_text {
            Self {
                body: String::from_utf8_lossy(bytes).into_owned(),
                is_base64_encoded: false,
            }
        } else {
            Self {
                body: STANDARD.encode(bytes),
                is_base64_encoded: true,
            }
        }
    }

    /// Recover the raw bytes from an event body.
    ///
    /// Line breaks inside base64 text are skipped, so wrapped output decodes.
    pub fn decode(body: String, is_base64_encoded: bool) -> CodecResult<Vec<u8>> {
        if is_base64_encoded {
            let unwrapped: Vec<u8> = body
                .bytes()
                .filter(|&b| !matches!(b, b'\r' | b'\n'))
                .collect();
            Ok(RESPONSE_BODY_ENGINE.decode(unwrapped)?)
        } else {
            Ok(body.into_bytes())
        }
    }
}

/// Read a body stream to the end, failing past `limit` bytes.
pub async fn read_all(body: Body, limit: usize) -> CodecResult<Bytes> {
    axum::body::to_bytes(body, limit)
        .await
        .map_err(CodecError::BodyRead)
}

/// True if the request's `Content-Type` marks the body as text.
pub fn is_text_content_type(headers: &HeaderMultimap) -> bool {
    let content_type = headers
        .get(&HeaderKey::from("Content-Type"))
        .and_then(|values| values.first())
        .map(String::as_str)
        .unwrap_or("");

    match parse_media_type(content_type) {
        Some(media_type) => {
            media_type.starts_with("text/") || TEXT_MEDIA_TYPES.contains(&media_type.as_str())
        }
        None => false,
    }
}

/// Extract the lower-cased media type from a `Content-Type` value.
///
/// Returns `None` when the type or any of its parameters is malformed.
pub fn parse_media_type(value: &str) -> Option<String> {
    let (base, params) = match value.split_once(';') {
        Some((base, params)) => (base, Some(params)),
        None => (value, None),
    };

    let media_type = base.trim().to_ascii_lowercase();
    let valid_type = match media_type.split_once('/') {
        Some((main, sub)) => is_token(main) && is_token(sub),
        None => is_token(&media_type),
    };
    if !valid_type {
        return None;
    }

    if let Some(params) = params {
        check_params(params)?;
    }
    Some(media_type)
}

fn check_params(params: &str) -> Option<()> {
    let mut seen: Vec<String> = Vec::new();
    let mut rest = params;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Some(());
        }

        let (key, after_key) = rest.split_once('=')?;
        let key = key.trim().to_ascii_lowercase();
        if !is_token(&key) || seen.contains(&key) {
            return None;
        }
        seen.push(key);

        let after_key = after_key.trim_start();
        let remainder = if let Some(quoted) = after_key.strip_prefix('"') {
            let end = closing_quote(quoted)?;
            &quoted[end + 1..]
        } else {
            let end = after_key.find(|c: char| !is_token_char(c)).unwrap_or(after_key.len());
            if end == 0 {
                return None;
            }
            &after_key[end..]
        };

        let remainder = remainder.trim_start();
        if remainder.is_empty() {
            return Some(());
        }
        // Each further parameter is introduced by a semicolon; trailing ones are tolerated.
        rest = remainder.strip_prefix(';')?;
    }
}

fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_token_char)
}

fn is_token_char(c: char) -> bool {
    c.is_ascii() && c > ' ' && c != '\x7f' && !"()<>@,;:\\\"/[]?=".contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(content_type: &str) -> HeaderMultimap {
        let mut headers = HeaderMultimap::new();
        headers.insert("Content-Type".into(), vec![content_type.to_string()]);
        headers
    }

    #[test]
    fn text_types() {
        for ct in [
            "text/plain",
            "text/html; charset=utf-8",
            "application/json",
            "APPLICATION/JSON",
            "application/json; charset=\"utf-8\"",
            "application/xml",
            "application/javascript",
            "text/csv;",
        ] {
            assert!(is_text_content_type(&headers_with(ct)), "{} should be text", ct);
        }
    }

    #[test]
    fn binary_types() {
        for ct in [
            "image/png",
            "application/octet-stream",
            "application/x-www-form-urlencoded",
            "",
            "text/plain; charset",
            "text/plain; a=1; a=2",
            "te xt/plain",
            "/json",
        ] {
            assert!(!is_text_content_type(&headers_with(ct)), "{} should be binary", ct);
        }
    }

    #[test]
    fn missing_header_is_binary() {
        assert!(!is_text_content_type(&HeaderMultimap::new()));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let mut headers = HeaderMultimap::new();
        headers.insert("content-type".into(), vec!["text/plain".to_string()]);
        assert!(is_text_content_type(&headers));
    }

    #[test]
    fn media_type_is_lowercased() {
        assert_eq!(parse_media_type(" Text/HTML ; q=1").as_deref(), Some("text/html"));
    }

    #[test]
    fn event_body_framing() {
        let text = EventBody::encode(b"hello", true);
        assert_eq!(text.body, "hello");
        assert!(!text.is_base64_encoded);

        let binary = EventBody::encode(&[0, 159, 146, 150], false);
        assert_eq!(binary.body, "AJ+Slg==");
        assert!(binary.is_base64_encoded);

        let bytes = EventBody::decode(binary.body, true).unwrap();
        assert_eq!(bytes, vec![0, 159, 146, 150]);
    }

    #[test]
    fn wrapped_base64_decodes() {
        let bytes = EventBody::decode("aGVsbG8g\nd29ybGQ=\n".into(), true).unwrap();
        assert_eq!(bytes, b"hello world");

        let bytes = EventBody::decode("aGVs\r\nbG8=".into(), true).unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn trailing_bits_are_tolerated() {
        assert_eq!(EventBody::decode("AB==".into(), true).unwrap(), vec![0x00]);
    }

    #[test]
    fn missing_padding_is_an_error() {
        let err = EventBody::decode("aGVsbG8".into(), true).unwrap_err();
        assert!(matches!(err, CodecError::Base64Decode(_)));
    }

    #[test]
    fn invalid_base64_is_an_error() {
        let err = EventBody::decode("!!!not-base64!!!".into(), true).unwrap_err();
        assert!(matches!(err, CodecError::Base64Decode(_)));
    }

    #[tokio::test]
    async fn read_all_respects_limit() {
        let bytes = read_all(Body::from("abcdef"), 16).await.unwrap();
        assert_eq!(&bytes[..], b"abcdef");

        let err = read_all(Body::from("abcdef"), 3).await.unwrap_err();
        assert!(matches!(err, CodecError::BodyRead(_)));
    }
}
