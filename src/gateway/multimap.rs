//! Ordered header and query-parameter maps.
//!
//! # Responsibilities
//! - Case-insensitive header keys with an explicit comparison policy
//! - Insertion-ordered maps so "first value wins" is deterministic
//! - Conversions between single-value and multi-value shapes
//!
//! # Design Decisions
//! - Header keys keep the spelling they were first inserted with
//! - Query keys are plain strings and compare case-sensitively
//! - Value lists are never empty: every key is created together with its first value

use std::fmt;
use std::hash::{Hash, Hasher};

use axum::http::{header, HeaderMap};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A header name that compares and hashes ignoring ASCII case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderKey(String);

impl HeaderKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for HeaderKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for HeaderKey {}

impl Hash for HeaderKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl From<&str> for HeaderKey {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for HeaderKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for HeaderKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HeaderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Header name → ordered values.
pub type HeaderMultimap = IndexMap<HeaderKey, Vec<String>>;

/// Query parameter → ordered values.
pub type QueryMultimap = IndexMap<String, Vec<String>>;

/// Canonical MIME form of a header name: `x-forwarded-for` → `X-Forwarded-For`.
pub fn canonical_header_key(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

/// Collect an `http::HeaderMap` into a multimap with canonical key spelling.
///
/// `Host` is left out; it describes the connection, not the request headers.
/// Values that are not valid UTF-8 are carried lossily.
pub fn from_header_map(headers: &HeaderMap) -> HeaderMultimap {
    let mut map = HeaderMultimap::with_capacity(headers.keys_len());
    for (name, value) in headers.iter() {
        if name == header::HOST {
            continue;
        }
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.entry(HeaderKey::new(canonical_header_key(name.as_str())))
            .or_default()
            .push(value);
    }
    map
}

/// Take the first value of every key.
///
/// Keys with an empty list cannot be produced by this crate's builders; if one
/// is passed in anyway it is dropped.
pub fn first_value_map<K>(multimap: &IndexMap<K, Vec<String>>) -> IndexMap<K, String>
where
    K: Clone + Hash + Eq,
{
    multimap
        .iter()
        .filter_map(|(key, values)| values.first().map(|v| (key.clone(), v.clone())))
        .collect()
}

/// Fold single-value headers into a multimap.
///
/// Keys that differ only in case are merged, their values appended in order.
pub fn single_to_multi_value(map: IndexMap<String, String>) -> HeaderMultimap {
    let mut multi = HeaderMultimap::with_capacity(map.len());
    for (key, value) in map {
        multi.entry(HeaderKey::from(key)).or_default().push(value);
    }
    multi
}

/// Fold multi-value headers into a multimap, appending across case variants.
pub fn merge_multi_values(map: IndexMap<String, Vec<String>>) -> HeaderMultimap {
    let mut multi = HeaderMultimap::with_capacity(map.len());
    for (key, values) in map {
        multi.entry(HeaderKey::from(key)).or_default().extend(values);
    }
    multi
}
