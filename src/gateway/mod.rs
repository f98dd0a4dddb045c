//! Gateway event codec subsystem.
//!
//! # Data Flow
//! ```text
//! Request<Body>
//!     → query.rs (raw query → ordered multimap)
//!     → multimap.rs (headers → case-insensitive ordered multimap)
//!     → body.rs (read body, text or base64 framing)
//!     → encode.rs (mode-specific request event → JSON bytes)
//!
//! JSON bytes from the function
//!     → decode.rs (response event → status, headers, body bytes)
//!     → on failure: synthetic 502 carried in DecodeFailure
//! ```
//!
//! # Design Decisions
//! - The encoding mode is fixed at startup and owned by the codec
//! - Encode and decode always share one mode
//! - The codec is pure apart from draining the request body once

pub mod body;
pub mod decode;
pub mod encode;
pub mod error;
pub mod event;
pub mod multimap;
pub mod query;

use std::fmt;
use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use decode::GatewayResponse;
pub use error::{CodecError, CodecResult, DecodeFailure, QueryError};
pub use multimap::{HeaderKey, HeaderMultimap, QueryMultimap};

/// Supported HTTP gateway event formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    /// Application Load Balancer target group events.
    #[default]
    Alb,
}

impl fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayKind::Alb => f.write_str("alb"),
        }
    }
}

/// How headers and query parameters are shaped in events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingMode {
    /// One string per key; the first value wins.
    SingleValue,
    /// Every value per key, in order.
    MultiValue,
}

impl EncodingMode {
    pub fn from_multi_value_flag(enabled: bool) -> Self {
        if enabled {
            EncodingMode::MultiValue
        } else {
            EncodingMode::SingleValue
        }
    }
}

/// ALB event codec.
#[derive(Debug, Clone)]
pub struct AlbCodec {
    mode: EncodingMode,
    max_body_bytes: usize,
    target_group_arn: Option<Arc<str>>,
}

impl AlbCodec {
    pub fn new(mode: EncodingMode, max_body_bytes: usize) -> Self {
        Self {
            mode,
            max_body_bytes,
            target_group_arn: None,
        }
    }

    /// Tag request events with `requestContext.elb.targetGroupArn`.
    pub fn with_target_group_arn(mut self, arn: impl Into<Arc<str>>) -> Self {
        self.target_group_arn = Some(arn.into());
        self
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }
}
