//! Codec error definitions.

use thiserror::Error;

use crate::gateway::decode::GatewayResponse;

/// Malformed query string or path.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid semicolon separator in query")]
    Semicolon,

    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),
}

/// Errors raised while translating between HTTP and gateway events.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The query string (or path) could not be parsed.
    #[error("{0}")]
    QueryParse(#[from] QueryError),

    /// The request body could not be read in full.
    #[error("{0}")]
    BodyRead(#[source] axum::Error),

    /// The request event could not be serialized.
    #[error("{0}")]
    JsonEncode(#[source] serde_json::Error),

    /// The response payload is not a gateway response document.
    #[error("{0}")]
    JsonDecode(#[source] serde_json::Error),

    /// The response body claimed base64 but was not.
    #[error("{0}")]
    Base64Decode(#[from] base64::DecodeError),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// A response payload that could not be decoded.
///
/// Carries the synthetic 502 response built for it, so callers can log the
/// cause and still answer the client with a well-formed response.
#[derive(Debug, Error)]
#[error("{message}: {source}")]
pub struct DecodeFailure {
    message: &'static str,
    #[source]
    source: CodecError,
    response: GatewayResponse,
}

impl DecodeFailure {
    pub(crate) fn new(message: &'static str, source: CodecError) -> Self {
        let body = format!("502 Bad Gateway\n{}\n{}", message, source);
        Self {
            message,
            source,
            response: GatewayResponse::bad_gateway(body.into_bytes()),
        }
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    pub fn cause(&self) -> &CodecError {
        &self.source
    }

    pub fn response(&self) -> &GatewayResponse {
        &self.response
    }

    pub fn into_response(self) -> GatewayResponse {
        self.response
    }
}
