//! ALB response event → HTTP response parts.

use crate::gateway::body::EventBody;
use crate::gateway::error::{CodecError, DecodeFailure};
use crate::gateway::event::AlbTargetGroupResponse;
use crate::gateway::multimap::{merge_multi_values, single_to_multi_value, HeaderMultimap};
use crate::gateway::{AlbCodec, EncodingMode};

/// A decoded response, headers always in multimap shape.
///
/// The status code is whatever the function returned; it is not checked
/// against the valid HTTP range here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    pub status: i64,
    pub headers: HeaderMultimap,
    pub body: Vec<u8>,
}

impl GatewayResponse {
    pub(crate) fn bad_gateway(body: Vec<u8>) -> Self {
        Self {
            status: 502,
            headers: HeaderMultimap::new(),
            body,
        }
    }
}

impl AlbCodec {
    /// Decode a response event.
    ///
    /// On failure the returned [`DecodeFailure`] already holds a 502 response
    /// describing the problem.
    pub fn decode(&self, payload: &[u8]) -> Result<GatewayResponse, DecodeFailure> {
        let event: AlbTargetGroupResponse = serde_json::from_slice(payload)
            .map_err(|e| DecodeFailure::new("Invalid JSON response", CodecError::JsonDecode(e)))?;

        let body = EventBody::decode(
            event.body.unwrap_or_default(),
            event.is_base64_encoded.unwrap_or_default(),
        )
        .map_err(|e| DecodeFailure::new("Invalid body in JSON response", e))?;

        let headers = match self.mode {
            EncodingMode::SingleValue => single_to_multi_value(event.headers.unwrap_or_default()),
            EncodingMode::MultiValue => merge_multi_values(event.multi_value_headers.unwrap_or_default()),
        };

        Ok(GatewayResponse {
            status: event.status_code.unwrap_or_default(),
            headers,
            body,
        })
    }
}
