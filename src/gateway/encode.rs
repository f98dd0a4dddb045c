//! HTTP request → ALB request event.

use axum::body::{Body, Bytes};
use axum::http::Request;

use crate::gateway::body::{is_text_content_type, read_all, EventBody};
use crate::gateway::error::{CodecError, CodecResult};
use crate::gateway::event::{AlbTargetGroupRequest, ElbContext, RequestContext, RequestParams};
use crate::gateway::multimap::{first_value_map, from_header_map};
use crate::gateway::query::{decode_path, parse_query};
use crate::gateway::{AlbCodec, EncodingMode};

impl AlbCodec {
    /// Encode a request as a JSON request event, draining its body.
    pub async fn encode(&self, request: Request<Body>) -> CodecResult<Bytes> {
        let (parts, body) = request.into_parts();

        let query = parse_query(parts.uri.query().unwrap_or_default())?;
        let path = decode_path(parts.uri.path())?;
        let headers = from_header_map(&parts.headers);

        let as_text = is_text_content_type(&headers);
        let bytes = read_all(body, self.max_body_bytes).await?;
        let body = EventBody::encode(&bytes, as_text);

        let params = match self.mode {
            EncodingMode::SingleValue => RequestParams::SingleValue {
                query_string_parameters: first_value_map(&query),
                headers: first_value_map(&headers),
            },
            EncodingMode::MultiValue => RequestParams::MultiValue {
                multi_value_query_string_parameters: query,
                multi_value_headers: headers,
            },
        };

        let event = AlbTargetGroupRequest {
            http_method: parts.method.as_str().to_owned(),
            path,
            params,
            body: body.body,
            is_base64_encoded: body.is_base64_encoded,
            request_context: self.target_group_arn.as_ref().map(|arn| RequestContext {
                elb: ElbContext {
                    target_group_arn: arn.to_string(),
                },
            }),
        };

        serde_json::to_vec(&event)
            .map(Bytes::from)
            .map_err(CodecError::JsonEncode)
    }
}
