//! ALB target group event documents.
//!
//! Field names are bit-exact with the gateway's JSON. Request parameters are
//! an untagged enum flattened into the event so each encoding mode emits only
//! its own pair of fields.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::gateway::multimap::{HeaderKey, HeaderMultimap, QueryMultimap};

/// Request event sent to the function.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbTargetGroupRequest {
    pub http_method: String,
    pub path: String,
    #[serde(flatten)]
    pub params: RequestParams,
    pub body: String,
    pub is_base64_encoded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_context: Option<RequestContext>,
}

/// Query parameters and headers, shaped by encoding mode.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RequestParams {
    #[serde(rename_all = "camelCase")]
    SingleValue {
        query_string_parameters: IndexMap<String, String>,
        headers: IndexMap<HeaderKey, String>,
    },
    #[serde(rename_all = "camelCase")]
    MultiValue {
        multi_value_query_string_parameters: QueryMultimap,
        multi_value_headers: HeaderMultimap,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    pub elb: ElbContext,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElbContext {
    pub target_group_arn: String,
}

/// Response event returned by the function.
///
/// Every field tolerates absence and `null`; the decoder picks the header
/// field that matches its mode and ignores the other. Header keys stay plain
/// strings here so case variants survive until they are merged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlbTargetGroupResponse {
    pub status_code: Option<i64>,
    pub status_description: Option<String>,
    pub headers: Option<IndexMap<String, String>>,
    pub multi_value_headers: Option<IndexMap<String, Vec<String>>>,
    pub body: Option<String>,
    pub is_base64_encoded: Option<bool>,
}
