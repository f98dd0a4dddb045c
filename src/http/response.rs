//! Response construction and error mapping.
//!
//! # Responsibilities
//! - Turn a decoded gateway response into an HTTP response
//! - Map every per-request failure to a well-formed 502/503 with a plain-text body
//!
//! # Design Decisions
//! - Invalid header names/values from the function are skipped, not fatal
//! - Content-Length and Transfer-Encoding are recomputed by the server
//! - An out-of-range status code is a gateway error

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::gateway::{CodecError, DecodeFailure, GatewayResponse};
use crate::invoke::{GateClosed, InvokeError};

/// A failure that ends one proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid request: {0}")]
    Encode(#[source] CodecError),

    #[error("Failed to invoke Lambda: {0}")]
    Invocation(#[from] InvokeError),

    #[error("Lambda function error: {0}")]
    FunctionError(String),

    #[error(transparent)]
    Decode(#[from] DecodeFailure),

    #[error("Invalid status code in JSON response: {0}")]
    InvalidStatus(i64),

    #[error(transparent)]
    GateClosed(#[from] GateClosed),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::GateClosed(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    /// Plain-text body sent to the client.
    pub fn body(&self) -> String {
        match self {
            ProxyError::Encode(e) => bad_gateway("Invalid request", Some(e)),
            ProxyError::Invocation(e) => bad_gateway("Failed to invoke Lambda", Some(e)),
            ProxyError::FunctionError(kind) => {
                bad_gateway(&format!("Lambda function error: {}", kind), None::<&str>)
            }
            ProxyError::Decode(failure) => String::from_utf8_lossy(&failure.response().body).into_owned(),
            ProxyError::InvalidStatus(code) => {
                bad_gateway("Invalid status code in JSON response", Some(code))
            }
            ProxyError::GateClosed(_) => "503 Service Unavailable".to_string(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.body()).into_response()
    }
}

fn bad_gateway(message: &str, cause: Option<impl std::fmt::Display>) -> String {
    match cause {
        Some(cause) => format!("502 Bad Gateway\n{}\n{}", message, cause),
        None => format!("502 Bad Gateway\n{}", message),
    }
}

/// Build the client response from a decoded gateway response.
pub fn build_response(decoded: GatewayResponse) -> Result<Response, ProxyError> {
    let status = u16::try_from(decoded.status)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or(ProxyError::InvalidStatus(decoded.status))?;

    let mut response = Response::new(Body::from(decoded.body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    for (key, values) in decoded.headers {
        let name = match HeaderName::from_bytes(key.as_str().as_bytes()) {
            Ok(name) => name,
            Err(_) => {
                tracing::warn!(header = %key, "Skipping invalid header name from function");
                continue;
            }
        };
        if name == header::CONTENT_LENGTH || name == header::TRANSFER_ENCODING {
            continue;
        }
        for value in values {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    headers.append(name.clone(), value);
                }
                Err(_) => tracing::warn!(header = %key, "Skipping invalid header value from function"),
            }
        }
    }

    Ok(response)
}
