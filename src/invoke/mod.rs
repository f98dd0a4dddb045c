//! Remote function invocation subsystem.
//!
//! # Data Flow
//! ```text
//! encoded event
//!     → gate.rs (wait for the single admission slot)
//!     → lambda.rs (POST to the Lambda Invoke API, SigV4 signed via sigv4.rs,
//!       credentials from the environment or profile.rs)
//!     → InvokeOutput { payload, function_error }
//!     → slot released when the permit drops
//! ```
//!
//! # Design Decisions
//! - `Invoke` is the seam between the proxy and the transport; tests plug in
//!   in-process functions
//! - A function-level error is data, not an `Err`: the call itself succeeded
//! - Timeouts belong to the transport, not to the codec

pub mod gate;
pub mod lambda;
pub mod profile;
pub mod sigv4;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use gate::{AdmissionGate, AdmissionPermit, GateClosed};
pub use lambda::LambdaClient;
pub use profile::SharedProfile;
pub use sigv4::Credentials;

/// Result of a completed invocation.
#[derive(Debug, Clone, Default)]
pub struct InvokeOutput {
    /// Raw response payload.
    pub payload: Bytes,
    /// Set when the function itself reported a failure (e.g. `Unhandled`).
    pub function_error: Option<String>,
}

impl InvokeOutput {
    pub fn ok(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            function_error: None,
        }
    }

    pub fn function_error(kind: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            function_error: Some(kind.into()),
        }
    }
}

/// Errors that prevent an invocation from completing.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// Connection, TLS or protocol failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The invocation API answered with a non-success status.
    #[error("invoke API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// No answer within the configured deadline.
    #[error("invocation timed out after {0} seconds")]
    Timeout(u64),

    /// Anything else a transport wants to report.
    #[error("{0}")]
    Other(String),
}

/// Result type for invocations.
pub type InvokeResult<T> = Result<T, InvokeError>;

/// A remote function transport.
#[async_trait]
pub trait Invoke: Send + Sync {
    /// Invoke `function_name` synchronously with `payload`.
    async fn invoke(&self, function_name: &str, payload: Bytes) -> InvokeResult<InvokeOutput>;
}
