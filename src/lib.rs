//! Local HTTP front end for an AWS Lambda function.
//!
//! Accepts plain HTTP, encodes each request as an Application Load Balancer
//! target group event, invokes the function synchronously and turns the
//! returned event back into an HTTP response.
//!
//! ```text
//!     Client ──▶ http::server ──▶ gateway::encode ──▶ invoke::gate ──▶ invoke::lambda ──▶ Lambda
//!     Client ◀── http::response ◀── gateway::decode ◀──────────────────────────────────────┘
//! ```

pub mod config;
pub mod gateway;
pub mod http;
pub mod invoke;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use gateway::{AlbCodec, EncodingMode, GatewayKind};
pub use http::HttpServer;
pub use invoke::{Invoke, InvokeError, InvokeOutput};
pub use lifecycle::Shutdown;
