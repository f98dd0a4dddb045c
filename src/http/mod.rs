//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all handler)
//!     → request.rs (append X-Forwarded-* headers)
//!     → [gateway codec encodes the event]
//!     → [admission gate + function invocation]
//!     → [gateway codec decodes the response]
//!     → response.rs (status/headers/body, or a synthetic 502)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use response::ProxyError;
pub use server::HttpServer;
