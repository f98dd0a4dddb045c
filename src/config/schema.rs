//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::gateway::{EncodingMode, GatewayKind};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, port).
    pub listener: ListenerConfig,

    /// Gateway event format.
    pub gateway: GatewayConfig,

    /// Target function and invocation transport.
    pub lambda: LambdaConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0" or "127.0.0.1").
    pub bind_address: String,

    /// Listen port. Also reported to the function as `X-Forwarded-Port`.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string to bind to.
    pub fn listen_address(&self) -> String {
        let host = if self.bind_address.is_empty() {
            "0.0.0.0"
        } else {
            self.bind_address.as_str()
        };
        if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, self.port)
        } else {
            format!("{}:{}", host, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Gateway event configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Event format. Only `alb` exists.
    pub kind: GatewayKind,

    /// Use `multiValueHeaders` / `multiValueQueryStringParameters`.
    pub multi_value_headers: bool,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Optional ARN reported in `requestContext.elb.targetGroupArn`.
    pub target_group_arn: Option<String>,
}

impl GatewayConfig {
    pub fn encoding_mode(&self) -> EncodingMode {
        EncodingMode::from_multi_value_flag(self.multi_value_headers)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            kind: GatewayKind::Alb,
            multi_value_headers: false,
            max_body_bytes: 6 * 1024 * 1024, // Lambda's synchronous payload limit
            target_group_arn: None,
        }
    }
}

/// Target function configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LambdaConfig {
    /// Function name, ARN or partial ARN.
    pub function_name: String,

    /// Invoke API endpoint; defaults to the regional AWS endpoint.
    pub endpoint: Option<String>,

    /// AWS region; falls back to `AWS_REGION`, then `AWS_DEFAULT_REGION`.
    pub region: Option<String>,

    /// Invocation deadline in seconds.
    pub timeout_secs: u64,
}

impl LambdaConfig {
    /// Configured region, then `AWS_REGION`, `AWS_DEFAULT_REGION`, the shared
    /// profile's region, and finally `us-east-1`.
    pub fn resolved_region(&self, profile_region: Option<&str>) -> String {
        self.region
            .clone()
            .filter(|r| !r.is_empty())
            .or_else(|| std::env::var("AWS_REGION").ok().filter(|r| !r.is_empty()))
            .or_else(|| std::env::var("AWS_DEFAULT_REGION").ok().filter(|r| !r.is_empty()))
            .or_else(|| profile_region.filter(|r| !r.is_empty()).map(str::to_owned))
            .unwrap_or_else(|| "us-east-1".to_string())
    }

    pub fn resolved_endpoint(&self, region: &str) -> String {
        match &self.endpoint {
            Some(endpoint) if !endpoint.is_empty() => endpoint.clone(),
            _ => format!("https://lambda.{}.amazonaws.com", region),
        }
    }
}

impl Default for LambdaConfig {
    fn default() -> Self {
        Self {
            function_name: "myfunction".to_string(),
            endpoint: None,
            region: None,
            timeout_secs: 900,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
