//! HTTP server setup and the proxy handler.
//!
//! # Responsibilities
//! - Create the Axum router with a catch-all handler
//! - Bind the server to a listener and drain on shutdown
//! - Translate each request into one function invocation
//! - Record request and invocation metrics

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::gateway::AlbCodec;
use crate::http::request::append_forwarded_headers;
use crate::http::response::{build_response, ProxyError};
use crate::invoke::{AdmissionGate, Invoke, InvokeResult, LambdaClient};
use crate::lifecycle::shutdown;
use crate::observability::metrics::{self, InvocationOutcome};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub codec: AlbCodec,
    pub invoker: Arc<dyn Invoke>,
    pub gate: AdmissionGate,
    pub function_name: Arc<str>,
    /// Port reported as `X-Forwarded-Port`.
    pub forwarded_port: u16,
}

/// HTTP front end for a single function.
pub struct HttpServer {
    config: ProxyConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a server that invokes through the Lambda Invoke API.
    pub fn new(config: ProxyConfig) -> InvokeResult<Self> {
        let client = LambdaClient::from_config(&config.lambda)?;
        Ok(Self::with_invoker(config, Arc::new(client)))
    }

    /// Create a server around any invocation transport.
    pub fn with_invoker(config: ProxyConfig, invoker: Arc<dyn Invoke>) -> Self {
        let mut codec = AlbCodec::new(config.gateway.encoding_mode(), config.gateway.max_body_bytes);
        if let Some(arn) = config.gateway.target_group_arn.as_deref().filter(|a| !a.is_empty()) {
            codec = codec.with_target_group_arn(arn);
        }

        let state = AppState {
            codec,
            invoker,
            gate: AdmissionGate::single(),
            function_name: Arc::from(config.lambda.function_name.as_str()),
            forwarded_port: config.listener.port,
        };

        Self { config, state }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until `shutdown` fires, then let in-flight requests finish.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let mut state = self.state;
        state.forwarded_port = addr.port();
        let gate = state.gate.clone();

        tracing::info!(
            address = %addr,
            function = %state.function_name,
            gateway = %self.config.gateway.kind,
            multi_value = self.config.gateway.multi_value_headers,
            "HTTP server starting"
        );

        let app = Self::build_router(state).into_make_service_with_connect_info::<SocketAddr>();

        // Requests still queued at the gate get 503; the running invocation finishes.
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown::wait(shutdown).await;
                tracing::info!("Shutdown requested, closing admission gate");
                gate.close();
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: one request, one invocation.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    mut request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    tracing::debug!(method = %method, path = %path, client = %client, "Proxying request");

    append_forwarded_headers(request.headers_mut(), client, state.forwarded_port);

    let response = match forward(&state, request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(method = %method, path = %path, error = %e, "Request failed");
            e.into_response()
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

async fn forward(state: &AppState, request: Request<Body>) -> Result<Response, ProxyError> {
    let payload = state.codec.encode(request).await.map_err(ProxyError::Encode)?;

    let output = {
        let waiting = metrics::gate_waiting();
        let _permit = state.gate.enter().await?;
        drop(waiting);

        let start = Instant::now();
        let result = state.invoker.invoke(&state.function_name, payload).await;
        let outcome = match &result {
            Ok(output) if output.function_error.is_some() => InvocationOutcome::FunctionError,
            Ok(_) => InvocationOutcome::Success,
            Err(_) => InvocationOutcome::Failed,
        };
        metrics::record_invocation(outcome, start);
        result?
    };

    if let Some(kind) = output.function_error {
        tracing::debug!(
            function_error = %kind,
            payload = %String::from_utf8_lossy(&output.payload),
            "Function reported an error"
        );
        return Err(ProxyError::FunctionError(kind));
    }

    let decoded = state.codec.decode(&output.payload)?;
    build_response(decoded)
}
