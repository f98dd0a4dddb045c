//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use lambda_local_proxy::invoke::{Invoke, InvokeResult, InvokeOutput};
use lambda_local_proxy::{HttpServer, ProxyConfig, Shutdown};

/// A running proxy bound to an ephemeral port.
pub struct TestProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    /// Begin graceful shutdown without waiting for the server to stop.
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the proxy on 127.0.0.1 with `invoker` as the function transport.
pub async fn start_proxy(
    config_updates: impl FnOnce(&mut ProxyConfig),
    invoker: Arc<dyn Invoke>,
) -> TestProxy {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1".into();
    config.listener.port = 0;
    config_updates(&mut config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::with_invoker(config, invoker);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    TestProxy { addr, shutdown }
}

/// An in-process function built from a closure over the decoded event.
pub struct FnInvoker<F> {
    handler: F,
    events: Mutex<Vec<Value>>,
}

impl<F> FnInvoker<F>
where
    F: Fn(&Value) -> InvokeResult<InvokeOutput> + Send + Sync + 'static,
{
    pub fn new(handler: F) -> Arc<Self> {
        Arc::new(Self {
            handler,
            events: Mutex::new(Vec::new()),
        })
    }

    /// Events received so far, oldest first.
    pub fn events(&self) -> Vec<Value> {
        self.events.lock().unwrap().clone()
    }

    pub fn last_event(&self) -> Value {
        self.events().pop().expect("no event received")
    }
}

#[async_trait]
impl<F> Invoke for FnInvoker<F>
where
    F: Fn(&Value) -> InvokeResult<InvokeOutput> + Send + Sync + 'static,
{
    async fn invoke(&self, _function_name: &str, payload: Bytes) -> InvokeResult<InvokeOutput> {
        let event: Value = serde_json::from_slice(&payload).expect("event is JSON");
        self.events.lock().unwrap().push(event.clone());
        (self.handler)(&event)
    }
}

/// A function that answers 200 with the request body echoed back unchanged.
pub fn echo_invoker() -> Arc<FnInvoker<impl Fn(&Value) -> InvokeResult<InvokeOutput> + Send + Sync + 'static>> {
    FnInvoker::new(|event: &Value| {
        let response = serde_json::json!({
            "statusCode": 200,
            "statusDescription": "200 OK",
            "headers": { "Content-Type": "application/octet-stream" },
            "multiValueHeaders": { "Content-Type": ["application/octet-stream"] },
            "body": event["body"],
            "isBase64Encoded": event["isBase64Encoded"],
        });
        Ok(InvokeOutput::ok(serde_json::to_vec(&response).unwrap()))
    })
}

/// A function that always returns `payload`.
pub fn fixed_invoker(payload: &'static str) -> Arc<FnInvoker<impl Fn(&Value) -> InvokeResult<InvokeOutput> + Send + Sync + 'static>> {
    FnInvoker::new(move |_: &Value| Ok(InvokeOutput::ok(payload)))
}

/// A request as seen by the mock Lambda endpoint.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: String,
    pub path: String,
    /// Header names lowercased.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl MockRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// What the mock Lambda endpoint answers.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Start a programmable raw-TCP Lambda endpoint; one request per connection.
pub async fn start_programmable_lambda<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockResponse> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let response = f(request).await;

                        let mut raw = format!(
                            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                            response.status,
                            reason(response.status),
                            response.body.len()
                        );
                        for (name, value) in &response.headers {
                            raw.push_str(&format!("{}: {}\r\n", name, value));
                        }
                        raw.push_str("\r\n");
                        raw.push_str(&response.body);

                        let _ = socket.write_all(raw.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut TcpStream) -> Option<MockRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(n, v)| (n.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(n, _)| n == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(MockRequest {
        method,
        path,
        headers,
        body,
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
