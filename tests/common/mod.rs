//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use ingress_gateway::config::{GatewayConfig, MatchType, RouteConfig, TargetConfig};
use ingress_gateway::{HttpServer, Shutdown};

/// What the mock backend saw.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    /// Request target as sent on the wire (path and query).
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl SeenRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A canned backend reply.
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

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Handle to a running mock backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    calls: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> MockBackend
where
    F: Fn(SeenRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockResponse> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let f = Arc::new(f);

    let counter = calls.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let counter = counter.clone();
                    tokio::spawn(async move {
                        let Some(seen) = read_request(&mut socket).await else {
                            return;
                        };
                        counter.fetch_add(1, Ordering::SeqCst);
                        let response = f(seen).await;
                        let _ = socket.write_all(&encode_response(&response)).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockBackend { addr, calls }
}

/// Start a mock backend that answers 200 with the request target as body.
pub async fn start_echo_backend(extra_headers: &'static [(&'static str, &'static str)]) -> MockBackend {
    start_programmable_backend(move |seen| async move {
        let mut response = MockResponse::ok(seen.target);
        for (name, value) in extra_headers {
            response = response.header(name, value);
        }
        response
    })
    .await
}

async fn read_request(socket: &mut TcpStream) -> Option<SeenRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buf[head_end..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(SeenRequest {
        method,
        target,
        headers,
        body,
    })
}

fn encode_response(response: &MockResponse) -> Vec<u8> {
    let reason = match response.status {
        200 => "OK",
        201 => "Created",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    };
    let mut out = format!("HTTP/1.1 {} {}\r\n", response.status, reason);
    for (name, value) in &response.headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.body.len(),
        response.body
    ));
    out.into_bytes()
}

/// A single-target route pointing at `backend`.
pub fn route_to(id: &str, path: &str, backend: SocketAddr) -> RouteConfig {
    RouteConfig {
        id: id.to_string(),
        hosts: Vec::new(),
        methods: Vec::new(),
        path: path.to_string(),
        match_type: MatchType::Prefix,
        rewrite: None,
        targets: vec![TargetConfig {
            host: backend.ip().to_string(),
            port: backend.port(),
            scheme: String::new(),
            weight: 1,
        }],
        cacheable: false,
        cache_key: Vec::new(),
        auth_required: false,
        request_headers: Vec::new(),
        response_headers: Vec::new(),
    }
}

/// A gateway server running on an ephemeral port.
pub struct RunningGateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl RunningGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn stop(&self) {
        self.shutdown.trigger();
    }
}

/// Bind and run an `HttpServer` for `config`.
pub async fn start_gateway(config: GatewayConfig) -> RunningGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let receiver: broadcast::Receiver<()> = shutdown.subscribe();

    tokio::spawn(async move {
        HttpServer::new(config).run(listener, receiver).await.unwrap();
    });

    RunningGateway { addr, shutdown }
}
