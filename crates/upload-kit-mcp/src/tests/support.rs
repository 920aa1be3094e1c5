// crates/upload-kit-mcp/src/tests/support.rs
// ============================================================================
// Module: MCP Test Support Helpers
// Description: In-process HTTP server and scripted stdio MCP peers.
// Purpose: Provide reusable fixtures for MCP client tests without a real server.
// Dependencies: hyper, tokio, http-body-util, serde_json, tempfile
// ============================================================================

use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::BodyExt;
use http_body_util::Full;
use hyper::Request;
use hyper::Response;
use hyper::StatusCode;
use hyper::body::Body;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use upload_kit_config::McpFraming;

use crate::client::McpClientConfig;
use crate::client::McpTransport;

/// Captured HTTP request data for assertions.
#[derive(Clone, Debug)]
pub struct CapturedRequest {
    /// Request headers.
    pub headers: hyper::HeaderMap,
    /// Raw request body bytes.
    pub body: Bytes,
}

impl CapturedRequest {
    /// Parses the body as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request json")
    }

    /// Returns the JSON-RPC method.
    pub fn method(&self) -> String {
        self.json().get("method").and_then(Value::as_str).unwrap_or_default().to_string()
    }

    /// Returns the JSON-RPC id, if any.
    pub fn id(&self) -> Option<Value> {
        self.json().get("id").cloned()
    }
}

/// Test response wrapper.
#[derive(Clone, Debug)]
pub struct TestResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: hyper::HeaderMap,
    /// Response body bytes.
    pub body: Bytes,
}

impl TestResponse {
    /// Builds a JSON response with Content-Type set.
    pub fn json(value: &Value) -> Self {
        let body = serde_json::to_vec(value).expect("serialize json response");
        let mut headers = hyper::HeaderMap::new();
        headers.insert(
            hyper::header::CONTENT_TYPE,
            hyper::header::HeaderValue::from_static("application/json"),
        );
        Self {
            status: StatusCode::OK,
            headers,
            body: Bytes::from(body),
        }
    }

    /// Builds a raw response with custom status and headers.
    pub fn raw(status: StatusCode, headers: hyper::HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Builds an empty `202 Accepted` response (notifications).
    pub fn accepted() -> Self {
        Self::raw(StatusCode::ACCEPTED, hyper::HeaderMap::new(), Bytes::new())
    }

    /// Builds an SSE response carrying one event per message.
    pub fn sse(messages: &[Value]) -> Self {
        let mut body = String::new();
        for message in messages {
            let payload = serde_json::to_string(message).expect("serialize json");
            body.push_str("event: message\n");
            body.push_str(&format!("data: {payload}\n\n"));
        }
        let mut headers = hyper::HeaderMap::new();
        headers.insert(
            hyper::header::CONTENT_TYPE,
            hyper::header::HeaderValue::from_static("text/event-stream"),
        );
        Self {
            status: StatusCode::OK,
            headers,
            body: Bytes::from(body),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.insert(name, hyper::header::HeaderValue::from_static(value));
        self
    }
}

impl From<TestResponse> for Response<Full<Bytes>> {
    fn from(value: TestResponse) -> Self {
        let mut response = Response::new(Full::new(value.body));
        *response.status_mut() = value.status;
        *response.headers_mut() = value.headers;
        if !response.headers().contains_key(hyper::header::CONTENT_LENGTH) {
            let len = response.body().size_hint().upper().unwrap_or_default();
            response.headers_mut().insert(
                hyper::header::CONTENT_LENGTH,
                hyper::header::HeaderValue::from_str(&len.to_string())
                    .expect("content-length header value"),
            );
        }
        response
    }
}

type Responder = Arc<Mutex<Box<dyn FnMut(CapturedRequest) -> TestResponse + Send>>>;

/// Lightweight HTTP test server with request capture.
pub struct TestHttpServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestHttpServer {
    /// Starts the server with a responder callback.
    pub async fn start<F>(responder: F) -> Self
    where
        F: FnMut(CapturedRequest) -> TestResponse + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responder: Responder = Arc::new(Mutex::new(Box::new(responder)));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let requests_task = Arc::clone(&requests);
        let responder_task = Arc::clone(&responder);

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    accept = listener.accept() => {
                        let Ok((stream, _)) = accept else { continue };
                        let requests = Arc::clone(&requests_task);
                        let responder = Arc::clone(&responder_task);
                        tokio::spawn(async move {
                            let io = TokioIo::new(stream);
                            let service = service_fn(move |req: Request<Incoming>| {
                                let requests = Arc::clone(&requests);
                                let responder = Arc::clone(&responder);
                                async move {
                                    let (parts, body) = req.into_parts();
                                    let bytes = body.collect().await?.to_bytes();
                                    let captured = CapturedRequest {
                                        headers: parts.headers,
                                        body: bytes,
                                    };
                                    let response = responder.lock().await.as_mut()(captured.clone());
                                    requests.lock().await.push(captured);
                                    let response: Response<Full<Bytes>> = response.into();
                                    Ok::<_, hyper::Error>(response)
                                }
                            });
                            let _ = http1::Builder::new().serve_connection(io, service).await;
                        });
                    }
                }
            }
        });

        Self {
            addr,
            requests,
            shutdown: Some(shutdown_tx),
            handle,
        }
    }

    /// Starts a server that answers like an MCP upload server.
    ///
    /// `tools_call` builds the reply to `tools/call` from its request.
    pub async fn mcp<F>(mut tools_call: F) -> Self
    where
        F: FnMut(&CapturedRequest) -> TestResponse + Send + 'static,
    {
        Self::start(move |request| match request.method().as_str() {
            "initialize" => TestResponse::json(&jsonrpc_result_for(&request, initialize_result()))
                .with_header("mcp-session-id", "session-1"),
            "tools/list" => TestResponse::json(&jsonrpc_result_for(&request, tools_list_result())),
            "tools/call" => tools_call(&request),
            _ => TestResponse::accepted(),
        })
        .await
    }

    /// Returns the base URL for the server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Returns a snapshot of captured requests.
    pub async fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().await.clone()
    }

    /// Shuts down the server.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = self.handle.await;
    }
}

/// Builds a JSON-RPC result echoing the request id.
pub fn jsonrpc_result_for(request: &CapturedRequest, result: Value) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": request.id().unwrap_or(Value::Null),
        "result": result
    })
}

/// Builds a JSON-RPC error echoing the request id.
pub fn jsonrpc_error_for(request: &CapturedRequest, code: i64, message: &str) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": request.id().unwrap_or(Value::Null),
        "error": { "code": code, "message": message }
    })
}

/// `initialize` result of the fake server.
pub fn initialize_result() -> Value {
    serde_json::json!({
        "protocolVersion": "2025-06-18",
        "capabilities": { "tools": {} },
        "serverInfo": { "name": "fake-upload-server", "version": "0.0.1" }
    })
}

/// `tools/list` result of the fake server.
pub fn tools_list_result() -> Value {
    serde_json::json!({
        "tools": [
            {
                "name": "upload_file",
                "description": "Upload a file from the upload root",
                "inputSchema": { "type": "object" }
            }
        ]
    })
}

/// Upload payload returned by the fake server.
pub fn upload_payload() -> Value {
    serde_json::json!({
        "url": "https://mcp-uploads-1a2b3c4d.s3.amazonaws.com/test-upload.txt?X-Amz-Signature=abc",
        "size": 4600,
        "mime_type": "text/plain",
        "s3_key": "test-upload.txt"
    })
}

/// HTTP client config for tests.
pub fn http_config(transport: McpTransport, endpoint: String, timeout: Duration) -> McpClientConfig {
    McpClientConfig::http(transport, endpoint, timeout)
}

/// A shell script acting as a stdio MCP server.
pub struct ScriptedServer {
    _dir: TempDir,
    path: PathBuf,
}

impl ScriptedServer {
    /// Writes `body` as a `sh` script.
    pub fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("server.sh");
        let mut file = std::fs::File::create(&path).expect("create script");
        file.write_all(body.as_bytes()).expect("write script");
        Self {
            _dir: dir,
            path,
        }
    }

    /// Stdio config that runs the script with `sh`.
    pub fn config(&self, framing: McpFraming, timeout: Duration) -> McpClientConfig {
        McpClientConfig::stdio(
            "sh",
            vec![self.path.display().to_string()],
            vec![("UPLOAD_KIT_TEST".to_string(), "1".to_string())],
            framing,
            timeout,
        )
    }
}
