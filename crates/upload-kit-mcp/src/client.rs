// crates/upload-kit-mcp/src/client.rs
// ============================================================================
// Module: MCP Client
// Description: Multi-transport JSON-RPC client for MCP upload servers.
// Purpose: Initialize a session, list tools, and call tools with progress.
// Dependencies: reqwest, serde, serde_json, tokio
// ============================================================================

//! ## Overview
//! [`McpClient`] speaks MCP over HTTP, SSE, or a spawned stdio process.
//! [`McpClient::connect`] performs the `initialize` handshake and sends the
//! `notifications/initialized` notification. While a request is in flight the
//! client keeps reading: matching `notifications/progress` messages go to the
//! caller's handler, server `ping` requests are answered, and anything else is
//! ignored until the response with the request's id arrives.
//!
//! Security posture: inputs and server responses are untrusted; apply size
//! limits, fail closed on parsing errors, and never log secrets.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::process::Stdio;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::process::ChildStdin;
use tokio::process::ChildStdout;
use tokio::process::Command;
use upload_kit_config::McpFraming;

use crate::framing::MAX_MCP_RESPONSE_BYTES;
use crate::framing::read_message;
use crate::framing::write_message;
use crate::progress::ProgressUpdate;
use crate::sse::SseDecoder;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// MCP protocol revision requested during `initialize`.
pub const PROTOCOL_VERSION: &str = "2025-06-18";
/// Client name reported during `initialize`.
pub const CLIENT_NAME: &str = "upload-kit";
/// Session header used by streamable HTTP servers.
const SESSION_HEADER: &str = "mcp-session-id";
/// Upper bound on `tools/list` pages followed.
const MAX_TOOL_PAGES: usize = 64;
/// Grace period for a stdio server to exit after stdin closes.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);
/// JSON-RPC "method not found" error code.
const METHOD_NOT_FOUND: i64 = -32601;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported MCP transports.
///
/// # Invariants
/// - Variants are stable for CLI parsing and transport selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpTransport {
    /// HTTP JSON-RPC transport.
    Http,
    /// SSE JSON-RPC transport.
    Sse,
    /// Stdio JSON-RPC transport.
    Stdio,
}

/// MCP client configuration.
///
/// # Invariants
/// - For [`McpTransport::Http`] and [`McpTransport::Sse`], `endpoint` must be `Some`.
/// - For [`McpTransport::Stdio`], `stdio_command` must be `Some`.
/// - `stdio_env` entries are added on top of the inherited process environment.
#[derive(Clone)]
pub struct McpClientConfig {
    /// Selected transport.
    pub transport: McpTransport,
    /// Endpoint URL for HTTP/SSE transports.
    pub endpoint: Option<String>,
    /// Stdio command to spawn.
    pub stdio_command: Option<String>,
    /// Stdio command arguments.
    pub stdio_args: Vec<String>,
    /// Stdio environment variables.
    pub stdio_env: Vec<(String, String)>,
    /// Stdio message framing.
    pub framing: McpFraming,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Bearer token sent as `Authorization` on HTTP/SSE requests.
    pub bearer_token: Option<String>,
}

impl McpClientConfig {
    /// Builds a stdio configuration.
    #[must_use]
    pub fn stdio(
        command: impl Into<String>,
        args: Vec<String>,
        env: Vec<(String, String)>,
        framing: McpFraming,
        timeout: Duration,
    ) -> Self {
        Self {
            transport: McpTransport::Stdio,
            endpoint: None,
            stdio_command: Some(command.into()),
            stdio_args: args,
            stdio_env: env,
            framing,
            timeout,
            bearer_token: None,
        }
    }

    /// Builds an HTTP or SSE configuration.
    #[must_use]
    pub fn http(transport: McpTransport, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            transport,
            endpoint: Some(endpoint.into()),
            stdio_command: None,
            stdio_args: Vec::new(),
            stdio_env: Vec::new(),
            framing: McpFraming::default(),
            timeout,
            bearer_token: None,
        }
    }
}

impl std::fmt::Debug for McpClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_keys: Vec<&str> = self.stdio_env.iter().map(|(key, _)| key.as_str()).collect();
        f.debug_struct("McpClientConfig")
            .field("transport", &self.transport)
            .field("endpoint", &self.endpoint)
            .field("stdio_command", &self.stdio_command)
            .field("stdio_args", &self.stdio_args)
            .field("stdio_env_keys", &env_keys)
            .field("framing", &self.framing)
            .field("timeout", &self.timeout)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// MCP client errors.
///
/// # Invariants
/// - Variants are stable for CLI error mapping and tests.
/// - String payloads are user-facing and may include untrusted server text.
#[derive(Debug, Error)]
pub enum McpClientError {
    /// Configuration error.
    #[error("mcp client config error: {0}")]
    Config(String),
    /// Transport error.
    #[error("mcp transport error: {0}")]
    Transport(String),
    /// JSON serialization error.
    #[error("mcp json error: {0}")]
    Json(String),
    /// Protocol parsing error.
    #[error("mcp protocol error: {0}")]
    Protocol(String),
    /// The tool reported a failure (`isError: true`).
    #[error("tool {tool} failed: {message}")]
    ToolFailed {
        /// Tool name.
        tool: String,
        /// Text content returned with the failure.
        message: String,
    },
    /// Response size exceeds limits.
    #[error("mcp response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Actual size in bytes.
        actual: usize,
        /// Maximum size in bytes.
        limit: usize,
    },
    /// No response arrived in time.
    #[error("mcp request {method} timed out after {timeout_ms} ms")]
    Timeout {
        /// Request method.
        method: String,
        /// Timeout in milliseconds.
        timeout_ms: u64,
    },
}

/// Tool metadata returned by `tools/list`.
///
/// # Invariants
/// - Values are untrusted and unvalidated; callers must treat them as hostile input.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    #[serde(default)]
    pub description: Option<String>,
    /// JSON schema of the tool arguments.
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

/// Server details returned by `initialize`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerInfo {
    /// Protocol revision chosen by the server.
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Server implementation details.
    #[serde(rename = "serverInfo", default)]
    pub implementation: Option<Implementation>,
    /// Advertised capabilities.
    #[serde(default)]
    pub capabilities: Value,
}

/// Name and version of an MCP implementation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Implementation {
    /// Implementation name.
    pub name: String,
    /// Implementation version.
    #[serde(default)]
    pub version: String,
}

/// Callback receiving progress updates for an in-flight call.
pub type ProgressHandler<'a> = &'a mut (dyn FnMut(ProgressUpdate) + Send);

/// MCP client implementation.
///
/// # Invariants
/// - `next_id` is strictly increasing for each request sent by this client.
/// - At most one request is in flight at a time.
pub struct McpClient {
    /// Selected transport client.
    transport: McpTransportClient,
    /// Next JSON-RPC request identifier.
    next_id: u64,
    /// Per-request timeout.
    timeout: Duration,
    /// Server details from `initialize`.
    server: Option<ServerInfo>,
}

impl std::fmt::Debug for McpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpClient")
            .field("next_id", &self.next_id)
            .field("timeout", &self.timeout)
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: JSON-RPC Structures
// ============================================================================

/// JSON-RPC request envelope.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    /// JSON-RPC version tag.
    jsonrpc: &'static str,
    /// Request identifier.
    id: u64,
    /// Method name to invoke.
    method: &'a str,
    /// Optional parameters payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

/// JSON-RPC notification envelope.
#[derive(Debug, Serialize)]
struct JsonRpcNotification<'a> {
    /// JSON-RPC version tag.
    jsonrpc: &'static str,
    /// Notification method.
    method: &'a str,
    /// Optional parameters payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

/// Any inbound JSON-RPC message.
#[derive(Debug, Deserialize)]
struct RawMessage {
    /// Identifier (responses and server requests).
    #[serde(default)]
    id: Option<Value>,
    /// Method (notifications and server requests).
    #[serde(default)]
    method: Option<String>,
    /// Parameters.
    #[serde(default)]
    params: Option<Value>,
    /// Result payload.
    #[serde(default)]
    result: Option<Value>,
    /// Error payload.
    #[serde(default)]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error payload.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    /// Error code.
    #[serde(default)]
    code: i64,
    /// Error message provided by the server.
    message: String,
}

/// Classified inbound message.
#[derive(Debug)]
enum Inbound {
    /// Response to a client request.
    Response {
        /// Identifier (null for some parse errors).
        id: Option<Value>,
        /// Result payload.
        result: Option<Value>,
        /// Error payload.
        error: Option<JsonRpcError>,
    },
    /// Server notification.
    Notification {
        /// Method.
        method: String,
        /// Parameters.
        params: Option<Value>,
    },
    /// Server-initiated request.
    Request {
        /// Identifier to echo.
        id: Value,
        /// Method.
        method: String,
    },
}

/// `tools/list` result payload.
#[derive(Debug, Deserialize)]
struct ToolListResult {
    /// Tool definitions returned by the server.
    tools: Vec<ToolDefinition>,
    /// Pagination cursor.
    #[serde(rename = "nextCursor", default)]
    next_cursor: Option<String>,
}

/// `tools/call` result payload.
#[derive(Debug, Deserialize)]
struct ToolCallResult {
    /// Tool response content entries.
    #[serde(default)]
    content: Vec<Value>,
    /// Structured result payload.
    #[serde(rename = "structuredContent", default)]
    structured_content: Option<Value>,
    /// Tool-level failure flag.
    #[serde(rename = "isError", default)]
    is_error: bool,
}

/// Parses and classifies one inbound message.
fn classify_message(bytes: &[u8]) -> Result<Inbound, McpClientError> {
    let raw: RawMessage = serde_json::from_slice(bytes)
        .map_err(|err| McpClientError::Protocol(format!("invalid json-rpc response: {err}")))?;
    match (raw.method, raw.id) {
        (Some(method), Some(id)) if !id.is_null() => Ok(Inbound::Request {
            id,
            method,
        }),
        (Some(method), _) => Ok(Inbound::Notification {
            method,
            params: raw.params,
        }),
        (None, id) => Ok(Inbound::Response {
            id,
            result: raw.result,
            error: raw.error,
        }),
    }
}

// ============================================================================
// SECTION: Pending Request
// ============================================================================

/// What to do after an inbound message.
enum Disposition {
    /// The request finished.
    Complete(Result<Value, McpClientError>),
    /// Send this reply to the server and keep waiting.
    Reply(Value),
    /// Keep waiting.
    Continue,
}

/// State of the single in-flight request.
struct PendingRequest<'m, 'p> {
    /// Request id.
    id: u64,
    /// Request method, for diagnostics.
    method: &'m str,
    /// Progress token sent in `_meta`, when progress was requested.
    progress_token: Option<Value>,
    /// Progress callback.
    on_progress: Option<ProgressHandler<'p>>,
}

impl PendingRequest<'_, '_> {
    /// Applies an inbound message.
    fn accept(&mut self, message: Inbound) -> Disposition {
        match message {
            Inbound::Response {
                id,
                result,
                error,
            } => {
                let matches_id = id.as_ref().and_then(Value::as_u64) == Some(self.id);
                let null_id_error = error.is_some() && id.as_ref().is_none_or(Value::is_null);
                if !matches_id && !null_id_error {
                    tracing::debug!(method = self.method, "ignoring response for another request");
                    return Disposition::Continue;
                }
                if let Some(error) = error {
                    return Disposition::Complete(Err(McpClientError::Protocol(format!(
                        "{} (code {})",
                        error.message, error.code
                    ))));
                }
                Disposition::Complete(result.ok_or_else(|| {
                    McpClientError::Protocol(format!("missing result in {} response", self.method))
                }))
            }
            Inbound::Notification {
                method,
                params,
            } => {
                if method == "notifications/progress" {
                    self.deliver_progress(params);
                } else {
                    tracing::debug!(method = %method, "ignoring server notification");
                }
                Disposition::Continue
            }
            Inbound::Request {
                id,
                method,
            } => {
                if method == "ping" {
                    return Disposition::Reply(serde_json::json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "result": {}
                    }));
                }
                tracing::debug!(method = %method, "rejecting unsupported server request");
                Disposition::Reply(serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": METHOD_NOT_FOUND, "message": "method not supported by client" }
                }))
            }
        }
    }

    /// Forwards a progress notification carrying this request's token.
    fn deliver_progress(&mut self, params: Option<Value>) {
        let (Some(token), Some(handler)) = (&self.progress_token, self.on_progress.as_mut()) else {
            return;
        };
        let Some(params) = params else {
            return;
        };
        if params.get("progressToken") != Some(token) {
            return;
        }
        match serde_json::from_value::<ProgressUpdate>(params) {
            Ok(update) => handler(update),
            Err(err) => tracing::debug!(error = %err, "ignoring malformed progress notification"),
        }
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Transport-specific client implementations.
enum McpTransportClient {
    /// HTTP JSON-RPC transport.
    Http(HttpMcpClient),
    /// SSE JSON-RPC transport.
    Sse(HttpMcpClient),
    /// Stdio JSON-RPC transport.
    Stdio(StdioMcpClient),
}

impl McpClient {
    /// Creates a client without performing the handshake.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when configuration is invalid or transport setup fails.
    pub fn new(config: McpClientConfig) -> Result<Self, McpClientError> {
        if config.timeout.is_zero() {
            return Err(McpClientError::Config("timeout must be greater than zero".to_string()));
        }
        let timeout = config.timeout;
        let transport = match config.transport {
            McpTransport::Http => McpTransportClient::Http(HttpMcpClient::new(config)?),
            McpTransport::Sse => McpTransportClient::Sse(HttpMcpClient::new(config)?),
            McpTransport::Stdio => McpTransportClient::Stdio(StdioMcpClient::spawn(config)?),
        };
        Ok(Self {
            transport,
            next_id: 1,
            timeout,
            server: None,
        })
    }

    /// Creates a client and completes the `initialize` handshake.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when setup or the handshake fails.
    pub async fn connect(config: McpClientConfig) -> Result<Self, McpClientError> {
        let mut client = Self::new(config)?;
        client.initialize().await?;
        Ok(client)
    }

    #[cfg(test)]
    pub(crate) const fn set_next_id_for_test(&mut self, next_id: u64) {
        self.next_id = next_id;
    }

    /// Sends `initialize` and the `notifications/initialized` notification.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when the server rejects the handshake.
    pub async fn initialize(&mut self) -> Result<ServerInfo, McpClientError> {
        let params = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": CLIENT_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        });
        let result = self.request("initialize", Some(params), None).await?;
        let info: ServerInfo = serde_json::from_value(result)
            .map_err(|err| McpClientError::Json(format!("invalid initialize payload: {err}")))?;
        self.notify("notifications/initialized", None).await?;
        tracing::debug!(
            protocol = %info.protocol_version,
            server = info.implementation.as_ref().map_or("unknown", |imp| imp.name.as_str()),
            "mcp session initialized"
        );
        self.server = Some(info.clone());
        Ok(info)
    }

    /// Returns server details from the handshake, when it has run.
    #[must_use]
    pub const fn server_info(&self) -> Option<&ServerInfo> {
        self.server.as_ref()
    }

    /// Calls `tools/list`, following pagination cursors.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when the transport or parsing fails.
    pub async fn list_tools(&mut self) -> Result<Vec<ToolDefinition>, McpClientError> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        for _ in 0 .. MAX_TOOL_PAGES {
            let params = cursor.as_ref().map(|cursor| serde_json::json!({ "cursor": cursor }));
            let result = self.request("tools/list", params, None).await?;
            let page: ToolListResult = serde_json::from_value(result)
                .map_err(|err| McpClientError::Json(format!("invalid tools/list payload: {err}")))?;
            tools.extend(page.tools);
            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => return Ok(tools),
            }
        }
        Err(McpClientError::Protocol(format!("tools/list exceeded {MAX_TOOL_PAGES} pages")))
    }

    /// Calls `tools/call` and returns the tool's JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when the transport fails, the payload is
    /// invalid, or the tool reports an error.
    pub async fn call_tool(
        &mut self,
        tool_name: &str,
        arguments: Value,
    ) -> Result<Value, McpClientError> {
        self.call_tool_inner(tool_name, arguments, None).await
    }

    /// Calls `tools/call` with a progress token, forwarding progress updates.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when the transport fails, the payload is
    /// invalid, or the tool reports an error.
    pub async fn call_tool_with_progress(
        &mut self,
        tool_name: &str,
        arguments: Value,
        on_progress: ProgressHandler<'_>,
    ) -> Result<Value, McpClientError> {
        self.call_tool_inner(tool_name, arguments, Some(on_progress)).await
    }

    /// Closes the session; stdio servers get a grace period before being killed.
    pub async fn shutdown(mut self) {
        if let McpTransportClient::Stdio(client) = &mut self.transport {
            client.close().await;
        }
    }

    /// Shared `tools/call` implementation.
    async fn call_tool_inner(
        &mut self,
        tool_name: &str,
        arguments: Value,
        on_progress: Option<ProgressHandler<'_>>,
    ) -> Result<Value, McpClientError> {
        let params = serde_json::json!({
            "name": tool_name,
            "arguments": arguments,
        });
        let result = self.request("tools/call", Some(params), on_progress).await?;
        extract_tool_payload(tool_name, result)
    }

    /// Sends a request and waits for its response, bounded by the timeout.
    async fn request(
        &mut self,
        method: &str,
        params: Option<Value>,
        on_progress: Option<ProgressHandler<'_>>,
    ) -> Result<Value, McpClientError> {
        let id = self.next_id;
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| McpClientError::Protocol("json-rpc request id overflow".to_string()))?;
        let progress_token = on_progress.as_ref().map(|_| Value::String(format!("upload-kit-{id}")));
        let params = match (&progress_token, params) {
            (Some(token), Some(Value::Object(mut map))) => {
                map.insert("_meta".to_string(), serde_json::json!({ "progressToken": token }));
                Some(Value::Object(map))
            }
            (Some(token), None) => Some(serde_json::json!({ "_meta": { "progressToken": token } })),
            (_, params) => params,
        };
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let payload = serde_json::to_vec(&request)
            .map_err(|err| McpClientError::Json(format!("jsonrpc serialization failed: {err}")))?;
        let mut pending = PendingRequest {
            id,
            method,
            progress_token,
            on_progress,
        };
        tracing::debug!(method, id, "mcp request");
        let timeout = self.timeout;
        let exchange = async {
            match &mut self.transport {
                McpTransportClient::Http(client) => {
                    client.round_trip(payload, false, &mut pending).await
                }
                McpTransportClient::Sse(client) => {
                    client.round_trip(payload, true, &mut pending).await
                }
                McpTransportClient::Stdio(client) => client.round_trip(&payload, &mut pending).await,
            }
        };
        tokio::time::timeout(timeout, exchange).await.map_err(|_| McpClientError::Timeout {
            method: method.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })?
    }

    /// Sends a notification (no response expected).
    async fn notify(&mut self, method: &str, params: Option<Value>) -> Result<(), McpClientError> {
        let notification = JsonRpcNotification {
            jsonrpc: "2.0",
            method,
            params,
        };
        let payload = serde_json::to_vec(&notification)
            .map_err(|err| McpClientError::Json(format!("jsonrpc serialization failed: {err}")))?;
        let timeout = self.timeout;
        let send = async {
            match &mut self.transport {
                McpTransportClient::Http(client) | McpTransportClient::Sse(client) => {
                    client.post_one_way(payload).await
                }
                McpTransportClient::Stdio(client) => client.send(&payload).await,
            }
        };
        tokio::time::timeout(timeout, send).await.map_err(|_| McpClientError::Timeout {
            method: method.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })?
    }
}

/// Extracts the JSON payload of a `tools/call` result.
///
/// Order: `structuredContent`, then `{type: "json"}` content, then the first
/// `text` content parsed as JSON (kept as a string when it is not JSON).
fn extract_tool_payload(tool_name: &str, result: Value) -> Result<Value, McpClientError> {
    let parsed: ToolCallResult = serde_json::from_value(result).map_err(|err| {
        McpClientError::Json(format!("invalid tools/call payload for {tool_name}: {err}"))
    })?;
    let text_of = |item: &Value| -> Option<String> {
        (item.get("type").and_then(Value::as_str) == Some("text"))
            .then(|| item.get("text").and_then(Value::as_str).map(str::to_string))
            .flatten()
    };
    if parsed.is_error {
        let message: Vec<String> = parsed.content.iter().filter_map(text_of).collect();
        return Err(McpClientError::ToolFailed {
            tool: tool_name.to_string(),
            message: if message.is_empty() {
                "no error details".to_string()
            } else {
                message.join("\n")
            },
        });
    }
    if let Some(structured) = parsed.structured_content {
        return Ok(structured);
    }
    if let Some(json) = parsed.content.iter().find_map(|item| {
        (item.get("type").and_then(Value::as_str) == Some("json"))
            .then(|| item.get("json").cloned())
            .flatten()
    }) {
        return Ok(json);
    }
    let text = parsed.content.iter().find_map(text_of).ok_or_else(|| {
        McpClientError::Protocol(format!("tool {tool_name} returned no usable content"))
    })?;
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// HTTP/SSE JSON-RPC transport client.
struct HttpMcpClient {
    /// Reqwest client instance.
    client: Client,
    /// Base endpoint URL.
    endpoint: String,
    /// Optional bearer token.
    bearer_token: Option<String>,
    /// Session id assigned by the server.
    session_id: Option<String>,
}

impl HttpMcpClient {
    /// Builds a new HTTP/SSE transport client.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when the configuration is invalid or the HTTP
    /// client cannot be constructed.
    fn new(config: McpClientConfig) -> Result<Self, McpClientError> {
        let endpoint = config.endpoint.ok_or_else(|| {
            McpClientError::Config("endpoint is required for HTTP/SSE transport".to_string())
        })?;
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| McpClientError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            bearer_token: config.bearer_token,
            session_id: None,
        })
    }

    /// Posts a request and processes the JSON or event-stream reply.
    async fn round_trip(
        &mut self,
        payload: Vec<u8>,
        sse: bool,
        pending: &mut PendingRequest<'_, '_>,
    ) -> Result<Value, McpClientError> {
        let mut response = self.post(payload, sse).await?;
        let streamed = sse || is_event_stream(response.headers());
        if !streamed {
            let body = read_response_body_with_limit(response, MAX_MCP_RESPONSE_BYTES).await?;
            return match pending.accept(classify_message(&body)?) {
                Disposition::Complete(result) => result,
                Disposition::Reply(_) | Disposition::Continue => Err(McpClientError::Protocol(
                    format!("no response to {} in http reply", pending.method),
                )),
            };
        }
        let mut decoder = SseDecoder::new();
        let mut total: usize = 0;
        loop {
            let chunk =
                response.chunk().await.map_err(|err| McpClientError::Transport(err.to_string()))?;
            let (events, finished) = match chunk {
                Some(chunk) => {
                    total = checked_total(total, chunk.len())?;
                    (decoder.push(&chunk)?, false)
                }
                None => (decoder.finish()?.into_iter().collect(), true),
            };
            for event in events {
                match pending.accept(classify_message(&event)?) {
                    Disposition::Complete(result) => return result,
                    Disposition::Reply(reply) => {
                        let bytes = serde_json::to_vec(&reply).map_err(|err| {
                            McpClientError::Json(format!("jsonrpc serialization failed: {err}"))
                        })?;
                        self.post_one_way(bytes).await?;
                    }
                    Disposition::Continue => {}
                }
            }
            if finished {
                return Err(McpClientError::Protocol(format!(
                    "event stream ended without a response to {}",
                    pending.method
                )));
            }
        }
    }

    /// Posts a notification or reply, discarding any body.
    async fn post_one_way(&mut self, payload: Vec<u8>) -> Result<(), McpClientError> {
        let response = self.post(payload, false).await?;
        let _ = read_response_body_with_limit(response, MAX_MCP_RESPONSE_BYTES).await?;
        Ok(())
    }

    /// Posts a payload and checks the status; captures the session id.
    async fn post(&mut self, payload: Vec<u8>, sse: bool) -> Result<reqwest::Response, McpClientError> {
        let headers = self.headers(sse)?;
        let response = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .body(payload)
            .send()
            .await
            .map_err(|err| McpClientError::Transport(err.to_string()))?;
        if let Some(session) = response.headers().get(SESSION_HEADER).and_then(|v| v.to_str().ok()) {
            self.session_id = Some(session.to_string());
        }
        let status = response.status();
        if !status.is_success() {
            let body = read_response_body_with_limit(response, MAX_MCP_RESPONSE_BYTES).await?;
            let preview = String::from_utf8_lossy(&body);
            return Err(McpClientError::Transport(format!(
                "http status {}: {}",
                status.as_u16(),
                preview.trim()
            )));
        }
        Ok(response)
    }

    /// Builds request headers for the MCP transport.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when header values are invalid.
    fn headers(&self, sse: bool) -> Result<HeaderMap, McpClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let accept = if sse { "text/event-stream" } else { "application/json, text/event-stream" };
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        if let Some(token) = &self.bearer_token {
            let value = format!("Bearer {token}");
            let header = HeaderValue::from_str(&value)
                .map_err(|_| McpClientError::Config("invalid bearer token header".to_string()))?;
            headers.insert(AUTHORIZATION, header);
        }
        if let Some(session) = &self.session_id {
            let header = HeaderValue::from_str(session)
                .map_err(|_| McpClientError::Protocol("invalid session id header".to_string()))?;
            headers.insert(SESSION_HEADER, header);
        }
        Ok(headers)
    }
}

// ============================================================================
// SECTION: HTTP/SSE Helpers
// ============================================================================

/// True when the response declares an event stream.
fn is_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("text/event-stream"))
}

/// Adds a chunk length to the running total, enforcing the response limit.
fn checked_total(total: usize, chunk: usize) -> Result<usize, McpClientError> {
    let next = total.checked_add(chunk).ok_or(McpClientError::ResponseTooLarge {
        actual: usize::MAX,
        limit: MAX_MCP_RESPONSE_BYTES,
    })?;
    if next > MAX_MCP_RESPONSE_BYTES {
        return Err(McpClientError::ResponseTooLarge {
            actual: next,
            limit: MAX_MCP_RESPONSE_BYTES,
        });
    }
    Ok(next)
}

/// Reads an HTTP response body while enforcing a hard byte limit.
async fn read_response_body_with_limit(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, McpClientError> {
    let mut body = Vec::new();
    let mut total: usize = 0;
    while let Some(chunk) =
        response.chunk().await.map_err(|err| McpClientError::Transport(err.to_string()))?
    {
        let next_total =
            total.checked_add(chunk.len()).ok_or(McpClientError::ResponseTooLarge {
                actual: usize::MAX,
                limit,
            })?;
        if next_total > limit {
            return Err(McpClientError::ResponseTooLarge {
                actual: next_total,
                limit,
            });
        }
        body.extend_from_slice(&chunk);
        total = next_total;
    }
    Ok(body)
}

// ============================================================================
// SECTION: Stdio Transport
// ============================================================================

/// Stdio JSON-RPC transport client.
struct StdioMcpClient {
    /// Spawned child process handle.
    child: Child,
    /// Child stdin; `None` once closed.
    stdin: Option<ChildStdin>,
    /// Buffered child stdout.
    stdout: BufReader<ChildStdout>,
    /// Message framing.
    framing: McpFraming,
}

impl StdioMcpClient {
    /// Spawns the stdio transport process.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError`] when the process cannot be spawned or streams
    /// are unavailable.
    fn spawn(config: McpClientConfig) -> Result<Self, McpClientError> {
        let command = config
            .stdio_command
            .ok_or_else(|| McpClientError::Config("stdio command is required".to_string()))?;
        let mut cmd = Command::new(&command);
        cmd.args(&config.stdio_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        for (key, value) in &config.stdio_env {
            cmd.env(key, value);
        }
        let mut child = cmd
            .spawn()
            .map_err(|err| McpClientError::Transport(format!("spawn stdio failed: {err}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpClientError::Transport("missing child stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpClientError::Transport("missing child stdout".to_string()))?;
        tracing::debug!(command = %command, args = config.stdio_args.len(), "spawned mcp server");
        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            framing: config.framing,
        })
    }

    /// Writes one framed message.
    async fn send(&mut self, payload: &[u8]) -> Result<(), McpClientError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| McpClientError::Transport("stdio closed".to_string()))?;
        write_message(stdin, self.framing, payload).await
    }

    /// Writes a request and reads until its response arrives.
    async fn round_trip(
        &mut self,
        payload: &[u8],
        pending: &mut PendingRequest<'_, '_>,
    ) -> Result<Value, McpClientError> {
        self.send(payload).await?;
        loop {
            let bytes = read_message(&mut self.stdout, self.framing).await?;
            match pending.accept(classify_message(&bytes)?) {
                Disposition::Complete(result) => return result,
                Disposition::Reply(reply) => {
                    let bytes = serde_json::to_vec(&reply).map_err(|err| {
                        McpClientError::Json(format!("jsonrpc serialization failed: {err}"))
                    })?;
                    self.send(&bytes).await?;
                }
                Disposition::Continue => {}
            }
        }
    }

    /// Closes stdin and waits briefly for the server to exit.
    async fn close(&mut self) {
        drop(self.stdin.take());
        match tokio::time::timeout(SHUTDOWN_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => tracing::debug!(%status, "mcp server exited"),
            Ok(Err(err)) => tracing::debug!(error = %err, "mcp server wait failed"),
            Err(_) => {
                tracing::debug!("mcp server did not exit; killing");
                let _ = self.child.start_kill();
            }
        }
    }
}

impl Drop for StdioMcpClient {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
    }
}
