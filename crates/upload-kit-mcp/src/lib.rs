// crates/upload-kit-mcp/src/lib.rs
// ============================================================================
// Module: Upload Kit MCP Library
// Description: MCP client and upload tool helpers for Upload Kit.
// Purpose: Drive an MCP upload server from the command line.
// Dependencies: reqwest, serde_json, tokio
// ============================================================================

//! ## Overview
//! [`McpClient`] launches or connects to an MCP server, performs the
//! `initialize` handshake, lists tools, and calls them. Calls can request
//! progress; updates are delivered to a callback and rendered with
//! [`ProgressBar`]. [`upload_file`] wraps the server's upload tool.
//! Security posture: server output is untrusted and size-bounded.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod framing;
pub mod progress;
pub mod sse;
pub mod upload;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::Implementation;
pub use client::McpClient;
pub use client::McpClientConfig;
pub use client::McpClientError;
pub use client::McpTransport;
pub use client::ProgressHandler;
pub use client::ServerInfo;
pub use client::ToolDefinition;
pub use framing::MAX_MCP_RESPONSE_BYTES;
pub use progress::ProgressBar;
pub use progress::ProgressFrame;
pub use progress::ProgressUpdate;
pub use upload::UPLOAD_TOOL_NAME;
pub use upload::UploadRequest;
pub use upload::UploadResult;
pub use upload::upload_file;
