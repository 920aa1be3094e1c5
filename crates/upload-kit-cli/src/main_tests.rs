// crates/upload-kit-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and server launch resolution.
// Purpose: Ensure flags override config in the documented order.
// Dependencies: upload-kit-cli main helpers
// ============================================================================

//! ## Overview
//! Validates locale resolution, clap parsing of the command tree, and how the
//! MCP server launch command is assembled from config and flags.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use upload_kit_cli::i18n::Locale;
use upload_kit_config::DotEnv;
use upload_kit_config::McpConfig;
use upload_kit_config::McpFraming;
use upload_kit_mcp::client::McpTransport;

use super::BucketCommand;
use super::Cli;
use super::Commands;
use super::FramingArg;
use super::LangArg;
use super::McpCommand;
use super::McpServerArgs;
use super::McpToolsCommand;
use super::McpTransportArg;
use super::OutputFormat;
use super::build_client_config;
use super::resolve_locale;
use super::resolve_upload_root;
use super::upload_request;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn mcp_config() -> McpConfig {
    McpConfig {
        command: "python".to_string(),
        args: vec!["mcp_s3.py".to_string()],
        timeout_ms: 9_000,
        ..McpConfig::default()
    }
}

// ============================================================================
// SECTION: Locale
// ============================================================================

#[test]
fn lang_flag_wins_over_environment() {
    let locale = resolve_locale(Some(LangArg::En), Some("ca_ES.UTF-8")).unwrap();
    assert_eq!(locale, Locale::En);
}

#[test]
fn environment_locale_is_parsed_with_region_tags() {
    assert_eq!(resolve_locale(None, Some("ca_ES.UTF-8")).unwrap(), Locale::Ca);
    assert_eq!(resolve_locale(None, None).unwrap(), Locale::En);
}

#[test]
fn unsupported_environment_locale_is_rejected() {
    let err = resolve_locale(None, Some("de")).unwrap_err();
    assert!(err.to_string().contains("UPLOAD_KIT_LANG"));
    assert!(err.to_string().contains("de"));
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn parses_bucket_setup_with_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "upload-kit",
        "bucket",
        "setup",
        "--format",
        "json",
        "-vv",
        "--env-file",
        "prod.env",
    ])
    .unwrap();
    assert_eq!(cli.format, OutputFormat::Json);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.env_file, Some(PathBuf::from("prod.env")));
    assert!(matches!(
        cli.command,
        Some(Commands::Bucket {
            command: BucketCommand::Setup
        })
    ));
}

#[test]
fn parses_repeated_server_args_including_hyphenated_values() {
    let cli = Cli::try_parse_from([
        "upload-kit",
        "mcp",
        "smoke",
        "--server-command",
        "uv",
        "--server-arg",
        "run",
        "--server-arg",
        "--quiet",
        "--framing",
        "content-length",
        "--timeout-ms",
        "500",
    ])
    .unwrap();
    let Some(Commands::Mcp {
        command: McpCommand::Smoke(args),
    }) = cli.command
    else {
        panic!("expected mcp smoke");
    };
    assert_eq!(args.server_command.as_deref(), Some("uv"));
    assert_eq!(args.server_arg, vec!["run".to_string(), "--quiet".to_string()]);
    assert_eq!(args.framing, Some(FramingArg::ContentLength));
    assert_eq!(args.timeout_ms, Some(500));
}

#[test]
fn parses_tools_call_with_default_arguments() {
    let cli = Cli::try_parse_from(["upload-kit", "mcp", "tools", "call", "--tool", "upload_file"])
        .unwrap();
    let Some(Commands::Mcp {
        command:
            McpCommand::Tools {
                command: McpToolsCommand::Call(call),
            },
    }) = cli.command
    else {
        panic!("expected mcp tools call");
    };
    assert_eq!(call.tool, "upload_file");
    assert_eq!(call.json, "{}");
    assert_eq!(call.server.transport, McpTransportArg::Stdio);
}

#[test]
fn tools_call_requires_a_tool_name() {
    assert!(Cli::try_parse_from(["upload-kit", "mcp", "tools", "call"]).is_err());
}

#[test]
fn no_subcommand_is_accepted_for_help_and_version() {
    let cli = Cli::try_parse_from(["upload-kit", "--version"]).unwrap();
    assert!(cli.show_version);
    assert!(cli.command.is_none());
}

// ============================================================================
// SECTION: Server Launch
// ============================================================================

#[test]
fn stdio_launch_appends_root_and_passes_dotenv_pairs() {
    let dotenv = DotEnv::from_pairs([("S3_BUCKET_NAME", "mcp-uploads-1a2b3c4d")]);
    let config = build_client_config(
        &mcp_config(),
        &McpServerArgs::default(),
        Path::new("/srv/uploads"),
        &dotenv,
    )
    .unwrap();
    assert_eq!(config.transport, McpTransport::Stdio);
    assert_eq!(config.stdio_command.as_deref(), Some("python"));
    assert_eq!(config.stdio_args, vec!["mcp_s3.py", "--root", "/srv/uploads"]);
    assert_eq!(
        config.stdio_env,
        vec![("S3_BUCKET_NAME".to_string(), "mcp-uploads-1a2b3c4d".to_string())]
    );
    assert_eq!(config.framing, McpFraming::Newline);
    assert_eq!(config.timeout, Duration::from_millis(9_000));
}

#[test]
fn flags_replace_command_args_framing_and_timeout() {
    let args = McpServerArgs {
        server_command: Some("sh".to_string()),
        server_arg: vec!["server.sh".to_string()],
        framing: Some(FramingArg::ContentLength),
        timeout_ms: Some(250),
        ..McpServerArgs::default()
    };
    let config =
        build_client_config(&mcp_config(), &args, Path::new("/tmp/u"), &DotEnv::default())
            .unwrap();
    assert_eq!(config.stdio_command.as_deref(), Some("sh"));
    assert_eq!(config.stdio_args, vec!["server.sh", "--root", "/tmp/u"]);
    assert_eq!(config.framing, McpFraming::ContentLength);
    assert_eq!(config.timeout, Duration::from_millis(250));
    assert!(config.stdio_env.is_empty());
}

#[test]
fn http_transport_requires_endpoint() {
    let args = McpServerArgs {
        transport: McpTransportArg::Http,
        ..McpServerArgs::default()
    };
    let err = build_client_config(&mcp_config(), &args, Path::new("/tmp/u"), &DotEnv::default())
        .unwrap_err();
    assert!(err.to_string().contains("--endpoint"));

    let args = McpServerArgs {
        transport: McpTransportArg::Sse,
        endpoint: Some("http://127.0.0.1:8000/mcp".to_string()),
        ..McpServerArgs::default()
    };
    let config =
        build_client_config(&mcp_config(), &args, Path::new("/tmp/u"), &DotEnv::default())
            .unwrap();
    assert_eq!(config.transport, McpTransport::Sse);
    assert_eq!(config.endpoint.as_deref(), Some("http://127.0.0.1:8000/mcp"));
    assert!(config.stdio_command.is_none());
}

#[test]
fn bearer_token_flag_reaches_http_config() {
    let cli = Cli::try_parse_from([
        "upload-kit",
        "mcp",
        "tools",
        "list",
        "--transport",
        "http",
        "--endpoint",
        "http://127.0.0.1:8000/mcp",
        "--bearer-token",
        "upload-token",
    ])
    .unwrap();
    let Some(Commands::Mcp {
        command:
            McpCommand::Tools {
                command: McpToolsCommand::List(args),
            },
    }) = cli.command
    else {
        panic!("expected mcp tools list");
    };
    let config =
        build_client_config(&mcp_config(), &args, Path::new("/tmp/u"), &DotEnv::default())
            .unwrap();
    assert_eq!(config.transport, McpTransport::Http);
    assert_eq!(config.bearer_token.as_deref(), Some("upload-token"));
}

#[test]
fn stdio_launch_ignores_bearer_token() {
    let args = McpServerArgs {
        bearer_token: Some("upload-token".to_string()),
        ..McpServerArgs::default()
    };
    let config =
        build_client_config(&mcp_config(), &args, Path::new("/tmp/u"), &DotEnv::default())
            .unwrap();
    assert!(config.bearer_token.is_none());
}

#[test]
fn upload_root_flag_wins_over_config() {
    let config = McpConfig {
        upload_root: "~/mcp-uploads".to_string(),
        ..McpConfig::default()
    };
    let home = Path::new("/home/operator");
    let from_config = resolve_upload_root(&config, &McpServerArgs::default(), Some(home));
    assert_eq!(from_config, PathBuf::from("/home/operator/mcp-uploads"));

    let args = McpServerArgs {
        upload_root: Some(PathBuf::from("/data/in")),
        ..McpServerArgs::default()
    };
    assert_eq!(resolve_upload_root(&config, &args, Some(home)), PathBuf::from("/data/in"));
}

#[test]
fn upload_request_uses_configured_expiry() {
    let config = McpConfig {
        expires_in: 600,
        ..McpConfig::default()
    };
    let request = upload_request(&config, "test-upload.txt");
    assert_eq!(request.local_path, "test-upload.txt");
    assert_eq!(request.expires_in, 600);
}
