// crates/upload-kit-cli/src/main.rs
// ============================================================================
// Module: Upload Kit CLI Entry Point
// Description: Command dispatcher for bucket setup, connection checks, and MCP tests.
// Purpose: Provide a localized operator CLI around the upload server's storage.
// Dependencies: clap, serde_json, serde_jcs, thiserror, tokio, upload-kit-*
// ============================================================================

//! ## Overview
//! `upload-kit` bundles the operator chores around an MCP file-upload server:
//! provisioning a hardened bucket, checking credentials against an existing
//! bucket, and driving the server's `upload_file` tool end to end. All
//! user-facing strings are routed through the i18n catalog; diagnostics go to
//! stderr through `tracing`. Every failure path exits with status 1.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde_json::Value;
use thiserror::Error;
use upload_kit_cli::fixture::PROGRESS_TEST_FILE;
use upload_kit_cli::fixture::SMOKE_TEST_FILE;
use upload_kit_cli::fixture::TestFileGuard;
use upload_kit_cli::fixture::TestFileSpec;
use upload_kit_cli::i18n::Locale;
use upload_kit_cli::i18n::set_locale;
use upload_kit_cli::logging;
use upload_kit_cli::report;
use upload_kit_cli::t;
use upload_kit_config::DotEnv;
use upload_kit_config::EnvError;
use upload_kit_config::EnvLayer;
use upload_kit_config::McpConfig;
use upload_kit_config::McpFraming;
use upload_kit_config::UploadEnv;
use upload_kit_config::UploadKitConfig;
use upload_kit_config::env::BUCKET_VAR;
use upload_kit_config::env::DEFAULT_REGION;
use upload_kit_mcp::client::McpClient;
use upload_kit_mcp::client::McpClientConfig;
use upload_kit_mcp::client::McpTransport;
use upload_kit_mcp::client::ToolDefinition;
use upload_kit_mcp::progress::ProgressBar;
use upload_kit_mcp::progress::ProgressUpdate;
use upload_kit_mcp::upload::UploadRequest;
use upload_kit_mcp::upload::UploadResult;
use upload_kit_mcp::upload::group_thousands;
use upload_kit_mcp::upload::upload_file;
use upload_kit_storage::AccessProbe;
use upload_kit_storage::BucketProvisioner;
use upload_kit_storage::ConnectionCheck;
use upload_kit_storage::ObjectStorage;
use upload_kit_storage::S3Storage;
use upload_kit_storage::StorageSettings;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable selecting the output language.
const LANG_ENV: &str = "UPLOAD_KIT_LANG";
/// Upload root flag passed to the server after its own arguments.
const ROOT_FLAG: &str = "--root";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Upload Kit command-line interface.
#[derive(Parser, Debug)]
#[command(name = "upload-kit", disable_version_flag = true, about = "Upload server operator tools")]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `UPLOAD_KIT_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Tool config file (defaults to upload-kit.toml or `UPLOAD_KIT_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Dotenv file with storage credentials (defaults to the config's `mcp.env_file`).
    #[arg(long, value_name = "PATH", global = true)]
    env_file: Option<PathBuf>,
    /// Increase diagnostic verbosity on stderr (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Output format for command reports.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Bucket provisioning.
    Bucket {
        /// Selected bucket subcommand.
        #[command(subcommand)]
        command: BucketCommand,
    },
    /// Credential and connectivity checks.
    Check {
        /// Selected check subcommand.
        #[command(subcommand)]
        command: CheckCommand,
    },
    /// MCP upload server exercises.
    Mcp {
        /// Selected MCP subcommand.
        #[command(subcommand)]
        command: McpCommand,
    },
}

/// Bucket subcommands.
#[derive(Subcommand, Debug)]
enum BucketCommand {
    /// Create and harden a new upload bucket.
    Setup,
}

/// Check subcommands.
#[derive(Subcommand, Debug)]
enum CheckCommand {
    /// Run the seven-step connection check against `S3_BUCKET_NAME`.
    Connection,
}

/// MCP subcommands.
#[derive(Subcommand, Debug)]
enum McpCommand {
    /// Upload a small test file through the server.
    Smoke(McpServerArgs),
    /// Upload a larger test file and render progress notifications.
    Progress(McpServerArgs),
    /// Tool discovery and generic invocation.
    Tools {
        /// Selected tools subcommand.
        #[command(subcommand)]
        command: McpToolsCommand,
    },
}

/// MCP tools subcommands.
#[derive(Subcommand, Debug)]
enum McpToolsCommand {
    /// List the server's tools.
    List(McpServerArgs),
    /// Call a tool with raw JSON arguments.
    Call(McpToolCallCommand),
}

/// Server launch overrides shared by the MCP commands.
#[derive(Args, Debug, Default, Clone)]
struct McpServerArgs {
    /// MCP transport to use.
    #[arg(long, value_enum, default_value_t = McpTransportArg::Stdio)]
    transport: McpTransportArg,
    /// MCP HTTP/SSE endpoint URL (for http and sse transports).
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,
    /// Bearer token sent as `Authorization` (for http and sse transports).
    #[arg(long, value_name = "TOKEN")]
    bearer_token: Option<String>,
    /// Server command to spawn (overrides `mcp.command`).
    #[arg(long, value_name = "COMMAND")]
    server_command: Option<String>,
    /// Server argument (repeatable; replaces `mcp.args`).
    #[arg(long, value_name = "ARG", action = ArgAction::Append, allow_hyphen_values = true)]
    server_arg: Vec<String>,
    /// Upload root directory (overrides `mcp.upload_root`).
    #[arg(long, value_name = "DIR")]
    upload_root: Option<PathBuf>,
    /// Stdio framing (overrides `mcp.framing`).
    #[arg(long, value_enum, value_name = "FRAMING")]
    framing: Option<FramingArg>,
    /// Request timeout in milliseconds (overrides `mcp.timeout_ms`).
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
}

/// Arguments for `mcp tools call`.
#[derive(Args, Debug)]
struct McpToolCallCommand {
    /// Server launch settings.
    #[command(flatten)]
    server: McpServerArgs,
    /// Tool name to invoke.
    #[arg(long, value_name = "NAME")]
    tool: String,
    /// Tool arguments as a JSON object.
    #[arg(long, value_name = "JSON", default_value = "{}")]
    json: String,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

/// Report output formats.
#[derive(ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Canonical JSON.
    Json,
}

/// MCP transport selections.
#[derive(ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
enum McpTransportArg {
    /// Spawn the server and talk over stdin/stdout.
    #[default]
    Stdio,
    /// HTTP JSON-RPC.
    Http,
    /// HTTP with event-stream responses.
    Sse,
}

/// Stdio framing selections.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum FramingArg {
    /// One JSON message per line.
    Newline,
    /// `Content-Length` headers.
    ContentLength,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    logging::init(cli.verbose)
        .map_err(|err| CliError::new(t!("logging.init_failed", error = err)))?;
    let context = CommandContext::load(cli.config.as_deref(), cli.env_file.as_deref(), cli.format)?;

    match command {
        Commands::Bucket {
            command: BucketCommand::Setup,
        } => command_bucket_setup(&context).await,
        Commands::Check {
            command: CheckCommand::Connection,
        } => command_check_connection(&context).await,
        Commands::Mcp {
            command,
        } => command_mcp(&context, command).await,
    }
}

/// Prints clap help to stdout.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Command Context
// ============================================================================

/// Configuration and environment shared by every command.
struct CommandContext {
    /// Tool configuration.
    config: UploadKitConfig,
    /// Dotenv file in use (for messages).
    env_file: PathBuf,
    /// Process environment layered over the dotenv file.
    env: EnvLayer,
    /// Selected output format.
    format: OutputFormat,
}

impl CommandContext {
    /// Loads config, then the dotenv file it (or `--env-file`) names.
    fn load(
        config_path: Option<&Path>,
        env_file: Option<&Path>,
        format: OutputFormat,
    ) -> CliResult<Self> {
        let config = UploadKitConfig::load(config_path)
            .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
        let env_file =
            env_file.map_or_else(|| PathBuf::from(&config.mcp.env_file), Path::to_path_buf);
        let dotenv = DotEnv::load(&env_file).map_err(|err| {
            CliError::new(t!("env.load_failed", path = env_file.display(), error = err))
        })?;
        Ok(Self {
            config,
            env_file,
            env: EnvLayer::from_process(dotenv),
            format,
        })
    }

    /// Returns the dotenv file name for messages.
    fn env_file_label(&self) -> String {
        self.env_file.display().to_string()
    }

    /// Writes rendered lines unless JSON output was requested.
    fn emit_lines(&self, lines: &[String]) -> CliResult<()> {
        if self.format == OutputFormat::Json {
            return Ok(());
        }
        for line in lines {
            write_stdout_line(line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Bucket Setup
// ============================================================================

/// Executes `bucket setup`.
async fn command_bucket_setup(context: &CommandContext) -> CliResult<ExitCode> {
    let settings = StorageSettings::from_layer(&context.config.storage, &context.env);
    let storage: Arc<dyn ObjectStorage> =
        Arc::new(S3Storage::connect(settings, &context.config.provision.default_region).await);
    let outcome = match BucketProvisioner::from_config(storage, &context.config) {
        Ok(provisioner) => provisioner.provision().await,
        Err(err) => Err(err),
    };
    if context.format == OutputFormat::Json {
        let value = match &outcome {
            Ok(report) => serde_json::json!({ "ok": true, "report": report }),
            Err(err) => serde_json::json!({ "ok": false, "error": err.to_string() }),
        };
        write_json_value(&value)?;
    } else {
        context.emit_lines(&report::provision_lines(&outcome, &context.config))?;
    }
    Ok(if outcome.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

// ============================================================================
// SECTION: Connection Check
// ============================================================================

/// Executes `check connection`.
async fn command_check_connection(context: &CommandContext) -> CliResult<ExitCode> {
    let env_file = context.env_file_label();
    context.emit_lines(&report::check_banner_lines(&env_file))?;
    let upload_env = match UploadEnv::resolve(&context.env) {
        Ok(upload_env) => upload_env,
        Err(EnvError::Missing(missing)) => {
            if context.format == OutputFormat::Json {
                write_json_value(&serde_json::json!({ "ok": false, "missing": missing }))?;
            }
            context.emit_lines(&report::missing_env_lines(&missing, &env_file))?;
            context.emit_lines(&report::check_outcome_lines(false, &env_file))?;
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => {
            return Err(CliError::new(t!(
                "env.load_failed",
                path = env_file,
                error = err
            )));
        }
    };

    let settings = StorageSettings::from_env(&context.config.storage, &upload_env);
    let storage: Arc<dyn ObjectStorage> =
        Arc::new(S3Storage::connect(settings, DEFAULT_REGION).await);
    let probe = AccessProbe::for_connection(&context.config.probe);
    let check = ConnectionCheck::new(storage, upload_env.bucket_name.clone(), probe);
    let connection = check.run().await;
    let passed = connection.passed();

    if context.format == OutputFormat::Json {
        write_json_value(&serde_json::json!({ "ok": passed, "report": connection }))?;
    }
    context.emit_lines(&report::connection_lines(&connection, &context.config.mcp.launch_hint))?;
    context.emit_lines(&report::check_outcome_lines(passed, &env_file))?;
    Ok(if passed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

// ============================================================================
// SECTION: MCP Commands
// ============================================================================

/// Dispatches MCP subcommands.
async fn command_mcp(context: &CommandContext, command: McpCommand) -> CliResult<ExitCode> {
    match command {
        McpCommand::Smoke(args) => command_mcp_smoke(context, &args).await,
        McpCommand::Progress(args) => command_mcp_progress(context, &args).await,
        McpCommand::Tools {
            command,
        } => match command {
            McpToolsCommand::List(args) => command_mcp_tools_list(context, &args).await,
            McpToolsCommand::Call(command) => command_mcp_tools_call(context, command).await,
        },
    }
}

/// Executes `mcp smoke`.
async fn command_mcp_smoke(context: &CommandContext, args: &McpServerArgs) -> CliResult<ExitCode> {
    context.emit_lines(&[t!("mcp.smoke.banner")])?;
    let Some(bucket) = require_bucket(context)? else {
        return Ok(ExitCode::FAILURE);
    };
    let upload_root = resolve_upload_root(&context.config.mcp, args, home_dir().as_deref());
    let Some(guard) = create_test_file(context, &upload_root, &SMOKE_TEST_FILE)? else {
        return Ok(ExitCode::FAILURE);
    };
    context.emit_lines(&[t!("mcp.file.created", path = guard.path().display())])?;

    let outcome = run_smoke(context, args, &upload_root).await;
    let code = match outcome {
        Ok((tools, result)) => {
            if context.format == OutputFormat::Json {
                write_json_value(&serde_json::json!({
                    "ok": true,
                    "bucket": bucket,
                    "tools": tools,
                    "result": result,
                }))?;
            }
            context.emit_lines(&report::smoke_result_lines(&result, &bucket))?;
            ExitCode::SUCCESS
        }
        Err(message) => {
            if context.format == OutputFormat::Json {
                write_json_value(&serde_json::json!({ "ok": false, "error": message }))?;
            }
            context.emit_lines(&[t!("mcp.failed", error = message)])?;
            ExitCode::FAILURE
        }
    };
    finish_test_file(context, guard, t!("mcp.file.cleaned"))?;
    Ok(code)
}

/// Connects, lists tools, and uploads the smoke test file.
async fn run_smoke(
    context: &CommandContext,
    args: &McpServerArgs,
    upload_root: &Path,
) -> Result<(Vec<ToolDefinition>, UploadResult), String> {
    context.emit_lines(&[t!("mcp.connecting")]).map_err(|err| err.to_string())?;
    let mut client = connect_server(context, args, upload_root).await?;
    let outcome = smoke_session(context, &mut client).await;
    client.shutdown().await;
    outcome
}

/// Lists tools and uploads the smoke test file on a connected client.
async fn smoke_session(
    context: &CommandContext,
    client: &mut McpClient,
) -> Result<(Vec<ToolDefinition>, UploadResult), String> {
    let tools = client.list_tools().await.map_err(|err| err.to_string())?;
    context.emit_lines(&report::tool_lines(&tools)).map_err(|err| err.to_string())?;
    context
        .emit_lines(&[String::new(), t!("mcp.upload.start")])
        .map_err(|err| err.to_string())?;
    let request = upload_request(&context.config.mcp, SMOKE_TEST_FILE.file_name);
    let result = upload_file(client, &context.config.mcp.upload_tool, &request, None)
        .await
        .map_err(|err| err.to_string())?;
    Ok((tools, result))
}

/// Executes `mcp progress`.
async fn command_mcp_progress(
    context: &CommandContext,
    args: &McpServerArgs,
) -> CliResult<ExitCode> {
    let Some(bucket) = require_bucket(context)? else {
        return Ok(ExitCode::FAILURE);
    };
    let upload_root = resolve_upload_root(&context.config.mcp, args, home_dir().as_deref());
    context.emit_lines(&[t!("mcp.file.creating")])?;
    let Some(guard) = create_test_file(context, &upload_root, &PROGRESS_TEST_FILE)? else {
        return Ok(ExitCode::FAILURE);
    };
    let size = group_thousands(guard.size());
    context.emit_lines(&[t!("mcp.file.created_size", size = size)])?;

    let outcome = run_progress(context, args, &upload_root).await;
    let code = match outcome {
        Ok(result) => {
            if context.format == OutputFormat::Json {
                write_json_value(&serde_json::json!({
                    "ok": true,
                    "bucket": bucket,
                    "result": result,
                }))?;
            }
            context.emit_lines(&report::progress_result_lines(&result, &bucket))?;
            ExitCode::SUCCESS
        }
        Err(message) => {
            if context.format == OutputFormat::Json {
                write_json_value(&serde_json::json!({ "ok": false, "error": message }))?;
            }
            context.emit_lines(&[String::new(), t!("mcp.failed", error = message)])?;
            ExitCode::FAILURE
        }
    };
    finish_test_file(context, guard, t!("mcp.progress.cleaned"))?;
    Ok(code)
}

/// Connects and uploads the progress test file, rendering each update in place.
async fn run_progress(
    context: &CommandContext,
    args: &McpServerArgs,
    upload_root: &Path,
) -> Result<UploadResult, String> {
    let mut client = connect_server(context, args, upload_root).await?;
    let outcome = progress_session(context, &mut client).await;
    client.shutdown().await;
    outcome
}

/// Uploads the progress test file on a connected client.
async fn progress_session(
    context: &CommandContext,
    client: &mut McpClient,
) -> Result<UploadResult, String> {
    context.emit_lines(&[t!("mcp.progress.start")]).map_err(|err| err.to_string())?;
    let text_output = context.format == OutputFormat::Text;
    let bar = ProgressBar::default();
    let mut on_progress = |update: ProgressUpdate| {
        if text_output {
            let line = report::progress_line(&update, bar);
            if let Err(err) = write_stdout_inline(&format!("\r{line}")) {
                tracing::debug!(error = %err, "progress frame not written");
            }
        }
    };
    let request = upload_request(&context.config.mcp, PROGRESS_TEST_FILE.file_name);
    upload_file(client, &context.config.mcp.upload_tool, &request, Some(&mut on_progress))
        .await
        .map_err(|err| err.to_string())
}

/// Executes `mcp tools list`.
async fn command_mcp_tools_list(
    context: &CommandContext,
    args: &McpServerArgs,
) -> CliResult<ExitCode> {
    let upload_root = resolve_upload_root(&context.config.mcp, args, home_dir().as_deref());
    let mut client = connect_server(context, args, &upload_root)
        .await
        .map_err(|err| CliError::new(t!("mcp.client.failed", error = err)))?;
    let tools = client.list_tools().await;
    client.shutdown().await;
    let tools = tools.map_err(|err| CliError::new(t!("mcp.client.failed", error = err)))?;
    if context.format == OutputFormat::Json {
        write_json_value(&serde_json::json!({ "tools": tools }))?;
    } else {
        context.emit_lines(&report::tool_lines(&tools))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `mcp tools call`.
async fn command_mcp_tools_call(
    context: &CommandContext,
    command: McpToolCallCommand,
) -> CliResult<ExitCode> {
    let arguments: Value = serde_json::from_str(&command.json)
        .map_err(|err| CliError::new(t!("mcp.client.input_parse_failed", error = err)))?;
    let upload_root =
        resolve_upload_root(&context.config.mcp, &command.server, home_dir().as_deref());
    let mut client = connect_server(context, &command.server, &upload_root)
        .await
        .map_err(|err| CliError::new(t!("mcp.client.failed", error = err)))?;
    let result = client.call_tool(&command.tool, arguments).await;
    client.shutdown().await;
    let result = result.map_err(|err| CliError::new(t!("mcp.client.failed", error = err)))?;
    write_json_value(&result)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: MCP Helpers
// ============================================================================

/// Resolves the bucket name, printing the missing-variable message when unset.
fn require_bucket(context: &CommandContext) -> CliResult<Option<String>> {
    match context.env.bucket_name() {
        Ok(bucket) => Ok(Some(bucket)),
        Err(_) => {
            let message =
                t!("mcp.bucket_missing", var = BUCKET_VAR, env_file = context.env_file_label());
            if context.format == OutputFormat::Json {
                write_json_value(&serde_json::json!({ "ok": false, "error": message }))?;
            } else {
                context.emit_lines(&[message])?;
            }
            Ok(None)
        }
    }
}

/// Writes a test file, reporting a failure instead of propagating it.
fn create_test_file(
    context: &CommandContext,
    upload_root: &Path,
    spec: &TestFileSpec,
) -> CliResult<Option<TestFileGuard>> {
    match TestFileGuard::create(upload_root, spec) {
        Ok(guard) => Ok(Some(guard)),
        Err(err) => {
            let path = upload_root.join(spec.file_name);
            let message = t!("mcp.file.create_failed", path = path.display(), error = err);
            if context.format == OutputFormat::Json {
                write_json_value(&serde_json::json!({ "ok": false, "error": message }))?;
            } else {
                context.emit_lines(&[message])?;
            }
            Ok(None)
        }
    }
}

/// Removes the test file and reports the cleanup.
fn finish_test_file(
    context: &CommandContext,
    guard: TestFileGuard,
    cleaned: String,
) -> CliResult<()> {
    let path = guard.path().display().to_string();
    match guard.remove() {
        Ok(true) => context.emit_lines(&[cleaned]),
        Ok(false) => Ok(()),
        Err(err) => {
            context.emit_lines(&[t!("mcp.file.cleanup_failed", path = path, error = err)])
        }
    }
}

/// Connects to the server named by config and flags.
async fn connect_server(
    context: &CommandContext,
    args: &McpServerArgs,
    upload_root: &Path,
) -> Result<McpClient, String> {
    let config = build_client_config(&context.config.mcp, args, upload_root, context.env.dotenv())
        .map_err(|err| err.to_string())?;
    let target = config.stdio_command.as_deref().or(config.endpoint.as_deref()).unwrap_or_default();
    tracing::info!(target_name = target, "connecting to mcp server");
    let client = McpClient::connect(config).await.map_err(|err| err.to_string())?;
    if let Some(info) = client.server_info() {
        tracing::info!(
            protocol = %info.protocol_version,
            server = info.implementation.as_ref().map_or("unknown", |imp| imp.name.as_str()),
            "mcp server ready"
        );
    }
    Ok(client)
}

/// Resolves the upload root from flags or config.
fn resolve_upload_root(config: &McpConfig, args: &McpServerArgs, home: Option<&Path>) -> PathBuf {
    args.upload_root.clone().unwrap_or_else(|| config.upload_root_with_home(home))
}

/// Builds the client configuration for the selected transport.
///
/// Stdio servers run as `<command> <args...> --root <upload_root>` with the
/// dotenv pairs added to the inherited environment.
fn build_client_config(
    config: &McpConfig,
    args: &McpServerArgs,
    upload_root: &Path,
    dotenv: &DotEnv,
) -> CliResult<McpClientConfig> {
    let timeout = args.timeout_ms.map_or_else(|| config.timeout(), Duration::from_millis);
    let transport = match args.transport {
        McpTransportArg::Stdio => McpTransport::Stdio,
        McpTransportArg::Http => McpTransport::Http,
        McpTransportArg::Sse => McpTransport::Sse,
    };
    if transport != McpTransport::Stdio {
        let endpoint = args.endpoint.clone().ok_or_else(|| {
            CliError::new(t!("mcp.client.failed", error = "--endpoint is required for http/sse"))
        })?;
        let mut client = McpClientConfig::http(transport, endpoint, timeout);
        client.bearer_token.clone_from(&args.bearer_token);
        return Ok(client);
    }
    let command = args.server_command.clone().unwrap_or_else(|| config.command.clone());
    let mut server_args =
        if args.server_arg.is_empty() { config.args.clone() } else { args.server_arg.clone() };
    server_args.push(ROOT_FLAG.to_string());
    server_args.push(upload_root.display().to_string());
    let framing = args.framing.map_or(config.framing, McpFraming::from);
    Ok(McpClientConfig::stdio(command, server_args, dotenv.pairs().to_vec(), framing, timeout))
}

/// Builds the upload tool arguments for a file in the upload root.
fn upload_request(config: &McpConfig, file_name: &str) -> UploadRequest {
    UploadRequest {
        local_path: file_name.to_string(),
        expires_in: config.expires_in,
    }
}

/// Returns the home directory used for `~` expansion.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

impl From<FramingArg> for McpFraming {
    fn from(value: FramingArg) -> Self {
        match value {
            FramingArg::Newline => Self::Newline,
            FramingArg::ContentLength => Self::ContentLength,
        }
    }
}

// ============================================================================
// SECTION: Locale Helpers
// ============================================================================

/// Resolves the CLI locale from flags or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

/// Converts CLI language selections into locales.
impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes text to stdout without a newline and flushes it.
fn write_stdout_inline(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(&mut stdout, "{message}")?;
    stdout.flush()
}

/// Writes a canonical JSON value to stdout.
fn write_json_value(value: &Value) -> CliResult<()> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    bytes.push(b'\n');
    let mut stdout = std::io::stdout();
    stdout.write_all(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
