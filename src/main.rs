// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Anonmetrics command line: send one event, or inspect configuration.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use anonmetrics::backend::{build_error_payload, build_success_payload, BackendTracker};
use anonmetrics::config::{self, PartialConfig};
use anonmetrics::telemetry::{init_telemetry, TelemetryConfig};
use anonmetrics::{
    Delivery, DeliveryError, ErrorOptions, SuccessOptions, ToolErrorType, TrackedError,
};

/// Anonmetrics version string.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Anonmetrics - send anonymous tool telemetry from the shell.
#[derive(Parser)]
#[command(name = "anonmetrics")]
#[command(author, version, about = "Send anonymous tool telemetry", long_about = None)]
struct Cli {
    /// Base URL of the metrics service
    #[arg(long, global = true, env = "ANONMETRICS_BASE_URL")]
    base_url: Option<String>,

    /// Anonymous project id
    #[arg(long, global = true, env = "ANONMETRICS_PROJECT_ID")]
    project_id: Option<String>,

    /// API key for backend events
    #[arg(long, global = true, env = "ANONMETRICS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Build the event but skip delivery
    #[arg(long, global = true)]
    disabled: bool,

    /// Extra config file, applied after the workspace config
    #[arg(long = "config", global = true, value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Show debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Show trace output (full payloads)
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for anonmetrics.
#[derive(Subcommand)]
enum Commands {
    /// Report a successful tool call
    Success {
        /// Tool name
        #[arg(long)]
        tool: String,
        /// Call duration in milliseconds
        #[arg(long)]
        duration_ms: u64,
        /// Correlation id (generated when omitted)
        #[arg(long)]
        call_id: Option<String>,
        /// Call parameters as JSON
        #[arg(long)]
        parameters: Option<String>,
        /// Response size in bytes
        #[arg(long)]
        response_size: Option<u64>,
    },

    /// Report a failed tool call
    Error {
        /// Tool name
        #[arg(long)]
        tool: String,
        /// Error message
        #[arg(long)]
        message: String,
        /// Error category (validation, timeout, internal, external, rate_limit, unknown)
        #[arg(long)]
        error_type: Option<ToolErrorType>,
        /// Error code
        #[arg(long)]
        error_code: Option<String>,
        /// Call duration in milliseconds
        #[arg(long)]
        duration_ms: Option<u64>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Print the URL events are posted to
    Endpoint {
        /// Show the frontend endpoint instead of the backend one
        #[arg(long)]
        frontend: bool,
    },

    /// Show version information
    Version,
}

/// Config subcommand actions.
#[derive(Subcommand)]
enum ConfigAction {
    /// Show the merged configuration
    Show,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_telemetry(&TelemetryConfig::from_flags(cli.debug, cli.trace)) {
        eprintln!("{} failed to initialize logging: {}", "warning:".yellow(), e);
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let overrides = PartialConfig {
        base_url: cli.base_url,
        project_id: cli.project_id,
        api_key: cli.api_key,
        timeout_ms: cli.timeout_ms,
        disabled: if cli.disabled { Some(true) } else { None },
    };
    let workspace_root = std::env::current_dir()?;
    let merged = resolve_config(&workspace_root, cli.config_file.as_deref(), overrides)?;

    match cli.command {
        Commands::Success {
            tool,
            duration_ms,
            call_id,
            parameters,
            response_size,
        } => {
            let tracker = BackendTracker::new(merged.into_backend()?)?;

            let options = SuccessOptions {
                call_id,
                parameters: parameters.as_deref().map(normalize_parameters).transpose()?,
                response_size_bytes: response_size,
            };

            let payload = build_success_payload(&tool, duration_ms, options);
            let outcome = tracker.try_track_tool_call(&payload).await;
            Ok(report_outcome("tool_call", &payload.call_id, outcome))
        }
        Commands::Error {
            tool,
            message,
            error_type,
            error_code,
            duration_ms,
        } => {
            let tracker = BackendTracker::new(merged.into_backend()?)?;

            let options = ErrorOptions {
                error_type,
                error_code,
                duration_ms,
                ..ErrorOptions::default()
            };

            let payload = build_error_payload(&tool, &TrackedError::plain(message), options);
            let outcome = tracker.try_track_tool_error(&payload).await;
            Ok(report_outcome("tool_error", &payload.call_id, outcome))
        }
        Commands::Config { action } => {
            match action {
                Some(ConfigAction::Show) | None => {
                    let display = PartialConfig {
                        api_key: merged.api_key.as_deref().map(config::mask_secret),
                        ..merged
                    };
                    println!("{}", serde_json::to_string_pretty(&display)?);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Endpoint { frontend } => {
            let url = if frontend {
                merged.into_frontend()?.endpoint_url()
            } else {
                merged.into_backend()?.endpoint_url()
            };
            println!("{}", url);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Version => {
            println!("anonmetrics {}", VERSION);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Merge file, environment and flag configuration.
fn resolve_config(
    workspace_root: &std::path::Path,
    extra_file: Option<&std::path::Path>,
    overrides: PartialConfig,
) -> anyhow::Result<PartialConfig> {
    let global = config::load_global_config()?;
    let workspace = config::load_workspace_config(workspace_root)?;
    let extra = extra_file.map(config::load_config_file).transpose()?;
    let env = config::load_env_config()?;

    Ok(config::merge_config([global, workspace, extra, Some(env), Some(overrides)]))
}

/// Validate `--parameters` as JSON and re-serialize it compactly.
fn normalize_parameters(raw: &str) -> anyhow::Result<String> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| anyhow::anyhow!("--parameters is not valid JSON: {}", e))?;
    Ok(serde_json::to_string(&value)?)
}

fn report_outcome(
    event_type: &str,
    call_id: &str,
    outcome: Result<Delivery, DeliveryError>,
) -> ExitCode {
    match outcome {
        Ok(Delivery::Sent) => {
            println!("{} {} {}", "✓".green(), event_type.bright_white(), call_id.dimmed());
            ExitCode::SUCCESS
        }
        Ok(Delivery::Skipped) => {
            println!("{} {} not sent (disabled)", "-".yellow(), event_type);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {} delivery failed: {}", "✗".red(), event_type, e);
            ExitCode::FAILURE
        }
    }
}
