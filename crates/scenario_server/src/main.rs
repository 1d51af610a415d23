//! Scenario Server
//!
//! REST API server for financial scenario analytics.

use anyhow::Context;
use clap::Parser;
use scenario_server::config::{build_config, CliArgs as ConfigCliArgs, LogFormat};
use scenario_server::server::Server;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Scenario Server - REST API for what-if analysis, forecasts and narratives
#[derive(Parser, Debug)]
#[command(name = "scenario_server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE", env = "SCENARIO_CONFIG")]
    config: Option<PathBuf>,

    /// Host address to bind to
    #[arg(long, env = "SCENARIO_SERVER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SCENARIO_SERVER_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SCENARIO_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (text, json)
    #[arg(long, env = "SCENARIO_LOG_FORMAT")]
    log_format: Option<String>,

    /// Narrative provider (openai, ollama, disabled)
    #[arg(long, env = "SCENARIO_GENERATOR_PROVIDER")]
    provider: Option<String>,
}

impl From<Args> for ConfigCliArgs {
    fn from(args: Args) -> Self {
        ConfigCliArgs {
            config_file: args.config,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            log_format: args.log_format,
            provider: args.provider,
        }
    }
}

fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cli_args: ConfigCliArgs = args.into();
    let config = build_config(&cli_args).context("Failed to load configuration")?;

    // Initialize tracing
    init_tracing(config.log_level.as_filter_str(), config.log_format);

    tracing::info!("Scenario Server v{}", scenario_server::VERSION);
    tracing::info!(
        host = %config.host,
        port = %config.port,
        log_level = %config.log_level,
        log_format = %config.log_format,
        international_exposure = config.impact.international_exposure,
        generator = %config.generator.provider,
        model = %config.generator.effective_model(),
        "Server configuration loaded"
    );

    // Create and start the server
    let server = Server::new(config).context("Failed to initialise server")?;
    let addr = server.socket_addr()?;
    tracing::info!(address = %addr, "Starting server");

    server.run().await.context("Server error")?;

    Ok(())
}
