use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use problem_demo_server::{router, AppState};
use runtime::{AppConfig, CliArgs};
use std::path::PathBuf;

/// Problem Detail demo server - maps handler exceptions to RFC 7807 responses
#[derive(Parser)]
#[command(name = "problem-demo-server")]
#[command(about = "Problem Detail demo server - maps handler exceptions to RFC 7807 responses")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, &config.base_dir());
    tracing::info!("Problem demo server starting");

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    let state = AppState::from_config(&config.problem)?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await
        .context("server error")
}

fn check_config(config: &AppConfig) -> Result<()> {
    let state = AppState::from_config(&config.problem)?;
    println!("Configuration is valid");
    println!("  listen:         {}:{}", config.server.host, config.server.port);
    println!("  problem types:  {}", state.builder().registry().len());
    for (uri, identity) in state.builder().registry().entries() {
        println!("    {uri} -> {identity}");
    }
    Ok(())
}
