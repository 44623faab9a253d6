//! Squid agent CLI and REST API entry point.
//!
//! Binary name: `squid`
//!
//! Parses CLI arguments, initializes tracing, the database and services,
//! then dispatches to the appropriate command handler or starts the REST API
//! server.

mod cli;
mod http;
mod state;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;
use tracing::{info, warn};

use cli::{Cli, Commands};
use squid_infra::config::{load_settings, resolve_data_dir};
use squid_observe::{LogFormat, init_tracing, shutdown_tracing};
use squid_types::config::AgentSettings;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "squid", &mut std::io::stdout());
        return Ok(());
    }

    let serving = matches!(cli.command, Commands::Serve { .. });
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 if serving => "info",
        0 => "warn",
        1 => "info,squid=debug",
        _ => "trace",
    };

    let data_dir = resolve_data_dir();
    tokio::fs::create_dir_all(&data_dir)
        .await
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
    let settings = load_settings(&data_dir).await;

    let format = settings.log_format.parse::<LogFormat>().unwrap_or_default();
    init_tracing(filter, format, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli, data_dir, settings).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli, data_dir: PathBuf, settings: AgentSettings) -> anyhow::Result<()> {
    let state = AppState::init(data_dir, settings).await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let port = port.unwrap_or(state.settings.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            info!(
                agent = %state.settings.agent_name,
                %addr,
                "Squid agent listening"
            );
            if !cli.quiet {
                println!(
                    "  {} {} listening on {}",
                    console::style("🦑").bold(),
                    console::style(&state.settings.agent_name).cyan().bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            info!("Server stopped");
        }

        Commands::Chat { message, channel } => {
            cli::chat::send(&state, &channel, &message, cli.json).await?;
        }

        Commands::Memory { action } => {
            cli::memory::handle_memory_command(action, &state, cli.json).await?;
        }

        Commands::Kv { action } => {
            cli::kv::handle_kv_command(action, &state, cli.json).await?;
        }

        Commands::Scan { action } => {
            cli::scan::handle_scan_command(action, &state, cli.json).await?;
        }

        Commands::Skill { action } => {
            cli::skill::handle_skill_command(action, &state, cli.json).await?;
        }

        Commands::Usage => {
            cli::usage::usage(&state, cli.json).await?;
        }

        Commands::Status => {
            cli::status::status(&state, cli.json).await?;
        }

        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
///
/// If a handler cannot be installed, that signal is ignored and the other
/// still stops the server.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
