//! pomotimer - A session/break interval timer
//!
//! The timer alternates between two phases:
//! - A work session (25 minutes by default, 1-60)
//! - A break (5 minutes by default, 1-30)
//!
//! A background daemon keeps time; every other subcommand talks to it.

use anyhow::Result;
use clap::{CommandFactory, Parser};

use pomotimer::cli::{Cli, Commands, DaemonArgs, Display, IpcClient};
use pomotimer::daemon;
use pomotimer::types::{default_socket_path, DaemonConfig, EngineConfig, Phase};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let command = match cli.command {
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
            return Ok(());
        }
        Some(command) => command,
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
            return Ok(());
        }
    };

    let socket_path = match cli.socket {
        Some(path) => path,
        None => default_socket_path()?,
    };
    tracing::info!(socket = ?socket_path, "Using daemon socket");

    match command {
        Commands::Toggle => {
            let client = IpcClient::with_socket_path(socket_path);
            let response = client.toggle().await?;
            Display::show_toggle_success(&response);
        }
        Commands::Reset => {
            let client = IpcClient::with_socket_path(socket_path);
            let response = client.reset().await?;
            Display::show_reset_success(&response);
        }
        Commands::Increase(args) => {
            let client = IpcClient::with_socket_path(socket_path);
            adjust_length(&client, args.phase.into(), 1).await?;
        }
        Commands::Decrease(args) => {
            let client = IpcClient::with_socket_path(socket_path);
            adjust_length(&client, args.phase.into(), -1).await?;
        }
        Commands::Adjust(args) => {
            let client = IpcClient::with_socket_path(socket_path);
            adjust_length(&client, args.phase.into(), args.delta).await?;
        }
        Commands::Dismiss => {
            let client = IpcClient::with_socket_path(socket_path);
            let response = client.dismiss().await?;
            Display::show_dismiss_success(&response);
        }
        Commands::Status => {
            let client = IpcClient::with_socket_path(socket_path);
            let response = client.status().await?;
            Display::show_status(&response);
        }
        Commands::Daemon(args) => {
            daemon::run(daemon_config(socket_path, &args)).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Changes a phase length, refusing while the countdown is live.
async fn adjust_length(client: &IpcClient, phase: Phase, delta: i32) -> Result<()> {
    let status = client.status().await?;
    if status.data.as_ref().is_some_and(|data| data.running) {
        anyhow::bail!("Cannot change lengths while the timer is running. Pause it first");
    }

    let response = client.adjust(phase, delta).await?;
    Display::show_adjust_success(&response);
    Ok(())
}

/// Builds the daemon configuration from CLI arguments.
fn daemon_config(socket_path: std::path::PathBuf, args: &DaemonArgs) -> DaemonConfig {
    DaemonConfig::new(socket_path)
        .with_engine(EngineConfig::default().with_tick_interval_ms(args.tick_ms))
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
