//! Command definitions for the pomotimer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::{Phase, DEFAULT_TICK_INTERVAL_MS};

// ============================================================================
// CLI Structure
// ============================================================================

/// pomotimer - A session/break interval timer
#[derive(Parser, Debug)]
#[command(
    name = "pomotimer",
    version,
    about = "Session/break interval timer",
    long_about = "A simple interval timer that alternates between a work session and a break.\n\
                  A background daemon keeps time; this command controls and inspects it.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the daemon socket (defaults to ~/.pomotimer/pomotimer.sock)
    #[arg(long, global = true, env = "POMOTIMER_SOCKET", value_name = "PATH")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the timer, or pause it if it is running
    Toggle,

    /// Stop the timer and restore the default lengths
    Reset,

    /// Lengthen a phase by one minute
    Increase(PhaseArgs),

    /// Shorten a phase by one minute
    Decrease(PhaseArgs),

    /// Change a phase length by any number of minutes
    Adjust(AdjustArgs),

    /// Clear the pending notification
    Dismiss,

    /// Show current timer status
    Status,

    /// Run as daemon (background service)
    #[command(hide = true)]
    Daemon(DaemonArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Command Arguments
// ============================================================================

/// Phase selector accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseArg {
    /// The work session
    Session,
    /// The break
    Break,
}

impl From<PhaseArg> for Phase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Session => Phase::Session,
            PhaseArg::Break => Phase::Break,
        }
    }
}

/// Arguments for increase/decrease
#[derive(Args, Debug, Clone)]
pub struct PhaseArgs {
    /// Phase whose length changes
    #[arg(value_enum)]
    pub phase: PhaseArg,
}

/// Arguments for the adjust command
#[derive(Args, Debug, Clone)]
pub struct AdjustArgs {
    /// Phase whose length changes
    #[arg(value_enum)]
    pub phase: PhaseArg,

    /// Minutes to add (negative to subtract); the result is clamped
    #[arg(allow_negative_numbers = true)]
    pub delta: i32,
}

/// Arguments for the daemon command
#[derive(Args, Debug, Clone)]
pub struct DaemonArgs {
    /// Milliseconds per countdown second
    #[arg(
        long,
        default_value_t = DEFAULT_TICK_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub tick_ms: u64,
}

impl Default for DaemonArgs {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Cli Tests
    // ------------------------------------------------------------------------

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["pomotimer"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
        }

        #[test]
        fn test_parse_verbose_flag() {
            let cli = Cli::parse_from(["pomotimer", "--verbose"]);
            assert!(cli.verbose);
        }

        #[test]
        fn test_parse_short_verbose_flag() {
            let cli = Cli::parse_from(["pomotimer", "-v"]);
            assert!(cli.verbose);
        }

        #[test]
        fn test_parse_socket_option() {
            let cli = Cli::parse_from(["pomotimer", "--socket", "/tmp/p.sock", "status"]);
            assert_eq!(cli.socket, Some(PathBuf::from("/tmp/p.sock")));
        }

        #[test]
        fn test_parse_socket_after_subcommand() {
            let cli = Cli::parse_from(["pomotimer", "status", "--socket", "/tmp/p.sock"]);
            assert_eq!(cli.socket, Some(PathBuf::from("/tmp/p.sock")));
        }

        #[test]
        fn test_parse_toggle_command() {
            let cli = Cli::parse_from(["pomotimer", "toggle"]);
            assert!(matches!(cli.command, Some(Commands::Toggle)));
        }

        #[test]
        fn test_parse_reset_command() {
            let cli = Cli::parse_from(["pomotimer", "reset"]);
            assert!(matches!(cli.command, Some(Commands::Reset)));
        }

        #[test]
        fn test_parse_dismiss_command() {
            let cli = Cli::parse_from(["pomotimer", "dismiss"]);
            assert!(matches!(cli.command, Some(Commands::Dismiss)));
        }

        #[test]
        fn test_parse_status_command() {
            let cli = Cli::parse_from(["pomotimer", "status"]);
            assert!(matches!(cli.command, Some(Commands::Status)));
        }

        #[test]
        fn test_parse_completions_bash() {
            let cli = Cli::parse_from(["pomotimer", "completions", "bash"]);
            match cli.command {
                Some(Commands::Completions { shell }) => {
                    assert_eq!(shell, clap_complete::Shell::Bash);
                }
                _ => panic!("Expected Completions command"),
            }
        }

        #[test]
        fn test_parse_invalid_command() {
            let result = Cli::try_parse_from(["pomotimer", "invalid"]);
            assert!(result.is_err());
        }
    }

    // ------------------------------------------------------------------------
    // Length Command Tests
    // ------------------------------------------------------------------------

    mod length_command_tests {
        use super::*;

        #[test]
        fn test_parse_increase_session() {
            let cli = Cli::parse_from(["pomotimer", "increase", "session"]);
            match cli.command {
                Some(Commands::Increase(args)) => assert_eq!(args.phase, PhaseArg::Session),
                _ => panic!("Expected Increase command"),
            }
        }

        #[test]
        fn test_parse_decrease_break() {
            let cli = Cli::parse_from(["pomotimer", "decrease", "break"]);
            match cli.command {
                Some(Commands::Decrease(args)) => assert_eq!(args.phase, PhaseArg::Break),
                _ => panic!("Expected Decrease command"),
            }
        }

        #[test]
        fn test_parse_adjust_negative_delta() {
            let cli = Cli::parse_from(["pomotimer", "adjust", "session", "-10"]);
            match cli.command {
                Some(Commands::Adjust(args)) => {
                    assert_eq!(args.phase, PhaseArg::Session);
                    assert_eq!(args.delta, -10);
                }
                _ => panic!("Expected Adjust command"),
            }
        }

        #[test]
        fn test_parse_adjust_positive_delta() {
            let cli = Cli::parse_from(["pomotimer", "adjust", "break", "7"]);
            match cli.command {
                Some(Commands::Adjust(args)) => {
                    assert_eq!(args.phase, PhaseArg::Break);
                    assert_eq!(args.delta, 7);
                }
                _ => panic!("Expected Adjust command"),
            }
        }

        #[test]
        fn test_parse_increase_invalid_phase() {
            let result = Cli::try_parse_from(["pomotimer", "increase", "lunch"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_adjust_missing_delta() {
            let result = Cli::try_parse_from(["pomotimer", "adjust", "session"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_phase_arg_conversion() {
            assert_eq!(Phase::from(PhaseArg::Session), Phase::Session);
            assert_eq!(Phase::from(PhaseArg::Break), Phase::Break);
        }
    }

    // ------------------------------------------------------------------------
    // DaemonArgs Tests
    // ------------------------------------------------------------------------

    mod daemon_args_tests {
        use super::*;

        #[test]
        fn test_parse_daemon_default_tick() {
            let cli = Cli::parse_from(["pomotimer", "daemon"]);
            match cli.command {
                Some(Commands::Daemon(args)) => {
                    assert_eq!(args.tick_ms, DEFAULT_TICK_INTERVAL_MS);
                }
                _ => panic!("Expected Daemon command"),
            }
        }

        #[test]
        fn test_parse_daemon_custom_tick() {
            let cli = Cli::parse_from(["pomotimer", "daemon", "--tick-ms", "10"]);
            match cli.command {
                Some(Commands::Daemon(args)) => assert_eq!(args.tick_ms, 10),
                _ => panic!("Expected Daemon command"),
            }
        }

        #[test]
        fn test_parse_daemon_zero_tick_rejected() {
            let result = Cli::try_parse_from(["pomotimer", "daemon", "--tick-ms", "0"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_daemon_args_default() {
            assert_eq!(DaemonArgs::default().tick_ms, 1000);
        }

        #[test]
        fn test_daemon_hidden_from_help() {
            use clap::CommandFactory;

            let help = Cli::command().render_help().to_string();
            let listed = |name: &str| help.lines().any(|line| line.trim_start().starts_with(name));
            assert!(!listed("daemon"));
            assert!(listed("toggle"));
        }
    }
}
