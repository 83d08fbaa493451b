//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands::{self, MonitorOptions};
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// A terminal peak-level meter with a scrolling timeline chart
#[derive(Parser)]
#[command(name = "peakline")]
#[command(version)]
#[command(about = "A terminal peak-level meter with a scrolling timeline chart")]
#[command(
    long_about = "Captures audio from an input device and renders a scrolling chart of peak\nlevels over the last few seconds.\n\nDEFAULT COMMAND:\n    If no command is specified, 'monitor' is used by default.\n    Monitor options (-d, --timeline, --precision) can be used without\n    explicitly saying 'monitor'.\n\nEXAMPLES:\n    # Monitor the default input device\n    $ peakline\n\n    # Monitor a specific device with an 8 second timeline\n    $ peakline -d 1 --timeline 8\n\n    # List input devices\n    $ peakline list-devices\n\n    # Edit configuration file\n    $ peakline config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/peakline/peakline.toml\n    Logs:               ~/.local/state/peakline/peakline.log.*"
)]
struct Cli {
    /// Audio input device: "default", a name, or an index from list-devices
    #[arg(short, long, value_name = "DEVICE", global = true)]
    device: Option<String>,

    /// Seconds of history shown in the chart
    #[arg(long, value_name = "SECONDS", global = true)]
    timeline: Option<u32>,

    /// Aggregated chart points per second of audio
    #[arg(long, value_name = "POINTS_PER_SEC", global = true)]
    precision: Option<u32>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor input levels with a live chart (default)
    ///
    /// Press Space to pause/resume, Escape/q to quit.
    #[command(visible_alias = "m")]
    Monitor {
        /// Audio input device: "default", a name, or an index from list-devices
        #[arg(short, long, value_name = "DEVICE")]
        device: Option<String>,

        /// Seconds of history shown in the chart
        #[arg(long, value_name = "SECONDS")]
        timeline: Option<u32>,

        /// Aggregated chart points per second of audio
        #[arg(long, value_name = "POINTS_PER_SEC")]
        precision: Option<u32>,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Edit audio and chart settings. Uses the $EDITOR environment variable
    /// or falls back to nano/vim.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in peakline.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   peakline completions bash > peakline.bash
    ///   peakline completions zsh > _peakline
    ///   peakline completions fish > peakline.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails (e.g., capture startup, rendering)
pub fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "peakline", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::Monitor { .. }) => {
            // Default command is monitor
            // Merge top-level options with explicit monitor command options
            let options = match cli.command {
                Some(Commands::Monitor {
                    device,
                    timeline,
                    precision,
                }) => MonitorOptions {
                    device: device.or(cli.device),
                    timeline: timeline.or(cli.timeline),
                    precision: precision.or(cli.precision),
                },
                None => MonitorOptions {
                    device: cli.device,
                    timeline: cli.timeline,
                    precision: cli.precision,
                },
                _ => unreachable!(),
            };
            commands::handle_monitor(options)?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
