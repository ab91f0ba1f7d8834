//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// HackRore technician bench CLI
#[derive(Parser, Debug)]
#[command(name = "hackrorectl")]
#[command(about = "HackRore - hardware diagnostics with technician progression", long_about = None)]
#[command(version = hackrore_common::VERSION)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Config file (overrides ~/.config/hackrore/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// State directory (overrides storage.data_dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output JSON only
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show level, XP progress and overall diagnostics status
    Status,

    /// Record a finished diagnostic check and pay out its XP
    Check {
        /// Check name (see `checks`)
        kind: String,

        /// pass, fail, warning or pending
        #[arg(long, default_value = "pass")]
        status: String,

        /// Keys verified, benchmark points or targets hit
        #[arg(long)]
        score: Option<u64>,

        /// Extra details as JSON (plain text is kept as a string)
        #[arg(long)]
        details: Option<String>,
    },

    /// List the known diagnostic checks
    Checks,

    /// Award XP directly
    Xp {
        amount: u64,

        #[arg(long, default_value = "Manual award")]
        reason: String,
    },

    /// Record a raw test result
    #[command(name = "result")]
    Record {
        id: String,

        /// Display name (defaults to the id)
        #[arg(long)]
        name: Option<String>,

        #[arg(long, default_value = "pass")]
        status: String,

        #[arg(long)]
        details: Option<String>,
    },

    /// Latest result per test
    Results,

    /// Result history, newest first
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Wipe results and history (progression is kept)
    ClearResults,

    /// Show themes and badges
    Unlocks,

    /// Technician ticket log
    Ticket {
        #[command(subcommand)]
        action: TicketCommands,
    },

    /// Write a service case report
    CaseReport {
        /// Technician name (defaults to profile.technician_name)
        #[arg(long)]
        technician: Option<String>,

        #[arg(long)]
        client: String,

        #[arg(long)]
        device: String,

        #[arg(long)]
        issue: String,

        #[arg(long)]
        notes: Option<String>,

        /// Output directory (defaults to the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum TicketCommands {
    /// Open a new ticket
    Add {
        #[arg(long)]
        client: String,

        #[arg(long)]
        device: String,

        #[arg(long)]
        issue: String,
    },

    /// List tickets, optionally filtered
    List {
        #[arg(long)]
        search: Option<String>,
    },

    /// Change a ticket's status (pending, in-progress, fixed)
    Status { id: String, status: String },

    Delete { id: String },

    /// Export the log as JSON
    Export {
        /// Output directory (defaults to the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_with_score() {
        let cli = Cli::try_parse_from(["hackrorectl", "check", "keyboard", "--score", "64"]).unwrap();
        match cli.command {
            Commands::Check { kind, status, score, .. } => {
                assert_eq!(kind, "keyboard");
                assert_eq!(status, "pass");
                assert_eq!(score, Some(64));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["hackrorectl", "status", "--json", "--data-dir", "/tmp/x"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    }
}
