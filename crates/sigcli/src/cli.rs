//! CLI argument parsing for the `sigcli` tool. Defines the `Cli` struct and `Command` enum.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sigcli",
    version,
    about = "Compile function signature declarations into command-line interfaces",
    after_help = "Examples:\n  sigcli schema resize.toml\n  sigcli run resize.toml -- in.png --size 800 600\n  sigcli completions resize.toml zsh"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log schema decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse arguments against a declaration and print the bound values as JSON
    Run {
        /// Path to the TOML signature declaration
        decl: PathBuf,

        /// Arguments for the declared command (put them after `--`)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Show the command-line schema derived from a declaration
    Schema {
        /// Path to the TOML signature declaration
        decl: PathBuf,

        /// Print machine-readable JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print shell completions for a declared command
    Completions {
        /// Path to the TOML signature declaration
        decl: PathBuf,

        #[arg(value_enum)]
        shell: Shell,
    },
}
