//! Command-line interface for jailparam
//!
//! Uses clap with derive for type-safe CLI parsing

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// jailparam - create, update and remove FreeBSD jails
#[derive(Parser)]
#[command(name = "jailparam")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create a persistent jail
    Create {
        /// Jail name
        name: String,

        /// Hostname inside the jail
        hostname: String,

        /// Jail root directory
        path: String,

        /// Securelevel (0-3)
        #[arg(value_parser = clap::value_parser!(i32).range(0..=3))]
        securelevel: i32,

        /// IPv4 address
        ipaddr: String,
    },

    /// Create a jail from a TOML manifest
    Apply {
        /// Manifest file
        file: PathBuf,
    },

    /// Update an existing jail
    Update {
        /// Jail name
        name: String,

        /// New hostname
        hostname: String,

        /// New securelevel (0-3)
        #[arg(value_parser = clap::value_parser!(i32).range(0..=3))]
        securelevel: i32,

        /// New IPv4 address
        ipaddr: String,
    },

    /// Remove a jail, killing its processes
    Remove {
        /// Jail name or ID
        jail: String,
    },

    /// Resolve a jail name or ID
    Lookup {
        /// Jail name or ID
        jail: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Run a command inside a running jail
    Attach {
        /// Jail name or ID
        jail: String,

        /// Command to execute (use -- to separate from options)
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Generate shell completion scripts
    pub fn generate_completion(shell: Shell) {
        let mut cmd = Self::command();
        clap_complete::generate(shell, &mut cmd, "jailparam", &mut std::io::stdout());
    }
}
