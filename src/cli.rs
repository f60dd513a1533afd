use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbosityLevel {
    /// Diagnostics only, no progress or summary lines
    Quiet,
    /// Show one line per diagnostic
    #[default]
    Normal,
    /// Show detailed information
    Verbose,
    /// Also show the full cause chain of each diagnostic
    Debug,
}

/// Diagnostics for batch XML/XSLT conversion
#[derive(Parser, Debug, Clone)]
#[command(name = "bulk-transform")]
#[command(about = "Inspect references and report XML diagnostics")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Append diagnostics to this file and keep going on non-fatal errors
    #[arg(long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose output (repeat for cause chains)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Enable quiet mode (diagnostics only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose",
        global = true
    )]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Decompose a reference into path, name and anchor
    Href {
        /// Reference to decompose (URL, relative path or file name)
        reference: String,

        /// Base URL to resolve the reference against
        #[arg(long = "base")]
        base: Option<String>,

        /// Also test whether the referenced resource can be opened
        #[arg(long = "check")]
        check: bool,
    },
    /// Check that XML files are well-formed
    Check {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Verbosity requested on the command line, if any
    pub fn verbosity(&self) -> Option<VerbosityLevel> {
        if self.quiet {
            Some(VerbosityLevel::Quiet)
        } else {
            match self.verbose {
                0 => None,
                1 => Some(VerbosityLevel::Verbose),
                _ => Some(VerbosityLevel::Debug),
            }
        }
    }
}
