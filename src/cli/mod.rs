//! CLI command definitions and handlers

mod check;
mod list;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// trustcheck - supply-chain trust scoring for source repositories
#[derive(Parser, Debug)]
#[command(name = "trustcheck")]
#[command(
    version,
    about = "Score a source repository on supply-chain security practices",
    long_about = "trustcheck runs a set of independent checks (branch protection, code review, \
dangerous workflows, signed releases, known vulnerabilities, ...) against a repository and \
scores each from 0 to 10, or ? when the evidence was not available.\n\n\
Run without a subcommand to check the current directory:\n  \
trustcheck .",
    after_help = "\
Examples:
  trustcheck .                                   Check a local checkout
  trustcheck --repo ossf/scorecard               Check a GitHub repository
  trustcheck --repo owner/name --format json     JSON output for scripting
  trustcheck --checks Dangerous-Workflow,SAST    Run selected checks
  trustcheck list                                List available checks

Environment:
  GITHUB_TOKEN     token for the GitHub API
  GITHUB_API_URL   GitHub Enterprise API base
  OSV_API_URL      OSV API base"
)]
pub struct Cli {
    /// Path to a local repository (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// GitHub repository to check (owner/name or URL) instead of PATH
    #[arg(long, global = true)]
    pub repo: Option<String>,

    /// Comma-separated checks to run (default: all enabled checks)
    #[arg(long, global = true, value_delimiter = ',')]
    pub checks: Vec<String>,

    /// Output format: text, json
    #[arg(long, short = 'f', global = true, value_parser = ["text", "json"])]
    pub format: Option<String>,

    /// Output file path (default: stdout)
    #[arg(long, short = 'o', global = true)]
    pub output: Option<PathBuf>,

    /// Number of parallel workers (1-64)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Per-check timeout in seconds (0 = none)
    #[arg(long, global = true)]
    pub check_timeout: Option<u64>,

    /// Timeout for the whole run in seconds (0 = none)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Print the details behind each score
    #[arg(long, global = true)]
    pub show_details: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run checks against a repository (default)
    Run,

    /// List available checks
    List,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::List) => list::run(&cli),
        Some(Commands::Run) | None => check::run(&cli),
    }
}
