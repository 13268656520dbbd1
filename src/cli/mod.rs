//! CLI definitions using clap derive API
//!
//! Argument types live in one submodule per command:
//! - update: Update command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod update;

pub use completions::CompletionsArgs;
pub use update::UpdateArgs;

/// scaffold-update - upgrade a scaffolded project
///
/// Merge the changes between two scaffold versions into your project.
#[derive(Parser, Debug)]
#[command(
    name = "scaffold-update",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Upgrade a scaffolded project to a newer template version",
    long_about = "scaffold-update generates the scaffold your project started from and the scaffold \
                  you want to move to, then merges the difference into your project with git's \
                  three-way merge. Local edits are kept; overlapping edits get conflict markers.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  scaffold-update update --to 2.14.1                      \x1b[90m# Version detected from package.json\x1b[0m\n   \
                  scaffold-update update --from 2.11.1 --to 2.14.1        \x1b[90m# Explicit range\x1b[0m\n   \
                  scaffold-update update --to 2.14.1 --dry-run            \x1b[90m# Show what the scaffold changed\x1b[0m\n   \
                  scaffold-update -p apps/web update --to 2.14.1          \x1b[90m# Project in a subfolder\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Project directory (defaults to current directory)
    #[arg(long, short = 'p', global = true, env = "SCAFFOLD_UPDATE_PROJECT")]
    pub project: Option<PathBuf>,

    /// Configuration file (defaults to scaffold-update.yaml in the project)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Update the project to a newer scaffold version
    Update(UpdateArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
