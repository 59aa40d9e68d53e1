//! CLI argument definitions using clap.
//!
//! This module defines the command-line interface structure for all
//! locsync commands. It uses clap's derive API for declarative argument
//! parsing.
//!
//! ## Commands
//!
//! - `export`: Build the exchange payload from the source catalog
//! - `import`: Merge per-locale payloads and write locale artifacts
//! - `check`: Run the full pipeline without writing anything
//! - `init`: Initialize locsync configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Export(cmd)) => cmd.common.verbose,
            Some(Command::Import(cmd)) => cmd.common.verbose,
            Some(Command::Check(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Source locale (overrides config file)
    #[arg(long)]
    pub source_locale: Option<String>,

    /// Messages directory path (overrides config file)
    #[arg(long)]
    pub messages_root: Option<PathBuf>,

    /// Exchange directory path (overrides config file)
    #[arg(long)]
    pub exchange_root: Option<PathBuf>,

    /// Output directory path (overrides config file)
    #[arg(long)]
    pub output_root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ExportCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct ImportCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Compute all artifacts but write nothing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the flat exchange payload from the source catalog and component blocks
    Export(ExportCommand),
    /// Merge per-locale exchange payloads and write locale files and component blocks
    Import(ImportCommand),
    /// Validate catalogs and payloads, including the source round-trip, without writing
    Check(CheckCommand),
    /// Initialize a new .locsyncrc.json configuration file
    Init,
}
