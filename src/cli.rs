//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bladerunner template compiler CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Template source directory path (relative to project root)
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file name (default: bladerunner.toml)
    #[arg(short = 'C', long, default_value = "bladerunner.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared build arguments for Build and Watch commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Clean output directory completely before building
    #[arg(long)]
    pub clean: bool,

    /// Echo `{{ }}` output without HTML escaping
    #[arg(long)]
    pub unsafe_output: bool,

    /// Log the compile stages applied to each template
    #[arg(short, long)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compile every template under the source directory
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Build, then rebuild on change
    Watch {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Compile a single template and print the PHP to stdout
    Compile {
        /// Template file to compile
        file: PathBuf,

        /// Path under the source root to compile the file as (default: derived from the file)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Echo `{{ }}` output without HTML escaping
        #[arg(long)]
        unsafe_output: bool,
    },
}

impl Cli {
    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Watch { .. })
    }

    /// Build arguments, if the command builds the site.
    pub fn build_args(&self) -> Option<&BuildArgs> {
        match &self.command {
            Commands::Build { build_args } | Commands::Watch { build_args } => Some(build_args),
            Commands::Compile { .. } => None,
        }
    }
}
