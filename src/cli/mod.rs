//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;
mod info;

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::build::ArtifactKind;
use crate::config::loader::CliOverrides;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// unity-build - Group C/C++ sources into unity build aggregate files
#[derive(Parser)]
#[command(name = "unity-build")]
#[command(about = "Group C/C++ sources into unity build aggregate files")]
#[command(version)]
pub struct Cli {
    /// Show debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by `generate` and `build`.
#[derive(Args, Debug, Clone, Default)]
pub struct UnityArgs {
    /// Configured target name, or the artifact path when SOURCES are given.
    /// If omitted, every target in unity.toml is processed.
    pub target: Option<String>,

    /// Source files and prebuilt inputs for an ad-hoc target.
    /// .c/.cc/.cpp/.cxx/.c++/.m/.mm are grouped, anything else is passed through.
    pub sources: Vec<PathBuf>,

    /// Path to unity.toml (default: search upwards from the current directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for aggregate files (overrides unity.toml for this run)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Maximum number of sources per aggregate file
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub max_sources: Option<usize>,

    /// Minimum number of aggregate files to generate (if possible)
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub min_files: Option<usize>,

    /// Number of parallel build jobs (used as --min-files when that is absent)
    #[arg(short, long, value_parser = clap::value_parser!(usize))]
    pub jobs: Option<usize>,

    /// Skip aggregation and pass sources straight through
    #[arg(long)]
    pub disable: bool,

    /// Artifact kind for an ad-hoc target
    #[arg(short, long)]
    pub kind: Option<ArtifactKind>,

    /// Show what would be generated without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl UnityArgs {
    /// Config overrides given on the command line.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            cache_dir: self.cache_dir.clone(),
            max_sources: self.max_sources,
            min_files: self.min_files,
            disable: self.disable.then_some(true),
            jobs: self.jobs,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write aggregate files and print the inputs for the artifact builder
    Generate {
        #[command(flatten)]
        args: UnityArgs,
    },
    /// Write aggregate files, then compile and link with the configured compiler
    Build {
        #[command(flatten)]
        args: UnityArgs,
    },
    /// Show how many sources each aggregate file would get
    Groups {
        /// Number of compilable sources
        #[arg(long)]
        total: usize,

        /// Maximum number of sources per aggregate file
        #[arg(long = "max", default_value = "15", value_parser = positive())]
        max_sources: usize,

        /// Minimum number of aggregate files
        #[arg(long = "min", default_value = "1", value_parser = positive())]
        min_files: usize,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Parser for limits that must be at least 1.
fn positive() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::new().range(1..)
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose);

    match cli.command {
        Commands::Generate { args } => build::run_generate(&args),
        Commands::Build { args } => build::run_build(&args),
        Commands::Groups { total, max_sources, min_files, json } => {
            info::run_groups(total, max_sources, min_files, json)
        }
    }
}
