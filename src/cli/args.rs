//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate the graphics math library sources from declarations
#[derive(Parser, Debug)]
#[command(name = "gm-codegen")]
#[command(about = "Generate graphics math library sources from declarations")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render every type, function and the module manifest
    Generate {
        /// Template root directory
        #[arg(short, long)]
        templates: Option<PathBuf>,

        /// Output root directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Glob patterns over artifact paths to skip (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,

        /// Run clang-format and black over written files
        #[arg(long)]
        format: bool,

        /// Render everything but write nothing
        #[arg(long)]
        dry_run: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the declared types and functions
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}
