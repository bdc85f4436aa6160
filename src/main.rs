//! Calltree Studio CLI
//!
//! Rebuilds the call tree of an instrumented app run from its record
//! and writes it as JSON for visualization.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use calltree_studio::commands::{
    display_schema, display_version, execute_build, validate_args, validate_record_file,
    BuildArgs,
};
use calltree_studio::utils::config::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES, DEFAULT_TEXT_DEPTH};

/// Calltree Studio - call tree reconstruction for app runs
#[derive(Parser, Debug)]
#[command(name = "calltree")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the call tree of a run record
    Build {
        /// Run record JSON file
        #[arg(short, long, env = "CALLTREE_RECORD")]
        record: PathBuf,

        /// Output path for the tree JSON
        #[arg(short, long, default_value = "tree.json")]
        output: PathBuf,

        /// Print the text tree and stats to stdout
        #[arg(long)]
        summary: bool,

        /// Depth shown in the text tree
        #[arg(long, default_value_t = DEFAULT_TEXT_DEPTH)]
        depth: usize,

        /// Fail on calls with an empty stack instead of skipping them
        #[arg(long)]
        strict: bool,

        /// Abort if the tree grows beyond this many nodes
        #[arg(long, default_value_t = DEFAULT_MAX_NODES)]
        max_nodes: usize,

        /// Reject calls whose stack is deeper than this
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Validate a run record file
    Validate {
        /// Path to record JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Build {
            record,
            output,
            summary,
            depth,
            strict,
            max_nodes,
            max_depth,
        } => {
            let args = BuildArgs {
                record_path: record,
                output_json: output,
                print_summary: summary,
                text_depth: depth,
                strict,
                max_nodes: Some(max_nodes),
                max_depth: Some(max_depth),
            };

            // Validate args first
            validate_args(&args)?;

            execute_build(args)?;
        }

        Commands::Validate { file } => {
            validate_record_file(&file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
