//! Build command implementation.
//!
//! The build command:
//! 1. Reads and parses the run record
//! 2. Folds its calls into a call tree
//! 3. Calculates tree statistics
//! 4. Writes the tree document

use super::models::BuildArgs;
use crate::aggregator::{build_with_options, slowest_calls, BuildOptions};
use crate::output::{render_text_tree, write_tree, TreeDocument};
use crate::parser::read_record;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the build command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Record read or parse failures
/// * Strict-mode, stack-depth, or node-limit build failures
/// * File write errors
pub fn execute_build(args: BuildArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Building call tree from: {}", args.record_path.display());

    // Step 1: Read record
    info!("Step 1/3: Reading record...");
    let run = read_record(&args.record_path).with_context(|| {
        format!("Failed to read record {}", args.record_path.display())
    })?;

    debug!(
        "Record {}: {} calls",
        run.record_id.as_deref().unwrap_or("<unnamed>"),
        run.calls.len()
    );

    // Step 2: Build tree
    info!("Step 2/3: Reconstructing call tree...");
    let mut options = BuildOptions::new().strict(args.strict);
    if let Some(limit) = args.max_nodes {
        options = options.with_max_nodes(limit);
    }
    options = match args.max_depth {
        Some(limit) => options.with_max_depth(limit),
        None => options.unbounded_depth(),
    };
    let tree = build_with_options(&run, options).context("Failed to build call tree")?;

    let document = TreeDocument::new(&tree, run.record_id.clone());
    info!("Tree: {}", document.stats.summary());

    // Step 3: Write output
    info!("Step 3/3: Writing output file...");
    write_tree(&document, &args.output_json).context("Failed to write tree JSON")?;

    info!("✓ Tree written to: {}", args.output_json.display());

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("CALL TREE");
        println!("{}", "=".repeat(80));
        if let Some(id) = &run.record_id {
            println!("Record: {}", id);
        }
        println!("Calls:  {}", run.calls.len());
        println!("{}", document.stats.summary());
        println!("\n{}", render_text_tree(&tree, args.text_depth));

        let slowest = slowest_calls(&tree, 5);
        if !slowest.is_empty() {
            println!("\nSlowest calls:");
            for (i, (path, duration)) in slowest.iter().enumerate() {
                println!("  {}. {} ms  {}", i + 1, duration.num_milliseconds(), path);
            }
        }
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!("Build completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Validate build arguments
///
/// **Public** - can be called before execute_build for early validation
pub fn validate_args(args: &BuildArgs) -> Result<()> {
    if args.record_path.as_os_str().is_empty() {
        anyhow::bail!("Record path cannot be empty");
    }

    if !args.record_path.is_file() {
        anyhow::bail!("Record file not found: {}", args.record_path.display());
    }

    if args.output_json.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if args.text_depth == 0 {
        anyhow::bail!("depth must be greater than 0");
    }

    if args.max_nodes == Some(0) {
        anyhow::bail!("max_nodes must be greater than 0");
    }

    if args.max_depth == Some(0) {
        anyhow::bail!("max_depth must be greater than 0");
    }

    Ok(())
}
