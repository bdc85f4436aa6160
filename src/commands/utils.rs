use anyhow::{Context, Result};
use std::path::Path;
use crate::parser::{read_record, RunRecord};
use crate::utils::config::{ROOT_NODE_NAME, SCHEMA_VERSION};

/// Findings from checking a run record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordReport {
    pub call_count: usize,

    /// Indices of calls with an empty stack
    pub empty_stacks: Vec<usize>,

    /// Indices of calls missing a start or end time
    pub untimed: Vec<usize>,

    /// Indices of calls whose end precedes their start
    pub inverted: Vec<usize>,
}

impl RecordReport {
    pub fn is_clean(&self) -> bool {
        self.empty_stacks.is_empty() && self.untimed.is_empty() && self.inverted.is_empty()
    }
}

/// Check a parsed record for calls the tree builder will treat specially
pub fn inspect_record(run: &RunRecord) -> RecordReport {
    let mut report = RecordReport {
        call_count: run.calls.len(),
        ..Default::default()
    };

    for (index, call) in run.calls.iter().enumerate() {
        if call.stack.is_empty() {
            report.empty_stacks.push(index);
        }
        match call.perf.duration() {
            None => report.untimed.push(index),
            Some(d) if d < chrono::Duration::zero() => report.inverted.push(index),
            Some(_) => {}
        }
    }

    report
}

/// Validate a run record file
pub fn validate_record_file(file_path: &Path) -> Result<RecordReport> {
    println!("Validating record: {}", file_path.display());

    let run = read_record(file_path)
        .with_context(|| format!("Failed to read record {}", file_path.display()))?;
    let report = inspect_record(&run);

    println!("✓ Valid record JSON");
    println!("  Record: {}", run.record_id.as_deref().unwrap_or("<unnamed>"));
    println!("  Calls: {}", report.call_count);
    println!("  Empty stacks (skipped when building): {:?}", report.empty_stacks);
    println!("  Missing timing: {:?}", report.untimed);
    println!("  End before start: {:?}", report.inverted);

    Ok(report)
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Calltree Studio Tree Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  record_id: string?       - Record the tree was built from");
        println!("  generated_at: string     - ISO 8601 timestamp");
        println!("  stats: object            - Tree statistics");
        println!("  tree: node               - Root node, named '{}'", ROOT_NODE_NAME);
        println!("    name: string           - Frame name");
        println!("    startTime: string?     - Start of the resolving call");
        println!("    endTime: string?       - End of the resolving call");
        println!("    raw: object?           - The call that resolved this node");
        println!("    children: node[]?      - Nested calls, in first-seen order");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Calltree Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Tree Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Call tree reconstruction for instrumented app runs.");
}
