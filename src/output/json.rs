//! JSON tree document writer.
//!
//! Writes reconstructed trees to JSON files with proper formatting.

use crate::aggregator::{calculate_tree_stats, TreeNode, TreeStats};
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Top-level document written to JSON
#[derive(Debug, Clone, Serialize)]
pub struct TreeDocument<'t, 'a> {
    /// Schema version for compatibility checking
    pub version: String,

    /// Record the tree was built from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,

    /// Timestamp when the document was generated
    pub generated_at: String,

    pub stats: TreeStats,

    pub tree: &'t TreeNode<'a>,
}

impl<'t, 'a> TreeDocument<'t, 'a> {
    /// Wrap a tree, computing its stats
    pub fn new(tree: &'t TreeNode<'a>, record_id: Option<String>) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            record_id,
            generated_at: chrono::Utc::now().to_rfc3339(),
            stats: calculate_tree_stats(tree),
            tree,
        }
    }
}

/// Write a tree document to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_tree(
    document: &TreeDocument<'_, '_>,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing tree to: {}", output_path.display());

    validate_output_path(output_path)?;

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, document).map_err(OutputError::SerializationFailed)?;

    info!(
        "Tree written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Render a tree document as pretty JSON in memory
///
/// **Public** - useful for tests and piping to stdout
pub fn tree_to_string(document: &TreeDocument<'_, '_>) -> Result<String, OutputError> {
    serde_json::to_string_pretty(document).map_err(OutputError::SerializationFailed)
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Calculate file size in bytes
///
/// **Private** - internal utility
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::build;
    use crate::parser::schema::{InvocationRecord, Perf, RunRecord};
    use chrono::{TimeZone, Utc};
    use tempfile::NamedTempFile;

    fn sample_run() -> RunRecord {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 10).unwrap();
        let mut run = RunRecord::new(
            Perf::new(t0, t1),
            vec![InvocationRecord::new(&["retriever"], Perf::new(t0, t1))],
        );
        run.record_id = Some("record_hash_1".to_string());
        run
    }

    #[test]
    fn test_write_tree() {
        let run = sample_run();
        let tree = build(&run);
        let document = TreeDocument::new(&tree, run.record_id.clone());
        let temp_file = NamedTempFile::new().unwrap();

        write_tree(&document, temp_file.path()).unwrap();

        let written: serde_json::Value =
            serde_json::from_reader(File::open(temp_file.path()).unwrap()).unwrap();
        assert_eq!(written["version"], SCHEMA_VERSION);
        assert_eq!(written["record_id"], "record_hash_1");
        assert_eq!(written["stats"]["node_count"], 1);
        assert_eq!(written["tree"]["children"][0]["name"], "retriever");
    }

    #[test]
    fn test_tree_field_names() {
        let run = sample_run();
        let tree = build(&run);
        let document = TreeDocument::new(&tree, None);
        let json: serde_json::Value =
            serde_json::from_str(&tree_to_string(&document).unwrap()).unwrap();

        let child = &json["tree"]["children"][0];
        assert_eq!(child["startTime"], "2024-01-01T00:00:00Z");
        assert_eq!(child["endTime"], "2024-01-01T00:00:10Z");
        assert_eq!(child["raw"]["stack"][0]["name"], "retriever");
        // Leaves carry no children key; the root carries no raw
        assert!(child.get("children").is_none());
        assert!(json["tree"].get("raw").is_none());
        assert!(json.get("record_id").is_none());
    }

    #[test]
    fn test_validate_output_path_empty() {
        let result = validate_output_path(Path::new(""));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_output_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = validate_output_path(temp_dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/tree.json");

        let run = sample_run();
        let tree = build(&run);
        write_tree(&TreeDocument::new(&tree, None), &nested_path).unwrap();

        assert!(nested_path.exists());
    }
}
