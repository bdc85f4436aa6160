//! Summary statistics over a reconstructed call tree.
//!
//! Used for logging, the CLI summary, and the `stats` block of the
//! written tree document.

use super::tree_builder::TreeNode;
use chrono::Duration;
use log::debug;
use serde::{Deserialize, Serialize};

/// Statistics about a call tree
///
/// **Public** - returned from calculate_tree_stats
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Nodes below the root
    pub node_count: usize,

    /// Deepest node (root is depth 0)
    pub max_depth: usize,

    /// Nodes closed by a call
    pub resolved_count: usize,

    /// Ancestor frames never closed by their own call
    pub placeholder_count: usize,

    /// Nodes without children (root excluded)
    pub leaf_count: usize,

    /// Root interval length in milliseconds, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_duration_ms: Option<i64>,
}

impl TreeStats {
    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        let duration = self
            .run_duration_ms
            .map(|ms| format!("{} ms", ms))
            .unwrap_or_else(|| "unknown".to_string());

        format!(
            "Nodes: {} | Depth: {} | Resolved: {} | Placeholders: {} | Leaves: {} | Run: {}",
            self.node_count,
            self.max_depth,
            self.resolved_count,
            self.placeholder_count,
            self.leaf_count,
            duration
        )
    }
}

/// Calculate statistics for a call tree
///
/// **Public** - main entry point for metrics calculation
pub fn calculate_tree_stats(root: &TreeNode<'_>) -> TreeStats {
    let mut stats = TreeStats {
        run_duration_ms: root.duration().map(|d| d.num_milliseconds()),
        ..TreeStats::default()
    };

    for (depth, node) in root.depth_first().into_iter().skip(1) {
        stats.node_count += 1;
        stats.max_depth = stats.max_depth.max(depth);

        if node.raw.is_some() {
            stats.resolved_count += 1;
        } else {
            stats.placeholder_count += 1;
        }

        if node.children.is_empty() {
            stats.leaf_count += 1;
        }
    }

    debug!("Tree stats: {}", stats.summary());

    stats
}

/// Rank resolved calls by duration
///
/// **Public** - longest first; equal durations keep depth-first order
///
/// # Arguments
/// * `root` - Tree to rank
/// * `top_n` - Number of calls to return
///
/// # Returns
/// `(path, duration)` pairs where path is the `;`-joined frame names
/// from the first frame below the root
pub fn slowest_calls(root: &TreeNode<'_>, top_n: usize) -> Vec<(String, Duration)> {
    let mut path: Vec<&str> = Vec::new();
    let mut ranked = Vec::new();
    collect_durations(root, &mut path, &mut ranked);

    // Stable sort keeps traversal order among ties
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(top_n);
    ranked
}

/// Walk the tree recording resolved node durations
///
/// **Private** - internal helper for slowest_calls
fn collect_durations<'t>(
    node: &'t TreeNode<'_>,
    path: &mut Vec<&'t str>,
    out: &mut Vec<(String, Duration)>,
) {
    for child in &node.children {
        path.push(child.name.as_str());

        if child.raw.is_some() {
            if let Some(duration) = child.duration() {
                out.push((path.join(";"), duration));
            }
        }

        collect_durations(child, path, out);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::tree_builder::build;
    use crate::parser::schema::{InvocationRecord, Perf, RunRecord};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn sample_run() -> RunRecord {
        RunRecord::new(
            Perf::new(at(0), at(20)),
            vec![
                InvocationRecord::new(&["chain", "retriever"], Perf::new(at(1), at(4))),
                InvocationRecord::new(&["chain", "llm"], Perf::new(at(5), at(15))),
                InvocationRecord::new(&["chain"], Perf::new(at(0), at(16))),
                InvocationRecord::new(&["other", "tool"], Perf::new(at(17), at(18))),
            ],
        )
    }

    #[test]
    fn test_calculate_tree_stats() {
        let run = sample_run();
        let tree = build(&run);
        let stats = calculate_tree_stats(&tree);

        assert_eq!(stats.node_count, 5);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.resolved_count, 4);
        assert_eq!(stats.placeholder_count, 1);
        assert_eq!(stats.leaf_count, 3);
        assert_eq!(stats.run_duration_ms, Some(20_000));
    }

    #[test]
    fn test_stats_for_empty_run() {
        let run = RunRecord::default();
        let tree = build(&run);
        let stats = calculate_tree_stats(&tree);

        assert_eq!(stats, TreeStats::default());
        assert!(stats.summary().contains("Run: unknown"));
    }

    #[test]
    fn test_slowest_calls() {
        let run = sample_run();
        let tree = build(&run);
        let slowest = slowest_calls(&tree, 2);

        assert_eq!(slowest.len(), 2);
        assert_eq!(slowest[0].0, "chain");
        assert_eq!(slowest[0].1, Duration::seconds(16));
        assert_eq!(slowest[1].0, "chain;llm");
    }
}
