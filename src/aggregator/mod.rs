//! Reconstruction of the call tree and statistics over it.
//!
//! This module transforms a parsed run record into:
//! - A call tree rooted at a synthetic run node
//! - Tree statistics and duration rankings

pub mod metrics;
pub mod tree_builder;

// Re-export main types and functions
pub use metrics::{calculate_tree_stats, slowest_calls, TreeStats};
pub use tree_builder::{build, build_with_options, BuildOptions, TreeBuilder, TreeNode};
