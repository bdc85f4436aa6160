use std::path::PathBuf;
use crate::utils::config::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES, DEFAULT_TEXT_DEPTH};

/// Arguments for the build command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct BuildArgs {
    /// Path to the run record JSON
    pub record_path: PathBuf,

    /// Output path for the tree JSON
    pub output_json: PathBuf,

    /// Print text tree and stats to stdout
    pub print_summary: bool,

    /// Depth shown in the text tree
    pub text_depth: usize,

    /// Reject calls with an empty stack
    pub strict: bool,

    /// Optional bound on tree size
    pub max_nodes: Option<usize>,

    /// Optional bound on a call's stack length
    pub max_depth: Option<usize>,
}

impl Default for BuildArgs {
    fn default() -> Self {
        Self {
            record_path: PathBuf::from("record.json"),
            output_json: PathBuf::from("tree.json"),
            print_summary: false,
            text_depth: DEFAULT_TEXT_DEPTH,
            strict: false,
            max_nodes: Some(DEFAULT_MAX_NODES),
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}
