//! Output writers for reconstructed trees.
//!
//! This module handles:
//! - JSON tree documents (file and in-memory)
//! - Indented text trees for the terminal

pub mod json;
pub mod text;

// Re-export main functions
pub use json::{tree_to_string, write_tree, TreeDocument};
pub use text::render_text_tree;
