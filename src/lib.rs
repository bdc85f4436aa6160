//! Calltree Studio
//!
//! Reconstructs the nested call hierarchy of an instrumented app run
//! from its flat list of recorded calls.
//!
//! Each recorded call carries its own stack and timing. Calls are folded
//! into a tree keyed by frame name, with time containment deciding which
//! of several same-named frames a deeper call belongs to.
//!
//! ## Getting Started
//!
//! ```ignore
//! let run = calltree_studio::parser::read_record("record.json")?;
//! let tree = calltree_studio::aggregator::build(&run);
//! println!("{}", calltree_studio::output::render_text_tree(&tree, 8));
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
