//! Run record parsing and schema definitions.
//!
//! This module handles:
//! - Parsing the collector's record JSON
//! - Extracting frame identities from stack entries
//! - Coercing timestamps

pub mod record;
pub mod schema;

// Re-export main types
pub use record::{coerce_timestamp, parse_frame, parse_record, read_record};
pub use schema::{InvocationRecord, Perf, RunRecord, StackFrame};
