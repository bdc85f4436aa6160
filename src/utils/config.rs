//! Configuration and constants for the CLI.

/// Name given to the synthetic root node of every reconstructed tree
pub const ROOT_NODE_NAME: &str = "App";

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Default upper bound on tree size (nodes, excluding the root)
pub const DEFAULT_MAX_NODES: usize = 1_000_000;

/// Default upper bound on a single call's stack length
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Default depth shown by the text tree renderer
pub const DEFAULT_TEXT_DEPTH: usize = 16;

// Naive timestamp layouts accepted from the collector (read as UTC).
// RFC 3339 strings with an offset are tried before these.
pub const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];
