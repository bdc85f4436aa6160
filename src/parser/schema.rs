//! Run record schema definitions.
//!
//! These types are the parsed, collector-independent form of one app run.
//! The tree builder consumes them by reference and never mutates them.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// One named calling context in a call's stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackFrame {
    /// Component identity used for matching (e.g. the class name)
    pub name: String,

    /// Method name, kept for display only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl StackFrame {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method: None,
        }
    }
}

/// Start/end timing pair. Either side may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Perf {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl Perf {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
        }
    }

    /// Elapsed time, when both ends are known
    pub fn duration(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

/// One observed call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationRecord {
    /// Root-to-own-frame chain; the last frame is the call itself
    pub stack: Vec<StackFrame>,

    pub perf: Perf,

    /// Bound arguments, passed through unchanged
    pub args: serde_json::Value,

    /// Return value, passed through unchanged
    pub rets: serde_json::Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl InvocationRecord {
    /// Build a call from frame names with no payload
    pub fn new<S: AsRef<str>>(frames: &[S], perf: Perf) -> Self {
        Self {
            stack: frames
                .iter()
                .map(|f| StackFrame::new(AsRef::<str>::as_ref(f)))
                .collect(),
            perf,
            args: serde_json::Value::Null,
            rets: serde_json::Value::Null,
            error: None,
        }
    }
}

/// Top-level record of one app execution
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    /// Overall interval of the run
    pub perf: Perf,

    /// Calls in observation order
    pub calls: Vec<InvocationRecord>,
}

impl RunRecord {
    pub fn new(perf: Perf, calls: Vec<InvocationRecord>) -> Self {
        Self {
            record_id: None,
            app_id: None,
            perf,
            calls,
        }
    }
}
