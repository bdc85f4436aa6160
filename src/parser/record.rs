//! Run record parser.
//!
//! Parses the collector's JSON record into a `RunRecord`.
//! Handles frame name extraction, timestamp coercion, and skipping of
//! malformed calls.

use super::schema::{InvocationRecord, Perf, RunRecord, StackFrame};
use crate::utils::config::NAIVE_TIMESTAMP_FORMATS;
use crate::utils::error::ParseError;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, warn};
use serde::Deserialize;
use std::path::Path;

/// Raw timing pair as serialized by the collector
#[derive(Debug, Clone, Default, Deserialize)]
struct RawPerf {
    #[serde(default)]
    start_time: Option<serde_json::Value>,

    #[serde(default)]
    end_time: Option<serde_json::Value>,
}

/// Raw call as serialized by the collector
#[derive(Debug, Clone, Deserialize)]
struct RawCall {
    #[serde(default)]
    stack: Vec<serde_json::Value>,

    #[serde(default)]
    perf: Option<RawPerf>,

    #[serde(default)]
    args: serde_json::Value,

    #[serde(default)]
    rets: serde_json::Value,

    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Parse a run record from collector JSON
///
/// **Public** - main entry point for parsing
///
/// # Arguments
/// * `raw` - Record JSON as produced by the collector
///
/// # Returns
/// Parsed run record ready for tree building
///
/// # Errors
/// * `ParseError::InvalidFormat` - Not an object, `calls` missing or not
///   an array, or every call is malformed
/// * `ParseError::InvalidTimestamp` - Run-level timing cannot be read
pub fn parse_record(raw: &serde_json::Value) -> Result<RunRecord, ParseError> {
    let obj = raw.as_object().ok_or_else(|| {
        ParseError::InvalidFormat("Record must be a JSON object".to_string())
    })?;

    let record_id = obj
        .get("record_id")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let app_id = obj.get("app_id").and_then(|v| v.as_str()).map(str::to_string);

    debug!("Parsing record: {}", record_id.as_deref().unwrap_or("<unnamed>"));

    let perf = match obj.get("perf") {
        Some(value) if !value.is_null() => {
            let raw_perf: RawPerf = serde_json::from_value(value.clone())?;
            coerce_perf(&raw_perf)?
        }
        _ => {
            warn!("Record has no perf interval, root will be untimed");
            Perf::default()
        }
    };

    let calls = extract_calls(obj)?;
    debug!("Parsed {} calls", calls.len());

    Ok(RunRecord {
        record_id,
        app_id,
        perf,
        calls,
    })
}

/// Read and parse a run record from a JSON file
///
/// **Public** - file front end for `parse_record`
pub fn read_record(input_path: impl AsRef<Path>) -> Result<RunRecord, ParseError> {
    let input_path = input_path.as_ref();

    debug!("Reading record from: {}", input_path.display());

    let file = std::fs::File::open(input_path)?;
    let raw: serde_json::Value = serde_json::from_reader(std::io::BufReader::new(file))?;

    parse_record(&raw)
}

/// Extract the call list
///
/// **Private** - internal extraction logic
fn extract_calls(
    obj: &serde_json::Map<String, serde_json::Value>,
) -> Result<Vec<InvocationRecord>, ParseError> {
    match obj.get("calls") {
        Some(serde_json::Value::Array(calls_array)) => parse_calls_array(calls_array),
        Some(other) => Err(ParseError::InvalidFormat(format!(
            "Record calls must be an array, found {}",
            other
        ))),
        None => Err(ParseError::InvalidFormat(
            "Record has no calls field".to_string(),
        )),
    }
}

/// Parse array of calls
///
/// **Private** - internal parsing logic
fn parse_calls_array(calls_array: &[serde_json::Value]) -> Result<Vec<InvocationRecord>, ParseError> {
    let mut calls = Vec::with_capacity(calls_array.len());

    for (index, call_value) in calls_array.iter().enumerate() {
        match parse_call(call_value) {
            Ok(call) => calls.push(call),
            Err(e) => {
                // Log but don't fail - one bad call should not hide the rest
                warn!("Failed to parse call {}: {}", index, e);
            }
        }
    }

    if calls.is_empty() && !calls_array.is_empty() {
        return Err(ParseError::InvalidFormat(
            "All calls failed to parse".to_string(),
        ));
    }

    Ok(calls)
}

/// Parse a single call
///
/// **Private** - internal parsing logic
fn parse_call(call_value: &serde_json::Value) -> Result<InvocationRecord, ParseError> {
    let raw: RawCall = serde_json::from_value(call_value.clone())?;

    let stack = raw
        .stack
        .iter()
        .map(parse_frame)
        .collect::<Result<Vec<_>, _>>()?;

    let perf = match &raw.perf {
        Some(p) => coerce_perf(p)?,
        None => Perf::default(),
    };

    Ok(InvocationRecord {
        stack,
        perf,
        args: raw.args,
        rets: raw.rets,
        error: raw.error,
    })
}

/// Obtain a frame's identity from a stack entry
///
/// **Public** - accepts the nested `method.obj.cls.name` form or a flat `name`
pub fn parse_frame(frame: &serde_json::Value) -> Result<StackFrame, ParseError> {
    let name = frame
        .pointer("/method/obj/cls/name")
        .and_then(|v| v.as_str())
        .or_else(|| frame.get("name").and_then(|v| v.as_str()))
        .ok_or_else(|| {
            ParseError::InvalidFormat(format!("Stack frame has no name: {}", frame))
        })?;

    let method = frame
        .pointer("/method/name")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Ok(StackFrame {
        name: name.to_string(),
        method,
    })
}

/// Coerce a raw timing pair
///
/// **Private** - absent or null ends stay absent
fn coerce_perf(raw: &RawPerf) -> Result<Perf, ParseError> {
    let coerce = |value: &Option<serde_json::Value>| match value {
        Some(v) if !v.is_null() => coerce_timestamp(v).map(Some),
        _ => Ok(None),
    };

    Ok(Perf {
        start_time: coerce(&raw.start_time)?,
        end_time: coerce(&raw.end_time)?,
    })
}

/// Coerce a JSON timestamp into an absolute time
///
/// **Public** - accepts ISO-8601 strings (naive values read as UTC)
/// and numeric Unix epoch seconds
pub fn coerce_timestamp(value: &serde_json::Value) -> Result<DateTime<Utc>, ParseError> {
    if let Some(s) = value.as_str() {
        parse_timestamp_str(s)
    } else if let Some(secs) = value.as_f64() {
        from_epoch_seconds(secs)
    } else {
        Err(ParseError::InvalidTimestamp(format!(
            "Expected string or number, found {}",
            value
        )))
    }
}

/// Parse timestamp from an ISO-8601 string
///
/// **Private** - internal utility
fn parse_timestamp_str(s: &str) -> Result<DateTime<Utc>, ParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ParseError::InvalidTimestamp(s.to_string()))
}

/// Convert fractional epoch seconds
///
/// **Private** - internal utility
fn from_epoch_seconds(secs: f64) -> Result<DateTime<Utc>, ParseError> {
    if !secs.is_finite() {
        return Err(ParseError::InvalidTimestamp(secs.to_string()));
    }

    let whole = secs.floor();
    let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);

    DateTime::<Utc>::from_timestamp(whole as i64, nanos)
        .ok_or_else(|| ParseError::InvalidTimestamp(secs.to_string()))
}
