// src/redis/slowlog.rs

use chrono::{DateTime, SecondsFormat, Utc};
use redis::Value;
use serde::Serialize;

/// One decoded `SLOWLOG GET` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlowlogEntry {
    pub id: i64,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub duration_ms: f64,
    pub command: String,
    pub client_address: String,
    pub client_name: String,
}

/// Decode a `SLOWLOG GET` reply.
///
/// Each entry is `[id, unix_ts, duration_us, [argv...], client_addr, client_name]`;
/// the last two only exist on Redis >= 4.0 and default to empty. Entries
/// with an unexpected shape are skipped.
pub fn parse_slowlog(v: &Value) -> Vec<SlowlogEntry> {
    match v {
        Value::Array(entries) => entries.iter().filter_map(parse_entry).collect(),
        _ => Vec::new(),
    }
}

fn parse_entry(v: &Value) -> Option<SlowlogEntry> {
    let Value::Array(parts) = v else {
        return None;
    };

    let id = value_to_i64(parts.first()?)?;
    let start = value_to_i64(parts.get(1)?)?;
    let duration_us = value_to_i64(parts.get(2)?)?;

    let command = match parts.get(3)? {
        Value::Array(args) => args
            .iter()
            .filter_map(value_to_string)
            .collect::<Vec<_>>()
            .join(" "),
        other => value_to_string(other)?,
    };

    let client_address = parts.get(4).and_then(value_to_string).unwrap_or_default();
    let client_name = parts.get(5).and_then(value_to_string).unwrap_or_default();

    Some(SlowlogEntry {
        id,
        timestamp: format_unix(start),
        duration_ms: duration_us as f64 / 1000.0,
        command,
        client_address,
        client_name,
    })
}

fn format_unix(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| secs.to_string())
}

fn value_to_string(v: &Value) -> Option<String> {
    match v {
        Value::BulkString(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Value::SimpleString(s) => Some(s.clone()),
        Value::Int(n) => Some(n.to_string()),
        Value::Okay => Some("OK".into()),
        _ => None,
    }
}

fn value_to_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Int(n) => Some(*n),
        Value::BulkString(bytes) => std::str::from_utf8(bytes).ok()?.parse::<i64>().ok(),
        Value::SimpleString(s) => s.parse::<i64>().ok(),
        _ => None,
    }
}
