// src/report.rs

use crate::redis::info::RawStatusMap;
use serde::Serialize;
use serde_json::Value;

/// Fixed-shape metrics record built from one INFO reply.
///
/// Every field is always present; a key the server did not report becomes
/// the field's default (0 / 0.0). Booleans (`aof_enabled`) stay 0/1 integers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsReport {
    pub connections: Connections,
    pub memory_usage: MemoryUsage,
    pub performance: Performance,
    pub persistence: Persistence,
    pub pubsub: Pubsub,
    pub cpu: Cpu,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Connections {
    pub connected_clients: i64,
    pub connection_errors: i64,
    pub connection_rate: i64,
    pub rejected_connections: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemoryUsage {
    pub used_memory: i64,
    pub used_memory_peak: i64,
    pub memory_fragmentation_ratio: f64,
    pub evicted_keys: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Performance {
    pub latency: f64,
    pub commands_per_second: i64,
    pub cache_hit_ratio: f64,
    pub total_commands_processed: i64,
    pub instantaneous_ops_per_sec: i64,
    pub keyspace_hits: i64,
    pub keyspace_misses: i64,
    pub command_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Persistence {
    pub rdb_last_save_time: i64,
    pub aof_enabled: i64,
    pub aof_last_rewrite_time_sec: i64,
    pub aof_delayed_fsyncs: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pubsub {
    pub pubsub_channels: i64,
    pub pubsub_patterns: i64,
}

/// Serialized as `"cpu": {"cpu": {...}}`; consumers read `metrics.cpu.cpu.*`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cpu {
    pub cpu: CpuUsage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuUsage {
    pub used_cpu_sys: f64,
    pub used_cpu_user: f64,
    pub used_cpu_sys_children: f64,
    pub used_cpu_user_children: f64,
    pub used_cpu_sys_main_thread: f64,
    pub used_cpu_user_main_thread: f64,
}

/// `(category, [(report field, INFO key)])`, in output order. Fields of
/// `cpu` sit one level deeper, see [`section`].
pub const FIELD_MAP: [(&str, &[(&str, &str)]); 6] = [
    (
        "connections",
        &[
            ("connected_clients", "connected_clients"),
            ("connection_errors", "rejected_connections"),
            ("connection_rate", "total_connections_received"),
            ("rejected_connections", "rejected_connections"),
        ],
    ),
    (
        "memory_usage",
        &[
            ("used_memory", "used_memory"),
            ("used_memory_peak", "used_memory_peak"),
            ("memory_fragmentation_ratio", "mem_fragmentation_ratio"),
            ("evicted_keys", "evicted_keys"),
        ],
    ),
    (
        "performance",
        &[
            ("latency", "latency"),
            ("commands_per_second", "instantaneous_ops_per_sec"),
            ("cache_hit_ratio", "cache_hit_ratio"),
            ("total_commands_processed", "total_commands_processed"),
            ("instantaneous_ops_per_sec", "instantaneous_ops_per_sec"),
            ("keyspace_hits", "keyspace_hits"),
            ("keyspace_misses", "keyspace_misses"),
            ("command_rate", "command_rate"),
        ],
    ),
    (
        "persistence",
        &[
            ("rdb_last_save_time", "rdb_last_save_time"),
            ("aof_enabled", "aof_enabled"),
            ("aof_last_rewrite_time_sec", "aof_last_rewrite_time_sec"),
            ("aof_delayed_fsyncs", "aof_delayed_fsync"),
        ],
    ),
    (
        "pubsub",
        &[
            ("pubsub_channels", "pubsub_channels"),
            ("pubsub_patterns", "pubsub_patterns"),
        ],
    ),
    (
        "cpu",
        &[
            ("used_cpu_sys", "used_cpu_sys"),
            ("used_cpu_user", "used_cpu_user"),
            ("used_cpu_sys_children", "used_cpu_sys_children"),
            ("used_cpu_user_children", "used_cpu_user_children"),
            ("used_cpu_sys_main_thread", "used_cpu_sys_main_thread"),
            ("used_cpu_user_main_thread", "used_cpu_user_main_thread"),
        ],
    ),
];

/// The object holding `category`'s fields inside a serialized report.
pub fn section<'a>(report: &'a Value, category: &str) -> &'a Value {
    match category {
        "cpu" => &report["cpu"]["cpu"],
        _ => &report[category],
    }
}

/// Pure mapping from an INFO reply to the fixed report.
///
/// No value is derived: `memory_fragmentation_ratio`, `cache_hit_ratio`,
/// `command_rate` and `latency` are copied when the server reports them and
/// are 0 otherwise. Values that cannot be coerced to the field type (e.g.
/// `2.5` into an integer field) fall back to the default as well.
pub fn extract(info: &RawStatusMap) -> MetricsReport {
    let int = |key: &str| info.get(key).and_then(|v| v.as_i64()).unwrap_or_default();
    let float = |key: &str| info.get(key).and_then(|v| v.as_f64()).unwrap_or_default();

    MetricsReport {
        connections: Connections {
            connected_clients: int("connected_clients"),
            connection_errors: int("rejected_connections"),
            connection_rate: int("total_connections_received"),
            rejected_connections: int("rejected_connections"),
        },
        memory_usage: MemoryUsage {
            used_memory: int("used_memory"),
            used_memory_peak: int("used_memory_peak"),
            memory_fragmentation_ratio: float("mem_fragmentation_ratio"),
            evicted_keys: int("evicted_keys"),
        },
        performance: Performance {
            latency: float("latency"),
            commands_per_second: int("instantaneous_ops_per_sec"),
            cache_hit_ratio: float("cache_hit_ratio"),
            total_commands_processed: int("total_commands_processed"),
            instantaneous_ops_per_sec: int("instantaneous_ops_per_sec"),
            keyspace_hits: int("keyspace_hits"),
            keyspace_misses: int("keyspace_misses"),
            command_rate: float("command_rate"),
        },
        persistence: Persistence {
            rdb_last_save_time: int("rdb_last_save_time"),
            aof_enabled: int("aof_enabled"),
            aof_last_rewrite_time_sec: int("aof_last_rewrite_time_sec"),
            aof_delayed_fsyncs: int("aof_delayed_fsync"),
        },
        pubsub: Pubsub {
            pubsub_channels: int("pubsub_channels"),
            pubsub_patterns: int("pubsub_patterns"),
        },
        cpu: Cpu {
            cpu: CpuUsage {
                used_cpu_sys: float("used_cpu_sys"),
                used_cpu_user: float("used_cpu_user"),
                used_cpu_sys_children: float("used_cpu_sys_children"),
                used_cpu_user_children: float("used_cpu_user_children"),
                used_cpu_sys_main_thread: float("used_cpu_sys_main_thread"),
                used_cpu_user_main_thread: float("used_cpu_user_main_thread"),
            },
        },
    }
}
