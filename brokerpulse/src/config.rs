//! Empirical constants behind the health heuristics, kept in one overridable structure.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TOTAL_MEMORY_BYTES: u64 = 8 * 1024 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Latency reported for an idle cluster, and the floor of the flow-based estimate.
    pub latency_baseline_ms: f64,
    /// Upper bound of the flow-based latency estimate.
    pub latency_ceiling_ms: f64,
    /// Upper bound of the connection/channel count proxy.
    pub latency_fallback_cap_ms: f64,
    /// Added per open connection or channel when there is no message flow.
    pub latency_per_client_ms: f64,
    /// Multiplier on `mem_limit` (the broker's high watermark) to estimate host memory.
    pub memory_limit_factor: f64,
    /// Multiplier on `mem_used` when `mem_limit` is unknown.
    pub memory_used_factor: f64,
    /// Returned when the node listing is not a list at all.
    pub default_total_memory_bytes: u64,
    /// CPU floor for every running node.
    pub cpu_running_baseline: f64,
    pub cpu_memory_weight: f64,
    pub cpu_socket_weight: f64,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            latency_baseline_ms: 1.2,
            latency_ceiling_ms: 100.0,
            latency_fallback_cap_ms: 50.0,
            latency_per_client_ms: 0.5,
            memory_limit_factor: 2.5,
            memory_used_factor: 3.33,
            default_total_memory_bytes: DEFAULT_TOTAL_MEMORY_BYTES,
            cpu_running_baseline: 5.0,
            cpu_memory_weight: 0.6,
            cpu_socket_weight: 0.4,
        }
    }
}
