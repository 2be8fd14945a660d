//! Heuristic cluster health estimates from partial node/connection/channel telemetry.
//!
//! None of these are measurements. They are stable, bounded composites meant for dashboards
//! and threshold alerts, and each one degrades to a fallback when authoritative fields are
//! missing instead of failing.

use tracing::debug;

use crate::config::Heuristics;
use crate::rates::round2;
use crate::types::{rate_of, ChannelSnapshot, ConnectionSnapshot, NodeSnapshot, OverviewSnapshot};

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const MIN_LATENCY_MS: f64 = 0.01;

#[derive(Debug, Clone, Default)]
pub struct HealthEstimator {
    heuristics: Heuristics,
}

impl HealthEstimator {
    pub fn new(heuristics: Heuristics) -> Self {
        Self { heuristics }
    }

    pub fn heuristics(&self) -> &Heuristics {
        &self.heuristics
    }

    /// Estimated end-to-end latency in milliseconds.
    ///
    /// With message flow, latency grows with the share of published messages not being
    /// delivered, from the baseline up to the ceiling. Without flow, open connections and
    /// channels stand in as a load proxy (capped). An idle cluster reports the baseline.
    pub fn average_latency(
        &self,
        overview: &OverviewSnapshot,
        connections: &[ConnectionSnapshot],
        channels: &[ChannelSnapshot],
    ) -> f64 {
        let h = &self.heuristics;
        let stats = overview.message_stats.as_ref();
        let publish = rate_of(stats.and_then(|s| s.publish_details.as_ref())).max(0.0);
        let deliver = rate_of(stats.and_then(|s| s.deliver_details.as_ref())).max(0.0);

        if publish > 0.0 || deliver > 0.0 {
            let backlog = if publish > 0.0 {
                ((publish - deliver) / publish).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let latency =
                h.latency_baseline_ms + backlog * (h.latency_ceiling_ms - h.latency_baseline_ms);
            return round2(latency.min(h.latency_ceiling_ms).max(MIN_LATENCY_MS));
        }

        let clients = connections.len() + channels.len();
        if clients > 0 {
            debug!(clients, "no message flow; estimating latency from client count");
            let proxy = h.latency_baseline_ms + clients as f64 * h.latency_per_client_ms;
            return round2(proxy.min(h.latency_fallback_cap_ms));
        }

        h.latency_baseline_ms
    }

    /// Average disk pressure (0..=100) across nodes that report enough to judge it.
    pub fn disk_usage(&self, nodes: &[NodeSnapshot]) -> f64 {
        let readings: Vec<f64> = nodes.iter().filter_map(node_disk_pressure).collect();
        average(&readings)
    }

    /// Estimated addressable memory across the cluster, in bytes.
    /// `None` means the node listing was malformed; the configured default is returned.
    pub fn total_memory_bytes(&self, nodes: Option<&[NodeSnapshot]>) -> u64 {
        let h = &self.heuristics;
        let Some(nodes) = nodes else {
            debug!("node listing is not a list; using default total memory");
            return h.default_total_memory_bytes;
        };

        let total: f64 = nodes
            .iter()
            .map(|n| match (n.mem_limit, n.mem_used) {
                (Some(limit), _) if limit > 0 => limit as f64 * h.memory_limit_factor,
                (_, Some(used)) if used > 0 => {
                    debug!(node = ?n.name, "mem_limit missing; scaling mem_used");
                    used as f64 * h.memory_used_factor
                }
                _ => 0.0,
            })
            .sum();
        total.max(0.0).round() as u64
    }

    /// Average CPU estimate (0..=100): memory and socket pressure blended per node,
    /// plus a floor for running nodes.
    pub fn average_cpu_usage(&self, nodes: &[NodeSnapshot]) -> f64 {
        let per_node: Vec<f64> = nodes.iter().map(|n| self.node_cpu(n)).collect();
        average(&per_node)
    }

    fn node_cpu(&self, node: &NodeSnapshot) -> f64 {
        let h = &self.heuristics;
        let blended = match (memory_pressure(node), socket_pressure(node)) {
            (Some(m), Some(s)) => {
                let weight = h.cpu_memory_weight + h.cpu_socket_weight;
                if weight > 0.0 {
                    (m * h.cpu_memory_weight + s * h.cpu_socket_weight) / weight
                } else {
                    0.0
                }
            }
            (Some(m), None) => m,
            (None, Some(s)) => s,
            (None, None) => 0.0,
        };

        let mut cpu = blended.clamp(0.0, 1.0) * 100.0;
        if node.running == Some(true) {
            cpu += h.cpu_running_baseline;
        }
        cpu.clamp(0.0, 100.0)
    }
}

/// Convert bytes to GiB at two decimals.
pub fn bytes_to_gib(bytes: u64) -> f64 {
    round2(bytes as f64 / BYTES_PER_GIB)
}

fn node_disk_pressure(node: &NodeSnapshot) -> Option<f64> {
    match (node.disk_free, node.disk_free_limit) {
        (Some(free), Some(limit)) if limit > 0 => Some(percent(1.0 - free as f64 / limit as f64)),
        _ => {
            let mem = memory_pressure(node)?;
            debug!(node = ?node.name, "disk fields missing; using memory pressure");
            Some(percent(mem))
        }
    }
}

fn memory_pressure(node: &NodeSnapshot) -> Option<f64> {
    match (node.mem_used, node.mem_limit) {
        (Some(used), Some(limit)) if limit > 0 => Some(used as f64 / limit as f64),
        _ => None,
    }
}

fn socket_pressure(node: &NodeSnapshot) -> Option<f64> {
    match (node.sockets_used, node.sockets_total) {
        (Some(used), Some(total)) if total > 0 => Some(used as f64 / total as f64),
        _ => None,
    }
}

fn percent(ratio: f64) -> f64 {
    (ratio * 100.0).clamp(0.0, 100.0)
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    round2(values.iter().sum::<f64>() / values.len() as f64)
}
