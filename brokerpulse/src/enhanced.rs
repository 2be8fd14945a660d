//! The composed per-tick result handed to charts, dashboards and the alert evaluator.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::health::{bytes_to_gib, HealthEstimator};
use crate::types::{
    ChannelSnapshot, ClusterSnapshot, ConnectionSnapshot, NodeSnapshot, OverviewSnapshot,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedMetrics {
    pub overview: OverviewSnapshot,
    pub nodes: Vec<NodeSnapshot>,
    pub connections: Vec<ConnectionSnapshot>,
    pub channels: Vec<ChannelSnapshot>,
    pub avg_latency: f64,
    pub disk_usage: f64,
    pub total_memory_bytes: u64,
    #[serde(rename = "totalMemoryGB")]
    pub total_memory_gb: f64,
    pub avg_cpu_usage: f64,
    pub calculated_at: DateTime<Utc>,
}

impl EnhancedMetrics {
    pub fn signal(&self, kind: HealthSignal) -> f64 {
        match kind {
            HealthSignal::Latency => self.avg_latency,
            HealthSignal::DiskUsage => self.disk_usage,
            HealthSignal::MemoryBytes => self.total_memory_bytes as f64,
            HealthSignal::MemoryGb => self.total_memory_gb,
            HealthSignal::CpuUsage => self.avg_cpu_usage,
        }
    }
}

/// Scalar fields an alert rule can compare against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthSignal {
    Latency,
    DiskUsage,
    MemoryBytes,
    MemoryGb,
    CpuUsage,
}

impl HealthSignal {
    pub const ALL: [HealthSignal; 5] = [
        HealthSignal::Latency,
        HealthSignal::DiskUsage,
        HealthSignal::MemoryBytes,
        HealthSignal::MemoryGb,
        HealthSignal::CpuUsage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HealthSignal::Latency => "latency",
            HealthSignal::DiskUsage => "disk",
            HealthSignal::MemoryBytes => "memory_bytes",
            HealthSignal::MemoryGb => "memory_gb",
            HealthSignal::CpuUsage => "cpu",
        }
    }
}

impl fmt::Display for HealthSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSignal(pub String);

impl fmt::Display for UnknownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = HealthSignal::ALL.iter().map(|s| s.as_str()).collect();
        write!(f, "unknown signal '{}' (expected one of: {})", self.0, names.join(", "))
    }
}

impl std::error::Error for UnknownSignal {}

impl FromStr for HealthSignal {
    type Err = UnknownSignal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        HealthSignal::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| UnknownSignal(s.to_string()))
    }
}

impl HealthEstimator {
    /// Run every estimate over one tick's snapshot, stamped with the current time.
    pub fn enhanced_metrics(&self, snapshot: ClusterSnapshot) -> EnhancedMetrics {
        self.enhanced_metrics_at(snapshot, Utc::now())
    }

    pub fn enhanced_metrics_at(
        &self,
        snapshot: ClusterSnapshot,
        calculated_at: DateTime<Utc>,
    ) -> EnhancedMetrics {
        let ClusterSnapshot {
            overview,
            nodes,
            connections,
            channels,
        } = snapshot;

        let total_memory_bytes = self.total_memory_bytes(nodes.as_deref());
        let nodes = nodes.unwrap_or_default();

        EnhancedMetrics {
            avg_latency: self.average_latency(&overview, &connections, &channels),
            disk_usage: self.disk_usage(&nodes),
            total_memory_bytes,
            total_memory_gb: bytes_to_gib(total_memory_bytes),
            avg_cpu_usage: self.average_cpu_usage(&nodes),
            calculated_at,
            overview,
            nodes,
            connections,
            channels,
        }
    }
}

/// Enhanced metrics with the default heuristics.
pub fn calculate_enhanced_metrics(snapshot: ClusterSnapshot) -> EnhancedMetrics {
    HealthEstimator::default().enhanced_metrics(snapshot)
}
