//! Types that mirror the broker management API JSON, plus the derived series the engine emits.
//! Every field the API may omit is optional or defaulted; nothing here rejects a partial document.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

// ---------- Inbound: polled snapshots ----------

/// One cumulative-counter reading. `timestamp` is epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSample {
    pub sample: f64,
    #[serde(deserialize_with = "timestamp_ms")]
    pub timestamp: i64,
}

/// Epoch milliseconds written as any JSON number; floats are rounded to the nearest millisecond.
fn timestamp_ms<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let n = Number::deserialize(d)?;
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    n.as_f64()
        .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
        .map(|f| f.round() as i64)
        .ok_or_else(|| de::Error::custom(format!("timestamp {n} is out of range")))
}

/// Sample window where entries that don't decode are dropped instead of failing the document.
fn lenient_samples<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<RateSample>, D::Error> {
    let items = match Value::deserialize(d)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|v| serde_json::from_value::<RateSample>(v).ok())
        .filter(|s| s.sample.is_finite())
        .collect())
}

/// A `*_details` block: the broker's own instantaneous rate plus the sample window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateDetails {
    pub rate: f64,
    #[serde(deserialize_with = "lenient_samples")]
    pub samples: Vec<RateSample>,
}

/// Samples of an optional details block; absent reads as empty.
pub fn samples_of(details: Option<&RateDetails>) -> &[RateSample] {
    details.map(|d| d.samples.as_slice()).unwrap_or(&[])
}

/// Instantaneous rate of an optional details block; absent reads as zero.
pub fn rate_of(details: Option<&RateDetails>) -> f64 {
    details.map(|d| d.rate).unwrap_or(0.0)
}

/// The `message_stats` envelope shared by the overview and queue documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_details: Option<RateDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deliver: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deliver_details: Option<RateDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack_details: Option<RateDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_reads: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_reads_details: Option<RateDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_writes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_writes_details: Option<RateDetails>,
}

impl MessageStats {
    pub fn details(&self, counter: Counter) -> Option<&RateDetails> {
        match counter {
            Counter::Publish => self.publish_details.as_ref(),
            Counter::Deliver => self.deliver_details.as_ref(),
            Counter::Ack => self.ack_details.as_ref(),
            Counter::DiskReads => self.disk_reads_details.as_ref(),
            Counter::DiskWrites => self.disk_writes_details.as_ref(),
        }
    }

    pub fn samples(&self, counter: Counter) -> &[RateSample] {
        samples_of(self.details(counter))
    }
}

/// Cluster-wide queue depth block (`queue_totals` in the overview).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueTotals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_details: Option<RateDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_ready: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_ready_details: Option<RateDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_unacknowledged: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_unacknowledged_details: Option<RateDetails>,
}

/// Cluster-wide overview document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverviewSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rabbitmq_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_stats: Option<MessageStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_totals: Option<QueueTotals>,
}

/// Single-queue document. Depth details live at the top level instead of under `queue_totals`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSnapshot {
    pub name: String,
    pub vhost: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_details: Option<RateDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_ready: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_ready_details: Option<RateDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_unacknowledged: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_unacknowledged_details: Option<RateDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_stats: Option<MessageStats>,
}

/// Broker node telemetry. Any field may be missing depending on broker version and permissions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_free: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_free_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sockets_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sockets_total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Everything one polling tick hands to the health estimator.
/// `nodes` is `None` when the node listing was not a JSON array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterSnapshot {
    pub overview: OverviewSnapshot,
    pub nodes: Option<Vec<NodeSnapshot>>,
    pub connections: Vec<ConnectionSnapshot>,
    pub channels: Vec<ChannelSnapshot>,
}

/// Interpret an arbitrary JSON value as a node listing.
/// Non-arrays give `None`; array elements that don't look like nodes are skipped.
pub fn nodes_from_value(value: &Value) -> Option<Vec<NodeSnapshot>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|v| serde_json::from_value::<NodeSnapshot>(v.clone()).ok())
            .collect(),
    )
}

// ---------- Outbound: derived series ----------

/// Per-second rate derived from two consecutive samples; signed, two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub timestamp: i64,
    pub rate: f64,
}

/// Named cumulative counters carried in `message_stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    Publish,
    Deliver,
    Ack,
    DiskReads,
    DiskWrites,
}

impl Counter {
    pub const MESSAGE_FLOW: [Counter; 3] = [Counter::Publish, Counter::Deliver, Counter::Ack];
    pub const DISK_IO: [Counter; 2] = [Counter::DiskReads, Counter::DiskWrites];

    pub fn as_str(self) -> &'static str {
        match self {
            Counter::Publish => "publish",
            Counter::Deliver => "deliver",
            Counter::Ack => "ack",
            Counter::DiskReads => "disk_reads",
            Counter::DiskWrites => "disk_writes",
        }
    }
}

/// Rates for every counter observed at one timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageRates {
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliver: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_reads: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_writes: Option<f64>,
}

impl MessageRates {
    pub fn at(timestamp: i64) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    pub fn get(&self, counter: Counter) -> Option<f64> {
        match counter {
            Counter::Publish => self.publish,
            Counter::Deliver => self.deliver,
            Counter::Ack => self.ack,
            Counter::DiskReads => self.disk_reads,
            Counter::DiskWrites => self.disk_writes,
        }
    }

    pub fn set(&mut self, counter: Counter, rate: f64) {
        let slot = match counter {
            Counter::Publish => &mut self.publish,
            Counter::Deliver => &mut self.deliver,
            Counter::Ack => &mut self.ack,
            Counter::DiskReads => &mut self.disk_reads,
            Counter::DiskWrites => &mut self.disk_writes,
        };
        *slot = Some(rate);
    }
}

/// Raw queue depth values aligned to the total-messages sample timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueueTotalsPoint {
    pub timestamp: i64,
    pub messages: f64,
    pub messages_ready: f64,
    pub messages_unacknowledged: f64,
}
