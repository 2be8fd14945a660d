//! Multi-counter rate merging and queue depth series.

use std::collections::BTreeMap;

use tracing::debug;

use crate::rates::calculate_rates_from_samples;
use crate::types::{
    samples_of, Counter, MessageRates, MessageStats, OverviewSnapshot, QueueSnapshot,
    QueueTotalsPoint, RateSample,
};

/// What the caller fetched: the cluster overview or one queue.
#[derive(Debug, Clone, Copy)]
pub enum StatsSubject<'a> {
    Overview(&'a OverviewSnapshot),
    Queue(&'a QueueSnapshot),
}

impl<'a> StatsSubject<'a> {
    pub fn message_stats(&self) -> Option<&'a MessageStats> {
        match self {
            StatsSubject::Overview(o) => o.message_stats.as_ref(),
            StatsSubject::Queue(q) => q.message_stats.as_ref(),
        }
    }
}

/// Derive rates for each counter and merge them into one series ordered by timestamp.
/// Each counter's rate lands on the timestamp it was sampled at.
pub fn process_metric_samples(series: &[(Counter, &[RateSample])]) -> Vec<MessageRates> {
    let mut merged: BTreeMap<i64, MessageRates> = BTreeMap::new();
    for (counter, samples) in series {
        for point in calculate_rates_from_samples(samples) {
            merged
                .entry(point.timestamp)
                .or_insert_with(|| MessageRates::at(point.timestamp))
                .set(*counter, point.rate);
        }
    }
    merged.into_values().collect()
}

/// Publish/deliver/ack rates (plus disk I/O when asked) from one stats envelope.
/// No publish samples means no data: the result is empty.
pub fn extract_message_rates_from_stats(
    stats: &MessageStats,
    include_disk_metrics: bool,
) -> Vec<MessageRates> {
    if stats.samples(Counter::Publish).is_empty() {
        debug!("message_stats carries no publish samples");
        return Vec::new();
    }

    let mut series: Vec<(Counter, &[RateSample])> = Counter::MESSAGE_FLOW
        .iter()
        .map(|c| (*c, stats.samples(*c)))
        .collect();
    if include_disk_metrics {
        series.extend(Counter::DISK_IO.iter().map(|c| (*c, stats.samples(*c))));
    }
    process_metric_samples(&series)
}

pub fn extract_message_rates(subject: StatsSubject<'_>) -> Vec<MessageRates> {
    extract_message_rates_with(subject, false)
}

pub fn extract_message_rates_with(
    subject: StatsSubject<'_>,
    include_disk_metrics: bool,
) -> Vec<MessageRates> {
    match subject.message_stats() {
        Some(stats) => extract_message_rates_from_stats(stats, include_disk_metrics),
        None => Vec::new(),
    }
}

/// Re-expose raw depth values as a series aligned to `total`.
/// Companion series are matched by index; a missing entry contributes 0.
pub fn process_queue_total_samples(
    total: &[RateSample],
    ready: &[RateSample],
    unacked: &[RateSample],
) -> Vec<QueueTotalsPoint> {
    total
        .iter()
        .enumerate()
        .map(|(i, s)| QueueTotalsPoint {
            timestamp: s.timestamp,
            messages: s.sample,
            messages_ready: ready.get(i).map(|r| r.sample).unwrap_or(0.0),
            messages_unacknowledged: unacked.get(i).map(|u| u.sample).unwrap_or(0.0),
        })
        .collect()
}

pub fn extract_queue_totals(subject: StatsSubject<'_>) -> Vec<QueueTotalsPoint> {
    let (total, ready, unacked) = match subject {
        StatsSubject::Overview(o) => match o.queue_totals.as_ref() {
            Some(t) => (
                samples_of(t.messages_details.as_ref()),
                samples_of(t.messages_ready_details.as_ref()),
                samples_of(t.messages_unacknowledged_details.as_ref()),
            ),
            None => return Vec::new(),
        },
        StatsSubject::Queue(q) => (
            samples_of(q.messages_details.as_ref()),
            samples_of(q.messages_ready_details.as_ref()),
            samples_of(q.messages_unacknowledged_details.as_ref()),
        ),
    };
    process_queue_total_samples(total, ready, unacked)
}
