//! Everything derived from one capture, in the shape printed to stdout.

use brokerpulse::types::{Counter, MessageRates, QueueTotalsPoint};
use brokerpulse::{
    calculate_rates_from_samples, detect_counter_resets, extract_message_rates_with,
    extract_queue_totals, EnhancedMetrics, HealthEstimator, StatsSubject,
};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::capture::Capture;

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub enhanced: EnhancedMetrics,
    pub message_rates: Vec<MessageRates>,
    pub queue_totals: Vec<QueueTotalsPoint>,
    /// counter name -> timestamps where the counter went backwards
    pub counter_resets: BTreeMap<&'static str, Vec<i64>>,
}

impl ReplayReport {
    /// Latest publish rate in the series, if any.
    pub fn publish_now(&self) -> Option<f64> {
        self.message_rates.iter().rev().find_map(|r| r.publish)
    }
}

pub fn build_report(
    capture: Capture,
    estimator: &HealthEstimator,
    include_disk: bool,
) -> ReplayReport {
    let Capture { cluster, queue } = capture;

    let subject = match queue.as_ref() {
        Some(q) => StatsSubject::Queue(q),
        None => StatsSubject::Overview(&cluster.overview),
    };
    let message_rates = extract_message_rates_with(subject, include_disk);
    let queue_totals = extract_queue_totals(subject);

    let mut counter_resets = BTreeMap::new();
    if let Some(stats) = subject.message_stats() {
        let counters = Counter::MESSAGE_FLOW.iter().chain(Counter::DISK_IO.iter());
        for c in counters {
            let resets = detect_counter_resets(&calculate_rates_from_samples(stats.samples(*c)));
            if !resets.is_empty() {
                counter_resets.insert(c.as_str(), resets);
            }
        }
    }

    ReplayReport {
        enhanced: estimator.enhanced_metrics(cluster),
        message_rates,
        queue_totals,
        counter_resets,
    }
}
