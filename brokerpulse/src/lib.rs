//! Metrics derivation and health estimation for message-broker management API snapshots.
//!
//! Every function here is pure and total: no I/O, no shared state, no panics on partial data.
//! A poller supplies snapshots; the results feed charts and threshold alerts.

pub mod aggregate;
pub mod config;
pub mod enhanced;
pub mod health;
pub mod rates;
pub mod types;

pub use aggregate::{
    extract_message_rates, extract_message_rates_from_stats, extract_message_rates_with,
    extract_queue_totals, process_metric_samples, process_queue_total_samples, StatsSubject,
};
pub use config::Heuristics;
pub use enhanced::{calculate_enhanced_metrics, EnhancedMetrics, HealthSignal};
pub use health::HealthEstimator;
pub use rates::{calculate_rates_from_samples, detect_counter_resets};
