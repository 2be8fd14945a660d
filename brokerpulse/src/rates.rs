//! Per-second rates from cumulative counter samples.

use crate::types::{RatePoint, RateSample};

/// Round to two decimal places, the precision charts and alert thresholds work in.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Convert one counter's samples into a per-second rate series.
///
/// Samples are sorted by timestamp first (stable, so equal timestamps keep their input order).
/// The first point is always 0. A non-positive time step also yields 0. Decreasing counters
/// (broker restart, stats reset) produce negative rates; see [`detect_counter_resets`].
pub fn calculate_rates_from_samples(samples: &[RateSample]) -> Vec<RatePoint> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by_key(|s| s.timestamp);

    let mut out = Vec::with_capacity(sorted.len());
    out.push(RatePoint {
        timestamp: sorted[0].timestamp,
        rate: 0.0,
    });
    for pair in sorted.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        // f64 step: i64 subtraction overflows on far-apart timestamps
        let dt = (cur.timestamp as f64 - prev.timestamp as f64) / 1000.0;
        let rate = if dt <= 0.0 {
            0.0
        } else {
            round2((cur.sample - prev.sample) / dt)
        };
        out.push(RatePoint {
            timestamp: cur.timestamp,
            rate,
        });
    }
    out
}

/// Timestamps at which a derived rate went negative, i.e. the counter moved backwards.
pub fn detect_counter_resets(points: &[RatePoint]) -> Vec<i64> {
    points
        .iter()
        .filter(|p| p.rate < 0.0)
        .map(|p| p.timestamp)
        .collect()
}
