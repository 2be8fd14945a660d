//! Small utilities to keep bounded per-signal history across watch ticks.

use brokerpulse::{EnhancedMetrics, HealthSignal};
use std::collections::VecDeque;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if dq.len() == cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

// One deque per health signal, in HealthSignal::ALL order
pub struct SignalHistory {
    deques: Vec<VecDeque<f64>>,
    cap: usize,
}

impl SignalHistory {
    pub fn new(cap: usize) -> Self {
        Self {
            deques: HealthSignal::ALL
                .iter()
                .map(|_| VecDeque::with_capacity(cap))
                .collect(),
            cap: cap.max(1),
        }
    }

    pub fn record(&mut self, m: &EnhancedMetrics) {
        for (i, s) in HealthSignal::ALL.iter().enumerate() {
            push_capped(&mut self.deques[i], m.signal(*s), self.cap);
        }
    }

    fn deque(&self, s: HealthSignal) -> &VecDeque<f64> {
        let i = HealthSignal::ALL
            .iter()
            .position(|k| *k == s)
            .unwrap_or_default();
        &self.deques[i]
    }

    pub fn peak(&self, s: HealthSignal) -> Option<f64> {
        self.deque(s).iter().copied().reduce(f64::max)
    }
}
