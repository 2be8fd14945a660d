//! Watch loop: re-read the capture on a fixed cadence and print one summary line per tick.

use anyhow::Result;
use brokerpulse::{HealthEstimator, HealthSignal};
use tokio::time::{sleep, Duration};
use tracing::warn;

use crate::capture::{load_capture, CaptureFiles};
use crate::history::SignalHistory;
use crate::report::{build_report, ReplayReport};

pub struct WatchOptions {
    pub period: Duration,
    pub include_disk: bool,
    pub signal: Option<HealthSignal>,
}

pub async fn run_watch(
    files: &CaptureFiles,
    estimator: &HealthEstimator,
    opts: &WatchOptions,
) -> Result<()> {
    // ~1h of history at a 6s cadence
    let mut hist = SignalHistory::new(600);
    // one listener for the whole loop so an interrupt during a load isn't lost
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        // A capture being rewritten mid-read shows up as a parse error; skip the tick.
        match load_capture(files) {
            Ok(capture) => {
                let report = build_report(capture, estimator, opts.include_disk);
                hist.record(&report.enhanced);
                println!("{}", summary_line(&report, &hist, opts.signal));
            }
            Err(e) => warn!("skipping tick: {e:#}"),
        }

        tokio::select! {
            _ = sleep(opts.period) => {}
            _ = &mut ctrl_c => break,
        }
    }
    Ok(())
}

pub fn summary_line(
    report: &ReplayReport,
    hist: &SignalHistory,
    only: Option<HealthSignal>,
) -> String {
    let m = &report.enhanced;
    if let Some(s) = only {
        return format!("{}", m.signal(s));
    }
    let peak = |s: HealthSignal| hist.peak(s).unwrap_or_else(|| m.signal(s));
    format!(
        "{} | cpu {:.2}% (peak {:.2}) | disk {:.2}% | mem {:.2} GiB | latency {:.2} ms (peak {:.2}) | publish {:.2}/s",
        m.calculated_at.format("%H:%M:%S"),
        m.avg_cpu_usage,
        peak(HealthSignal::CpuUsage),
        m.disk_usage,
        m.total_memory_gb,
        m.avg_latency,
        peak(HealthSignal::Latency),
        report.publish_now().unwrap_or(0.0),
    )
}
