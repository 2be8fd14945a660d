//! Entry point for brokerpulse_replay. Parses args, loads a capture and prints derived metrics.

mod capture;
mod history;
mod report;
mod settings;
mod watch;

use anyhow::Result;
use brokerpulse::{HealthEstimator, HealthSignal};
use capture::{load_capture, CaptureFiles};
use report::build_report;
use std::env;
use std::path::PathBuf;
use tokio::time::Duration;
use watch::{run_watch, WatchOptions};

const USAGE_FLAGS: &str = "[--overview FILE|-o FILE] [--nodes FILE|-n FILE] [--connections FILE|-c FILE] [--channels FILE|-C FILE] [--queue FILE|-q FILE] [--disk] [--signal NAME|-s NAME] [--heuristics FILE] [--watch SECS|-w SECS] [--pretty] [--print-heuristics]";

#[derive(Debug, Default)]
struct ParsedArgs {
    files: CaptureFiles,
    disk: bool,
    signal: Option<HealthSignal>,
    heuristics: Option<PathBuf>,
    watch_secs: Option<u64>,
    pretty: bool,
    print_heuristics: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "brokerpulse_replay".into());
    let usage = format!("Usage: {prog} {USAGE_FLAGS}");
    let mut out = ParsedArgs::default();
    let mut overview: Option<PathBuf> = None;

    while let Some(arg) = it.next() {
        // Accept both "--flag value" and "--flag=value"
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String, String> {
            inline
                .clone()
                .or_else(|| it.next())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| format!("{name} needs a value. {usage}"))
        };
        match flag.as_str() {
            "-h" | "--help" => return Err(usage),
            "--overview" | "-o" => overview = Some(value("--overview")?.into()),
            "--nodes" | "-n" => out.files.nodes = Some(value("--nodes")?.into()),
            "--connections" | "-c" => out.files.connections = Some(value("--connections")?.into()),
            "--channels" | "-C" => out.files.channels = Some(value("--channels")?.into()),
            "--queue" | "-q" => out.files.queue = Some(value("--queue")?.into()),
            "--heuristics" => out.heuristics = Some(value("--heuristics")?.into()),
            "--signal" | "-s" => {
                let v = value("--signal")?;
                out.signal = Some(v.parse().map_err(|e| format!("{e}. {usage}"))?);
            }
            "--watch" | "-w" => {
                let v = value("--watch")?;
                let secs = v
                    .parse::<u64>()
                    .ok()
                    .filter(|s| *s > 0)
                    .ok_or_else(|| format!("--watch expects whole seconds > 0. {usage}"))?;
                out.watch_secs = Some(secs);
            }
            "--disk" => out.disk = true,
            "--pretty" => out.pretty = true,
            "--print-heuristics" => out.print_heuristics = true,
            _ => return Err(format!("Unexpected argument '{arg}'. {usage}")),
        }
    }

    match overview {
        Some(p) => out.files.overview = p,
        None if out.print_heuristics => {}
        None => return Err(format!("--overview is required. {usage}")),
    }
    Ok(out)
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn to_json<T: serde::Serialize>(v: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(v)?
    } else {
        serde_json::to_string(v)?
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };
    init_logging();

    let heuristics = settings::load_heuristics(parsed.heuristics.as_deref());
    if parsed.print_heuristics {
        println!("{}", to_json(&heuristics, parsed.pretty)?);
        return Ok(());
    }
    let estimator = HealthEstimator::new(heuristics);

    if let Some(secs) = parsed.watch_secs {
        let opts = WatchOptions {
            period: Duration::from_secs(secs),
            include_disk: parsed.disk,
            signal: parsed.signal,
        };
        return run_watch(&parsed.files, &estimator, &opts).await;
    }

    let report = build_report(load_capture(&parsed.files)?, &estimator, parsed.disk);
    match parsed.signal {
        Some(s) => println!("{}", report.enhanced.signal(s)),
        None => println!("{}", to_json(&report, parsed.pretty)?),
    }
    Ok(())
}
