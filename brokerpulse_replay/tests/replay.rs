//! End-to-end replay of captured management API documents.
use assert_cmd::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

fn window(values: &[f64]) -> Value {
    let samples: Vec<Value> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let timestamp = 1_700_000_000_000_i64 + 5000 * i as i64;
            json!({ "sample": v, "timestamp": timestamp })
        })
        .collect();
    json!({ "rate": 0.0, "samples": samples })
}

fn write(dir: &Path, name: &str, v: &Value) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, serde_json::to_vec(v).unwrap()).unwrap();
    p
}

struct Fixture {
    dir: tempfile::TempDir,
    overview: PathBuf,
    nodes: PathBuf,
    connections: PathBuf,
    channels: PathBuf,
    queue: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let overview = write(
        dir.path(),
        "overview.json",
        &json!({
            "cluster_name": "rabbit@test",
            "message_stats": {
                "publish_details": { "rate": 100.0, "samples": window(&[0.0, 500.0, 1000.0])["samples"] },
                "deliver_details": { "rate": 50.0, "samples": window(&[0.0, 250.0, 100.0])["samples"] },
                "ack_details": window(&[0.0, 200.0, 400.0]),
                "disk_writes_details": window(&[0.0, 50.0, 100.0])
            },
            "queue_totals": {
                "messages_details": window(&[10.0, 20.0, 30.0]),
                "messages_ready_details": window(&[8.0, 15.0, 25.0]),
                "messages_unacknowledged_details": window(&[2.0, 5.0, 5.0])
            }
        }),
    );
    let nodes = write(
        dir.path(),
        "nodes.json",
        &json!([{
            "name": "rabbit@a",
            "mem_used": 400_000_000u64,
            "mem_limit": 1_000_000_000u64,
            "disk_free": 60,
            "disk_free_limit": 100,
            "sockets_used": 10,
            "sockets_total": 100,
            "running": true
        }]),
    );
    let connections = write(dir.path(), "connections.json", &json!([{ "state": "running" }]));
    let channels = write(dir.path(), "channels.json", &json!([{ "state": "running" }, { "state": "flow" }]));
    let queue = write(
        dir.path(),
        "queue.json",
        &json!({
            "name": "orders",
            "vhost": "/",
            "messages_details": window(&[3.0, 4.0]),
            "message_stats": { "publish_details": window(&[0.0, 50.0]) }
        }),
    );
    Fixture {
        dir,
        overview,
        nodes,
        connections,
        channels,
        queue,
    }
}

fn replay(f: &Fixture, extra: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("brokerpulse_replay").expect("binary exists");
    cmd.env("XDG_CONFIG_HOME", f.dir.path())
        .arg("-o")
        .arg(&f.overview)
        .arg("-n")
        .arg(&f.nodes)
        .arg("-c")
        .arg(&f.connections)
        .arg("-C")
        .arg(&f.channels)
        .args(extra);
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let out = cmd.output().expect("run replay");
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    serde_json::from_slice(&out.stdout).expect("stdout is JSON")
}

#[test]
fn one_shot_report_from_overview() {
    let f = fixture();
    let report = stdout_json(&mut replay(&f, &[]));

    let enhanced = &report["enhanced"];
    assert_eq!(enhanced["totalMemoryBytes"], json!(2_500_000_000u64));
    assert_eq!(enhanced["diskUsage"], json!(40.0));
    assert_eq!(enhanced["avgLatency"], json!(50.6));
    assert_eq!(enhanced["overview"]["cluster_name"], json!("rabbit@test"));
    assert_eq!(enhanced["channels"].as_array().map(Vec::len), Some(2));

    let rates = report["message_rates"].as_array().expect("rates");
    assert_eq!(rates.len(), 3);
    assert_eq!(rates[1]["publish"], json!(100.0));
    assert_eq!(rates[2]["ack"], json!(40.0));
    assert!(rates[2].get("disk_writes").is_none());

    let totals = report["queue_totals"].as_array().expect("totals");
    assert_eq!(totals[2]["messages"], json!(30.0));
    assert_eq!(totals[2]["messages_ready"], json!(25.0));

    assert_eq!(report["counter_resets"]["deliver"], json!([1_700_000_010_000_i64]));
    assert!(report["counter_resets"].get("publish").is_none());
}

#[test]
fn disk_flag_adds_disk_rates() {
    let f = fixture();
    let report = stdout_json(&mut replay(&f, &["--disk"]));
    assert_eq!(report["message_rates"][2]["disk_writes"], json!(10.0));
}

#[test]
fn queue_subject_replaces_overview_series() {
    let f = fixture();
    let q = f.queue.to_string_lossy().to_string();
    let report = stdout_json(&mut replay(&f, &["--queue", &q]));
    let rates = report["message_rates"].as_array().expect("rates");
    assert_eq!(rates.len(), 2);
    assert_eq!(rates[1]["publish"], json!(10.0));
    let totals = report["queue_totals"].as_array().expect("totals");
    assert_eq!(totals[1]["messages"], json!(4.0));
    assert_eq!(totals[1]["messages_unacknowledged"], json!(0.0));
}

#[test]
fn single_signal_output() {
    let f = fixture();
    let out = replay(&f, &["--signal", "disk"]).output().expect("run replay");
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "40");
}

#[test]
fn non_array_nodes_fall_back_to_default_memory() {
    let f = fixture();
    write(f.dir.path(), "nodes.json", &json!({ "error": "not_authorized" }));
    let report = stdout_json(&mut replay(&f, &[]));
    assert_eq!(report["enhanced"]["totalMemoryBytes"], json!(8_589_934_592u64));
    assert_eq!(report["enhanced"]["totalMemoryGB"], json!(8.0));
    assert_eq!(report["enhanced"]["avgCpuUsage"], json!(0.0));
}

#[test]
fn missing_capture_file_is_an_error() {
    let f = fixture();
    fs::remove_file(&f.overview).unwrap();
    let out = replay(&f, &[]).output().expect("run replay");
    assert!(!out.status.success());
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("overview.json"), "{err}");
}

#[test]
fn heuristics_from_config_dir_and_flag() {
    let f = fixture();
    let cfg = f.dir.path().join("brokerpulse");
    fs::create_dir_all(&cfg).unwrap();
    write(&cfg, "heuristics.json", &json!({ "memory_limit_factor": 2.0 }));
    let report = stdout_json(&mut replay(&f, &[]));
    assert_eq!(report["enhanced"]["totalMemoryBytes"], json!(2_000_000_000u64));

    let explicit = write(f.dir.path(), "h.json", &json!({ "memory_limit_factor": 3.0 }));
    let explicit = explicit.to_string_lossy().to_string();
    let report = stdout_json(&mut replay(&f, &["--heuristics", &explicit]));
    assert_eq!(report["enhanced"]["totalMemoryBytes"], json!(3_000_000_000u64));

    // invalid overrides are ignored
    write(&cfg, "heuristics.json", &json!("not an object"));
    let report = stdout_json(&mut replay(&f, &[]));
    assert_eq!(report["enhanced"]["totalMemoryBytes"], json!(2_500_000_000u64));
}

#[test]
fn print_heuristics_merges_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("brokerpulse");
    fs::create_dir_all(&cfg).unwrap();
    write(&cfg, "heuristics.json", &json!({ "cpu_running_baseline": 7.5 }));
    let mut cmd = Command::cargo_bin("brokerpulse_replay").unwrap();
    cmd.env("XDG_CONFIG_HOME", dir.path()).arg("--print-heuristics");
    let h = stdout_json(&mut cmd);
    assert_eq!(h["cpu_running_baseline"], json!(7.5));
    assert_eq!(h["memory_limit_factor"], json!(2.5));
    assert_eq!(h["default_total_memory_bytes"], json!(8_589_934_592u64));
}

#[test]
fn watch_mode_prints_summary_lines() {
    let f = fixture();
    let child = replay(&f, &["--watch", "1"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn replay");
    let pid = child.id();

    // Let at least one tick run, then stop the process
    std::thread::sleep(Duration::from_millis(1500));
    let _ = Command::new("kill").arg(pid.to_string()).status();
    let out = child.wait_with_output().expect("wait replay");

    let text = String::from_utf8_lossy(&out.stdout);
    let first = text.lines().next().unwrap_or_default();
    assert!(first.contains("cpu 33.00%"), "{text}");
    assert!(first.contains("latency 50.60 ms"), "{text}");
    assert!(first.contains("publish 100.00/s"), "{text}");
}

#[test]
fn watch_mode_exits_cleanly_on_interrupt() {
    let f = fixture();
    let child = replay(&f, &["--watch", "1"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn replay");
    let pid = child.id();

    std::thread::sleep(Duration::from_millis(1500));
    let _ = Command::new("kill").args(["-INT", &pid.to_string()]).status();
    let out = child.wait_with_output().expect("wait replay");

    assert!(out.status.success(), "interrupt should end the loop normally: {:?}", out.status);
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.lines().count() >= 1, "{text}");
}
