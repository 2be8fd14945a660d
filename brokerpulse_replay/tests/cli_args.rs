//! CLI arg parsing tests for brokerpulse_replay
use std::process::Command;

fn run(args: &[&str]) -> (bool, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_brokerpulse_replay"))
        .args(args)
        .output()
        .expect("run brokerpulse_replay");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    (output.status.success(), text)
}

#[test]
fn test_help_mentions_short_and_long_flags() {
    let (ok, text) = run(&["--help"]);
    assert!(ok);
    for flag in [
        "--overview", "-o", "--nodes", "-n", "--queue", "-q", "--watch", "-w", "--signal",
        "--print-heuristics",
    ] {
        assert!(text.contains(flag), "help text missing {flag}\n{text}");
    }
}

#[test]
fn test_overview_is_required() {
    let (ok, text) = run(&["--nodes", "/tmp/nodes.json"]);
    assert!(ok, "argument errors exit cleanly");
    assert!(text.contains("--overview is required"), "{text}");
}

#[test]
fn test_unknown_signal_rejected() {
    let (_, text) = run(&["-o", "/tmp/overview.json", "--signal", "swap"]);
    assert!(text.contains("unknown signal 'swap'"), "{text}");
    assert!(text.contains("Usage:"));
}

#[test]
fn test_watch_needs_positive_seconds() {
    let (_, text) = run(&["-o", "/tmp/overview.json", "--watch=0"]);
    assert!(text.contains("--watch expects whole seconds"), "{text}");
    let (_, text) = run(&["-o", "/tmp/overview.json", "-w"]);
    assert!(text.contains("--watch needs a value"), "{text}");
}

#[test]
fn test_unexpected_argument() {
    let (_, text) = run(&["-o", "/tmp/overview.json", "amqp://guest@localhost"]);
    assert!(text.contains("Unexpected argument"), "{text}");
}
