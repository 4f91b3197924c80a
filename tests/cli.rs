//! Binary tests: run the built collector as a child process.

use std::net::TcpListener;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

/// Run the collector with `args` and collect its output, killing it if it
/// is still running after `limit`.
fn run_collector(args: &[&str], limit: Duration) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_als-collector"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("ALS_CONFIG")
        .env_remove("ALS_LOG_FORMAT")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let deadline = Instant::now() + limit;
    while child.try_wait().unwrap().is_none() {
        if Instant::now() >= deadline {
            child.kill().unwrap();
            panic!("collector still running after {limit:?}");
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    child.wait_with_output().unwrap()
}

#[test]
fn test_exits_non_zero_when_port_is_taken() {
    // Same wildcard address the collector binds.
    let held = TcpListener::bind("0.0.0.0:0").unwrap();
    let port = held.local_addr().unwrap().port().to_string();

    let output = run_collector(&["--port", &port], Duration::from_secs(10));
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "exit status: {:?}", output.status);
    assert_eq!(output.status.code(), Some(1));

    let fatal: Vec<&str> = stderr.lines().filter(|line| line.contains("failed to listen on")).collect();
    assert_eq!(fatal.len(), 1, "stderr: {stderr}");
    assert!(fatal[0].contains(&format!(":{port}")), "stderr: {stderr}");
    assert!(output.stdout.is_empty());

    drop(held);
}

#[test]
fn test_rejects_non_numeric_port() {
    let output = run_collector(&["--port", "http"], Duration::from_secs(10));

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
