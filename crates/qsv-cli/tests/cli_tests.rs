//! End-to-end tests that run the `qsv` binary.

use std::io::Write;
use std::process::{Command, Output};

use serde_json::Value;

fn qsv(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_qsv"))
        .args(args)
        .env_remove("QSV_THREADS")
        .output()
        .expect("failed to launch qsv")
}

fn run_json(args: &[&str]) -> Value {
    let mut full = vec!["run", "--format", "json"];
    full.extend_from_slice(args);
    let output = qsv(&full);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_bell_pair_json() {
    let report = run_json(&[
        "-q", "2", "-t", "2", "-g", "h:0", "-g", "cnot:0:1", "--shots", "400", "--seed", "5",
    ]);

    assert_eq!(report["num_qubits"], 2);
    assert_eq!(report["threads"], 2);
    assert_eq!(report["gates"], serde_json::json!(["h:0", "cnot:0:1"]));

    let probs = report["probabilities"].as_object().unwrap();
    assert_eq!(probs.len(), 2);
    assert!((probs["00"].as_f64().unwrap() - 0.5).abs() < 1e-5);
    assert!((probs["11"].as_f64().unwrap() - 0.5).abs() < 1e-5);

    let counts = report["counts"].as_object().unwrap();
    assert!(counts.keys().all(|k| k == "00" || k == "11"));
    let total: u64 = counts.values().map(|v| v.as_u64().unwrap()).sum();
    assert_eq!(total, 400);
}

#[test]
fn test_basis_state_sampling_is_deterministic() {
    let report = run_json(&["-q", "3", "-g", "x:2", "--shots", "50"]);
    assert_eq!(report["counts"], serde_json::json!({ "100": 50 }));
    assert_eq!(report["probabilities"], serde_json::json!({ "100": 1.0 }));
}

#[test]
fn test_seed_makes_sampling_reproducible() {
    let args = ["-q", "3", "-g", "h:0", "-g", "h:1", "-g", "h:2", "--seed", "99"];
    let a = run_json(&args);
    let b = run_json(&args);
    assert_eq!(a["counts"], b["counts"]);
}

#[test]
fn test_show_limits_probabilities() {
    let report = run_json(&["-q", "4", "-g", "h:0", "-g", "h:1", "-g", "h:3", "--show", "3"]);
    let probs = report["probabilities"].as_object().unwrap();
    assert_eq!(probs.len(), 3);
    assert!(probs.contains_key("0000"));
}

#[test]
fn test_out_of_range_gate_is_ignored() {
    let report = run_json(&["-q", "1", "-g", "x:5", "--shots", "10"]);
    assert_eq!(report["counts"], serde_json::json!({ "0": 10 }));
}

#[test]
fn test_config_file_is_applied() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"threads": 3, "pair_chunk": 2, "permutation_chunk": 2}}"#).unwrap();
    let path = file.path().to_str().unwrap();

    let report = run_json(&["-q", "5", "-g", "h:4", "-c", path, "--shots", "0"]);
    assert_eq!(report["threads"], 3);

    // Explicit flags win over the file.
    let report = run_json(&["-q", "5", "-c", path, "-t", "2", "--shots", "0"]);
    assert_eq!(report["threads"], 2);
}

#[test]
fn test_threads_from_environment() {
    let output = Command::new(env!("CARGO_BIN_EXE_qsv"))
        .args(["run", "-q", "2", "--format", "json", "--shots", "0"])
        .env("QSV_THREADS", "3")
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["threads"], 3);
}

#[test]
fn test_table_output() {
    let output = qsv(&["run", "-q", "2", "-g", "x:0", "--shots", "8"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Simulating 2 qubits"));
    assert!(stdout.contains("Probabilities:"));
    assert!(stdout.contains("01: 1.000000"));
    assert!(stdout.contains("Samples (8 shots)"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_invalid_gate_spec_fails() {
    let output = qsv(&["run", "-q", "2", "-g", "rx:0"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("rx:0"));
}

#[test]
fn test_missing_config_fails() {
    let output = qsv(&["run", "-q", "2", "-c", "/no/such/qsv.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("File not found"));
}

#[test]
fn test_invalid_config_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"pair_chunk": 0}}"#).unwrap();
    let output = qsv(&["run", "-q", "2", "-c", file.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("pair_chunk"));
}

#[test]
fn test_malformed_config_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    let output = qsv(&["run", "-q", "2", "-c", file.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to parse config"));
}

// ============================================================================
// version
// ============================================================================

#[test]
fn test_version_command() {
    let output = qsv(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    assert!(stdout.contains("qsv-core"));
}
