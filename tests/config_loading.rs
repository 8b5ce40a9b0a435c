//! Policy loading through the engine facade

use locus::config::{load_engine_config, POLICY_PATH_ENV};
use serial_test::serial;
use std::env;
use std::time::Duration;

fn clear_env() {
    env::remove_var(POLICY_PATH_ENV);
    env::remove_var("LOCUS_POLICY_OVERRIDE_JSON");
    env::remove_var("LOCUS_POLICY__EXECUTION__COMMAND_BUDGET_MS");
}

#[test]
#[serial]
fn defaults_without_file() {
    clear_env();
    let policy = load_engine_config(None).unwrap();
    assert_eq!(policy.command_budget(), Duration::from_secs(20));
    assert_eq!(policy.backoff().len(), 3);
    assert!(!policy.execution.verify_fill);
}

#[test]
#[serial]
fn file_from_env_then_env_overlay() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locus.yaml");
    std::fs::write(
        &path,
        "execution:\n  command_budget_ms: 15000\n  verify_fill: true\nretry:\n  backoff_ms: [500, 1000]\n",
    )
    .unwrap();
    env::set_var(POLICY_PATH_ENV, &path);
    env::set_var("LOCUS_POLICY__EXECUTION__COMMAND_BUDGET_MS", "12000");

    let policy = load_engine_config(None).unwrap();
    clear_env();

    assert_eq!(policy.command_budget(), Duration::from_secs(12));
    assert!(policy.execution.verify_fill);
    assert_eq!(
        policy.backoff(),
        vec![Duration::from_millis(500), Duration::from_secs(1)]
    );
}

#[test]
#[serial]
fn invalid_policy_is_rejected() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locus.yaml");
    std::fs::write(&path, "execution:\n  command_budget_ms: 0\n").unwrap();

    let err = load_engine_config(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("Failed to load engine policy"));
}
