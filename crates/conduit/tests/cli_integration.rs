//! CLI integration tests for the Conduit command-line interface.
//!
//! Every test that boots a registry passes `--config` with a temporary file
//! so no user or project config is picked up.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

const STORE: &str = r#"
[integrations.commerce]
currency = "EUR"
order_statuses = ["pending", "processing", "completed"]

[[integrations.commerce.customers]]
customer_id = 7
account_id = 42
email = "ada@example.com"

[[integrations.commerce.orders]]
order_id = 100
customer_id = 7
total = 30.0
status = "processing"
"#;

/// Get a command for the conduit binary.
fn conduit() -> Command {
    let mut cmd = Command::cargo_bin("conduit").unwrap();
    cmd.env_remove("CONDUIT_CONFIG").env("CONDUIT_LOG", "off");
    cmd
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// A conduit command booted from the sample store config.
fn with_store(file: &NamedTempFile) -> Command {
    let mut cmd = conduit();
    cmd.arg("--config").arg(file.path());
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    conduit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("catalog"))
        .stdout(predicate::str::contains("path"))
        .stdout(predicate::str::contains("fire"))
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("context"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_version_displays() {
    conduit()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("conduit"));
}

#[test]
fn test_missing_subcommand_fails() {
    conduit().assert().failure();
}

#[test]
fn test_missing_config_file_fails() {
    conduit()
        .args(["--config", "/nonexistent/conduit.toml", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog / Check
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_catalog_json() {
    let file = config_file(STORE);
    with_store(&file)
        .args(["--json", "catalog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"commerce.order\""))
        .stdout(predicate::str::contains("\"platform.visitor\""))
        .stdout(predicate::str::contains("\"commerce.order_status_changed\""));
}

#[test]
fn test_catalog_filtered_by_integration() {
    let file = config_file(STORE);
    with_store(&file)
        .args(["catalog", "--integration", "platform"])
        .assert()
        .success()
        .stdout(predicate::str::contains("platform.account_registered"))
        .stdout(predicate::str::contains("commerce.order_status_changed").not());
}

#[test]
fn test_check_ready() {
    let file = config_file(STORE);
    with_store(&file)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("● ready"));
}

#[test]
fn test_check_reports_dangling_references() {
    let file = config_file("[integrations.platform]\nenabled = false\n");
    with_store(&file)
        .args(["--json", "check"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"ok\": false"))
        .stdout(predicate::str::contains("platform.visitor"));
}

#[test]
fn test_invalid_config_rejected() {
    let file = config_file("[integrations.commerce]\norder_statuses = []\n");
    with_store(&file)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("order_statuses"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolution
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_path_multi_hop() {
    let file = config_file(STORE);
    with_store(&file)
        .args(["path", "commerce.abandoned_cart", "commerce.customer"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "commerce.abandoned_cart -> platform.visitor -> commerce.customer",
        ));
}

#[test]
fn test_path_not_found() {
    let file = config_file(STORE);
    with_store(&file)
        .args(["path", "commerce.customer", "platform.visitor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no transform path"));
}

#[test]
fn test_convert_identified_visitor() {
    let file = config_file(STORE);
    with_store(&file)
        .args([
            "--json",
            "convert",
            "platform.visitor",
            "commerce.customer",
            "--args",
            r#"{"session_id": "s-1", "account_id": 42}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"customer_id\": 7"))
        .stdout(predicate::str::contains("ada@example.com"));
}

#[test]
fn test_convert_anonymous_visitor_fails() {
    let file = config_file(STORE);
    with_store(&file)
        .args([
            "convert",
            "platform.visitor",
            "commerce.customer",
            "--args",
            r#"{"session_id": "s-1"}"#,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not signed in"));
}

#[test]
fn test_fire_respects_step_args() {
    let file = config_file(STORE);
    let payload = r#"{"order_id": 100, "from": "pending", "to": "processing"}"#;

    with_store(&file)
        .args(["--json", "fire", "commerce.order_status_changed", "--payload", payload])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"triggered\": true"))
        .stdout(predicate::str::contains("commerce.order_status_change"));

    with_store(&file)
        .args([
            "--json",
            "fire",
            "commerce.order_status_changed",
            "--payload",
            payload,
            "--step-args",
            r#"{"to": "completed"}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"triggered\": false"));
}

#[test]
fn test_fire_rejects_bad_payload() {
    let file = config_file(STORE);
    with_store(&file)
        .args(["fire", "commerce.order_status_changed", "--payload", "[1]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a JSON object"));
}

#[test]
fn test_context_for_commerce() {
    let file = config_file(STORE);
    with_store(&file)
        .args(["--json", "context", "commerce"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"currency\": \"EUR\""));
}

#[test]
fn test_context_unknown_integration() {
    let file = config_file(STORE);
    with_store(&file)
        .args(["context", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
