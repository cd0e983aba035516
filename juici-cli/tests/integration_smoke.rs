//! Smoke tests for command wiring
//!
//! Remote tiers are left unconfigured, so everything below runs against
//! the local fallback file in a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ALICE: &str = "11111111-1111-1111-1111-111111111111";

/// `juici` isolated from the caller's environment and dotfiles.
fn juici(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("juici").unwrap();
    cmd.current_dir(temp.path())
        .env("HOME", temp.path())
        .env("JUICI_DATA_FILE", temp.path().join("favorites.json"))
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_SERVICE_ROLE_KEY")
        .env_remove("SUPABASE_ANON_KEY")
        .env_remove("DATABASE_URL")
        .env_remove("JUICI_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

// === Help Tests ===

#[test]
fn test_favorites_add_help() {
    let mut cmd = Command::cargo_bin("juici").unwrap();
    cmd.arg("favorites").arg("add").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Prompt text to save"));
}

#[test]
fn test_profile_update_help() {
    let mut cmd = Command::cargo_bin("juici").unwrap();
    cmd.arg("profile").arg("update").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--full-name"));
}

#[test]
fn test_query_help() {
    let mut cmd = Command::cargo_bin("juici").unwrap();
    cmd.arg("query").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Positional parameter"));
}

#[test]
fn test_status_help_points_to_probe() {
    let mut cmd = Command::cargo_bin("juici").unwrap();
    cmd.arg("status").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("juici probe"));
}

// === Fallback Tier Tests ===

#[test]
fn test_status_lists_memory_tier_only() {
    let temp = TempDir::new().unwrap();

    juici(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"memory\""))
        .stdout(predicate::str::contains("supabase").not());
}

#[test]
fn test_add_then_list_uses_fallback_file() {
    let temp = TempDir::new().unwrap();

    juici(&temp)
        .args(["favorites", "add", "--user", ALICE, "--prompt", "Build a widget"])
        .args(["--category", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": 1"));

    let output = juici(&temp)
        .args(["favorites", "list", "--user", ALICE])
        .output()
        .unwrap();
    assert!(output.status.success());

    let favorites: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(favorites.as_array().unwrap().len(), 1);
    assert_eq!(favorites[0]["categories"], serde_json::json!(["web"]));

    assert!(temp.path().join("favorites.json").exists());
}

#[test]
fn test_dangerous_query_is_rejected() {
    let temp = TempDir::new().unwrap();

    juici(&temp)
        .args(["query", "--sql", "DROP TABLE favorites"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid query"));
}

#[test]
fn test_profile_update_requires_a_field() {
    let temp = TempDir::new().unwrap();

    juici(&temp)
        .args(["profile", "update", ALICE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to update"));
}

#[test]
fn test_config_path_from_dotenv_is_honored() {
    let temp = TempDir::new().unwrap();
    let data_file = temp.path().join("from-config.json");
    let config_file = temp.path().join("juici.toml");
    std::fs::write(
        &config_file,
        format!("data_file = {:?}\n", data_file.to_string_lossy()),
    )
    .unwrap();
    std::fs::write(
        temp.path().join(".env"),
        format!("JUICI_CONFIG={}\n", config_file.display()),
    )
    .unwrap();

    juici(&temp)
        .env_remove("JUICI_DATA_FILE")
        .args(["favorites", "add", "--user", ALICE, "--prompt", "from dotenv"])
        .assert()
        .success();

    assert!(data_file.exists());
    assert!(!temp.path().join("favorites.json").exists());
}
