//! End-to-end tests running the dvln binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A dvln command with a clean environment and an empty home directory
fn dvln_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dvln").expect("Failed to find dvln binary");
    cmd.env_clear().env("HOME", home.path());
    cmd
}

// ============================================================================
// Exit values and diagnostics
// ============================================================================

#[test]
fn test_no_subcommand_is_an_issue() {
    let home = TempDir::new().unwrap();
    dvln_cmd(&home)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Issue #2001: Please use a valid subcommand"));
}

#[test]
fn test_unknown_flag_is_reported() {
    let home = TempDir::new().unwrap();
    dvln_cmd(&home)
        .arg("--baloney")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Issue #2000: Error: unexpected argument '--baloney'"));
}

#[test]
fn test_unknown_subcommand_is_reported() {
    let home = TempDir::new().unwrap();
    dvln_cmd(&home)
        .arg("frobnicate")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Issue #2000: Error:"))
        .stdout(predicate::str::contains("Please run 'dvln help' for usage"));
}

#[test]
fn test_serve_is_fatal() {
    let home = TempDir::new().unwrap();
    dvln_cmd(&home)
        .arg("--serve")
        .assert()
        .code(1)
        .stdout(predicate::eq("Fatal #2008: Serve mode is not available yet\n"));
}

// ============================================================================
// Help and version
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    dvln_cmd(&home)
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available Commands:"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_json_help_is_valid_json() {
    let home = TempDir::new().unwrap();
    let output = dvln_cmd(&home)
        .env("USER", "pat")
        .args(["--look=json", "--help"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["data"]["kind"], "usage");
    assert_eq!(parsed["data"]["items"][0]["userId"], "pat");
}

#[test]
fn test_version_variants() {
    let home = TempDir::new().unwrap();
    let version = env!("CARGO_PKG_VERSION");

    dvln_cmd(&home)
        .args(["version", "--terse"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("Version: {}\n", version)));

    dvln_cmd(&home)
        .arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::contains("API Rev: 0.1"))
        .stdout(predicate::str::contains("Build Date:"));

    dvln_cmd(&home)
        .args(["-v", "version"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exec Name:"));
}

// ============================================================================
// Settings sources
// ============================================================================

#[test]
fn test_environment_feeds_the_settings_dump() {
    let home = TempDir::new().unwrap();
    dvln_cmd(&home)
        .env("DVLN_DEVLINE", "proj_env")
        .args(["--globs=cfg", "-t"])
        .assert()
        .success()
        .stdout(predicate::str::contains("devline:\n  Value: proj_env\n"));
}

#[test]
fn test_config_file_is_below_the_command_line() {
    let home = TempDir::new().unwrap();
    let cfg_dir = home.path().join(".dvlncfg");
    std::fs::create_dir_all(&cfg_dir).unwrap();
    std::fs::write(cfg_dir.join("cfg.yaml"), "codebase: prod_cfg\ndevline: proj_cfg\n").unwrap();

    dvln_cmd(&home)
        .args(["get", "-d", "proj_cli"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Getting packages from codebase prod_cfg, devline proj_cli",
        ));
}

#[test]
fn test_bad_globs_value() {
    let home = TempDir::new().unwrap();
    dvln_cmd(&home)
        .arg("--globs=bogus")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Issue #2005:"));
}

#[test]
fn test_temp_record_note_on_stderr() {
    let home = TempDir::new().unwrap();
    let output = dvln_cmd(&home)
        .args(["--record=tmp", "pull", "-d", "proj_x"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let path = stderr
        .lines()
        .find_map(|line| line.strip_prefix("Note: Temp output logfile: "))
        .expect("temp logfile note");
    let logged = std::fs::read_to_string(path).unwrap();
    assert!(logged.contains("Pulling packages based on devline proj_x"));
    let _ = std::fs::remove_file(path);
}
