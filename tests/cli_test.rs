//! End-to-end tests for the hostprobe binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A probe command pointed at `dir`, isolated from the ambient environment.
fn probe_cmd(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(cargo_bin("hostprobe"));
    cmd.env_remove("HOSTPROBE_RESTRICTED_PATHS");
    cmd.env_remove("RUST_LOG");
    cmd.env("HOSTPROBE_DIR", dir);
    cmd
}

#[cfg(unix)]
fn set_mode(path: &std::path::Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

#[cfg(unix)]
fn octal_mode(path: &std::path::Path) -> u32 {
    use std::os::unix::fs::MetadataExt;
    fs::metadata(path).unwrap().mode() & 0o7777
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("hostprobe"));
    cmd.arg("--help");
    cmd.assert().success().stdout(predicate::str::contains(
        "file-ownership diagnostic probe",
    ));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("hostprobe"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_default_run_reports_and_exits_zero() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    set_mode(temp.path(), 0o700);

    // The test runs the probe it built, so process owner == file owner and
    // the identity heuristic must flag the match. Exit code stays 0: the
    // verdict is informational.
    probe_cmd(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[+] Running hostprobe"))
        .stdout(predicate::str::contains(
            "Is 'identity_introspection' available? T",
        ))
        .stdout(predicate::str::contains("Script permissions: 0"))
        .stdout(predicate::str::contains("File owner == Process owner"));
    Ok(())
}

#[test]
fn cli_missing_probe_dir_is_fatal_before_probing() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("hostprobe"));
    cmd.env("HOSTPROBE_DIR", "/nonexistent/probe/dir");
    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("[-]"))
        .stdout(predicate::str::contains("does not exist"))
        .stdout(predicate::str::contains("Running hostprobe").not());
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_json_report_is_machine_readable() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    set_mode(temp.path(), 0o700);

    let output = probe_cmd(temp.path())
        .args(["--format", "json"])
        .assert()
        .success()
        .get_output()
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["strategy"], "posix_identity");
    assert_eq!(report["owner_match"], true);
    assert_eq!(report["capabilities"]["code_evaluation"], false);
    assert_eq!(report["script"]["perms"].as_str().unwrap().len(), 4);
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_write_test_refuses_world_writable_dir() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    set_mode(temp.path(), 0o777);

    probe_cmd(temp.path())
        .args(["--strategy", "write-test"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Cannot run write test"))
        .stdout(predicate::str::contains("Test passed.").not())
        .stdout(predicate::str::contains("File owner == Process owner").not());

    set_mode(temp.path(), 0o700);
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_write_test_succeeds_and_leaves_no_artifact() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    set_mode(temp.path(), 0o700);

    probe_cmd(temp.path())
        .args(["--strategy", "write-test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("falling back to a write test"))
        .stdout(predicate::str::contains("File owner == Process owner"));

    assert_eq!(fs::read_dir(temp.path())?.count(), 0);
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_chmod_strategy_restores_original_mode() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    set_mode(temp.path(), 0o700);

    probe_cmd(temp.path())
        .args(["--strategy", "chmod"])
        .assert()
        .success()
        .stdout(predicate::str::contains("falling back to a chmod test"))
        .stdout(predicate::str::contains("File owner == Process owner"));

    assert_eq!(octal_mode(temp.path()), 0o700);
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_debug_flag_emits_debug_lines() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    set_mode(temp.path(), 0o700);

    probe_cmd(temp.path())
        .args(["--debug", "--strategy", "chmod"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[#] Trying to `chmod 0777"))
        .stdout(predicate::str::contains("[#] Reverting original permissions"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_without_debug_emits_no_debug_lines() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    set_mode(temp.path(), 0o700);

    probe_cmd(temp.path())
        .args(["--strategy", "chmod"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[#]").not());
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_restricted_paths_are_listed() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    set_mode(temp.path(), 0o700);
    let restricted = TempDir::new()?;
    fs::write(restricted.path().join("site.conf"), "x")?;

    probe_cmd(temp.path())
        .env("HOSTPROBE_RESTRICTED_PATHS", restricted.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Restricted path permissions:"))
        .stdout(predicate::str::contains("site.conf"));
    Ok(())
}

#[test]
fn cli_rejects_unknown_strategy() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("hostprobe"));
    cmd.args(["--strategy", "guesswork"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
    Ok(())
}
