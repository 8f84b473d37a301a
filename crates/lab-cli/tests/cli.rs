// Binary-level tests for argument handling and failures that happen before
// any request reaches GitLab.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// `lab` isolated from the user's config, repository and editor settings
fn lab(sandbox: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lab").unwrap();
    cmd.current_dir(sandbox.path())
        .env("HOME", sandbox.path())
        .env("XDG_CONFIG_HOME", sandbox.path().join("config"))
        .env("TMPDIR", sandbox.path())
        .env("GIT_CEILING_DIRECTORIES", sandbox.path())
        .env_remove("LAB_CONFIG")
        .env_remove("LAB_CORE_HOST")
        .env_remove("LAB_CORE_TOKEN")
        .env_remove("LAB_CORE_REMOTE")
        .env_remove("LAB_EDITOR")
        .env_remove("LAB_LOG")
        .env_remove("GIT_EDITOR")
        .env_remove("VISUAL")
        .env_remove("EDITOR");
    cmd
}

#[test]
fn help_lists_commands() {
    let sandbox = TempDir::new().unwrap();
    lab(&sandbox)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("issue").and(predicate::str::contains("mr")));
}

#[test]
fn note_help_documents_reply_address() {
    let sandbox = TempDir::new().unwrap();
    lab(&sandbox)
        .args(["mr", "reply", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--quote").and(predicate::str::contains("--force-linebreak")));
}

#[test]
fn malformed_note_id_is_rejected() {
    let sandbox = TempDir::new().unwrap();
    lab(&sandbox)
        .args(["mr", "note", "4:abc", "-m", "hello"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Malformed ID"));
}

#[test]
fn too_many_positionals_are_rejected() {
    let sandbox = TempDir::new().unwrap();
    lab(&sandbox)
        .args(["issue", "note", "origin", "1", "2", "-m", "hello"])
        .assert()
        .failure();
}

#[test]
fn empty_message_file_aborts() {
    let sandbox = TempDir::new().unwrap();
    let message = sandbox.path().join("message.txt");
    fs::write(&message, "  \n\n").unwrap();

    lab(&sandbox)
        .args(["issue", "note", "1", "-F"])
        .arg(&message)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("aborting note due to empty note message"));
}

#[test]
fn missing_message_file_is_reported() {
    let sandbox = TempDir::new().unwrap();
    lab(&sandbox)
        .args(["issue", "note", "1", "-F", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.txt"));
}

#[cfg(unix)]
#[test]
fn untouched_editor_buffer_aborts() {
    let sandbox = TempDir::new().unwrap();
    lab(&sandbox)
        .env("GIT_EDITOR", "true")
        .args(["mr", "note", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("aborting note due to empty note message"));
}

#[test]
fn invalid_config_host_is_rejected() {
    let sandbox = TempDir::new().unwrap();
    let config = sandbox.path().join("lab.toml");
    fs::write(&config, "[core]\nhost = \"gitlab.example.org\"\n").unwrap();

    lab(&sandbox)
        .arg("--config")
        .arg(&config)
        .args(["mr", "note", "3", "-m", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration value"));
}

#[test]
fn since_requires_comments() {
    let sandbox = TempDir::new().unwrap();
    lab(&sandbox)
        .args(["mr", "show", "3", "--since", "2020-08-21"])
        .assert()
        .failure();
}
