//! Binary-level tests for the pomotimer CLI.
//!
//! These tests run the compiled binary:
//! - Help and completion output
//! - Error reporting when no daemon is listening
//! - A daemon process driven by separate CLI invocations

use std::path::Path;
use std::process::{Child, Command as StdCommand, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

fn pomotimer(socket_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pomotimer").unwrap();
    cmd.arg("--socket").arg(socket_path);
    cmd
}

/// Daemon child process, killed on drop.
struct DaemonProcess {
    child: Child,
}

impl DaemonProcess {
    fn spawn(socket_path: &Path) -> Self {
        let child = StdCommand::new(assert_cmd::cargo::cargo_bin("pomotimer"))
            .arg("--socket")
            .arg(socket_path)
            .arg("daemon")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !socket_path.exists() {
            assert!(Instant::now() < deadline, "daemon did not bind its socket");
            sleep(Duration::from_millis(10));
        }
        Self { child }
    }
}

impl Drop for DaemonProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

// ============================================================================
// Standalone Commands
// ============================================================================

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("pomotimer")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("toggle"))
        .stdout(predicate::str::contains("increase"))
        .stdout(predicate::str::contains("--socket"));
}

#[test]
fn test_completions_bash() {
    Command::cargo_bin("pomotimer")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pomotimer"));
}

#[test]
fn test_invalid_phase_rejected() {
    let dir = TempDir::new().unwrap();
    pomotimer(&dir.path().join("p.sock"))
        .args(["increase", "lunch"])
        .assert()
        .failure();
}

#[test]
fn test_status_without_daemon_fails() {
    let dir = TempDir::new().unwrap();
    pomotimer(&dir.path().join("missing.sock"))
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Cannot connect to daemon"));
}

#[test]
fn test_socket_from_environment() {
    let dir = TempDir::new().unwrap();
    let socket_path = dir.path().join("env.sock");

    Command::cargo_bin("pomotimer")
        .unwrap()
        .env("POMOTIMER_SOCKET", &socket_path)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("env.sock"));
}

// ============================================================================
// Daemon Workflow
// ============================================================================

#[test]
fn test_daemon_workflow() {
    let dir = TempDir::new().unwrap();
    let socket_path = dir.path().join("daemon.sock");
    let _daemon = DaemonProcess::spawn(&socket_path);

    pomotimer(&socket_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session"))
        .stdout(predicate::str::contains("25:00"))
        .stdout(predicate::str::contains("[Start]"));

    pomotimer(&socket_path)
        .args(["increase", "session"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Session length set to 26 min"));

    pomotimer(&socket_path)
        .args(["adjust", "break", "-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Break length set to 1 min"));

    pomotimer(&socket_path)
        .arg("toggle")
        .assert()
        .success()
        .stdout(predicate::str::contains("Timer started"));

    pomotimer(&socket_path)
        .args(["decrease", "session"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pause it first"));

    pomotimer(&socket_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("[Pause]"));

    pomotimer(&socket_path)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Timer reset"))
        .stdout(predicate::str::contains("25:00"));
}
