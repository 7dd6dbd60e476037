#![cfg(windows)]

//! End-to-end queries against live processes.

use std::path::Path;
use std::process::{Child, Command, Stdio};

use proccwd::{cwd_by_pid, CwdError};

/// Spawns a short-lived helper process with an explicit working directory.
fn spawn_in(dir: &Path) -> Child {
    Command::new("cmd.exe")
        .args(["/C", "ping", "-n", "30", "127.0.0.1"])
        .current_dir(dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn helper process")
}

fn canonical(path: impl AsRef<Path>) -> std::path::PathBuf {
    std::fs::canonicalize(path).expect("canonicalize")
}

#[test]
fn own_process_cwd_matches_environment() {
    let cwd = cwd_by_pid(std::process::id()).expect("own process");

    assert_eq!(cwd.as_wide().len(), cwd.char_len() + 1);
    assert_eq!(*cwd.as_wide().last().unwrap(), 0);
    assert!(!cwd.as_wide()[..cwd.char_len()].contains(&0));

    assert_eq!(
        canonical(cwd.to_os_string()),
        canonical(std::env::current_dir().unwrap())
    );
}

#[test]
fn spawned_child_reports_explicit_cwd() {
    let dir = std::env::temp_dir();
    let mut child = spawn_in(&dir);

    let result = cwd_by_pid(child.id());
    let _ = child.kill();
    let _ = child.wait();

    let cwd = result.expect("child process");
    assert_eq!(canonical(cwd.to_os_string()), canonical(&dir));
}

#[test]
fn drive_root_cwd_is_minimal_but_non_empty() {
    let root = Path::new("C:\\");
    let mut child = spawn_in(root);

    let result = cwd_by_pid(child.id());
    let _ = child.kill();
    let _ = child.wait();

    let cwd = result.expect("child process");
    assert!(cwd.char_len() > 0);
    assert_eq!(canonical(cwd.to_os_string()), canonical(root));
}

#[test]
fn reserved_and_absent_pids_fail_cleanly() {
    assert!(matches!(
        cwd_by_pid(0),
        Err(CwdError::ProcessOpen { pid: 0, .. })
    ));

    // PIDs are multiples of four; this one is far outside any real table.
    assert!(cwd_by_pid(0xFFFF_FFF0).is_err());
}

#[test]
fn repeated_queries_are_idempotent() {
    let dir = std::env::temp_dir();
    let mut child = spawn_in(&dir);

    let first = cwd_by_pid(child.id()).expect("child process");
    for _ in 0..50 {
        let next = cwd_by_pid(child.id()).expect("stable process");
        assert_eq!(next.as_wide(), first.as_wide());
    }

    let _ = child.kill();
    let _ = child.wait();
}

#[test]
fn handle_churn_across_many_calls() {
    // Alternating failing and succeeding queries; the RAII handle wrapper
    // must release every handle, so thousands of rounds stay stable.
    let pid = std::process::id();
    for _ in 0..2000 {
        assert!(cwd_by_pid(0).is_err());
        assert!(cwd_by_pid(pid).is_ok());
    }
}
