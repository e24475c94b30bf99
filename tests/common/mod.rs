//! Shared test helpers for byline integration tests.
//!
//! All tests use temp directories — no side effects on the real repo.
//! Each test gets its own git repo via `setup_repo()`.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Create a fresh git repo in a temp directory with one initial commit.
pub fn setup_repo() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");

    git(dir.path(), &["init"]);
    git(dir.path(), &["config", "user.name", "Test"]);
    git(dir.path(), &["config", "user.email", "test@test.com"]);
    git(dir.path(), &["config", "commit.gpgsign", "false"]);

    std::fs::write(dir.path().join("README.md"), "# test repo\n").expect("write README");
    git(dir.path(), &["add", "README.md"]);
    git(dir.path(), &["commit", "-m", "initial"]);

    dir
}

/// Run a git command in `root`, asserting success, returning trimmed stdout.
pub fn git(root: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(args)
        .current_dir(root)
        .output()
        .expect("failed to run git");
    assert!(
        out.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).trim().to_owned()
}

/// Write a file under the repo, creating parent directories.
pub fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(full, content).expect("write file");
}

/// A file body of `count` numbered lines, each `prefix N`.
pub fn numbered_lines(prefix: &str, count: u32) -> String {
    (1..=count)
        .map(|n| format!("{prefix} {n}\n"))
        .collect::<String>()
}

/// Stage everything and commit, returning the full commit hash.
pub fn commit_all(root: &Path, message: &str) -> String {
    git(root, &["add", "-A"]);
    git(root, &["commit", "-m", message]);
    git(root, &["rev-parse", "HEAD"])
}
