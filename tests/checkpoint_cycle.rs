//! Integration tests for checkpoint recording over a real git repository.
//!
//! Covers the baseline-then-diff cycle: snapshot capture, whole-file
//! additions, precise blob-to-blob diffs for modifications, and deletions.

mod common;

use std::collections::BTreeMap;

use byline::checkpoint::{CheckpointStore, record_checkpoint};
use byline::config::{BylineConfig, TrackingPolicy};
use byline::gitio::SystemGit;
use byline::model::{AuthorKind, LineRange};

use common::{numbered_lines, setup_repo, write};

fn default_policy() -> TrackingPolicy {
    BylineConfig::default()
        .tracking
        .compile()
        .expect("default tracking config compiles")
}

fn store_for(git: &SystemGit) -> CheckpointStore {
    CheckpointStore::in_git_dir(&git.git_dir().expect("git dir"))
}

fn record(
    git: &SystemGit,
    store: &CheckpointStore,
    author: &str,
    kind: AuthorKind,
) -> byline::checkpoint::RecordOutcome {
    record_checkpoint(
        git,
        git.root(),
        store,
        &default_policy(),
        author,
        kind,
        BTreeMap::new(),
    )
    .expect("record checkpoint")
}

#[test]
fn first_checkpoint_is_a_baseline_with_no_changes() {
    let repo = setup_repo();
    let git = SystemGit::new(repo.path());
    let store = store_for(&git);

    let outcome = record(&git, &store, "alice", AuthorKind::Human);
    assert!(outcome.baseline);
    assert_eq!(outcome.files_changed, 0);
    assert_eq!(outcome.files_tracked, 1); // README.md

    let all = store.load_all().expect("load checkpoints");
    assert_eq!(all.len(), 1);
    assert!(all[0].changes.is_empty());
    assert_eq!(all[0].snapshot.len(), 1);
    assert!(all[0].snapshot.contains_key("README.md"));
}

#[test]
fn new_file_is_a_whole_file_addition() {
    let repo = setup_repo();
    let git = SystemGit::new(repo.path());
    let store = store_for(&git);

    record(&git, &store, "alice", AuthorKind::Human);
    write(repo.path(), "src/app.go", &numbered_lines("line", 10));
    let outcome = record(&git, &store, "alice", AuthorKind::Human);

    assert!(!outcome.baseline);
    assert_eq!(outcome.files_changed, 1);

    let all = store.load_all().expect("load checkpoints");
    let change = &all[1].changes["src/app.go"];
    assert_eq!(change.added, 10);
    assert_eq!(change.deleted, 0);
    assert_eq!(change.lines, vec![LineRange::Span(1, 10)]);
}

#[test]
fn appended_lines_get_precise_ranges_from_blob_diff() {
    let repo = setup_repo();
    let git = SystemGit::new(repo.path());
    let store = store_for(&git);

    write(repo.path(), "src/app.go", &numbered_lines("line", 10));
    record(&git, &store, "alice", AuthorKind::Human);

    // Append five lines; the first ten are untouched.
    let mut content = numbered_lines("line", 10);
    content.push_str(&numbered_lines("extra", 5));
    write(repo.path(), "src/app.go", &content);
    let outcome = record(&git, &store, "claude", AuthorKind::Ai);

    assert_eq!(outcome.files_changed, 1);
    let all = store.load_all().expect("load checkpoints");
    let change = &all[1].changes["src/app.go"];
    assert_eq!(change.added, 5);
    assert_eq!(change.deleted, 0);
    assert_eq!(change.lines, vec![LineRange::Span(11, 15)]);
}

#[test]
fn rewritten_middle_lines_are_located_precisely() {
    let repo = setup_repo();
    let git = SystemGit::new(repo.path());
    let store = store_for(&git);

    write(repo.path(), "src/app.go", &numbered_lines("line", 10));
    record(&git, &store, "alice", AuthorKind::Human);

    let mut lines: Vec<String> = (1..=10).map(|n| format!("line {n}")).collect();
    lines[4] = "rewritten 5".to_owned();
    lines[5] = "rewritten 6".to_owned();
    write(repo.path(), "src/app.go", &(lines.join("\n") + "\n"));
    record(&git, &store, "claude", AuthorKind::Ai);

    let all = store.load_all().expect("load checkpoints");
    let change = &all[1].changes["src/app.go"];
    assert_eq!(change.added, 2);
    assert_eq!(change.deleted, 2);
    assert_eq!(change.lines, vec![LineRange::Span(5, 6)]);
}

#[test]
fn deleted_file_is_a_whole_file_deletion() {
    let repo = setup_repo();
    let git = SystemGit::new(repo.path());
    let store = store_for(&git);

    write(repo.path(), "src/app.go", &numbered_lines("line", 10));
    record(&git, &store, "alice", AuthorKind::Human);

    std::fs::remove_file(repo.path().join("src/app.go")).expect("remove file");
    let outcome = record(&git, &store, "alice", AuthorKind::Human);

    assert_eq!(outcome.files_changed, 1);
    let all = store.load_all().expect("load checkpoints");
    let change = &all[1].changes["src/app.go"];
    assert_eq!(change.added, 0);
    assert_eq!(change.deleted, 10);
    assert!(change.lines.is_empty());
}

#[test]
fn untouched_files_never_appear_in_changes() {
    let repo = setup_repo();
    let git = SystemGit::new(repo.path());
    let store = store_for(&git);

    record(&git, &store, "alice", AuthorKind::Human);
    write(repo.path(), "src/app.go", &numbered_lines("line", 3));
    record(&git, &store, "alice", AuthorKind::Human);

    let all = store.load_all().expect("load checkpoints");
    // README.md was captured in both snapshots but never changed.
    assert!(!all[1].changes.contains_key("README.md"));
    assert!(all[1].snapshot.contains_key("README.md"));
}

#[test]
fn untracked_extensions_stay_out_of_the_snapshot() {
    let repo = setup_repo();
    let git = SystemGit::new(repo.path());
    let store = store_for(&git);

    write(repo.path(), "blob.bin", "\u{0}\u{1}\u{2}");
    let outcome = record(&git, &store, "alice", AuthorKind::Human);

    assert_eq!(outcome.files_tracked, 1); // README.md only
    let all = store.load_all().expect("load checkpoints");
    assert!(!all[0].snapshot.contains_key("blob.bin"));
}
