//! Checkpoint recording: snapshot capture, change detection, and the
//! append-only store.

pub mod detect;
pub mod store;

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;

pub use detect::{Snapshot, capture_snapshot, detect_changes};
pub use store::{CheckpointStore, StoreError};

use crate::config::TrackingPolicy;
use crate::error::BylineError;
use crate::gitio::run::GitRunner;
use crate::model::{AuthorKind, Checkpoint, FileSnapshot};

/// What a `record` invocation did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordOutcome {
    /// Number of files with a detected delta.
    pub files_changed: usize,

    /// Number of files in the captured snapshot.
    pub files_tracked: usize,

    /// True when this was the first checkpoint of the cycle — a baseline
    /// that records state, not changes.
    pub baseline: bool,
}

/// Capture the working tree and append an author-tagged checkpoint.
///
/// Modified files are diffed precisely between the previous checkpoint's
/// recorded blob and the current one; when that diff cannot be produced the
/// detector degrades to count-only evidence.
///
/// # Errors
/// Git and store failures are hard errors; nothing is appended on failure.
pub fn record_checkpoint(
    git: &dyn GitRunner,
    worktree: &Path,
    store: &CheckpointStore,
    policy: &TrackingPolicy,
    author: &str,
    kind: AuthorKind,
    metadata: BTreeMap<String, String>,
) -> Result<RecordOutcome, BylineError> {
    let snapshot = capture_snapshot(git, worktree, policy)?;
    let previous = store.load_all()?;
    let last_snapshot = previous.last().map(|cp| &cp.snapshot);

    let differ = |_path: &str, prev: &FileSnapshot, cur: &FileSnapshot| {
        git.run(&["diff", "--unified=0", &prev.hash, &cur.hash]).ok()
    };
    let changes = detect_changes(last_snapshot, &snapshot, differ);

    let outcome = RecordOutcome {
        files_changed: changes.len(),
        files_tracked: snapshot.len(),
        baseline: previous.is_empty(),
    };
    tracing::info!(
        author,
        %kind,
        files_changed = outcome.files_changed,
        baseline = outcome.baseline,
        "recording checkpoint"
    );

    store.append(&Checkpoint {
        recorded_at: Utc::now(),
        author: author.to_owned(),
        kind,
        metadata,
        changes,
        snapshot,
    })?;

    Ok(outcome)
}
