//! Authorship log construction and commit finalization.

pub mod builder;
pub mod classify;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, Utc};

pub use builder::{build_log, compose_from_checkpoints};
pub use classify::AuthorPolicy;

use crate::checkpoint::{CheckpointStore, record_checkpoint};
use crate::config::TrackingPolicy;
use crate::error::BylineError;
use crate::gitio::notes::NoteStore;
use crate::gitio::numstat::commit_diff;
use crate::gitio::run::GitRunner;
use crate::model::AuthorKind;

// ---------------------------------------------------------------------------
// FinalizeContext
// ---------------------------------------------------------------------------

/// Everything a finalization run needs, bundled so callers wire it up once.
pub struct FinalizeContext<'a> {
    pub git: &'a dyn GitRunner,
    pub worktree: &'a Path,
    pub store: &'a CheckpointStore,
    pub notes: &'a NoteStore<'a>,
    pub policy: &'a TrackingPolicy,
    pub default_author: &'a str,
    pub default_kind: AuthorKind,
}

/// What a finalization run produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// A validated log was attached to the commit.
    Persisted {
        /// Full commit hash.
        commit: String,
        /// Number of attributed files.
        files: usize,
        /// Number of distinct contributing authors.
        authors: usize,
    },

    /// The commit touched no tracked files; no note was written.
    NothingToAttribute {
        /// Full commit hash.
        commit: String,
    },
}

// ---------------------------------------------------------------------------
// finalize_commit
// ---------------------------------------------------------------------------

/// Reconcile pending checkpoints against a commit's diff, persist the
/// resulting authorship note, and start the next checkpoint cycle.
///
/// The pending checkpoints are consumed either way: the commit is what they
/// were leading up to. After clearing, a fresh baseline checkpoint of the
/// just-committed state is recorded so the next cycle's first edit has a
/// reference to diff against.
///
/// # Errors
/// Git and store failures abort before anything is persisted; a log that
/// fails validation is never written.
pub fn finalize_commit(
    ctx: &FinalizeContext<'_>,
    commit_ish: &str,
) -> Result<FinalizeOutcome, BylineError> {
    let commit = ctx.git.run(&["rev-parse", "--verify", commit_ish])?;
    let committed_at = commit_timestamp(ctx.git, &commit);
    let diff = commit_diff(ctx.git, &commit)?;
    let checkpoints = ctx.store.load_all()?;

    let log = build_log(
        &commit,
        committed_at,
        &checkpoints,
        &diff,
        ctx.policy,
        ctx.default_author,
        ctx.default_kind,
    );

    let outcome = if log.files.is_empty() {
        tracing::info!(%commit, "commit touched no tracked files; skipping note");
        FinalizeOutcome::NothingToAttribute {
            commit: commit.clone(),
        }
    } else {
        log.validate()?;
        ctx.notes.put(&commit, &log)?;
        let authors: BTreeSet<(&str, AuthorKind)> = log
            .files
            .values()
            .flat_map(|f| f.authors.iter().map(|a| (a.name.as_str(), a.kind)))
            .collect();
        FinalizeOutcome::Persisted {
            commit: commit.clone(),
            files: log.files.len(),
            authors: authors.len(),
        }
    };

    ctx.store.clear()?;

    let mut metadata = BTreeMap::new();
    metadata.insert("baseline".to_owned(), commit);
    record_checkpoint(
        ctx.git,
        ctx.worktree,
        ctx.store,
        ctx.policy,
        ctx.default_author,
        ctx.default_kind,
        metadata,
    )?;

    Ok(outcome)
}

/// The commit's own timestamp, falling back to "now" if it cannot be
/// parsed (the log still validates either way).
fn commit_timestamp(git: &dyn GitRunner, commit: &str) -> DateTime<Utc> {
    let raw = git
        .run(&["show", "-s", "--format=%cI", commit])
        .unwrap_or_default();
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(err) => {
            tracing::warn!(commit, %err, "could not parse commit timestamp");
            Utc::now()
        }
    }
}
