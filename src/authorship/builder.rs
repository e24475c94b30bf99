//! Authorship log construction.
//!
//! Two composition modes exist:
//!
//! - [`build_log`] — the canonical mode: checkpoint evidence is replayed
//!   into per-line ownership and reconciled against the commit's own diff,
//!   which is authoritative for what actually landed in history.
//! - [`compose_from_checkpoints`] — the fallback when no commit diff is
//!   available (e.g. reconstructing from checkpoints alone): per (file,
//!   author, kind) triple, recorded ranges are concatenated as-is.
//!
//! Replay semantics in the canonical mode: each checkpoint that touched a
//! file claims its recorded added lines for its author, later checkpoints
//! override earlier ones on overlapping lines, and surviving claims are
//! clipped to the commit diff's added ranges. A checkpoint with count-only
//! evidence (empty ranges) claims no lines but still marks its author as
//! having touched the file — enough for a sole author to be credited with a
//! pure deletion.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::config::TrackingPolicy;
use crate::gitio::numstat::CommitDiff;
use crate::model::{
    AuthorInfo, AuthorKind, AuthorshipLog, Checkpoint, FileAuthorship, LineRange, compress_lines,
};

// ---------------------------------------------------------------------------
// Canonical mode: full-diff reconciliation
// ---------------------------------------------------------------------------

/// Build the authorship log for `commit` from the checkpoints recorded
/// since the last commit plus the commit's full diff.
///
/// Only files that appear in the commit diff and pass the tracking policy
/// are included; checkpoint-only changes to untracked or excluded files are
/// dropped. A qualifying file no checkpoint ever touched is attributed to
/// `default_author` with a metadata note flagging the missing evidence.
#[must_use]
pub fn build_log(
    commit: &str,
    recorded_at: DateTime<Utc>,
    checkpoints: &[Checkpoint],
    diff: &CommitDiff,
    policy: &TrackingPolicy,
    default_author: &str,
    default_kind: AuthorKind,
) -> AuthorshipLog {
    let mut log = AuthorshipLog::new(commit, recorded_at);

    for path in diff.stats.keys() {
        if !policy.is_tracked(path) {
            tracing::debug!(%path, "skipping untracked path in commit diff");
            continue;
        }
        let committed_ranges = diff.ranges.get(path).map_or(&[][..], Vec::as_slice);
        let file = attribute_file(path, checkpoints, committed_ranges, default_author, default_kind);
        log.files.insert(path.clone(), file);
    }

    log
}

fn attribute_file(
    path: &str,
    checkpoints: &[Checkpoint],
    committed_ranges: &[LineRange],
    default_author: &str,
    default_kind: AuthorKind,
) -> FileAuthorship {
    // Authors interned in first-touch order so output is deterministic.
    let mut keys: Vec<(String, AuthorKind)> = Vec::new();
    let mut owner: BTreeMap<u32, usize> = BTreeMap::new();
    let mut touched: Vec<usize> = Vec::new();

    for checkpoint in checkpoints {
        let Some(change) = checkpoint.touched(path) else {
            continue;
        };
        let key = (checkpoint.author.clone(), checkpoint.kind);
        let idx = keys.iter().position(|k| *k == key).unwrap_or_else(|| {
            keys.push(key);
            keys.len() - 1
        });
        if !touched.contains(&idx) {
            touched.push(idx);
        }
        for range in &change.lines {
            for line in range.expand() {
                owner.insert(line, idx);
            }
        }
    }

    if touched.is_empty() {
        // No checkpoint evidence at all: credit the configured fallback
        // identity with the commit's own ranges, flagged as unattested.
        let mut author = AuthorInfo::new(default_author.to_owned(), default_kind);
        author.lines = committed_ranges.to_vec();
        author
            .metadata
            .insert("checkpoint_evidence".to_owned(), "none".to_owned());
        return FileAuthorship {
            authors: vec![author],
        };
    }

    // The commit diff is authoritative: claims on lines that never landed
    // are discarded. Numstat-only evidence (no ranges) clips nothing.
    if !committed_ranges.is_empty() {
        owner.retain(|line, _| committed_ranges.iter().any(|r| r.contains(*line)));
    }

    let mut lines_per_author: BTreeMap<usize, Vec<u32>> = BTreeMap::new();
    for (line, idx) in &owner {
        lines_per_author.entry(*idx).or_default().push(*line);
    }

    let authors: Vec<AuthorInfo> = if lines_per_author.is_empty() {
        // No surviving line evidence: keep every touching author so a sole
        // author can still be credited with count-only work.
        touched
            .iter()
            .map(|idx| {
                let (name, kind) = &keys[*idx];
                AuthorInfo::new(name.clone(), *kind)
            })
            .collect()
    } else {
        touched
            .iter()
            .filter_map(|idx| {
                let lines = lines_per_author.get(idx)?;
                let (name, kind) = &keys[*idx];
                let mut author = AuthorInfo::new(name.clone(), *kind);
                author.lines = compress_lines(lines);
                Some(author)
            })
            .collect()
    };

    FileAuthorship { authors }
}

// ---------------------------------------------------------------------------
// Fallback mode: checkpoint-only composition
// ---------------------------------------------------------------------------

/// Compose a log purely from checkpoint records, with no commit diff to
/// reconcile against.
///
/// For the same (file, author, kind) triple across multiple checkpoints,
/// line ranges are concatenated rather than overwritten.
#[must_use]
pub fn compose_from_checkpoints(
    commit: &str,
    recorded_at: DateTime<Utc>,
    checkpoints: &[Checkpoint],
) -> AuthorshipLog {
    let mut log = AuthorshipLog::new(commit, recorded_at);

    for checkpoint in checkpoints {
        for (path, change) in &checkpoint.changes {
            let file = log
                .files
                .entry(path.clone())
                .or_insert_with(|| FileAuthorship {
                    authors: Vec::new(),
                });
            match file
                .authors
                .iter_mut()
                .find(|a| a.name == checkpoint.author && a.kind == checkpoint.kind)
            {
                Some(author) => author.lines.extend(change.lines.iter().copied()),
                None => {
                    let mut author =
                        AuthorInfo::new(checkpoint.author.clone(), checkpoint.kind);
                    author.lines = change.lines.clone();
                    file.authors.push(author);
                }
            }
        }
    }

    log
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gitio::numstat::FileStat;
    use crate::model::Change;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    fn checkpoint(author: &str, kind: AuthorKind, changes: &[(&str, Change)]) -> Checkpoint {
        Checkpoint {
            recorded_at: ts(),
            author: author.to_owned(),
            kind,
            metadata: BTreeMap::new(),
            changes: changes
                .iter()
                .map(|(p, c)| ((*p).to_owned(), c.clone()))
                .collect(),
            snapshot: BTreeMap::new(),
        }
    }

    fn change(added: u32, deleted: u32, lines: &[LineRange]) -> Change {
        Change {
            added,
            deleted,
            lines: lines.to_vec(),
        }
    }

    fn diff(entries: &[(&str, u32, u32, &[LineRange])]) -> CommitDiff {
        let mut out = CommitDiff::default();
        for (path, added, deleted, ranges) in entries {
            out.stats.insert(
                (*path).to_owned(),
                FileStat {
                    added: *added,
                    deleted: *deleted,
                },
            );
            if !ranges.is_empty() {
                out.ranges.insert((*path).to_owned(), ranges.to_vec());
            }
        }
        out
    }

    fn policy() -> TrackingPolicy {
        crate::config::TrackingConfig::default().compile().unwrap()
    }

    fn build(checkpoints: &[Checkpoint], diff: &CommitDiff) -> AuthorshipLog {
        build_log(
            &"c".repeat(40),
            ts(),
            checkpoints,
            diff,
            &policy(),
            "unknown",
            AuthorKind::Human,
        )
    }

    // -- canonical mode --

    #[test]
    fn disjoint_checkpoint_authors_share_the_file() {
        let checkpoints = vec![
            checkpoint(
                "alice",
                AuthorKind::Human,
                &[("file.go", change(10, 0, &[LineRange::Span(1, 10)]))],
            ),
            checkpoint(
                "claude",
                AuthorKind::Ai,
                &[("file.go", change(5, 0, &[LineRange::Span(11, 15)]))],
            ),
        ];
        let diff = diff(&[("file.go", 15, 0, &[LineRange::Span(1, 15)])]);

        let log = build(&checkpoints, &diff);
        let authors = &log.files["file.go"].authors;
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].name, "alice");
        assert_eq!(authors[0].lines, vec![LineRange::Span(1, 10)]);
        assert_eq!(authors[1].name, "claude");
        assert_eq!(authors[1].lines, vec![LineRange::Span(11, 15)]);
        // Combined coverage accounts for every committed line.
        assert_eq!(
            crate::model::count_lines(&authors[0].lines)
                + crate::model::count_lines(&authors[1].lines),
            15
        );
        assert_eq!(log.validate(), Ok(()));
    }

    #[test]
    fn later_checkpoint_wins_overlapping_lines() {
        let checkpoints = vec![
            checkpoint(
                "alice",
                AuthorKind::Human,
                &[("a.rs", change(10, 0, &[LineRange::Span(1, 10)]))],
            ),
            checkpoint(
                "claude",
                AuthorKind::Ai,
                &[("a.rs", change(8, 0, &[LineRange::Span(5, 12)]))],
            ),
        ];
        let diff = diff(&[("a.rs", 12, 0, &[LineRange::Span(1, 12)])]);

        let log = build(&checkpoints, &diff);
        let authors = &log.files["a.rs"].authors;
        assert_eq!(authors[0].lines, vec![LineRange::Span(1, 4)]);
        assert_eq!(authors[1].lines, vec![LineRange::Span(5, 12)]);
    }

    #[test]
    fn claims_are_clipped_to_committed_ranges() {
        let checkpoints = vec![checkpoint(
            "claude",
            AuthorKind::Ai,
            &[("a.rs", change(20, 0, &[LineRange::Span(1, 20)]))],
        )];
        let diff = diff(&[("a.rs", 10, 0, &[LineRange::Span(1, 10)])]);

        let log = build(&checkpoints, &diff);
        assert_eq!(
            log.files["a.rs"].authors[0].lines,
            vec![LineRange::Span(1, 10)]
        );
    }

    #[test]
    fn numstat_only_commit_evidence_clips_nothing() {
        let checkpoints = vec![checkpoint(
            "claude",
            AuthorKind::Ai,
            &[("a.rs", change(3, 0, &[LineRange::Span(7, 9)]))],
        )];
        // The commit diff has counts but no ranges for the file.
        let diff = diff(&[("a.rs", 3, 0, &[])]);

        let log = build(&checkpoints, &diff);
        assert_eq!(
            log.files["a.rs"].authors[0].lines,
            vec![LineRange::Span(7, 9)]
        );
    }

    #[test]
    fn unattested_file_goes_to_default_author() {
        let diff = diff(&[("mystery.rs", 4, 0, &[LineRange::Span(1, 4)])]);
        let log = build(&[], &diff);

        let authors = &log.files["mystery.rs"].authors;
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].name, "unknown");
        assert_eq!(authors[0].kind, AuthorKind::Human);
        assert_eq!(authors[0].lines, vec![LineRange::Span(1, 4)]);
        assert_eq!(authors[0].metadata["checkpoint_evidence"], "none");
        assert_eq!(log.validate(), Ok(()));
    }

    #[test]
    fn untracked_and_checkpoint_only_files_are_dropped() {
        let checkpoints = vec![checkpoint(
            "alice",
            AuthorKind::Human,
            &[
                // Touched by a checkpoint but absent from the commit diff.
                ("uncommitted.rs", change(2, 0, &[LineRange::Span(1, 2)])),
            ],
        )];
        // The png fails the extension policy even though it is in the diff.
        let diff = diff(&[
            ("logo.png", 1, 0, &[]),
            ("code.rs", 2, 0, &[LineRange::Span(1, 2)]),
        ]);

        let log = build(&checkpoints, &diff);
        assert!(!log.files.contains_key("uncommitted.rs"));
        assert!(!log.files.contains_key("logo.png"));
        assert!(log.files.contains_key("code.rs"));
    }

    #[test]
    fn sole_author_with_count_only_evidence_is_kept() {
        // A pure deletion: the checkpoint recorded counts but no ranges.
        let checkpoints = vec![checkpoint(
            "alice",
            AuthorKind::Human,
            &[("a.rs", change(0, 5, &[]))],
        )];
        let diff = diff(&[("a.rs", 0, 5, &[])]);

        let log = build(&checkpoints, &diff);
        let authors = &log.files["a.rs"].authors;
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].name, "alice");
        assert!(authors[0].lines.is_empty());
        assert_eq!(log.validate(), Ok(()));
    }

    #[test]
    fn author_whose_claims_were_all_overwritten_is_dropped() {
        let checkpoints = vec![
            checkpoint(
                "alice",
                AuthorKind::Human,
                &[("a.rs", change(3, 0, &[LineRange::Span(1, 3)]))],
            ),
            checkpoint(
                "claude",
                AuthorKind::Ai,
                &[("a.rs", change(3, 3, &[LineRange::Span(1, 3)]))],
            ),
        ];
        let diff = diff(&[("a.rs", 3, 0, &[LineRange::Span(1, 3)])]);

        let log = build(&checkpoints, &diff);
        let authors = &log.files["a.rs"].authors;
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].name, "claude");
    }

    #[test]
    fn empty_commit_diff_builds_empty_log() {
        let log = build(&[], &CommitDiff::default());
        assert!(log.files.is_empty());
    }

    // -- fallback mode --

    #[test]
    fn compose_concatenates_ranges_for_same_author() {
        let checkpoints = vec![
            checkpoint(
                "alice",
                AuthorKind::Human,
                &[("a.rs", change(5, 0, &[LineRange::Span(1, 5)]))],
            ),
            checkpoint(
                "alice",
                AuthorKind::Human,
                &[("a.rs", change(3, 0, &[LineRange::Span(6, 8)]))],
            ),
        ];
        let log = compose_from_checkpoints("abc", ts(), &checkpoints);
        let authors = &log.files["a.rs"].authors;
        assert_eq!(authors.len(), 1);
        assert_eq!(
            authors[0].lines,
            vec![LineRange::Span(1, 5), LineRange::Span(6, 8)]
        );
    }

    #[test]
    fn compose_keeps_authors_separate() {
        let checkpoints = vec![
            checkpoint(
                "alice",
                AuthorKind::Human,
                &[("a.rs", change(5, 0, &[LineRange::Span(1, 5)]))],
            ),
            checkpoint(
                "claude",
                AuthorKind::Ai,
                &[("a.rs", change(2, 0, &[LineRange::Span(6, 7)]))],
            ),
        ];
        let log = compose_from_checkpoints("abc", ts(), &checkpoints);
        assert_eq!(log.files["a.rs"].authors.len(), 2);
    }

    #[test]
    fn compose_includes_files_the_diffless_mode_never_sees() {
        let checkpoints = vec![checkpoint(
            "alice",
            AuthorKind::Human,
            &[("notes.txt", change(1, 0, &[LineRange::Single(1)]))],
        )];
        let log = compose_from_checkpoints("abc", ts(), &checkpoints);
        assert!(log.files.contains_key("notes.txt"));
    }
}
