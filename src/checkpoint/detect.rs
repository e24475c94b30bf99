//! Snapshot capture and change detection.
//!
//! A snapshot is a table of tracked paths → content digest + line count.
//! [`detect_changes`] compares two snapshots and classifies every path as
//! new, modified, deleted, or unchanged; modified files get a precise
//! line-range diff when the caller-supplied differ can produce one, and a
//! line-count heuristic otherwise. The heuristic path never fails and never
//! surfaces an error — attribution degrades to count-only evidence instead.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::TrackingPolicy;
use crate::gitio::numstat::parse_diff_totals;
use crate::gitio::run::{GitError, GitRunner};
use crate::model::{Change, FileSnapshot};

/// A full tracked-file snapshot, keyed by repository-relative path.
pub type Snapshot = BTreeMap<String, FileSnapshot>;

/// How many paths to hash per `git hash-object` invocation.
const HASH_BATCH: usize = 200;

// ---------------------------------------------------------------------------
// Change detection
// ---------------------------------------------------------------------------

/// Compare two snapshots and produce the per-file deltas.
///
/// `differ` is given (path, previous, current) for each modified file and
/// may return unified-diff text between the two recorded states; `None`
/// selects the line-count fallback.
///
/// With no previous snapshot the result is empty — the first checkpoint is
/// a baseline, not a diff. Unchanged paths are omitted entirely: absence
/// means "no change", not "zero change".
pub fn detect_changes<F>(
    last: Option<&Snapshot>,
    current: &Snapshot,
    differ: F,
) -> BTreeMap<String, Change>
where
    F: Fn(&str, &FileSnapshot, &FileSnapshot) -> Option<String>,
{
    let Some(last) = last else {
        return BTreeMap::new();
    };

    let mut changes = BTreeMap::new();

    for (path, cur) in current {
        match last.get(path) {
            None => {
                changes.insert(path.clone(), Change::whole_file(cur.lines));
            }
            Some(prev) if prev.hash == cur.hash => {}
            Some(prev) => {
                changes.insert(path.clone(), modified(path, prev, cur, &differ));
            }
        }
    }

    for (path, prev) in last {
        if !current.contains_key(path) {
            changes.insert(path.clone(), Change::whole_file_deleted(prev.lines));
        }
    }

    changes
}

fn modified<F>(path: &str, prev: &FileSnapshot, cur: &FileSnapshot, differ: &F) -> Change
where
    F: Fn(&str, &FileSnapshot, &FileSnapshot) -> Option<String>,
{
    if let Some(text) = differ(path, prev, cur) {
        let totals = parse_diff_totals(&text);
        if totals.added > 0 || totals.deleted > 0 {
            return Change {
                added: totals.added,
                deleted: totals.deleted,
                lines: totals.ranges,
            };
        }
    }

    // Count heuristic: all we know is the line-count delta.
    if cur.lines > prev.lines {
        Change {
            added: cur.lines - prev.lines,
            deleted: 0,
            lines: Vec::new(),
        }
    } else if cur.lines < prev.lines {
        Change {
            added: 0,
            deleted: prev.lines - cur.lines,
            lines: Vec::new(),
        }
    } else {
        // Same length, different content: the entry still appears so the
        // file registers as touched.
        Change::default()
    }
}

// ---------------------------------------------------------------------------
// Snapshot capture
// ---------------------------------------------------------------------------

/// Capture the current tracked working tree.
///
/// Paths come from `git ls-files` (index plus untracked, gitignore
/// respected), filtered through the tracking policy. Content digests are
/// git blob ids written into the object store (`git hash-object -w`,
/// batched), which is what lets a later checkpoint diff two recorded states
/// precisely.
///
/// # Errors
/// Propagates git failures. Files that vanish mid-capture are skipped.
pub fn capture_snapshot(
    git: &dyn GitRunner,
    worktree: &Path,
    policy: &TrackingPolicy,
) -> Result<Snapshot, GitError> {
    let listing = git.run(&["ls-files", "--cached", "--others", "--exclude-standard"])?;

    let paths: Vec<&str> = listing
        .lines()
        .map(str::trim)
        .filter(|p| !p.is_empty() && policy.is_tracked(p) && worktree.join(p).is_file())
        .collect();

    let mut snapshot = Snapshot::new();
    for chunk in paths.chunks(HASH_BATCH) {
        let mut args = vec!["hash-object", "-w", "--"];
        args.extend_from_slice(chunk);
        let output = git.run(&args)?;
        let oids: Vec<&str> = output.lines().map(str::trim).collect();
        if oids.len() != chunk.len() {
            return Err(GitError::Unexpected {
                command: "git hash-object -w".to_owned(),
                detail: format!("expected {} object ids, got {}", chunk.len(), oids.len()),
            });
        }

        for (path, oid) in chunk.iter().zip(oids) {
            match std::fs::read(worktree.join(path)) {
                Ok(bytes) => {
                    snapshot.insert(
                        (*path).to_owned(),
                        FileSnapshot {
                            hash: oid.to_owned(),
                            lines: count_content_lines(&bytes),
                        },
                    );
                }
                Err(err) => {
                    tracing::debug!(%path, %err, "skipping unreadable file during capture");
                }
            }
        }
    }

    Ok(snapshot)
}

/// Count lines the way diff tools do: newline-terminated, with a final
/// unterminated line still counting.
fn count_content_lines(bytes: &[u8]) -> u32 {
    if bytes.is_empty() {
        return 0;
    }
    let newlines = bytes.iter().filter(|b| **b == b'\n').count();
    let trailing = usize::from(bytes.last() != Some(&b'\n'));
    u32::try_from(newlines + trailing).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::LineRange;

    fn snap(entries: &[(&str, &str, u32)]) -> Snapshot {
        entries
            .iter()
            .map(|(path, hash, lines)| {
                (
                    (*path).to_owned(),
                    FileSnapshot {
                        hash: (*hash).to_owned(),
                        lines: *lines,
                    },
                )
            })
            .collect()
    }

    fn no_diff(_: &str, _: &FileSnapshot, _: &FileSnapshot) -> Option<String> {
        None
    }

    // -- baseline --

    #[test]
    fn no_previous_snapshot_detects_nothing() {
        let current = snap(&[("a.rs", "h1", 10), ("b.rs", "h2", 5)]);
        assert!(detect_changes(None, &current, no_diff).is_empty());
    }

    // -- added --

    #[test]
    fn new_path_counts_whole_file_as_added() {
        let last = snap(&[]);
        let current = snap(&[("a.rs", "h1", 7)]);
        let changes = detect_changes(Some(&last), &current, no_diff);
        assert_eq!(
            changes["a.rs"],
            Change {
                added: 7,
                deleted: 0,
                lines: vec![LineRange::Span(1, 7)],
            }
        );
    }

    // -- unchanged --

    #[test]
    fn unchanged_hash_produces_no_entry() {
        let last = snap(&[("a.rs", "same", 10)]);
        let current = snap(&[("a.rs", "same", 10)]);
        let changes = detect_changes(Some(&last), &current, no_diff);
        assert!(!changes.contains_key("a.rs"));
        assert!(changes.is_empty());
    }

    // -- modified, precise diff --

    #[test]
    fn modified_path_uses_differ_ranges() {
        let last = snap(&[("a.rs", "old", 10)]);
        let current = snap(&[("a.rs", "new", 12)]);
        let changes = detect_changes(Some(&last), &current, |path, prev, cur| {
            assert_eq!(path, "a.rs");
            assert_eq!(prev.hash, "old");
            assert_eq!(cur.hash, "new");
            Some("@@ -4,1 +4,3 @@\n".to_owned())
        });
        assert_eq!(
            changes["a.rs"],
            Change {
                added: 3,
                deleted: 1,
                lines: vec![LineRange::Span(4, 6)],
            }
        );
    }

    #[test]
    fn pure_deletion_diff_has_counts_but_no_ranges() {
        let last = snap(&[("a.rs", "old", 10)]);
        let current = snap(&[("a.rs", "new", 7)]);
        let changes = detect_changes(Some(&last), &current, |_, _, _| {
            Some("@@ -3,3 +2,0 @@\n".to_owned())
        });
        assert_eq!(
            changes["a.rs"],
            Change {
                added: 0,
                deleted: 3,
                lines: vec![],
            }
        );
    }

    // -- modified, fallback heuristic --

    #[test]
    fn fallback_on_grown_file() {
        let last = snap(&[("a.rs", "old", 10)]);
        let current = snap(&[("a.rs", "new", 15)]);
        let changes = detect_changes(Some(&last), &current, no_diff);
        assert_eq!(
            changes["a.rs"],
            Change {
                added: 5,
                deleted: 0,
                lines: vec![],
            }
        );
    }

    #[test]
    fn fallback_on_shrunk_file() {
        let last = snap(&[("a.rs", "old", 10)]);
        let current = snap(&[("a.rs", "new", 4)]);
        let changes = detect_changes(Some(&last), &current, no_diff);
        assert_eq!(
            changes["a.rs"],
            Change {
                added: 0,
                deleted: 6,
                lines: vec![],
            }
        );
    }

    #[test]
    fn fallback_on_same_length_still_registers_touch() {
        let last = snap(&[("a.rs", "old", 10)]);
        let current = snap(&[("a.rs", "new", 10)]);
        let changes = detect_changes(Some(&last), &current, no_diff);
        assert_eq!(changes["a.rs"], Change::default());
    }

    #[test]
    fn unparseable_diff_text_falls_back() {
        let last = snap(&[("a.rs", "old", 10)]);
        let current = snap(&[("a.rs", "new", 12)]);
        let changes =
            detect_changes(Some(&last), &current, |_, _, _| Some("garbage".to_owned()));
        assert_eq!(
            changes["a.rs"],
            Change {
                added: 2,
                deleted: 0,
                lines: vec![],
            }
        );
    }

    // -- deleted --

    #[test]
    fn removed_path_counts_whole_file_as_deleted() {
        let last = snap(&[("a.rs", "h1", 9)]);
        let current = snap(&[]);
        let changes = detect_changes(Some(&last), &current, no_diff);
        assert_eq!(changes["a.rs"], Change::whole_file_deleted(9));
    }

    // -- mixed --

    #[test]
    fn mixed_snapshot_classifies_every_path() {
        let last = snap(&[("keep.rs", "k", 5), ("mod.rs", "m1", 8), ("gone.rs", "g", 3)]);
        let current = snap(&[("keep.rs", "k", 5), ("mod.rs", "m2", 9), ("new.rs", "n", 2)]);
        let changes = detect_changes(Some(&last), &current, no_diff);
        assert_eq!(changes.len(), 3);
        assert!(!changes.contains_key("keep.rs"));
        assert_eq!(changes["mod.rs"].added, 1);
        assert_eq!(changes["new.rs"].added, 2);
        assert_eq!(changes["gone.rs"].deleted, 3);
    }

    // -- line counting --

    #[test]
    fn content_line_counting_matches_diff_semantics() {
        assert_eq!(count_content_lines(b""), 0);
        assert_eq!(count_content_lines(b"one\n"), 1);
        assert_eq!(count_content_lines(b"one\ntwo\n"), 2);
        assert_eq!(count_content_lines(b"one\ntwo"), 2);
        assert_eq!(count_content_lines(b"\n"), 1);
    }
}
