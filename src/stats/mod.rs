//! Range aggregation: per-author and per-file statistics over a revision
//! range.
//!
//! The aggregator makes exactly two subprocess calls regardless of range
//! size — one batched numstat log and one batched notes log — then joins
//! the two per commit. A file contributes only when it appears in **both**
//! the commit's numstat and its authorship log: a file can appear in a log
//! without numstat coverage if it was reverted, and vice versa, and either
//! way there is nothing sound to attribute.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::BylineError;
use crate::gitio::notes::NoteStore;
use crate::gitio::numstat::range_numstat;
use crate::gitio::run::GitRunner;
use crate::model::{AuthorKind, count_lines};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Accumulated totals for one author across a range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthorStats {
    pub name: String,
    pub kind: AuthorKind,

    /// Attributed added lines.
    pub additions: u64,

    /// Work volume: attributed additions plus deletions.
    pub volume: u64,

    /// Distinct commits this author contributed to (a commit touching
    /// three files by the same author counts once).
    pub commits: u64,

    /// Share of all attributed additions, 0–100.
    pub percentage: f64,
}

/// Attributed additions for one file across a range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    pub path: String,
    pub total: u64,
    pub ai: u64,
    pub human: u64,
}

/// Headline AI/human split for a range.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: u64,
    pub ai: u64,
    pub human: u64,
    pub ai_percentage: f64,
}

/// The full aggregation result for a revision range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// The range as given by the caller.
    pub range: String,

    /// Number of commits in the range (noted or not).
    pub commit_count: u64,

    pub summary: Summary,
    pub by_author: Vec<AuthorStats>,
    pub by_file: Vec<FileStats>,
}

// ---------------------------------------------------------------------------
// Proportional attribution
// ---------------------------------------------------------------------------

/// Split one file's numstat totals for one author.
///
/// A sole author takes the full totals — no ratio math, no rounding loss.
/// Multiple authors split proportionally to their line-range evidence with
/// truncating division; the shortfall of up to (author count − 1) lines is
/// accepted. With no line evidence at all, a sole author still takes
/// everything (a pure-deletion commit is unambiguous) while multiple
/// authors each get zero rather than a guess.
#[must_use]
pub const fn author_contribution(
    author_lines: u64,
    total_author_lines: u64,
    total_added: u64,
    total_deleted: u64,
    author_count: usize,
) -> (u64, u64) {
    if author_count <= 1 {
        return (total_added, total_deleted);
    }
    if total_author_lines == 0 {
        return (0, 0);
    }
    (
        total_added * author_lines / total_author_lines,
        total_deleted * author_lines / total_author_lines,
    )
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct AuthorAcc {
    additions: u64,
    volume: u64,
    commits: u64,
}

/// Aggregate authorship across every commit in `range`.
///
/// # Errors
/// Propagates git failures (e.g. an unknown revision); commits without a
/// note and files without matching evidence are skipped, not errors.
pub fn aggregate(
    git: &dyn GitRunner,
    notes: &NoteStore<'_>,
    range: &str,
) -> Result<Report, BylineError> {
    let (ids, per_commit) = range_numstat(git, range)?;
    let logs = notes.list_for_range(range)?;
    tracing::debug!(
        range,
        commits = ids.len(),
        noted = logs.len(),
        "aggregating range"
    );

    let mut authors: BTreeMap<(String, AuthorKind), AuthorAcc> = BTreeMap::new();
    let mut files: BTreeMap<String, (u64, u64)> = BTreeMap::new(); // (ai, human)

    for id in &ids {
        let Some(stats) = per_commit.get(id) else {
            continue;
        };
        let Some(log) = logs.get(id) else {
            continue;
        };

        let mut commit_authors: BTreeSet<(String, AuthorKind)> = BTreeSet::new();

        for (path, file) in &log.files {
            let Some(stat) = stats.get(path) else {
                continue;
            };
            let total_author_lines: u64 =
                file.authors.iter().map(|a| count_lines(&a.lines)).sum();
            let author_count = file.authors.len();

            for author in &file.authors {
                let (added, deleted) = author_contribution(
                    count_lines(&author.lines),
                    total_author_lines,
                    u64::from(stat.added),
                    u64::from(stat.deleted),
                    author_count,
                );

                let key = (author.name.clone(), author.kind);
                let acc = authors.entry(key.clone()).or_default();
                acc.additions += added;
                acc.volume += added + deleted;
                commit_authors.insert(key);

                let (ai, human) = files.entry(path.clone()).or_default();
                match author.kind {
                    AuthorKind::Ai => *ai += added,
                    AuthorKind::Human => *human += added,
                }
            }
        }

        for key in commit_authors {
            if let Some(acc) = authors.get_mut(&key) {
                acc.commits += 1;
            }
        }
    }

    Ok(build_report(range, ids.len(), authors, files))
}

fn build_report(
    range: &str,
    commit_count: usize,
    authors: BTreeMap<(String, AuthorKind), AuthorAcc>,
    files: BTreeMap<String, (u64, u64)>,
) -> Report {
    let total: u64 = authors.values().map(|a| a.additions).sum();
    let ai: u64 = authors
        .iter()
        .filter(|((_, kind), _)| *kind == AuthorKind::Ai)
        .map(|(_, a)| a.additions)
        .sum();

    let mut by_author: Vec<AuthorStats> = authors
        .into_iter()
        .map(|((name, kind), acc)| AuthorStats {
            name,
            kind,
            additions: acc.additions,
            volume: acc.volume,
            commits: acc.commits,
            percentage: percentage(acc.additions, total),
        })
        .collect();
    by_author.sort_by(|a, b| {
        b.additions
            .cmp(&a.additions)
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut by_file: Vec<FileStats> = files
        .into_iter()
        .map(|(path, (ai, human))| FileStats {
            path,
            total: ai + human,
            ai,
            human,
        })
        .collect();
    by_file.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.path.cmp(&b.path)));

    Report {
        range: range.to_owned(),
        commit_count: commit_count as u64,
        summary: Summary {
            total,
            ai,
            human: total - ai,
            ai_percentage: percentage(ai, total),
        },
        by_author,
        by_file,
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
