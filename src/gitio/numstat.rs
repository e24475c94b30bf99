//! Plumbing-text parsers: numstat tables and unified-diff hunk headers.
//!
//! Everything here is best-effort. Diff text is ambiguous at the edges
//! (binary blobs, rename notation), and a zero-tolerance parser would make
//! the tool unusable on real histories — malformed lines are dropped
//! silently and the parsers never fail the caller.
//!
//! Two wire formats are consumed:
//!
//! - numstat: `added<TAB>deleted<TAB>path`, with `-` in place of counts for
//!   binary files and `old => new` (bare or brace) rename notation;
//! - unified-diff hunk headers: `@@ -a[,b] +c[,d] @@`.

use std::collections::BTreeMap;

use crate::model::LineRange;

use super::run::{GitError, GitRunner};

// ---------------------------------------------------------------------------
// FileStat
// ---------------------------------------------------------------------------

/// Added/deleted line counts for one file in one commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileStat {
    pub added: u32,
    pub deleted: u32,
}

// ---------------------------------------------------------------------------
// Numstat parsing
// ---------------------------------------------------------------------------

/// Parse a per-commit numstat table.
///
/// Binary-marker lines and lines with fewer than three tab fields are
/// skipped. Renamed files are keyed by their new path.
#[must_use]
pub fn parse_numstat(text: &str) -> BTreeMap<String, FileStat> {
    let mut stats = BTreeMap::new();
    for line in text.lines() {
        if let Some((path, stat)) = parse_numstat_line(line) {
            stats.insert(path, stat);
        }
    }
    stats
}

/// Parse a multi-commit numstat log segmented by `commit <id>` marker lines
/// (as produced by `git log --format='commit %H' --numstat`).
///
/// Returns the commit ids in input order plus a per-commit table. A commit
/// with no file lines (e.g. a merge) still appears in the id list with an
/// empty table.
#[must_use]
pub fn parse_range_numstat(
    text: &str,
) -> (Vec<String>, BTreeMap<String, BTreeMap<String, FileStat>>) {
    let mut ids = Vec::new();
    let mut per_commit: BTreeMap<String, BTreeMap<String, FileStat>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if let Some(id) = line.strip_prefix("commit ") {
            let id = id.trim().to_owned();
            ids.push(id.clone());
            per_commit.entry(id.clone()).or_default();
            current = Some(id);
        } else if let Some(id) = &current
            && let Some((path, stat)) = parse_numstat_line(line)
            && let Some(table) = per_commit.get_mut(id)
        {
            table.insert(path, stat);
        }
    }

    (ids, per_commit)
}

fn parse_numstat_line(line: &str) -> Option<(String, FileStat)> {
    let mut fields = line.splitn(3, '\t');
    let added = fields.next()?.trim();
    let deleted = fields.next()?.trim();
    let path = fields.next()?;

    // Binary files carry "-" in place of counts; skip them entirely.
    let added: u32 = added.parse().ok()?;
    let deleted: u32 = deleted.parse().ok()?;

    Some((resolve_rename(path), FileStat { added, deleted }))
}

/// Resolve numstat rename notation to the post-rename path.
///
/// Handles both the bare form `old/path.go => new/path.go` and the brace
/// form `src/{old => new}/path.go` git uses when a prefix is shared.
fn resolve_rename(path: &str) -> String {
    if let Some(open) = path.find('{')
        && let Some(close) = path[open..].find('}').map(|i| open + i)
        && let Some((_, new)) = path[open + 1..close].split_once(" => ")
    {
        let joined = format!("{}{}{}", &path[..open], new, &path[close + 1..]);
        return joined.replace("//", "/");
    }
    if let Some((_, new)) = path.split_once(" => ") {
        return new.to_owned();
    }
    path.to_owned()
}

// ---------------------------------------------------------------------------
// Hunk-header parsing
// ---------------------------------------------------------------------------

/// One parsed `@@ -a[,b] +c[,d] @@` header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct HunkHeader {
    old_count: u32,
    new_start: u32,
    new_count: u32,
}

impl HunkHeader {
    /// The added-line range this hunk contributes, if any.
    ///
    /// A pure deletion (`d == 0`) contributes no range; `d` absent or 1
    /// yields a single line; otherwise the inclusive span.
    const fn added_range(self) -> Option<LineRange> {
        match self.new_count {
            0 => None,
            1 => Some(LineRange::Single(self.new_start)),
            n => Some(LineRange::Span(self.new_start, self.new_start + n - 1)),
        }
    }
}

fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    if !line.starts_with("@@ ") {
        return None;
    }
    let mut tokens = line.split_whitespace();
    tokens.next()?; // "@@"
    let old = tokens.next()?.strip_prefix('-')?;
    let new = tokens.next()?.strip_prefix('+')?;

    let (_, old_count) = parse_start_count(old)?;
    let (new_start, new_count) = parse_start_count(new)?;
    Some(HunkHeader {
        old_count,
        new_start,
        new_count,
    })
}

fn parse_start_count(token: &str) -> Option<(u32, u32)> {
    match token.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((token.parse().ok()?, 1)),
    }
}

/// Extract the added-line ranges from unified-diff text.
///
/// Only hunk headers are inspected; hunks with zero added lines contribute
/// nothing. Malformed headers are skipped.
#[must_use]
pub fn parse_hunk_ranges(text: &str) -> Vec<LineRange> {
    text.lines()
        .filter_map(parse_hunk_header)
        .filter_map(HunkHeader::added_range)
        .collect()
}

/// Added/deleted totals plus added-line ranges from zero-context diff text.
///
/// Counts are exact only for `-U0` diffs, where hunk extents carry no
/// context lines — the only form this crate requests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffTotals {
    pub added: u32,
    pub deleted: u32,
    pub ranges: Vec<LineRange>,
}

/// Sum hunk extents of a zero-context diff into [`DiffTotals`].
#[must_use]
pub fn parse_diff_totals(text: &str) -> DiffTotals {
    let mut totals = DiffTotals::default();
    for header in text.lines().filter_map(parse_hunk_header) {
        totals.added += header.new_count;
        totals.deleted += header.old_count;
        if let Some(range) = header.added_range() {
            totals.ranges.push(range);
        }
    }
    totals
}

/// Split a full-commit `-U0` patch into per-file added-line ranges.
///
/// Files are recognized by their `+++ b/<path>` headers; a `+++ /dev/null`
/// header (deleted file) discards subsequent hunks.
#[must_use]
pub fn parse_commit_patch(text: &str) -> BTreeMap<String, Vec<LineRange>> {
    let mut ranges: BTreeMap<String, Vec<LineRange>> = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("+++ ") {
            let rest = rest.trim().trim_matches('"');
            current = rest.strip_prefix("b/").map(str::to_owned);
        } else if let Some(header) = parse_hunk_header(line)
            && let Some(path) = &current
            && let Some(range) = header.added_range()
        {
            ranges.entry(path.clone()).or_default().push(range);
        }
    }

    ranges
}

// ---------------------------------------------------------------------------
// CommitDiff — the authoritative record of what a commit changed
// ---------------------------------------------------------------------------

/// A commit's full diff: numstat counts plus per-file added-line ranges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitDiff {
    /// Per-file added/deleted counts.
    pub stats: BTreeMap<String, FileStat>,

    /// Per-file added-line ranges in the committed content.
    pub ranges: BTreeMap<String, Vec<LineRange>>,
}

/// Fetch a commit's full diff (vs its first parent, or the empty tree for a
/// root commit) in two subprocess calls.
///
/// # Errors
/// Propagates git failures; parse problems never error (best-effort).
pub fn commit_diff(git: &dyn GitRunner, commit: &str) -> Result<CommitDiff, GitError> {
    let numstat = git.run(&["show", "--numstat", "--format=", commit])?;
    let patch = git.run(&["show", "--unified=0", "--format=", commit])?;
    Ok(CommitDiff {
        stats: parse_numstat(&numstat),
        ranges: parse_commit_patch(&patch),
    })
}

/// Fetch the ordered commit ids and per-commit numstat tables for a range
/// in a single subprocess call.
///
/// # Errors
/// Propagates git failures (e.g. an unknown revision in the range).
pub fn range_numstat(
    git: &dyn GitRunner,
    range: &str,
) -> Result<(Vec<String>, BTreeMap<String, BTreeMap<String, FileStat>>), GitError> {
    let text = git.run(&["log", "--format=commit %H", "--numstat", range])?;
    Ok(parse_range_numstat(&text))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
