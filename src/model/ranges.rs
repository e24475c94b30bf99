//! Line ranges — the unit of authorship evidence.
//!
//! A [`LineRange`] is either a single 1-based line number or an inclusive
//! `[start, end]` span. On the wire a single line serializes as a bare
//! number and a span as a two-element array; both round-trip exactly, and
//! the order of ranges in a list is preserved but carries no meaning.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LineRange
// ---------------------------------------------------------------------------

/// One contiguous run of attributed lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineRange {
    /// A single line, e.g. `17`.
    Single(u32),
    /// An inclusive span, e.g. `[3, 9]`.
    Span(u32, u32),
}

impl LineRange {
    /// Build a range from inclusive endpoints, collapsing a one-line span
    /// to [`LineRange::Single`]. Endpoints may be given in either order.
    #[must_use]
    pub fn span(a: u32, b: u32) -> Self {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        if start == end {
            Self::Single(start)
        } else {
            Self::Span(start, end)
        }
    }

    /// First line covered by this range.
    #[must_use]
    pub const fn start(&self) -> u32 {
        match self {
            Self::Single(n) | Self::Span(n, _) => *n,
        }
    }

    /// Last line covered by this range.
    #[must_use]
    pub const fn end(&self) -> u32 {
        match self {
            Self::Single(n) | Self::Span(_, n) => *n,
        }
    }

    /// Number of lines covered.
    #[must_use]
    pub const fn count(&self) -> u64 {
        (self.end() - self.start() + 1) as u64
    }

    /// Whether `line` falls inside this range.
    #[must_use]
    pub const fn contains(&self, line: u32) -> bool {
        self.start() <= line && line <= self.end()
    }

    /// Iterate over every line number covered.
    pub fn expand(&self) -> impl Iterator<Item = u32> + use<> {
        self.start()..=self.end()
    }
}

// ---------------------------------------------------------------------------
// Free functions over range lists
// ---------------------------------------------------------------------------

/// Total line count across a list of ranges.
///
/// Ranges are assumed non-overlapping (the invariant every producer in this
/// crate maintains); overlapping input double-counts.
#[must_use]
pub fn count_lines(ranges: &[LineRange]) -> u64 {
    ranges.iter().map(LineRange::count).sum()
}

/// Compress individual line numbers into the minimal list of ranges.
///
/// Input need not be sorted or deduplicated. Output is sorted, non-empty
/// runs collapse to spans, isolated lines stay single.
#[must_use]
pub fn compress_lines(lines: &[u32]) -> Vec<LineRange> {
    let mut sorted = lines.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut out = Vec::new();
    let mut run: Option<(u32, u32)> = None;
    for line in sorted {
        match run {
            Some((start, end)) if line == end + 1 => run = Some((start, line)),
            Some((start, end)) => {
                out.push(LineRange::span(start, end));
                run = Some((line, line));
            }
            None => run = Some((line, line)),
        }
    }
    if let Some((start, end)) = run {
        out.push(LineRange::span(start, end));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
