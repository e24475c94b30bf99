//! Checkpoints and the change/snapshot records they carry.
//!
//! A [`Checkpoint`] captures the tracked working tree at a moment in time,
//! tagged with an author: a snapshot table (path → content digest + line
//! count) plus the per-file [`Change`]s since the previous checkpoint.
//! Checkpoints are appended to a store and only ever read back or cleared —
//! never mutated in place.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ranges::LineRange;
use super::types::AuthorKind;

// ---------------------------------------------------------------------------
// FileSnapshot
// ---------------------------------------------------------------------------

/// One file's state at checkpoint-capture time. Immutable once stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSnapshot {
    /// Content digest — the git blob id of the file's bytes. Writing the
    /// blob into the object store at capture time is what lets a later
    /// checkpoint diff precisely against this state.
    pub hash: String,

    /// Line count of the file at capture time.
    pub lines: u32,
}

// ---------------------------------------------------------------------------
// Change
// ---------------------------------------------------------------------------

/// Line-level delta for one file between two snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Lines added.
    pub added: u32,

    /// Lines deleted.
    pub deleted: u32,

    /// Where the added lines landed, as ranges in the new file.
    ///
    /// Empty when only a count-level delta was derivable (heuristic
    /// fallback); callers must tolerate empty-range changes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<LineRange>,
}

impl Change {
    /// The change for a file that is entirely new: every line is an
    /// addition. A zero-line file carries no ranges.
    #[must_use]
    pub fn whole_file(lines: u32) -> Self {
        Self {
            added: lines,
            deleted: 0,
            lines: if lines == 0 {
                Vec::new()
            } else {
                vec![LineRange::span(1, lines)]
            },
        }
    }

    /// The change for a file that was removed outright.
    #[must_use]
    pub const fn whole_file_deleted(lines: u32) -> Self {
        Self {
            added: 0,
            deleted: lines,
            lines: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Checkpoint
// ---------------------------------------------------------------------------

/// A recorded snapshot of tracked-file state plus the diff since the
/// previous checkpoint, tagged with an author identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// When the checkpoint was recorded.
    pub recorded_at: DateTime<Utc>,

    /// Free-text author identity.
    pub author: String,

    /// Human or AI.
    pub kind: AuthorKind,

    /// Free-form annotations (session ids, tool names, baseline markers).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    /// Per-file deltas since the previous checkpoint. Absence of a path
    /// means "unchanged", not "zero change".
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub changes: BTreeMap<String, Change>,

    /// Full tracked-file snapshot at capture time.
    pub snapshot: BTreeMap<String, FileSnapshot>,
}

impl Checkpoint {
    /// The delta this checkpoint recorded for `path`, if any.
    #[must_use]
    pub fn touched(&self, path: &str) -> Option<&Change> {
        self.changes.get(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
