//! Authorship records — the durable per-commit attribution schema.
//!
//! An [`AuthorshipLog`] is written once per commit (as a git note) and read
//! many times by range aggregation. It serializes to canonical JSON:
//! `BTreeMap` keys give deterministic ordering, so serializing the same log
//! twice produces identical bytes.
//!
//! Schema acceptance is gated by [`LOG_SCHEMA_VERSION`]: logs carrying a
//! different version are rejected by [`AuthorshipLog::validate`], never
//! migrated in place.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ranges::LineRange;

/// Current authorship log schema version.
pub const LOG_SCHEMA_VERSION: &str = "byline/1.0.0";

// ---------------------------------------------------------------------------
// AuthorKind
// ---------------------------------------------------------------------------

/// Whether a contribution was made by a person or an AI tool.
///
/// This is a closed set: the wire format accepts exactly `"human"` and
/// `"ai"`, and anything else fails deserialization.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum AuthorKind {
    #[default]
    Human,
    Ai,
}

impl fmt::Display for AuthorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => f.write_str("human"),
            Self::Ai => f.write_str("ai"),
        }
    }
}

impl FromStr for AuthorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(Self::Human),
            "ai" => Ok(Self::Ai),
            other => Err(format!("unknown author kind '{other}' (expected human or ai)")),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthorInfo / FileAuthorship
// ---------------------------------------------------------------------------

/// One author's contribution to one file in one commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorInfo {
    /// Free-text author identity (e.g. a name, email, or tool id).
    pub name: String,

    /// Human or AI.
    pub kind: AuthorKind,

    /// Line ranges this author is credited with, in the committed file.
    ///
    /// May be empty when only count-level evidence existed (heuristic
    /// fallback); consumers must tolerate that.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<LineRange>,

    /// Free-form annotations (e.g. evidence provenance).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl AuthorInfo {
    /// A contribution record with no line evidence or metadata.
    #[must_use]
    pub const fn new(name: String, kind: AuthorKind) -> Self {
        Self {
            name,
            kind,
            lines: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }
}

/// One file's full authorship breakdown for one commit.
///
/// Invariant: `authors` is non-empty — a file with nothing to attribute is
/// simply absent from the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAuthorship {
    pub authors: Vec<AuthorInfo>,
}

// ---------------------------------------------------------------------------
// AuthorshipLog
// ---------------------------------------------------------------------------

/// The durable, commit-scoped attribution record.
///
/// Immutable once persisted for a given commit hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorshipLog {
    /// Schema version; must equal [`LOG_SCHEMA_VERSION`].
    pub version: String,

    /// Full hash of the commit this log describes.
    pub commit: String,

    /// When the log was produced (the commit's own timestamp).
    pub recorded_at: DateTime<Utc>,

    /// Per-file authorship, keyed by repository-relative path.
    pub files: BTreeMap<String, FileAuthorship>,
}

impl AuthorshipLog {
    /// An empty log for `commit` at the current schema version.
    #[must_use]
    pub fn new(commit: impl Into<String>, recorded_at: DateTime<Utc>) -> Self {
        Self {
            version: LOG_SCHEMA_VERSION.to_owned(),
            commit: commit.into(),
            recorded_at,
            files: BTreeMap::new(),
        }
    }

    /// Check every schema invariant.
    ///
    /// Author kinds are already closed at the type level; this covers the
    /// rest: version match, non-empty commit id, at least one author per
    /// file, and non-empty author names.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), LogValidationError> {
        if self.version != LOG_SCHEMA_VERSION {
            return Err(LogValidationError::VersionMismatch {
                found: self.version.clone(),
            });
        }
        if self.commit.is_empty() {
            return Err(LogValidationError::MissingCommit);
        }
        for (path, file) in &self.files {
            if file.authors.is_empty() {
                return Err(LogValidationError::NoAuthors { path: path.clone() });
            }
            if file.authors.iter().any(|a| a.name.is_empty()) {
                return Err(LogValidationError::UnnamedAuthor { path: path.clone() });
            }
        }
        Ok(())
    }

    /// Serialize to the canonical single-line JSON wire form.
    ///
    /// # Errors
    /// Returns an error if serialization fails (shouldn't happen for valid logs).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from the JSON wire form.
    ///
    /// # Errors
    /// Returns an error if the text is not valid JSON for this schema.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

// ---------------------------------------------------------------------------
// LogValidationError
// ---------------------------------------------------------------------------

/// A schema invariant an [`AuthorshipLog`] failed before persistence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogValidationError {
    /// The log's version does not match [`LOG_SCHEMA_VERSION`].
    VersionMismatch {
        /// The version string the log carried (possibly empty).
        found: String,
    },

    /// The commit id is empty.
    MissingCommit,

    /// A file entry has no authors.
    NoAuthors {
        /// The offending file path.
        path: String,
    },

    /// A file entry has an author with an empty name.
    UnnamedAuthor {
        /// The offending file path.
        path: String,
    },
}

impl fmt::Display for LogValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionMismatch { found } => {
                write!(
                    f,
                    "authorship log version {found:?} does not match {LOG_SCHEMA_VERSION:?}.\n  \
                     Logs from other schema versions are rejected, not migrated."
                )
            }
            Self::MissingCommit => write!(f, "authorship log has an empty commit id"),
            Self::NoAuthors { path } => {
                write!(f, "authorship log entry for '{path}' has no authors")
            }
            Self::UnnamedAuthor { path } => {
                write!(
                    f,
                    "authorship log entry for '{path}' has an author with an empty name"
                )
            }
        }
    }
}

impl std::error::Error for LogValidationError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
