//! Unified error type for attribution flows.
//!
//! Engine modules define their own focused error enums ([`GitError`],
//! [`StoreError`], [`NoteError`], [`LogValidationError`]); this module
//! folds them into one [`BylineError`] for the record/finalize/report
//! orchestration paths. Each variant stays self-contained: the message says
//! what failed and what to do about it, without leaking more than a
//! diagnostic suffix of raw subprocess output.

use std::fmt;

use crate::checkpoint::StoreError;
use crate::gitio::notes::NoteError;
use crate::gitio::run::GitError;
use crate::model::LogValidationError;

// ---------------------------------------------------------------------------
// BylineError
// ---------------------------------------------------------------------------

/// Any hard failure in a checkpoint, finalization, or report flow.
///
/// Diff-text parse problems never appear here — malformed plumbing lines
/// are dropped by the best-effort parsers, not surfaced.
#[derive(Debug)]
pub enum BylineError {
    /// A git subprocess call failed (missing repository, bad revision,
    /// git not installed).
    Git(GitError),

    /// The checkpoint journal could not be read or written.
    Store(StoreError),

    /// Reading or writing an authorship note failed.
    Note(NoteError),

    /// A built authorship log failed schema validation; nothing was
    /// persisted for that commit.
    InvalidLog(LogValidationError),
}

impl fmt::Display for BylineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Note(err) => write!(f, "{err}"),
            Self::InvalidLog(err) => {
                write!(
                    f,
                    "refusing to persist an invalid authorship log: {err}\n  \
                     Already-persisted logs for other commits are untouched."
                )
            }
        }
    }
}

impl std::error::Error for BylineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Git(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Note(err) => Some(err),
            Self::InvalidLog(err) => Some(err),
        }
    }
}

impl From<GitError> for BylineError {
    fn from(err: GitError) -> Self {
        Self::Git(err)
    }
}

impl From<StoreError> for BylineError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<NoteError> for BylineError {
    fn from(err: NoteError) -> Self {
        Self::Note(err)
    }
}

impl From<LogValidationError> for BylineError {
    fn from(err: LogValidationError) -> Self {
        Self::InvalidLog(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
