//! The checkpoint store: an append-only JSON array file.
//!
//! Checkpoints accumulate in `.git/byline/checkpoints.json` between
//! commits. The store exposes exactly the contract the engine consumes —
//! `load_all`, `append`, `clear` — and treats the backing file as opaque
//! beyond that.
//!
//! # Single-writer assumption
//!
//! Recording and finalization are separate, normally non-overlapping
//! invocations; the store takes no lock. Two recorders racing on the same
//! file within one commit cycle is an accepted gap.

use std::fmt;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::model::Checkpoint;

/// File name of the checkpoint journal inside the state directory.
const CHECKPOINTS_FILE: &str = "checkpoints.json";

// ---------------------------------------------------------------------------
// CheckpointStore
// ---------------------------------------------------------------------------

/// Reads and writes the checkpoint journal for one repository.
#[derive(Clone, Debug)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// A store backed by `<state_dir>/checkpoints.json`.
    #[must_use]
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: state_dir.into().join(CHECKPOINTS_FILE),
        }
    }

    /// The store rooted in a repository's `.git` directory.
    #[must_use]
    pub fn in_git_dir(git_dir: &Path) -> Self {
        Self::new(git_dir.join("byline"))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every recorded checkpoint, oldest first.
    ///
    /// # Errors
    /// A missing file is an empty store; an unreadable or unparseable file
    /// is a [`StoreError`].
    pub fn load_all(&self) -> Result<Vec<Checkpoint>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source: err,
                });
            }
        };
        serde_json::from_str(&text).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Append one checkpoint to the journal.
    ///
    /// The whole array is rewritten through a temp file in the same
    /// directory so a crash mid-write cannot leave a torn journal.
    ///
    /// # Errors
    /// Propagates read, serialize, and write failures.
    pub fn append(&self, checkpoint: &Checkpoint) -> Result<(), StoreError> {
        let mut all = self.load_all()?;
        all.push(checkpoint.clone());
        self.write_all(&all)
    }

    /// Drop every recorded checkpoint.
    ///
    /// # Errors
    /// Propagates filesystem failures; clearing an already-empty store is
    /// fine.
    pub fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Io {
                path: self.path.clone(),
                source: err,
            }),
        }
    }

    fn write_all(&self, checkpoints: &[Checkpoint]) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(io_err)?;

        let json = serde_json::to_string_pretty(checkpoints).map_err(|source| {
            StoreError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|err| io_err(err.error))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// The checkpoint file could not be read or written.
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem failure on the journal or its temp file.
    Io {
        /// The journal path.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The journal exists but is not a valid checkpoint array.
    Parse {
        /// The journal path.
        path: PathBuf,
        /// The underlying serde error.
        source: serde_json::Error,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(
                    f,
                    "checkpoint store I/O error on '{}': {source}\n  \
                     To fix: check file permissions and disk space.",
                    path.display()
                )
            }
            Self::Parse { path, source } => {
                write!(
                    f,
                    "checkpoint store at '{}' is corrupted: {source}\n  \
                     To fix: remove the file to start a fresh checkpoint cycle \
                     (recorded-but-uncommitted attribution will be lost).",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
