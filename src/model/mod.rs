//! Core data model: line ranges, authorship records, checkpoints.

pub mod change;
pub mod ranges;
pub mod types;

pub use change::{Change, Checkpoint, FileSnapshot};
pub use ranges::{LineRange, compress_lines, count_lines};
pub use types::{
    AuthorInfo, AuthorKind, AuthorshipLog, FileAuthorship, LOG_SCHEMA_VERSION, LogValidationError,
};
