//! Git access layer: the subprocess runner contract, plumbing-text parsers,
//! and authorship-note persistence.
//!
//! Every module in this crate that needs git goes through the [`GitRunner`]
//! trait — no direct `std::process::Command` use outside [`run`]. Tests
//! substitute a scripted runner.

pub mod notes;
pub mod numstat;
pub mod run;

pub use notes::{NoteError, NoteStore};
pub use numstat::{CommitDiff, FileStat};
pub use run::{GitError, GitRunner, SystemGit};
