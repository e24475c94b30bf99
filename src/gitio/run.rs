//! The git subprocess contract.
//!
//! [`GitRunner`] is the single seam through which the engine executes git:
//! one synchronous call, trimmed stdout on success, captured stderr on
//! failure. Batching (one call covering many commits) is achieved by
//! choosing subcommand arguments, never by concurrency.
//!
//! [`SystemGit`] is the production implementation. Components receive a
//! `&dyn GitRunner` explicitly — there is no global executor — so tests can
//! substitute a scripted runner.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

// ---------------------------------------------------------------------------
// GitRunner
// ---------------------------------------------------------------------------

/// Executes a single git subcommand and returns its trimmed stdout.
pub trait GitRunner {
    /// Run `git <args…>`.
    ///
    /// # Errors
    /// [`GitError::Launch`] if the process could not be spawned,
    /// [`GitError::Failed`] if it exited non-zero.
    fn run(&self, args: &[&str]) -> Result<String, GitError>;
}

// ---------------------------------------------------------------------------
// SystemGit
// ---------------------------------------------------------------------------

/// Runs the real `git` binary against a fixed repository root.
#[derive(Clone, Debug)]
pub struct SystemGit {
    root: PathBuf,
}

impl SystemGit {
    /// A runner rooted at `root` (the repository worktree).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Discover the repository containing the current working directory.
    ///
    /// # Errors
    /// Returns an error when git is unavailable or the cwd is not inside a
    /// work tree.
    pub fn discover() -> Result<Self, GitError> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .map_err(GitError::Launch)?;
        if !output.status.success() {
            return Err(GitError::Failed {
                command: "git rev-parse --show-toplevel".to_owned(),
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        let root = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        Ok(Self::new(root))
    }

    /// The repository worktree root this runner operates on.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the repository's `.git` directory.
    ///
    /// # Errors
    /// Propagates the underlying `git rev-parse` failure.
    pub fn git_dir(&self) -> Result<PathBuf, GitError> {
        let dir = self.run(&["rev-parse", "--git-dir"])?;
        let path = PathBuf::from(dir);
        if path.is_absolute() {
            Ok(path)
        } else {
            Ok(self.root.join(path))
        }
    }
}

impl GitRunner for SystemGit {
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        tracing::debug!(?args, root = %self.root.display(), "git");
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .output()
            .map_err(GitError::Launch)?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
        } else {
            Err(GitError::Failed {
                command: format!("git {}", args.join(" ")),
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// GitError
// ---------------------------------------------------------------------------

/// A git subprocess call that did not produce usable output.
#[derive(Debug)]
pub enum GitError {
    /// The `git` binary could not be spawned at all.
    Launch(std::io::Error),

    /// git ran but exited non-zero.
    Failed {
        /// The command that was run (e.g. `"git notes show HEAD"`).
        command: String,
        /// Process exit code, if available.
        exit_code: Option<i32>,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// git succeeded but printed something the caller could not use.
    Unexpected {
        /// The command that was run.
        command: String,
        /// What was wrong with the output.
        detail: String,
    },
}

impl fmt::Display for GitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Launch(err) => {
                write!(
                    f,
                    "could not launch git: {err}\n  To fix: check that git is installed and on PATH."
                )
            }
            Self::Failed {
                command,
                exit_code,
                stderr,
            } => {
                write!(f, "git command failed: {command}")?;
                if let Some(code) = exit_code {
                    write!(f, " (exit code {code})")?;
                }
                if !stderr.is_empty() {
                    write!(f, "\n  stderr: {stderr}")?;
                }
                write!(
                    f,
                    "\n  To fix: check the repository state. Run `git status` for details."
                )
            }
            Self::Unexpected { command, detail } => {
                write!(f, "unexpected output from {command}: {detail}")
            }
        }
    }
}

impl std::error::Error for GitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Launch(err) => Some(err),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
