//! Authorship log persistence over `git notes`.
//!
//! Each commit's [`AuthorshipLog`] is stored as single-line JSON attached to
//! the commit under a dedicated notes namespace (`refs/notes/byline` by
//! default). A commit with no note means "no log for this commit" — that is
//! an ordinary state, not an error.
//!
//! Reads over a range are batched through one `git log --notes` call so
//! aggregation never pays one subprocess per commit.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::AuthorshipLog;

use super::run::{GitError, GitRunner};

/// Default notes namespace (under `refs/notes/`).
pub const DEFAULT_NOTES_NAMESPACE: &str = "byline";

// ---------------------------------------------------------------------------
// NoteStore
// ---------------------------------------------------------------------------

/// Reads and writes authorship notes through a [`GitRunner`].
pub struct NoteStore<'a> {
    git: &'a dyn GitRunner,
    namespace: String,
}

impl<'a> NoteStore<'a> {
    /// A store over `git`'s repository using the given notes namespace.
    pub fn new(git: &'a dyn GitRunner, namespace: impl Into<String>) -> Self {
        Self {
            git,
            namespace: namespace.into(),
        }
    }

    /// Attach `log` to `commit`, replacing any existing note.
    ///
    /// # Errors
    /// Propagates git failures; the caller is expected to have validated
    /// the log first.
    pub fn put(&self, commit: &str, log: &AuthorshipLog) -> Result<(), NoteError> {
        let json = log.to_json().map_err(|source| NoteError::Malformed {
            commit: commit.to_owned(),
            source,
        })?;
        self.git
            .run(&[
                "notes",
                "--ref",
                &self.namespace,
                "add",
                "-f",
                "-m",
                &json,
                commit,
            ])
            .map_err(NoteError::Git)?;
        tracing::info!(%commit, namespace = %self.namespace, "authorship note written");
        Ok(())
    }

    /// Read the log attached to `commit`, if any.
    ///
    /// # Errors
    /// A missing note is `Ok(None)`; a present-but-unparseable note is
    /// [`NoteError::Malformed`]; other git failures propagate.
    pub fn get(&self, commit: &str) -> Result<Option<AuthorshipLog>, NoteError> {
        let text = match self
            .git
            .run(&["notes", "--ref", &self.namespace, "show", commit])
        {
            Ok(text) => text,
            Err(GitError::Failed { stderr, .. }) if stderr.contains("no note found") => {
                return Ok(None);
            }
            Err(err) => return Err(NoteError::Git(err)),
        };
        AuthorshipLog::from_json(text.trim())
            .map(Some)
            .map_err(|source| NoteError::Malformed {
                commit: commit.to_owned(),
                source,
            })
    }

    /// Read every valid log attached to commits in `range`, in one call.
    ///
    /// Commits without a note are simply absent from the result. Notes that
    /// fail to parse or fail schema validation are skipped with a warning —
    /// one bad note must not take down a whole report.
    ///
    /// # Errors
    /// Propagates the underlying `git log` failure (e.g. bad revision).
    pub fn list_for_range(
        &self,
        range: &str,
    ) -> Result<BTreeMap<String, AuthorshipLog>, NoteError> {
        let notes_arg = format!("--notes={}", self.namespace);
        let text = self
            .git
            .run(&["log", &notes_arg, "--format=commit %H%n%N", range])
            .map_err(NoteError::Git)?;

        let mut logs = BTreeMap::new();
        let mut current: Option<(String, String)> = None;
        for line in text.lines() {
            if let Some(id) = line.strip_prefix("commit ") {
                if let Some(entry) = current.take() {
                    insert_parsed(&mut logs, entry);
                }
                current = Some((id.trim().to_owned(), String::new()));
            } else if let Some((_, note)) = &mut current {
                note.push_str(line);
                note.push('\n');
            }
        }
        if let Some(entry) = current.take() {
            insert_parsed(&mut logs, entry);
        }
        Ok(logs)
    }
}

fn insert_parsed(logs: &mut BTreeMap<String, AuthorshipLog>, (commit, note): (String, String)) {
    let note = note.trim();
    if note.is_empty() {
        return;
    }
    match AuthorshipLog::from_json(note) {
        Ok(log) => match log.validate() {
            Ok(()) => {
                logs.insert(commit, log);
            }
            Err(err) => {
                tracing::warn!(%commit, %err, "skipping authorship note that fails validation");
            }
        },
        Err(err) => {
            tracing::warn!(%commit, %err, "skipping unparseable authorship note");
        }
    }
}

// ---------------------------------------------------------------------------
// NoteError
// ---------------------------------------------------------------------------

/// A failure reading or writing authorship notes.
#[derive(Debug)]
pub enum NoteError {
    /// The underlying git call failed.
    Git(GitError),

    /// A note exists but its payload is not a valid authorship log.
    Malformed {
        /// The commit whose note is broken.
        commit: String,
        /// The underlying serde error.
        source: serde_json::Error,
    },
}

impl fmt::Display for NoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git(err) => write!(f, "{err}"),
            Self::Malformed { commit, source } => {
                write!(
                    f,
                    "authorship note on commit {commit} is not valid JSON: {source}\n  \
                     To fix: inspect it with `git notes --ref byline show {commit}`."
                )
            }
        }
    }
}

impl std::error::Error for NoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Git(err) => Some(err),
            Self::Malformed { source, .. } => Some(source),
        }
    }
}

impl From<GitError> for NoteError {
    fn from(err: GitError) -> Self {
        Self::Git(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gitio::testing::ScriptedGit;
    use crate::model::{AuthorInfo, AuthorKind, FileAuthorship};
    use chrono::TimeZone;

    fn sample_log(commit: &str) -> AuthorshipLog {
        let ts = chrono::Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        let mut log = AuthorshipLog::new(commit, ts);
        log.files.insert(
            "a.rs".to_owned(),
            FileAuthorship {
                authors: vec![AuthorInfo::new("alice".to_owned(), AuthorKind::Human)],
            },
        );
        log
    }

    #[test]
    fn put_writes_compact_json_note() {
        let log = sample_log("abc123");
        let json = log.to_json().unwrap();
        let git = ScriptedGit::new().expect(
            &[
                "notes", "--ref", "byline", "add", "-f", "-m", &json, "abc123",
            ],
            Ok(""),
        );
        NoteStore::new(&git, "byline").put("abc123", &log).unwrap();
        git.assert_drained();
    }

    #[test]
    fn get_parses_existing_note() {
        let log = sample_log("abc123");
        let json = log.to_json().unwrap();
        let git = ScriptedGit::new().expect(
            &["notes", "--ref", "byline", "show", "abc123"],
            Ok(&json),
        );
        let fetched = NoteStore::new(&git, "byline").get("abc123").unwrap();
        assert_eq!(fetched, Some(log));
    }

    #[test]
    fn get_maps_missing_note_to_none() {
        let git = ScriptedGit::new().expect(
            &["notes", "--ref", "byline", "show", "abc123"],
            Err(GitError::Failed {
                command: "git notes show".to_owned(),
                exit_code: Some(1),
                stderr: "error: no note found for object abc123.".to_owned(),
            }),
        );
        let fetched = NoteStore::new(&git, "byline").get("abc123").unwrap();
        assert_eq!(fetched, None);
    }

    #[test]
    fn get_surfaces_malformed_note() {
        let git = ScriptedGit::new().expect(
            &["notes", "--ref", "byline", "show", "abc123"],
            Ok("{ not json"),
        );
        let err = NoteStore::new(&git, "byline").get("abc123").unwrap_err();
        assert!(matches!(err, NoteError::Malformed { .. }));
        assert!(err.to_string().contains("abc123"));
    }

    #[test]
    fn list_for_range_collects_noted_commits_only() {
        let log_a = sample_log("aaa");
        let text = format!(
            "commit aaa\n{}\ncommit bbb\n\ncommit ccc\nnot-json\n",
            log_a.to_json().unwrap()
        );
        let git = ScriptedGit::new().expect(
            &["log", "--notes=byline", "--format=commit %H%n%N", "HEAD~3..HEAD"],
            Ok(&text),
        );
        let logs = NoteStore::new(&git, "byline")
            .list_for_range("HEAD~3..HEAD")
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs["aaa"], log_a);
    }

    #[test]
    fn list_for_range_skips_version_mismatched_logs() {
        let mut stale = sample_log("aaa");
        stale.version = "byline/0.1.0".to_owned();
        let text = format!("commit aaa\n{}\n", stale.to_json().unwrap());
        let git = ScriptedGit::new().expect(
            &["log", "--notes=byline", "--format=commit %H%n%N", "HEAD"],
            Ok(&text),
        );
        let logs = NoteStore::new(&git, "byline").list_for_range("HEAD").unwrap();
        assert!(logs.is_empty());
    }
}
