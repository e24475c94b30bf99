//! Repository configuration (`.byline/config.toml`).
//!
//! Typed configuration for attribution: which files are tracked, how author
//! identities are classified, and where authorship notes live. Missing
//! fields use sensible defaults. Missing file → all defaults (no error).

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::model::AuthorKind;

/// Location of the config file, relative to the repository root.
pub const CONFIG_PATH: &str = ".byline/config.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level byline repository configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BylineConfig {
    /// Which files participate in attribution.
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Author identity handling.
    #[serde(default)]
    pub authors: AuthorsConfig,

    /// Authorship note storage.
    #[serde(default)]
    pub notes: NotesConfig,
}

impl BylineConfig {
    /// Load the configuration for the repository rooted at `root`.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] when the file exists but cannot be read or
    /// parsed; a missing file yields defaults.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_PATH);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ConfigError {
                    path: Some(path),
                    message: err.to_string(),
                });
            }
        };
        toml::from_str(&text).map_err(|err| ConfigError {
            path: Some(path),
            message: err.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// TrackingConfig
// ---------------------------------------------------------------------------

/// File selection: extension allow-list plus exclude globs.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackingConfig {
    /// File extensions that participate in attribution. Empty list means
    /// every extension participates.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns for paths that never participate (matched against the
    /// repository-relative path).
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude: default_excludes(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    [
        "rs", "go", "py", "js", "jsx", "ts", "tsx", "java", "kt", "c", "h", "cc", "cpp", "hpp",
        "cs", "rb", "php", "swift", "scala", "sh", "sql", "html", "css", "toml", "yaml", "yml",
        "json", "proto", "md",
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect()
}

fn default_excludes() -> Vec<String> {
    ["vendor/**", "node_modules/**", "target/**", "dist/**", "*.lock"]
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
}

impl TrackingConfig {
    /// Compile the config into a matchable [`TrackingPolicy`].
    ///
    /// # Errors
    /// Returns a [`ConfigError`] for an invalid exclude glob.
    pub fn compile(&self) -> Result<TrackingPolicy, ConfigError> {
        let mut excludes = Vec::with_capacity(self.exclude.len());
        for pattern in &self.exclude {
            let compiled = glob::Pattern::new(pattern).map_err(|err| ConfigError {
                path: None,
                message: format!("invalid exclude pattern {pattern:?}: {err}"),
            })?;
            excludes.push(compiled);
        }
        Ok(TrackingPolicy {
            extensions: self.extensions.iter().map(|e| e.to_lowercase()).collect(),
            excludes,
        })
    }
}

// ---------------------------------------------------------------------------
// TrackingPolicy
// ---------------------------------------------------------------------------

/// Compiled form of [`TrackingConfig`], cheap to match per path.
#[derive(Clone, Debug)]
pub struct TrackingPolicy {
    extensions: BTreeSet<String>,
    excludes: Vec<glob::Pattern>,
}

impl TrackingPolicy {
    /// Whether `path` (repository-relative) participates in attribution.
    #[must_use]
    pub fn is_tracked(&self, path: &str) -> bool {
        if self.excludes.iter().any(|p| p.matches(path)) {
            return false;
        }
        if self.extensions.is_empty() {
            return true;
        }
        Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.contains(&e.to_lowercase()))
    }
}

// ---------------------------------------------------------------------------
// AuthorsConfig
// ---------------------------------------------------------------------------

/// Author identity handling: the fallback identity for unattributed work
/// and the classification rule table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorsConfig {
    /// Identity credited when a committed file has no checkpoint evidence.
    #[serde(default = "default_author")]
    pub default_author: String,

    /// Kind assumed for `default_author`.
    #[serde(default)]
    pub default_kind: AuthorKind,

    /// Exact identities classified as AI (checked before patterns).
    #[serde(default)]
    pub ai: Vec<String>,

    /// Case-insensitive substrings that classify an identity as AI.
    #[serde(default = "default_ai_patterns")]
    pub ai_patterns: Vec<String>,
}

impl Default for AuthorsConfig {
    fn default() -> Self {
        Self {
            default_author: default_author(),
            default_kind: AuthorKind::Human,
            ai: Vec::new(),
            ai_patterns: default_ai_patterns(),
        }
    }
}

fn default_author() -> String {
    "unknown".to_owned()
}

fn default_ai_patterns() -> Vec<String> {
    ["claude", "copilot", "cursor", "codex", "gpt", "gemini", "aider", "devin"]
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
}

// ---------------------------------------------------------------------------
// NotesConfig
// ---------------------------------------------------------------------------

/// Authorship note storage settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotesConfig {
    /// Notes namespace under `refs/notes/`.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

fn default_namespace() -> String {
    crate::gitio::notes::DEFAULT_NOTES_NAMESPACE.to_owned()
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// A configuration file that could not be loaded, parsed, or compiled.
#[derive(Debug)]
pub struct ConfigError {
    /// Path to the offending file, when one was involved.
    pub path: Option<PathBuf>,
    /// Human-readable description of the problem.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(
                f,
                "configuration error in '{}': {}\n  To fix: edit the config file and correct the issue.",
                path.display(),
                self.message
            ),
            None => write!(f, "configuration error: {}", self.message),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
