//! Author-kind classification policy.
//!
//! Whether an identity counts as AI is a reviewable rule table, not string
//! logic scattered through the engine: an ordered list of exact names is
//! checked first, then an ordered list of case-insensitive substrings.
//! Anything unmatched is human.

use crate::config::AuthorsConfig;
use crate::model::AuthorKind;

/// Deterministic identity → [`AuthorKind`] rule table.
#[derive(Clone, Debug, Default)]
pub struct AuthorPolicy {
    exact_ai: Vec<String>,
    ai_substrings: Vec<String>,
}

impl AuthorPolicy {
    /// Build a policy from explicit rule lists. Substrings are matched
    /// case-insensitively, in order.
    #[must_use]
    pub fn new(exact_ai: Vec<String>, ai_substrings: Vec<String>) -> Self {
        Self {
            exact_ai,
            ai_substrings: ai_substrings.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// The rule table declared in the repository configuration.
    #[must_use]
    pub fn from_config(config: &AuthorsConfig) -> Self {
        Self::new(config.ai.clone(), config.ai_patterns.clone())
    }

    /// Classify an author identity.
    #[must_use]
    pub fn classify(&self, identity: &str) -> AuthorKind {
        if self.exact_ai.iter().any(|name| name == identity) {
            return AuthorKind::Ai;
        }
        let lowered = identity.to_lowercase();
        if self.ai_substrings.iter().any(|p| lowered.contains(p)) {
            return AuthorKind::Ai;
        }
        AuthorKind::Human
    }
}
