//! Belief primitives for the component mesh.
//!
//! A belief is a monotonic boolean assertion a component makes about the
//! world. Components may only assert subjects inside their own namespace,
//! and a given (subject, polarity) pair is committed at most once.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single belief assertion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Belief {
    /// Component that committed the belief.
    pub component: String,
    /// Dotted subject, prefixed with the committing component's name.
    pub subject: String,
    /// Asserted truth value.
    pub polarity: bool,
    /// Free-form JSON attached by the committer.
    pub context: Value,
}

impl Belief {
    /// Creates a new belief assertion.
    pub fn new(
        component: impl Into<String>,
        subject: impl Into<String>,
        polarity: bool,
        context: Value,
    ) -> Self {
        Belief {
            component: component.into(),
            subject: subject.into(),
            polarity,
            context,
        }
    }
}

/// Outcome of offering a belief to a [`CommitLog`].
///
/// Rejections never cross the wire; they exist so callers and tests can
/// observe why a commit went nowhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitDecision {
    /// Belief recorded and eligible for publication.
    Accepted,
    /// Subject does not carry the committing component's `<name>.` prefix.
    ForeignSubject,
    /// The same (subject, polarity) pair was already committed.
    Duplicate,
}

impl CommitDecision {
    /// True when the belief was recorded.
    pub fn is_accepted(&self) -> bool {
        matches!(self, CommitDecision::Accepted)
    }
}

/// Append-only history of beliefs committed by one component.
///
/// The log is the enforcement point for the two commit invariants:
/// namespace ownership and write-once monotonicity.
#[derive(Clone, Debug, Default)]
pub struct CommitLog {
    entries: Vec<Belief>,
}

impl CommitLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates ownership and monotonicity, appending on acceptance.
    pub fn admit(&mut self, belief: &Belief) -> CommitDecision {
        let prefix = format!("{}.", belief.component);
        if !belief.subject.starts_with(&prefix) {
            return CommitDecision::ForeignSubject;
        }

        let duplicate = self
            .entries
            .iter()
            .any(|b| b.subject == belief.subject && b.polarity == belief.polarity);
        if duplicate {
            return CommitDecision::Duplicate;
        }

        self.entries.push(belief.clone());
        CommitDecision::Accepted
    }

    /// All accepted beliefs, oldest first.
    pub fn entries(&self) -> &[Belief] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
