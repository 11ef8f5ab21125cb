//! Parser for the restricted PlantUML-like machine grammar.
//!
//! Two constructs matter, one per line:
//!
//! ```text
//! Idle --> Armed : belief NAV.ok
//! note right of Armed
//! {"_commit": {"subject": "FSM.armed"}}
//! end note
//! ```
//!
//! Everything else is ignored. Transition clauses other than
//! `belief <subject>` are discarded, leaving the transition
//! unconditional. Note bodies are JSON; bodies that fail to parse are
//! kept verbatim so the state still exists.

use std::collections::HashMap;

use thiserror::Error;

use crate::intent::IntentNote;

/// One edge of the machine.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub from: String,
    pub to: String,
    /// Belief subjects that must all be observed true. The grammar
    /// yields at most one; the evaluator handles any number.
    pub required_beliefs: Vec<String>,
}

/// Errors a definition text can produce.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// No `note right of` block was found, so no state was defined.
    #[error("definition has no state notes")]
    NoStateNotes,
}

/// A parsed machine definition.
///
/// `state_order` lists states in first-seen `note right of` order; the
/// head is the initial state. Transitions keep their source-text order
/// per origin state, which is what makes first-match-wins deterministic.
#[derive(Clone, Debug, Default)]
pub struct Definition {
    pub state_order: Vec<String>,
    pub transitions: HashMap<String, Vec<Transition>>,
    pub notes: HashMap<String, IntentNote>,
}

impl Definition {
    /// Parse a definition text wholesale.
    pub fn parse(text: &str) -> Result<Self, DefinitionError> {
        let mut def = Definition::default();
        let mut lines = text.lines();
        let mut any_note = false;

        while let Some(line) = lines.next() {
            if let Some(arrow) = line.find("-->") {
                let from = line[..arrow].trim();
                let rest = &line[arrow + 3..];
                let (to, clause) = match rest.find(':') {
                    Some(colon) => (rest[..colon].trim(), Some(rest[colon + 1..].trim())),
                    None => (rest.trim(), None),
                };

                let mut required_beliefs = Vec::new();
                if let Some(clause) = clause {
                    if let Some(subject) = clause.strip_prefix("belief ") {
                        required_beliefs.push(subject.trim().to_string());
                    }
                }

                def.transitions
                    .entry(from.to_string())
                    .or_default()
                    .push(Transition {
                        from: from.to_string(),
                        to: to.to_string(),
                        required_beliefs,
                    });
                continue;
            }

            if let Some(state) = line.strip_prefix("note right of ") {
                let state = state.trim().to_string();

                let mut body = String::new();
                for body_line in lines.by_ref() {
                    if body_line.contains("end note") {
                        break;
                    }
                    body.push_str(body_line);
                    body.push('\n');
                }

                // A repeated note replaces its body but keeps the
                // state's first-seen position.
                if !def.notes.contains_key(&state) {
                    def.state_order.push(state.clone());
                }
                def.notes.insert(state, IntentNote::parse(&body));
                any_note = true;
            }
        }

        if !any_note {
            return Err(DefinitionError::NoStateNotes);
        }
        Ok(def)
    }

    /// The first-declared state, entered on load.
    pub fn initial_state(&self) -> Option<&str> {
        self.state_order.first().map(String::as_str)
    }

    /// Transitions leaving `state`, in source order.
    pub fn transitions_from(&self, state: &str) -> &[Transition] {
        self.transitions.get(state).map_or(&[], Vec::as_slice)
    }

    /// Intent note attached to `state`, if any.
    pub fn note(&self, state: &str) -> Option<&IntentNote> {
        self.notes.get(state)
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(Vec::len).sum()
    }
}
