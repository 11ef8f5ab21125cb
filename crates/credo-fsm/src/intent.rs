//! Intent notes: the channels a state may route when entered.
//!
//! A note body is parsed once at load time into an [`IntentNote`].
//! Three channels exist, applied in this order when the state is
//! entered: `_commit`, `_send`, `_tck`. Each is optional; a malformed
//! channel is disabled rather than erroring.

use serde_json::{Value, json};

/// Marker prefix for register references in `_send` payloads.
pub const REGISTER_REF_MARKER: &str = "$REG.";

/// Resolves `$REG.` references found in outbound payloads.
///
/// The engine substitutes before sending; swapping the resolver is how a
/// future register-polling protocol plugs in.
pub trait RegisterResolver {
    /// Value to substitute for `reference` (the full `$REG.`-prefixed
    /// string).
    fn resolve(&self, reference: &str) -> Value;
}

/// Default resolver: every reference collapses to JSON null until a
/// register-polling protocol exists.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullResolver;

impl RegisterResolver for NullResolver {
    fn resolve(&self, _reference: &str) -> Value {
        Value::Null
    }
}

/// Replace `$REG.` string references at the top level of `payload`:
/// object fields and array elements. Nested values pass through
/// untouched.
pub fn substitute_register_refs(payload: &mut Value, resolver: &dyn RegisterResolver) {
    match payload {
        Value::Object(map) => {
            for slot in map.values_mut() {
                substitute_slot(slot, resolver);
            }
        }
        Value::Array(items) => {
            for slot in items.iter_mut() {
                substitute_slot(slot, resolver);
            }
        }
        _ => {}
    }
}

fn substitute_slot(slot: &mut Value, resolver: &dyn RegisterResolver) {
    if let Value::String(text) = slot {
        if text.starts_with(REGISTER_REF_MARKER) {
            *slot = resolver.resolve(text);
        }
    }
}

/// Parsed `_commit` channel.
#[derive(Clone, Debug, PartialEq)]
pub struct CommitIntent {
    pub subject: String,
    pub polarity: bool,
    pub context: Value,
}

impl CommitIntent {
    /// `None` when the subject is missing, empty, or not a string - the
    /// channel is disabled instead of erroring.
    fn from_value(value: &Value) -> Option<Self> {
        let subject = value
            .get("subject")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if subject.is_empty() {
            return None;
        }
        Some(CommitIntent {
            subject: subject.to_string(),
            polarity: value.get("polarity").and_then(Value::as_bool).unwrap_or(true),
            context: value.get("context").cloned().unwrap_or_else(|| json!({})),
        })
    }
}

/// Channels extracted from one state's note body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntentNote {
    /// `_commit` channel, absent when missing or malformed.
    pub commit: Option<CommitIntent>,
    /// `_send` payload, forwarded after register substitution.
    pub send: Option<Value>,
    /// `_tck` payload, forwarded verbatim.
    pub tck: Option<Value>,
    /// Verbatim body kept when it was not valid JSON.
    pub raw: Option<String>,
}

impl IntentNote {
    /// Parse one note body. Valid JSON yields channel routing; anything
    /// else becomes an inert raw note - the state still exists.
    pub fn parse(body: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(body) else {
            return IntentNote {
                raw: Some(body.to_string()),
                ..IntentNote::default()
            };
        };

        IntentNote {
            commit: value.get("_commit").and_then(CommitIntent::from_value),
            send: value.get("_send").cloned(),
            tck: value.get("_tck").cloned(),
            raw: None,
        }
    }

    /// True when no channel will route anything on entry.
    pub fn is_inert(&self) -> bool {
        self.commit.is_none() && self.send.is_none() && self.tck.is_none()
    }
}
