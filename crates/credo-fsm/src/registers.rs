//! Observable engine registers.

use credo_core::Sba;
use serde_json::{Value, json};

/// The engine's register block: everything a `GET` can observe plus the
/// internal `last_applied_state` bookkeeping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FsmRegisters {
    pub sba: Sba,
    /// Destination for `_send` intents; 0 means unconfigured.
    pub target_sba: Sba,
    /// Destination for `_tck` intents; 0 means unconfigured.
    pub tck_sba: Sba,
    pub run: bool,
    pub loaded: bool,
    pub current_state: String,
    pub next_state: String,
    pub transition_fired: bool,
    /// Last state whose note was applied. Not served on the control
    /// plane.
    pub last_applied_state: String,
    pub last_error: String,
}

impl FsmRegisters {
    pub fn new(sba: Sba) -> Self {
        FsmRegisters {
            sba,
            ..FsmRegisters::default()
        }
    }

    /// Register block served on the control plane.
    pub fn control_reply(&self, component: &str) -> Value {
        json!({
            "component": component,
            "sba": self.sba,
            "target_sba": self.target_sba,
            "tck_sba": self.tck_sba,
            "run": self.run,
            "loaded": self.loaded,
            "current_state": self.current_state,
            "next_state": self.next_state,
            "transition_fired": self.transition_fired,
            "last_error": self.last_error,
        })
    }

    /// Record a diagnostic. Kept until the next fired transition clears
    /// it.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = message.into();
    }
}
