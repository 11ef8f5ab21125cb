//! The belief store: the mesh's shared record of commitments.
//!
//! One component owns the substrate. Every accepted commit lands here,
//! and anyone may ask for the full polarity snapshot. Polarity is
//! last-write-wins per subject; the journal keeps every commit in
//! arrival order, so a flip never erases history.

use std::collections::BTreeMap;

use credo_core::{Belief, ControlRequest, Sba, credo_store};
use credo_node::{Component, NodeCtx};
use serde_json::{Value, json};

const COMPONENT_NAME: &str = "BLS";

pub struct BeliefStore {
    sba: Sba,
    polarities: BTreeMap<String, bool>,
    journal: Vec<Belief>,
}

impl BeliefStore {
    pub fn new(sba: Sba) -> Self {
        BeliefStore {
            sba,
            polarities: BTreeMap::new(),
            journal: Vec::new(),
        }
    }

    /// Record a commit: polarity last-write-wins, journal append-only.
    pub fn absorb(&mut self, belief: Belief) {
        credo_store!(
            debug,
            component = %belief.component,
            subject = %belief.subject,
            polarity = belief.polarity,
            "commit absorbed"
        );
        self.polarities
            .insert(belief.subject.clone(), belief.polarity);
        self.journal.push(belief);
    }

    /// The full polarity map, framed for the wire. Always complete,
    /// never a delta.
    pub fn snapshot_frame(&self) -> Value {
        json!({"beliefs": &self.polarities})
    }

    fn status_frame(&self) -> Value {
        json!({
            "component": COMPONENT_NAME,
            "sba": self.sba,
            "subjects": self.polarities.len(),
            "commits": self.journal.len(),
        })
    }

    /// Every commit ever absorbed, oldest first.
    pub fn journal(&self) -> &[Belief] {
        &self.journal
    }

    pub fn polarity(&self, subject: &str) -> Option<bool> {
        self.polarities.get(subject).copied()
    }
}

impl Component for BeliefStore {
    fn name(&self) -> &str {
        COMPONENT_NAME
    }

    fn apply_snapshot(&mut self, ctx: &mut NodeCtx<'_>, msg: &Value) {
        let Some(request) = ControlRequest::from_value(msg) else {
            return;
        };
        match request {
            ControlRequest::Get { resource } => {
                let reply = if resource.as_deref() == Some("beliefs") {
                    self.snapshot_frame()
                } else {
                    self.status_frame()
                };
                ctx.reply(&reply);
            }
            // The store exposes no writable registers.
            ControlRequest::Put { .. } | ControlRequest::Post { .. } => {}
        }
    }

    fn on_message(&mut self, _ctx: &mut NodeCtx<'_>, msg: &Value) {
        let Some(raw) = msg.get("belief") else {
            return;
        };
        match serde_json::from_value::<Belief>(raw.clone()) {
            Ok(belief) => self.absorb(belief),
            Err(err) => {
                credo_store!(debug, error = %err, "malformed commit dropped");
            }
        }
    }
}
