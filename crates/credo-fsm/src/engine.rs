//! The tick-driven engine.
//!
//! Time arrives as datagrams: a `{"tick": true}` pulse drives one
//! belief poll and at most one transition. Belief snapshots arrive on
//! their own datagrams and replace the observed map wholesale, so a
//! step always evaluates against the most recent complete answer from
//! the store, never a partial merge.

use std::collections::BTreeMap;

use credo_core::{BeliefSnapshot, ControlRequest, Sba, credo_engine, wire};
use credo_node::{Component, NodeCtx};
use serde_json::{Value, json};

use crate::definition::{Definition, Transition};
use crate::intent::{IntentNote, NullResolver, RegisterResolver, substitute_register_refs};
use crate::registers::FsmRegisters;

const COMPONENT_NAME: &str = "FSM";

/// Tick-driven machine over the belief mesh.
pub struct Fsm {
    regs: FsmRegisters,
    definition: Definition,
    observed: BeliefSnapshot,
    resolver: Box<dyn RegisterResolver>,
}

impl Fsm {
    pub fn new(sba: Sba) -> Self {
        Self::with_resolver(sba, Box::new(NullResolver))
    }

    /// Engine with a custom `$REG.` resolver.
    pub fn with_resolver(sba: Sba, resolver: Box<dyn RegisterResolver>) -> Self {
        Fsm {
            regs: FsmRegisters::new(sba),
            definition: Definition::default(),
            observed: BeliefSnapshot::default(),
            resolver,
        }
    }

    pub fn registers(&self) -> &FsmRegisters {
        &self.regs
    }

    /// The snapshot the engine last observed.
    pub fn observed_beliefs(&self) -> &BTreeMap<String, bool> {
        &self.observed.beliefs
    }

    fn on_tick(&mut self, ctx: &mut NodeCtx<'_>) {
        self.poll_beliefs(ctx);
        self.step(ctx);
    }

    /// Ask the store for a fresh snapshot. The answer arrives on a later
    /// dispatch; stepping always uses the most recent one already held.
    fn poll_beliefs(&mut self, ctx: &mut NodeCtx<'_>) {
        let request = json!({"verb": "GET", "resource": "beliefs"});
        let dest = ctx.bls_sba();
        ctx.send(&request, dest);
    }

    /// Evaluate the current state's transitions in source order and fire
    /// the first satisfied one, if any.
    fn step(&mut self, ctx: &mut NodeCtx<'_>) {
        self.regs.transition_fired = false;
        self.regs.next_state.clear();

        let fired = self
            .definition
            .transitions_from(&self.regs.current_state)
            .iter()
            .find(|t| self.guard_satisfied(t))
            .cloned();
        let Some(transition) = fired else {
            return;
        };

        credo_engine!(
            debug,
            from = %transition.from,
            to = %transition.to,
            "transition fired"
        );

        self.regs.next_state = transition.to.clone();
        self.regs.current_state = transition.to.clone();
        self.regs.transition_fired = true;
        self.regs.last_error.clear();

        // Subject prefix comes from the dispatch context so the commit
        // always clears the ownership check.
        let subject = format!("{}.state.{}", ctx.component(), transition.to);
        ctx.commit(&subject, true, json!({}));

        if let Some(note) = self.definition.note(&transition.to).cloned() {
            self.regs.last_applied_state = transition.to.clone();
            self.apply_note(ctx, &note);
        }
    }

    /// All listed subjects must be observed and true. Absent means
    /// false; there is no "unknown".
    fn guard_satisfied(&self, transition: &Transition) -> bool {
        transition
            .required_beliefs
            .iter()
            .all(|subject| self.observed.beliefs.get(subject).copied().unwrap_or(false))
    }

    /// Run the entered state's channels, in order: commit, send, tck.
    fn apply_note(&mut self, ctx: &mut NodeCtx<'_>, note: &IntentNote) {
        if let Some(intent) = &note.commit {
            ctx.commit(&intent.subject, intent.polarity, intent.context.clone());
        }
        if let Some(payload) = &note.send {
            self.route_send(ctx, payload.clone());
        }
        if let Some(payload) = &note.tck {
            self.route_tck(ctx, payload);
        }
    }

    fn route_send(&mut self, ctx: &mut NodeCtx<'_>, mut payload: Value) {
        if self.regs.target_sba == 0 {
            return;
        }
        substitute_register_refs(&mut payload, self.resolver.as_ref());
        ctx.send(&payload, self.regs.target_sba);
    }

    fn route_tck(&mut self, ctx: &mut NodeCtx<'_>, payload: &Value) {
        if self.regs.tck_sba == 0 {
            return;
        }
        ctx.send(payload, self.regs.tck_sba);
    }

    fn apply_put(&mut self, resource: &str, body: &Value) {
        if resource != "fsm" {
            return;
        }
        if let Some(sba) = read_sba(body, "target_sba") {
            self.regs.target_sba = sba;
        }
        if let Some(sba) = read_sba(body, "tck_sba") {
            self.regs.tck_sba = sba;
        }
        if let Some(text) = body.get("fsm_text").and_then(Value::as_str) {
            self.load(text);
        }
    }

    /// Install a definition wholesale. Failure leaves the engine
    /// unloaded; addresses and the run flag are not rolled back.
    fn load(&mut self, text: &str) {
        match Definition::parse(text) {
            Ok(definition) => {
                if let Some(initial) = definition.initial_state() {
                    self.regs.current_state = initial.to_string();
                    self.regs.run = true;
                }
                self.regs.loaded = true;
                credo_engine!(
                    info,
                    states = definition.state_order.len(),
                    transitions = definition.transition_count(),
                    "definition loaded"
                );
                self.definition = definition;
            }
            Err(err) => {
                credo_engine!(debug, error = %err, "definition rejected");
                self.definition = Definition::default();
                self.regs.loaded = false;
                self.regs.record_error(err.to_string());
            }
        }
    }

    fn apply_post(&mut self, action: &str) {
        match action {
            "run" => self.regs.run = true,
            "stop" => self.regs.run = false,
            _ => return,
        }
        credo_engine!(debug, action, run = self.regs.run, "run flag set");
    }
}

impl Component for Fsm {
    fn name(&self) -> &str {
        COMPONENT_NAME
    }

    fn apply_snapshot(&mut self, ctx: &mut NodeCtx<'_>, msg: &Value) {
        // Ticks are consumed before any verb handling.
        if wire::is_tick(msg) {
            if self.regs.run {
                self.on_tick(ctx);
            }
            return;
        }

        let Some(request) = ControlRequest::from_value(msg) else {
            return;
        };
        match request {
            ControlRequest::Get { .. } => {
                let reply = self.regs.control_reply(ctx.component());
                ctx.reply(&reply);
            }
            ControlRequest::Put { resource, body } => self.apply_put(&resource, &body),
            ControlRequest::Post { action } => self.apply_post(&action),
        }
    }

    fn on_message(&mut self, _ctx: &mut NodeCtx<'_>, msg: &Value) {
        let Some(beliefs) = msg.get("beliefs").and_then(Value::as_object) else {
            return;
        };
        self.observed.beliefs.clear();
        for (subject, polarity) in beliefs {
            if let Some(polarity) = polarity.as_bool() {
                self.observed.beliefs.insert(subject.clone(), polarity);
            }
        }
        credo_engine!(
            trace,
            subjects = self.observed.beliefs.len(),
            "snapshot replaced"
        );
    }
}

fn read_sba(body: &Value, key: &str) -> Option<Sba> {
    body.get(key)
        .and_then(Value::as_u64)
        .and_then(|raw| Sba::try_from(raw).ok())
}
