//! Capability surface handed to component hooks.

use credo_core::{Belief, BeliefCommit, CommitDecision, CommitLog, Sba, credo_net};
use serde_json::Value;

/// Transport over which a node exchanges frames.
///
/// The substrate implements this for its UDP endpoint; tests implement it
/// with a recording mock so engines can be driven without sockets.
pub trait Transport {
    /// Deliver one frame to a destination address. True when the whole
    /// frame was accepted.
    fn send(&mut self, value: &Value, dest: Sba) -> bool;

    /// Deliver one frame to the sender of the most recent inbound
    /// datagram. False when no datagram has arrived yet.
    fn reply(&mut self, value: &Value) -> bool;
}

/// What a component may do while handling a datagram: send, reply, and
/// commit beliefs. Borrowed from the owning node for the duration of one
/// dispatch.
pub struct NodeCtx<'a> {
    transport: &'a mut dyn Transport,
    log: &'a mut CommitLog,
    component: &'a str,
    bls_sba: Sba,
}

impl<'a> NodeCtx<'a> {
    pub fn new(
        transport: &'a mut dyn Transport,
        log: &'a mut CommitLog,
        component: &'a str,
        bls_sba: Sba,
    ) -> Self {
        Self {
            transport,
            log,
            component,
            bls_sba,
        }
    }

    /// Name of the component this context belongs to.
    pub fn component(&self) -> &str {
        self.component
    }

    /// Address of the belief store commits are published to.
    pub fn bls_sba(&self) -> Sba {
        self.bls_sba
    }

    pub fn send(&mut self, value: &Value, dest: Sba) -> bool {
        self.transport.send(value, dest)
    }

    pub fn reply(&mut self, value: &Value) -> bool {
        self.transport.reply(value)
    }

    /// Commit a belief: ownership and monotonicity checks, then
    /// publication to the belief store. Rejections are silent on the
    /// wire; the decision says why.
    pub fn commit(&mut self, subject: &str, polarity: bool, context: Value) -> CommitDecision {
        let belief = Belief::new(self.component, subject, polarity, context);
        let decision = self.log.admit(&belief);
        match decision {
            CommitDecision::Accepted => {
                if let Ok(frame) = serde_json::to_value(BeliefCommit { belief }) {
                    if !self.transport.send(&frame, self.bls_sba) {
                        credo_net!(debug, component = self.component, subject, "belief publication failed");
                    }
                }
            }
            CommitDecision::ForeignSubject => {
                credo_net!(
                    debug,
                    component = self.component,
                    subject,
                    "commit rejected: foreign subject"
                );
            }
            CommitDecision::Duplicate => {
                credo_net!(trace, component = self.component, subject, "commit rejected: duplicate");
            }
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Vec<(Value, Sba)>,
        replies: Vec<Value>,
    }

    impl Transport for RecordingTransport {
        fn send(&mut self, value: &Value, dest: Sba) -> bool {
            self.sent.push((value.clone(), dest));
            true
        }

        fn reply(&mut self, value: &Value) -> bool {
            self.replies.push(value.clone());
            true
        }
    }

    #[test]
    fn accepted_commit_is_published_to_the_store() {
        let mut transport = RecordingTransport::default();
        let mut log = CommitLog::new();
        let mut ctx = NodeCtx::new(&mut transport, &mut log, "FSM", 4000);

        let decision = ctx.commit("FSM.state.armed", true, json!({"tick": 3}));
        assert!(decision.is_accepted());

        assert_eq!(transport.sent.len(), 1);
        let (frame, dest) = &transport.sent[0];
        assert_eq!(*dest, 4000);
        assert_eq!(frame["belief"]["component"], "FSM");
        assert_eq!(frame["belief"]["subject"], "FSM.state.armed");
        assert_eq!(frame["belief"]["polarity"], true);
        assert_eq!(frame["belief"]["context"]["tick"], 3);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn foreign_commit_is_dropped_without_traffic() {
        let mut transport = RecordingTransport::default();
        let mut log = CommitLog::new();
        let mut ctx = NodeCtx::new(&mut transport, &mut log, "FSM", 4000);

        let decision = ctx.commit("NAV.ok", true, json!({}));
        assert_eq!(decision, CommitDecision::ForeignSubject);
        assert!(transport.sent.is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn duplicate_commit_publishes_once() {
        let mut transport = RecordingTransport::default();
        let mut log = CommitLog::new();
        let mut ctx = NodeCtx::new(&mut transport, &mut log, "FSM", 4000);

        assert!(ctx.commit("FSM.done", true, json!({})).is_accepted());
        assert_eq!(
            ctx.commit("FSM.done", true, json!({})),
            CommitDecision::Duplicate
        );
        assert_eq!(transport.sent.len(), 1);
        assert_eq!(log.len(), 1);
    }
}
