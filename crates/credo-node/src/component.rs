//! The component trait.

use serde_json::Value;

use crate::ctx::NodeCtx;

/// A participant in the mesh.
///
/// The poll loop hands every inbound datagram to `apply_snapshot` first
/// and `on_message` second: control-plane state lands before the domain
/// hook sees the frame. Both hooks receive the same decoded value and a
/// context scoped to the dispatch.
pub trait Component {
    /// Name used as the belief namespace prefix and in register replies.
    fn name(&self) -> &str;

    /// Control-plane intake: verbs, tick pulses, register merges.
    fn apply_snapshot(&mut self, ctx: &mut NodeCtx<'_>, msg: &Value);

    /// Domain intake, after the snapshot pass.
    fn on_message(&mut self, ctx: &mut NodeCtx<'_>, msg: &Value);
}
