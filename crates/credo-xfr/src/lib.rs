//! File transfer component scripted by machine definitions.
//!
//! XFR is a register file on the mesh: machines drive it by writing
//! `mode` and `advance` through their `_send` channel, and poll its
//! registers to sequence a chunked transfer. The chunk pump itself is
//! a peer process; this component holds the registers both sides
//! script against.

use credo_core::{ControlRequest, Sba};
use credo_node::{Component, NodeCtx};
use serde_json::{Value, json};

const COMPONENT_NAME: &str = "XFR";

/// Everything a machine definition can read back from XFR.
#[derive(Clone, Debug, PartialEq)]
pub struct XfrRegisters {
    pub sba: Sba,
    /// "idle", "send" or "recv".
    pub mode: String,
    pub file_path: String,
    pub peer_id: String,
    pub chunk_size: u32,
    pub total_chunks: u32,
    pub current_chunk: u32,
    pub chunk_payload: String,
    pub chunk_ready: bool,
    pub chunk_accepted: bool,
    pub send_done: bool,
    pub recv_done: bool,
    pub advance: bool,
    pub last_error: String,
}

impl Default for XfrRegisters {
    fn default() -> Self {
        XfrRegisters {
            sba: 0,
            mode: "idle".to_string(),
            file_path: String::new(),
            peer_id: String::new(),
            chunk_size: 512,
            total_chunks: 0,
            current_chunk: 0,
            chunk_payload: String::new(),
            chunk_ready: false,
            chunk_accepted: false,
            send_done: false,
            recv_done: false,
            advance: false,
            last_error: String::new(),
        }
    }
}

impl XfrRegisters {
    pub fn new(sba: Sba) -> Self {
        XfrRegisters {
            sba,
            ..XfrRegisters::default()
        }
    }

    /// Full register dump for a control read.
    pub fn control_reply(&self, component: &str) -> Value {
        json!({
            "component": component,
            "sba": self.sba,
            "mode": self.mode,
            "file_path": self.file_path,
            "peer_id": self.peer_id,
            "chunk_size": self.chunk_size,
            "total_chunks": self.total_chunks,
            "current_chunk": self.current_chunk,
            "chunk_payload": self.chunk_payload,
            "chunk_ready": self.chunk_ready,
            "chunk_accepted": self.chunk_accepted,
            "send_done": self.send_done,
            "recv_done": self.recv_done,
            "advance": self.advance,
            "last_error": self.last_error,
        })
    }
}

pub struct Xfr {
    regs: XfrRegisters,
}

impl Xfr {
    pub fn new(sba: Sba) -> Self {
        Xfr {
            regs: XfrRegisters::new(sba),
        }
    }

    pub fn registers(&self) -> &XfrRegisters {
        &self.regs
    }
}

impl Component for Xfr {
    fn name(&self) -> &str {
        COMPONENT_NAME
    }

    fn apply_snapshot(&mut self, ctx: &mut NodeCtx<'_>, msg: &Value) {
        // Any inbound frame may steer the transfer.
        if let Some(mode) = msg.get("mode").and_then(Value::as_str) {
            self.regs.mode = mode.to_string();
        }
        if let Some(advance) = msg.get("advance").and_then(Value::as_bool) {
            self.regs.advance = advance;
        }

        if let Some(ControlRequest::Get { .. }) = ControlRequest::from_value(msg) {
            let reply = self.regs.control_reply(ctx.component());
            ctx.reply(&reply);
        }
    }

    fn on_message(&mut self, _ctx: &mut NodeCtx<'_>, _msg: &Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use credo_core::{BLS_SBA, CommitLog};
    use credo_node::Transport;

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

    fn deliver(xfr: &mut Xfr, transport: &mut RecordingTransport, frame: &Value) {
        let mut log = CommitLog::new();
        let mut ctx = NodeCtx::new(transport, &mut log, "XFR", BLS_SBA);
        xfr.apply_snapshot(&mut ctx, frame);
        xfr.on_message(&mut ctx, frame);
    }

    #[test]
    fn defaults_are_idle() {
        let regs = XfrRegisters::new(4005);
        assert_eq!(regs.sba, 4005);
        assert_eq!(regs.mode, "idle");
        assert_eq!(regs.chunk_size, 512);
        assert!(!regs.advance);
    }

    #[test]
    fn inbound_frames_steer_mode_and_advance() {
        let mut xfr = Xfr::new(4005);
        let mut transport = RecordingTransport::default();

        deliver(&mut xfr, &mut transport, &json!({"mode": "send"}));
        assert_eq!(xfr.registers().mode, "send");

        deliver(&mut xfr, &mut transport, &json!({"advance": true}));
        assert_eq!(xfr.registers().mode, "send");
        assert!(xfr.registers().advance);

        // Wrong types leave the registers alone.
        deliver(&mut xfr, &mut transport, &json!({"mode": 7, "advance": "yes"}));
        assert_eq!(xfr.registers().mode, "send");
        assert!(xfr.registers().advance);
    }

    #[test]
    fn get_replies_the_full_register_dump() {
        let mut xfr = Xfr::new(4005);
        let mut transport = RecordingTransport::default();
        deliver(&mut xfr, &mut transport, &json!({"verb": "GET"}));

        let reply = &transport.replies[0];
        assert_eq!(reply["component"], "XFR");
        assert_eq!(reply["sba"], 4005);
        assert_eq!(reply["mode"], "idle");
        assert_eq!(reply["chunk_size"], 512);
        assert_eq!(reply.as_object().map(|o| o.len()), Some(15));
    }

    #[test]
    fn steering_fields_ride_along_with_a_get() {
        let mut xfr = Xfr::new(4005);
        let mut transport = RecordingTransport::default();
        deliver(
            &mut xfr,
            &mut transport,
            &json!({"verb": "GET", "mode": "recv"}),
        );

        // Merge happens before the reply is built.
        assert_eq!(transport.replies[0]["mode"], "recv");
    }
}
