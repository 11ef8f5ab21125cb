//! Wire formats for the mesh.
//!
//! Every datagram carries exactly one JSON document terminated by a
//! newline. Unknown or malformed frames are dropped by receivers, never
//! answered with an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::belief::Belief;

/// Service binding address: a UDP port on the loopback interface.
pub type Sba = u16;

/// Well-known address of the belief store.
pub const BLS_SBA: Sba = 4000;

/// Encode one JSON value as a newline-terminated frame.
pub fn encode_frame(value: &Value) -> Vec<u8> {
    let mut bytes = value.to_string().into_bytes();
    bytes.push(b'\n');
    bytes
}

/// Decode a frame back into JSON. `None` for anything that is not a
/// single JSON document (the trailing newline is tolerated either way).
pub fn decode_frame(bytes: &[u8]) -> Option<Value> {
    serde_json::from_slice(bytes).ok()
}

/// True when the datagram is a tick pulse: a boolean `tick` field with
/// value `true`. Any other shape of `tick` is not a pulse.
pub fn is_tick(value: &Value) -> bool {
    value.get("tick").and_then(Value::as_bool).unwrap_or(false)
}

/// Envelope for a belief published to the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeliefCommit {
    pub belief: Belief,
}

/// Full belief snapshot as served by the store. Always the whole map,
/// never a delta.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BeliefSnapshot {
    pub beliefs: BTreeMap<String, bool>,
}

/// Control-plane request, tagged by verb.
///
/// Unknown verbs and shapeless frames fail to decode; callers treat
/// `None` as silence.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "verb")]
pub enum ControlRequest {
    #[serde(rename = "GET")]
    Get {
        #[serde(default)]
        resource: Option<String>,
    },
    #[serde(rename = "PUT")]
    Put {
        #[serde(default)]
        resource: String,
        #[serde(default)]
        body: Value,
    },
    #[serde(rename = "POST")]
    Post {
        #[serde(default)]
        action: String,
    },
}

impl ControlRequest {
    /// Decode from an arbitrary datagram; `None` for non-control traffic.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}
