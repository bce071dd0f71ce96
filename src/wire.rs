//! Wire format: self-describing JSON datagrams.
//!
//! Every message travels as a single UTF-8 JSON object, one message per
//! UDP datagram, with a top-level `kind` tag selecting the variant:
//!
//! | kind    | fields                                                |
//! |---------|-------------------------------------------------------|
//! | `LSA`   | `originator`, `sequence`, `ttl`, `links`, `emitted_at` (optional) |
//! | `DATA`  | `source`, `destination`, `sequence`, `ttl`, `payload` |
//! | `ACK`   | `source`, `destination`, `ack_sequence`               |
//! | `HELLO` | `source`, `timestamp`                                 |
//!
//! Decoding distinguishes a recognized object carrying an unknown `kind`
//! (callers drop it with a warning) from a parse failure or missing field
//! (callers drop it silently). `ttl` is a hop budget decremented once per
//! router; ACKs carry none and are routed by destination alone.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Maximum encoded datagram size. Large enough for an LSA listing 16
/// neighbors with worst-case identifiers.
pub const MAX_DATAGRAM_SIZE: usize = 4096;

/// Initial hop budget stamped on originated datagrams.
pub const DEFAULT_TTL: u8 = 16;

/// Errors surfaced by the codec.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed datagram: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("datagram is not a JSON object")]
    NotAnObject,

    #[error("datagram has no kind field")]
    MissingKind,

    #[error("unknown message kind: {0}")]
    UnknownKind(String),
}

/// Logical node identifier, e.g. `A` or `H1`.
///
/// The identifier namespace is flat; routers and hosts are told apart only
/// by role at their owner. Ordering is lexicographic and drives the
/// deterministic tie-break in shortest-path computation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Link state advertisement: a router's announcement of its live
/// neighbors and attached hosts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lsa {
    /// Router that produced this advertisement.
    pub originator: NodeId,
    /// Per-originator freshness counter; the first LSA of a run is 1.
    pub sequence: u64,
    /// Hop budget for flooding.
    pub ttl: u8,
    /// Neighbor id → link cost. Attached hosts appear at cost 0.
    pub links: BTreeMap<NodeId, u32>,
    /// Wall-clock origination stamp (UNIX seconds), informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emitted_at: Option<u64>,
}

/// Application datagram between hosts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Data {
    pub source: NodeId,
    pub destination: NodeId,
    /// Sender-local sequence number, echoed back by the ACK.
    pub sequence: u64,
    /// Hop budget.
    pub ttl: u8,
    pub payload: String,
}

/// End-to-end acknowledgement of one DATA datagram.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub source: NodeId,
    pub destination: NodeId,
    /// Sequence of the DATA being acknowledged.
    pub ack_sequence: u64,
}

/// Optional liveness probe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hello {
    pub source: NodeId,
    /// Sender wall clock, UNIX seconds.
    pub timestamp: u64,
}

/// A decoded datagram.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Message {
    #[serde(rename = "LSA")]
    Lsa(Lsa),
    #[serde(rename = "DATA")]
    Data(Data),
    #[serde(rename = "ACK")]
    Ack(Ack),
    #[serde(rename = "HELLO")]
    Hello(Hello),
}

const KNOWN_KINDS: [&str; 4] = ["LSA", "DATA", "ACK", "HELLO"];

impl Message {
    /// Encode as a single JSON datagram.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a received datagram.
    ///
    /// The kind tag is checked against the known set before field
    /// validation so callers can tell an unknown kind (warn and drop)
    /// apart from a malformed datagram (drop silently).
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        let obj = value.as_object().ok_or(WireError::NotAnObject)?;
        let kind = obj
            .get("kind")
            .and_then(|k| k.as_str())
            .ok_or(WireError::MissingKind)?;
        if !KNOWN_KINDS.contains(&kind) {
            return Err(WireError::UnknownKind(kind.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// The kind tag, as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Lsa(_) => "LSA",
            Message::Data(_) => "DATA",
            Message::Ack(_) => "ACK",
            Message::Hello(_) => "HELLO",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
