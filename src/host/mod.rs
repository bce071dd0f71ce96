//! Host node.
//!
//! A stub endpoint attached to exactly one router. Hosts never route:
//! every datagram they send goes to the local router, addressed by
//! logical node ID. Reliability is end-to-end and lives here: each sent
//! DATA is tracked as a pending request until the matching ACK arrives or
//! a bounded retry budget runs out.

mod handlers;
mod lifecycle;
pub mod pending;
#[cfg(test)]
mod tests;

use crate::config::{Config, HostConfig};
use crate::transport::{PacketRx, PacketTx, TransportError, UdpEndpoint};
use crate::wire::{Data, Message, NodeId};
use pending::PendingTable;
use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;
use thiserror::Error;
use tracing::warn;

/// Payload marker for spontaneous startup traffic.
pub(crate) const BURST_PAYLOAD: &str = "probe";

/// Payload marker for answers to received datagrams.
pub(crate) const REPLY_PAYLOAD: &str = "reply";

/// Errors related to host operations.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("host not started")]
    NotStarted,

    #[error("host already started")]
    AlreadyStarted,

    #[error("configuration has no host section")]
    NotAHost,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// End-to-end protocol counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostStats {
    /// DATA datagrams sent (first transmissions only).
    pub sent: u64,
    /// DATA datagrams received and addressed to us.
    pub received: u64,
    pub acks_sent: u64,
    /// Pending requests cleared by a matching ACK.
    pub acked: u64,
    pub retransmits: u64,
    /// Requests dropped after the retry budget ran out.
    pub abandoned: u64,
    pub unmatched_acks: u64,
    pub malformed: u64,
    pub unknown_kind: u64,
}

/// A running host instance.
pub struct Host {
    // === Identity ===
    id: NodeId,
    listen: SocketAddr,

    // === Configuration ===
    config: HostConfig,

    // === Protocol State ===
    /// Sender-local sequence counter; every originated DATA gets the next
    /// value.
    sequence: u64,
    /// In-flight requests awaiting acknowledgement.
    pending: PendingTable,

    // === Counters ===
    stats: HostStats,

    // === Transport ===
    endpoint: Option<UdpEndpoint>,
    packet_tx: Option<PacketTx>,
    packet_rx: Option<PacketRx>,
}

impl Host {
    /// Create a host from configuration.
    pub fn new(config: Config) -> Result<Self, HostError> {
        let host_config = config.host.ok_or(HostError::NotAHost)?;

        Ok(Self {
            id: config.node.id,
            listen: config.node.listen,
            config: host_config,
            sequence: 0,
            pending: PendingTable::new(),
            stats: HostStats::default(),
            endpoint: None,
            packet_tx: None,
            packet_rx: None,
        })
    }

    // === Accessors ===

    /// This host's identifier.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// The bound endpoint, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.endpoint.as_ref().map(|e| e.local_addr())
    }

    pub fn is_running(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Protocol counters.
    pub fn stats(&self) -> HostStats {
        self.stats
    }

    /// Number of requests still awaiting acknowledgement.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    // === Sending ===

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Build a DATA datagram to `destination` with a fresh sequence.
    fn make_data(&mut self, destination: NodeId, payload: &str) -> Data {
        Data {
            source: self.id.clone(),
            destination,
            sequence: self.next_sequence(),
            ttl: self.config.ttl,
            payload: payload.to_string(),
        }
    }

    /// Send one message to the local router, swallowing failures after
    /// logging. Loss is handled by the retry scan, not here.
    async fn send_to_router(&mut self, message: &Message) {
        let Some(endpoint) = self.endpoint.as_ref() else {
            return;
        };
        let bytes = match message.encode() {
            Ok(b) => b,
            Err(e) => {
                warn!(id = %self.id, kind = message.kind(), error = %e, "failed to encode message");
                return;
            }
        };
        if let Err(e) = endpoint.send(self.config.router, &bytes).await {
            warn!(id = %self.id, kind = message.kind(), error = %e, "send to router failed");
        }
    }

    /// Send a fresh DATA and register it for retransmission.
    async fn send_data(&mut self, data: Data, now: Instant) {
        self.pending.insert(data.clone(), now);
        self.send_to_router(&Message::Data(data)).await;
        self.stats.sent += 1;
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("id", &self.id)
            .field("router", &self.config.router)
            .field("pending", &self.pending.len())
            .field("sequence", &self.sequence)
            .finish()
    }
}
