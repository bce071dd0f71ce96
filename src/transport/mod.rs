//! Datagram transport.
//!
//! Each node owns exactly one bound UDP socket. A spawned receive task
//! delivers incoming datagrams over a bounded channel to the node's event
//! loop, which is the sole consumer; sends go straight through the shared
//! socket. The substrate is unreliable: no delivery, ordering, or
//! uniqueness guarantees, and no retries at this layer.

pub mod udp;

use std::net::SocketAddr;
use thiserror::Error;
use tokio::sync::mpsc;

pub use udp::UdpEndpoint;

/// Capacity of the receive-task → event-loop packet channel.
pub const PACKET_CHANNEL_CAPACITY: usize = 1024;

/// Errors related to the datagram substrate.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("bind failed on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("send to {addr} failed: {source}")]
    Send {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("datagram of {size} bytes exceeds the {limit} byte limit")]
    DatagramTooLarge { size: usize, limit: usize },
}

/// A datagram received from the socket, tagged with its sender endpoint.
///
/// The sender endpoint is what split-horizon flooding keys on.
#[derive(Clone, Debug)]
pub struct ReceivedPacket {
    pub from: SocketAddr,
    pub data: Vec<u8>,
}

/// Sender half of the packet channel (held by the receive task).
pub type PacketTx = mpsc::Sender<ReceivedPacket>;

/// Receiver half of the packet channel (held by the event loop).
pub type PacketRx = mpsc::Receiver<ReceivedPacket>;

/// Create the bounded packet channel between receive task and event loop.
pub fn packet_channel(capacity: usize) -> (PacketTx, PacketRx) {
    mpsc::channel(capacity)
}
