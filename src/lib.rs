//! LSNET: a link-state routed datagram network.
//!
//! Two node roles cooperate over plain UDP. **Routers** flood link state
//! advertisements, maintain a link state database, and forward datagrams
//! along Dijkstra shortest paths keyed by logical node ID. **Hosts** are
//! stub endpoints attached to one router; they exchange application
//! datagrams end-to-end under a sequence-numbered request/ACK protocol
//! with bounded retransmission.
//!
//! One process runs one node; the role is chosen by configuration.

pub mod config;
pub mod host;
pub mod router;
pub mod transport;
pub mod wire;

// Re-export configuration types
pub use config::{
    AttachedHostConfig, Config, ConfigError, HostConfig, HostTimers, NeighborConfig, NodeSection,
    RouterConfig, RouterTimers,
};

// Re-export wire types
pub use wire::{Ack, Data, Hello, Lsa, Message, NodeId, WireError, DEFAULT_TTL, MAX_DATAGRAM_SIZE};

// Re-export transport types
pub use transport::{
    packet_channel, PacketRx, PacketTx, ReceivedPacket, TransportError, UdpEndpoint,
};

// Re-export node types
pub use host::{Host, HostError, HostStats};
pub use router::{Neighbor, Router, RouterError, RouterStats};
