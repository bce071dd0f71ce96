//! Router node.
//!
//! Top-level structure for the router role. The Router owns all routing
//! state: the neighbor table built from static configuration, the
//! attached-host table, the link state database, the derived forwarding
//! table, and the local LSA sequence counter. Every mutation happens on
//! the single event-loop turn in `handlers`, so no locking is needed and
//! the forwarding path never observes a partial rebuild.

mod handlers;
mod lifecycle;
pub mod lsdb;
pub mod spf;
#[cfg(test)]
mod tests;

use crate::config::{Config, RouterConfig};
use crate::transport::{PacketRx, PacketTx, TransportError, UdpEndpoint};
use crate::wire::{Message, NodeId};
use lsdb::Lsdb;
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors related to router operations.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("router not started")]
    NotStarted,

    #[error("router already started")]
    AlreadyStarted,

    #[error("configuration has no router section")]
    NotARouter,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// A directly connected neighbor router.
#[derive(Clone, Debug)]
pub struct Neighbor {
    pub id: NodeId,
    /// The neighbor's listen endpoint; also the split-horizon key.
    pub addr: SocketAddr,
    /// Static link cost advertised for this neighbor.
    pub cost: u32,
    /// Last instant an LSA originated by this neighbor was received.
    /// Starts at router creation, giving a configured neighbor one full
    /// dead interval to produce its first LSA.
    pub last_seen: Instant,
}

/// Datagram handling counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct RouterStats {
    pub lsas_accepted: u64,
    pub lsas_stale: u64,
    pub flooded: u64,
    pub forwarded: u64,
    pub delivered: u64,
    pub unroutable: u64,
    pub ttl_expired: u64,
    pub malformed: u64,
    pub unknown_kind: u64,
    pub send_failures: u64,
}

/// A running router instance.
pub struct Router {
    // === Identity ===
    id: NodeId,
    listen: SocketAddr,

    // === Configuration ===
    config: RouterConfig,

    // === Topology ===
    /// Directly connected neighbor routers, from static configuration.
    neighbors: HashMap<NodeId, Neighbor>,
    /// Locally attached hosts and their delivery endpoints.
    attached_hosts: HashMap<NodeId, SocketAddr>,

    // === Routing State ===
    /// Latest LSA per originator.
    lsdb: Lsdb,
    /// Destination → next-hop endpoint. Rebuilt wholesale on every LSDB
    /// change, never partially mutated.
    forwarding: HashMap<NodeId, SocketAddr>,
    /// Local LSA sequence counter; only origination increments it.
    sequence: u64,

    // === Counters ===
    stats: RouterStats,

    // === Transport ===
    endpoint: Option<UdpEndpoint>,
    packet_tx: Option<PacketTx>,
    packet_rx: Option<PacketRx>,
}

impl Router {
    /// Create a router from configuration.
    pub fn new(config: Config) -> Result<Self, RouterError> {
        let router_config = config.router.ok_or(RouterError::NotARouter)?;
        let started = Instant::now();

        let neighbors = router_config
            .neighbors
            .iter()
            .map(|n| {
                (
                    n.id.clone(),
                    Neighbor {
                        id: n.id.clone(),
                        addr: n.addr,
                        cost: n.cost,
                        last_seen: started,
                    },
                )
            })
            .collect();

        let attached_hosts = router_config
            .hosts
            .iter()
            .map(|h| (h.id.clone(), h.addr))
            .collect();

        Ok(Self {
            id: config.node.id,
            listen: config.node.listen,
            config: router_config,
            neighbors,
            attached_hosts,
            lsdb: Lsdb::new(),
            forwarding: HashMap::new(),
            sequence: 0,
            stats: RouterStats::default(),
            endpoint: None,
            packet_tx: None,
            packet_rx: None,
        })
    }

    // === Accessors ===

    /// This router's identifier.
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

    /// Datagram handling counters.
    pub fn stats(&self) -> RouterStats {
        self.stats
    }

    /// The link state database.
    pub fn lsdb(&self) -> &Lsdb {
        &self.lsdb
    }

    /// Current next-hop endpoint for a destination, if routable.
    pub fn forwarding_entry(&self, destination: &NodeId) -> Option<SocketAddr> {
        self.forwarding.get(destination).copied()
    }

    /// Number of destinations in the forwarding table.
    pub fn route_count(&self) -> usize {
        self.forwarding.len()
    }

    /// Look up a configured neighbor.
    pub fn neighbor(&self, id: &NodeId) -> Option<&Neighbor> {
        self.neighbors.get(id)
    }

    /// The sequence of the most recently originated LSA (0 before the
    /// first origination).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    // === Route Derivation ===

    /// Rebuild the forwarding table from a fresh shortest-path run.
    pub(crate) fn rebuild_forwarding(&mut self) {
        let result = spf::compute(&self.lsdb, &self.id);
        let mut table = HashMap::new();

        for (dest, hop) in &result.first_hops {
            if let Some(neighbor) = self.neighbors.get(hop) {
                table.insert(dest.clone(), neighbor.addr);
            }
        }

        // Stub hosts inherit their owning router's route; our own hosts
        // are delivered to directly.
        for (host, owner) in &result.stubs {
            if *owner == self.id {
                if let Some(&addr) = self.attached_hosts.get(host) {
                    table.insert(host.clone(), addr);
                }
            } else if let Some(hop) = result.first_hops.get(owner) {
                if let Some(neighbor) = self.neighbors.get(hop) {
                    table.insert(host.clone(), neighbor.addr);
                }
            }
        }

        debug!(
            id = %self.id,
            lsdb_entries = self.lsdb.len(),
            routers = result.first_hops.len(),
            routes = table.len(),
            "forwarding table rebuilt"
        );
        self.forwarding = table;
    }

    // === Sending ===

    /// Encode and send one message, swallowing failures after logging.
    /// Reliability is end-to-end; the router layer never retries.
    pub(crate) async fn send_message(&mut self, message: &Message, addr: SocketAddr) {
        let Some(endpoint) = self.endpoint.as_ref() else {
            return;
        };
        let bytes = match message.encode() {
            Ok(b) => b,
            Err(e) => {
                warn!(kind = message.kind(), error = %e, "failed to encode message");
                return;
            }
        };
        if let Err(e) = endpoint.send(addr, &bytes).await {
            self.stats.send_failures += 1;
            warn!(remote_addr = %addr, kind = message.kind(), error = %e, "send failed");
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("id", &self.id)
            .field("neighbors", &self.neighbors.len())
            .field("attached_hosts", &self.attached_hosts.len())
            .field("lsdb_entries", &self.lsdb.len())
            .field("routes", &self.forwarding.len())
            .field("sequence", &self.sequence)
            .finish()
    }
}
