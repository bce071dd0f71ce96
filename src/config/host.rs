//! Host-role configuration (`host.*`).

use super::{ConfigError, NodeSection};
use crate::wire::{NodeId, DEFAULT_TTL};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

/// Host timer cadences (`host.timers.*`), in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostTimers {
    /// Base retransmission interval; the effective deadline grows
    /// linearly with the attempt count.
    #[serde(default = "HostTimers::default_retry_interval_secs")]
    pub retry_interval_secs: u64,

    /// Cadence of the pending-request scan.
    #[serde(default = "HostTimers::default_scan_period_secs")]
    pub scan_period_secs: u64,
}

impl HostTimers {
    fn default_retry_interval_secs() -> u64 {
        5
    }
    fn default_scan_period_secs() -> u64 {
        1
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    pub fn scan_period(&self) -> Duration {
        Duration::from_secs(self.scan_period_secs)
    }
}

impl Default for HostTimers {
    fn default() -> Self {
        Self {
            retry_interval_secs: Self::default_retry_interval_secs(),
            scan_period_secs: Self::default_scan_period_secs(),
        }
    }
}

/// Host-role settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// The local router's endpoint; all host traffic goes through it.
    pub router: SocketAddr,

    /// Known peer hosts, candidates for spontaneous traffic.
    #[serde(default)]
    pub peers: Vec<NodeId>,

    /// Timer cadences.
    #[serde(default)]
    pub timers: HostTimers,

    /// A request is abandoned once its attempt count exceeds this.
    #[serde(default = "HostConfig::default_max_attempts")]
    pub max_attempts: u32,

    /// Number of datagrams sent to random peers at startup.
    #[serde(default = "HostConfig::default_initial_burst")]
    pub initial_burst: u32,

    /// Initial hop budget stamped on originated DATA.
    #[serde(default = "HostConfig::default_ttl")]
    pub ttl: u8,
}

impl HostConfig {
    fn default_max_attempts() -> u32 {
        3
    }
    fn default_initial_burst() -> u32 {
        100
    }
    fn default_ttl() -> u8 {
        DEFAULT_TTL
    }

    pub(super) fn validate(&self, node: &NodeSection) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for peer in &self.peers {
            if *peer == node.id {
                return Err(ConfigError::SelfPeer(peer.clone()));
            }
            if !seen.insert(peer.clone()) {
                return Err(ConfigError::DuplicateId(peer.clone()));
            }
        }
        Ok(())
    }
}
