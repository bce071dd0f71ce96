//! Router-role configuration (`router.*`).

use super::{ConfigError, NodeSection};
use crate::wire::{NodeId, DEFAULT_TTL};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

/// A directly connected neighbor router (`router.neighbors[]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborConfig {
    pub id: NodeId,
    /// The neighbor's listen endpoint.
    pub addr: SocketAddr,
    /// Static link cost; 1 when omitted.
    #[serde(default = "NeighborConfig::default_cost")]
    pub cost: u32,
}

impl NeighborConfig {
    fn default_cost() -> u32 {
        1
    }
}

/// A host attached to this router (`router.hosts[]`).
///
/// Attached hosts are advertised in originated LSAs at cost 0 and are
/// delivered to directly, never used as transit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachedHostConfig {
    pub id: NodeId,
    /// The host's listen endpoint for local delivery.
    pub addr: SocketAddr,
}

/// Router timer cadences (`router.timers.*`), in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterTimers {
    /// LSA origination period.
    #[serde(default = "RouterTimers::default_lsa_period_secs")]
    pub lsa_period_secs: u64,

    /// LSDB and neighbor liveness sweep period.
    #[serde(default = "RouterTimers::default_age_sweep_secs")]
    pub age_sweep_secs: u64,

    /// LSDB entries unrefreshed this long are expired.
    #[serde(default = "RouterTimers::default_lsa_max_age_secs")]
    pub lsa_max_age_secs: u64,

    /// Neighbors silent this long are excluded from originated LSAs.
    #[serde(default = "RouterTimers::default_neighbor_dead_secs")]
    pub neighbor_dead_secs: u64,
}

impl RouterTimers {
    fn default_lsa_period_secs() -> u64 {
        30
    }
    fn default_age_sweep_secs() -> u64 {
        10
    }
    // Both age thresholds default to three LSA periods.
    fn default_lsa_max_age_secs() -> u64 {
        90
    }
    fn default_neighbor_dead_secs() -> u64 {
        90
    }

    pub fn lsa_period(&self) -> Duration {
        Duration::from_secs(self.lsa_period_secs)
    }

    pub fn age_sweep(&self) -> Duration {
        Duration::from_secs(self.age_sweep_secs)
    }

    pub fn lsa_max_age(&self) -> Duration {
        Duration::from_secs(self.lsa_max_age_secs)
    }

    pub fn neighbor_dead(&self) -> Duration {
        Duration::from_secs(self.neighbor_dead_secs)
    }
}

impl Default for RouterTimers {
    fn default() -> Self {
        Self {
            lsa_period_secs: Self::default_lsa_period_secs(),
            age_sweep_secs: Self::default_age_sweep_secs(),
            lsa_max_age_secs: Self::default_lsa_max_age_secs(),
            neighbor_dead_secs: Self::default_neighbor_dead_secs(),
        }
    }
}

/// Router-role settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Directly connected neighbor routers.
    #[serde(default)]
    pub neighbors: Vec<NeighborConfig>,

    /// Hosts attached to this router.
    #[serde(default)]
    pub hosts: Vec<AttachedHostConfig>,

    /// Timer cadences.
    #[serde(default)]
    pub timers: RouterTimers,

    /// Initial hop budget stamped on originated LSAs.
    #[serde(default = "RouterConfig::default_ttl")]
    pub ttl: u8,
}

impl RouterConfig {
    fn default_ttl() -> u8 {
        DEFAULT_TTL
    }

    pub(super) fn validate(&self, node: &NodeSection) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        seen.insert(node.id.clone());

        for neighbor in &self.neighbors {
            if neighbor.cost == 0 {
                return Err(ConfigError::ZeroCost(neighbor.id.clone()));
            }
            if !seen.insert(neighbor.id.clone()) {
                return Err(ConfigError::DuplicateId(neighbor.id.clone()));
            }
        }

        for host in &self.hosts {
            if !seen.insert(host.id.clone()) {
                return Err(ConfigError::DuplicateId(host.id.clone()));
            }
        }

        Ok(())
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            neighbors: Vec::new(),
            hosts: Vec::new(),
            timers: RouterTimers::default(),
            ttl: Self::default_ttl(),
        }
    }
}
