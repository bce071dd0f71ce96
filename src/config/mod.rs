//! Node configuration.
//!
//! One YAML file per process, given on the command line. The `node`
//! section names the process and its listen endpoint; exactly one of
//! `router`/`host` selects the role and carries role-specific settings.
//!
//! # YAML structure
//!
//! ```yaml
//! node:
//!   id: A
//!   listen: "0.0.0.0:5001"
//! router:
//!   neighbors:
//!     - { id: B, addr: "10.0.0.2:5001", cost: 1 }
//!   hosts:
//!     - { id: H1, addr: "10.0.1.1:6001" }
//! ```
//!
//! Every tunable has a serde default, so a minimal file only names the
//! node and its topology.

mod host;
mod router;

pub use host::{HostConfig, HostTimers};
pub use router::{AttachedHostConfig, NeighborConfig, RouterConfig, RouterTimers};

use crate::wire::NodeId;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("config must carry exactly one of `router` or `host`")]
    AmbiguousRole,

    #[error("duplicate node id in configuration: {0}")]
    DuplicateId(NodeId),

    #[error("link cost for neighbor {0} must be positive")]
    ZeroCost(NodeId),

    #[error("peer list must not include the host itself: {0}")]
    SelfPeer(NodeId),
}

/// Identity and listen endpoint, common to both roles (`node.*`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSection {
    /// This node's logical identifier.
    pub id: NodeId,
    /// Endpoint the UDP socket binds to.
    pub listen: SocketAddr,
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Common node settings (`node.*`).
    pub node: NodeSection,

    /// Router-role settings (`router.*`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<RouterConfig>,

    /// Host-role settings (`host.*`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostConfig>,
}

impl Config {
    /// Load and validate configuration from a single file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config =
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::ParseYaml {
                path: path.to_path_buf(),
                source: e,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Check the structural rules serde cannot express: exactly one role,
    /// unique identifiers, positive router link costs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.router, &self.host) {
            (Some(router), None) => router.validate(&self.node),
            (None, Some(host)) => host.validate(&self.node),
            _ => Err(ConfigError::AmbiguousRole),
        }
    }

    /// Whether this process runs the router role.
    pub fn is_router(&self) -> bool {
        self.router.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
