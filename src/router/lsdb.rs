//! Link state database.
//!
//! Maps each originator to the freshest LSA observed from it. Acceptance
//! follows the strict-greater sequence rule, which makes the database
//! converge under arbitrary reordering and duplication of the flood.
//! Entries an originator stops refreshing are expired by the age sweep.

use crate::wire::{Lsa, NodeId};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Stored state for one originator.
#[derive(Clone, Debug)]
pub struct LsdbEntry {
    pub sequence: u64,
    /// Neighbor id → link cost, as advertised.
    pub links: BTreeMap<NodeId, u32>,
    /// Wall-clock origination stamp carried by the LSA, if any.
    pub emitted_at: Option<u64>,
    /// When this entry was last accepted.
    pub refreshed_at: Instant,
}

/// Outcome of offering an LSA to the database.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LsaDisposition {
    /// New originator, or sequence strictly above the stored one: stored.
    Accepted,
    /// Sequence at or below the stored one: dropped, not reflooded.
    Stale,
}

/// The link state database.
///
/// Keyed by a `BTreeMap` so iteration order is the same on every router,
/// which keeps derived state deterministic across the network.
#[derive(Debug, Default)]
pub struct Lsdb {
    entries: BTreeMap<NodeId, LsdbEntry>,
}

impl Lsdb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the freshness rule to a received LSA.
    pub fn apply(&mut self, lsa: &Lsa, now: Instant) -> LsaDisposition {
        if let Some(entry) = self.entries.get(&lsa.originator) {
            if lsa.sequence <= entry.sequence {
                return LsaDisposition::Stale;
            }
        }

        self.entries.insert(
            lsa.originator.clone(),
            LsdbEntry {
                sequence: lsa.sequence,
                links: lsa.links.clone(),
                emitted_at: lsa.emitted_at,
                refreshed_at: now,
            },
        );
        LsaDisposition::Accepted
    }

    /// Expire entries unrefreshed for at least `max_age`.
    ///
    /// Returns the expired originators; a non-empty result obligates the
    /// caller to recompute routes.
    pub fn expire(&mut self, max_age: Duration, now: Instant) -> Vec<NodeId> {
        let expired: Vec<NodeId> = self
            .entries
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.refreshed_at) >= max_age)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            self.entries.remove(id);
        }
        expired
    }

    pub fn get(&self, originator: &NodeId) -> Option<&LsdbEntry> {
        self.entries.get(originator)
    }

    pub fn contains(&self, originator: &NodeId) -> bool {
        self.entries.contains_key(originator)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in originator order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &LsdbEntry)> {
        self.entries.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
