//! Shortest path computation over the link state database.
//!
//! Pure and non-suspending: the event loop calls [`compute`] after every
//! database change and swaps the resulting forwarding state in wholesale.
//!
//! An edge `u → v` participates only when it is bidirectionally
//! confirmed: `u`'s LSA lists `v` and `v`'s LSA lists `u`. Unconfirmed
//! half-edges are left out, which keeps traffic away from dead ends while
//! a partial flood converges. Link targets that originate no LSA of their
//! own are stub hosts: leaves of their advertising router, never transit.

use super::lsdb::Lsdb;
use crate::wire::NodeId;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

/// Result of one shortest-path run from a fixed source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpfResult {
    /// Reachable router → first-hop neighbor on its shortest path.
    pub first_hops: BTreeMap<NodeId, NodeId>,
    /// Reachable router → total path cost.
    pub distances: BTreeMap<NodeId, u32>,
    /// Stub host → the router advertising it. Only routers that are the
    /// source itself or reachable from it contribute stubs.
    pub stubs: BTreeMap<NodeId, NodeId>,
}

/// Run Dijkstra from `source` over the confirmed edges of the database.
///
/// Ties on path cost resolve to the lexicographically smaller first-hop
/// neighbor, so any two routers holding identical databases derive
/// identical tables.
pub fn compute(lsdb: &Lsdb, source: &NodeId) -> SpfResult {
    let mut result = SpfResult::default();
    if !lsdb.contains(source) {
        return result;
    }

    let mut dist: HashMap<NodeId, u32> = HashMap::new();
    let mut first_hop: HashMap<NodeId, NodeId> = HashMap::new();
    let mut heap: BinaryHeap<Reverse<(u32, NodeId)>> = BinaryHeap::new();

    dist.insert(source.clone(), 0);
    heap.push(Reverse((0, source.clone())));

    while let Some(Reverse((d, u))) = heap.pop() {
        match dist.get(&u) {
            Some(&best) if d > best => continue,
            _ => {}
        }
        let Some(entry) = lsdb.get(&u) else { continue };

        for (v, &cost) in &entry.links {
            if !confirmed(lsdb, &u, v) {
                continue;
            }

            let candidate = d.saturating_add(cost);
            // The first hop a path through u commits to: u's own first
            // hop, or v itself when u is the source.
            let hop = if u == *source {
                v.clone()
            } else {
                match first_hop.get(&u) {
                    Some(h) => h.clone(),
                    None => continue,
                }
            };

            let improves = match dist.get(v) {
                None => true,
                Some(&current) if candidate < current => true,
                Some(&current) if candidate == current => {
                    first_hop.get(v).is_some_and(|h| hop < *h)
                }
                _ => false,
            };

            if improves {
                dist.insert(v.clone(), candidate);
                first_hop.insert(v.clone(), hop);
                heap.push(Reverse((candidate, v.clone())));
            }
        }
    }

    for (node, &d) in &dist {
        if node == source {
            continue;
        }
        if let Some(hop) = first_hop.get(node) {
            result.distances.insert(node.clone(), d);
            result.first_hops.insert(node.clone(), hop.clone());
        }
    }

    // Stub hosts hang off their advertising router. Iteration is in
    // originator order, so a host claimed by two routers resolves the
    // same way on every router in the network.
    for (router, entry) in lsdb.iter() {
        if router != source && !dist.contains_key(router) {
            continue;
        }
        for target in entry.links.keys() {
            if lsdb.contains(target) {
                continue;
            }
            result
                .stubs
                .entry(target.clone())
                .or_insert_with(|| router.clone());
        }
    }

    result
}

/// Whether `v`'s own LSA confirms the edge back to `u`.
fn confirmed(lsdb: &Lsdb, u: &NodeId, v: &NodeId) -> bool {
    lsdb.get(v).is_some_and(|entry| entry.links.contains_key(u))
}
