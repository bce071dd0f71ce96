//! Shortest-path tests: convergence topologies, tie-breaking, half-edge
//! rejection, stub host attachment.

use super::{id, lsa};
use crate::router::lsdb::Lsdb;
use crate::router::spf;
use std::time::Instant;

/// Build a database from a list of LSAs.
fn lsdb_from(lsas: &[crate::wire::Lsa]) -> Lsdb {
    let now = Instant::now();
    let mut lsdb = Lsdb::new();
    for l in lsas {
        lsdb.apply(l, now);
    }
    lsdb
}

/// Symmetric LSAs for an undirected unit-cost edge list.
fn unit_topology(edges: &[(&str, &str)]) -> Lsdb {
    let mut nodes: std::collections::BTreeMap<&str, Vec<(&str, u32)>> =
        std::collections::BTreeMap::new();
    for &(a, b) in edges {
        nodes.entry(a).or_default().push((b, 1));
        nodes.entry(b).or_default().push((a, 1));
    }
    let lsas: Vec<_> = nodes
        .iter()
        .map(|(node, links)| lsa(node, 1, links))
        .collect();
    lsdb_from(&lsas)
}

#[test]
fn test_five_router_convergence() {
    // Edges A-B, A-C, B-D, C-E, D-E, all cost 1. From A, D goes via B
    // (cost 2) and E via C (cost 2); from E, A goes via C.
    let lsdb = unit_topology(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "E"), ("D", "E")]);

    let at_a = spf::compute(&lsdb, &id("A"));
    assert_eq!(at_a.first_hops.get(&id("D")), Some(&id("B")));
    assert_eq!(at_a.first_hops.get(&id("E")), Some(&id("C")));
    assert_eq!(at_a.distances.get(&id("D")), Some(&2));
    assert_eq!(at_a.distances.get(&id("E")), Some(&2));

    let at_e = spf::compute(&lsdb, &id("E"));
    assert_eq!(at_e.first_hops.get(&id("A")), Some(&id("C")));
    assert_eq!(at_e.distances.get(&id("A")), Some(&2));
}

#[test]
fn test_equal_cost_tie_breaks_lexicographically() {
    // A-B, A-C, B-D, C-D: both paths to D cost 2; B < C wins.
    let lsdb = unit_topology(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);

    let at_a = spf::compute(&lsdb, &id("A"));
    assert_eq!(at_a.first_hops.get(&id("D")), Some(&id("B")));
    assert_eq!(at_a.distances.get(&id("D")), Some(&2));
}

#[test]
fn test_tie_break_is_stable_across_observers() {
    // Both D and A see the same database, so their tables must agree
    // modulo renaming by local ID.
    let lsdb = unit_topology(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);

    let at_d = spf::compute(&lsdb, &id("D"));
    assert_eq!(at_d.first_hops.get(&id("A")), Some(&id("B")));
}

#[test]
fn test_half_edge_rejected() {
    // X's LSA lists Y, but Y's LSA does not list X back: the X→Y edge
    // must not carry traffic.
    let lsdb = lsdb_from(&[
        lsa("A", 1, &[("X", 1)]),
        lsa("X", 1, &[("A", 1), ("Y", 1)]),
        lsa("Y", 1, &[("Z", 1)]),
        lsa("Z", 1, &[("Y", 1)]),
    ]);

    let at_a = spf::compute(&lsdb, &id("A"));
    assert_eq!(at_a.first_hops.get(&id("X")), Some(&id("X")));
    assert!(!at_a.first_hops.contains_key(&id("Y")));
    assert!(!at_a.first_hops.contains_key(&id("Z")));
}

#[test]
fn test_link_failure_reroutes() {
    // Scenario: B-D fails. B's fresher LSA omits D; traffic from A to D
    // must reroute via C-E-D even though D's stale LSA still lists B.
    let now = Instant::now();
    let mut lsdb = Lsdb::new();
    for l in [
        lsa("A", 1, &[("B", 1), ("C", 1)]),
        lsa("B", 1, &[("A", 1), ("D", 1)]),
        lsa("C", 1, &[("A", 1), ("E", 1)]),
        lsa("D", 1, &[("B", 1), ("E", 1)]),
        lsa("E", 1, &[("C", 1), ("D", 1)]),
    ] {
        lsdb.apply(&l, now);
    }

    let before = spf::compute(&lsdb, &id("A"));
    assert_eq!(before.first_hops.get(&id("D")), Some(&id("B")));

    // B notices D went silent and originates without it.
    lsdb.apply(&lsa("B", 2, &[("A", 1)]), now);

    let after = spf::compute(&lsdb, &id("A"));
    assert_eq!(after.first_hops.get(&id("D")), Some(&id("C")));
    assert_eq!(after.distances.get(&id("D")), Some(&3));
}

#[test]
fn test_costs_respected() {
    // A-B cost 10, A-C cost 1, C-B cost 1: B goes via C.
    let lsdb = lsdb_from(&[
        lsa("A", 1, &[("B", 10), ("C", 1)]),
        lsa("B", 1, &[("A", 10), ("C", 1)]),
        lsa("C", 1, &[("A", 1), ("B", 1)]),
    ]);

    let at_a = spf::compute(&lsdb, &id("A"));
    assert_eq!(at_a.first_hops.get(&id("B")), Some(&id("C")));
    assert_eq!(at_a.distances.get(&id("B")), Some(&2));
}

#[test]
fn test_stub_hosts_attach_to_their_router() {
    // H1 is attached to A (the source), H7 to B. Hosts originate no LSA,
    // so they must come back as stubs, never as routers.
    let lsdb = lsdb_from(&[
        lsa("A", 1, &[("B", 1), ("H1", 0)]),
        lsa("B", 1, &[("A", 1), ("H7", 0)]),
    ]);

    let at_a = spf::compute(&lsdb, &id("A"));
    assert_eq!(at_a.stubs.get(&id("H1")), Some(&id("A")));
    assert_eq!(at_a.stubs.get(&id("H7")), Some(&id("B")));
    assert!(!at_a.first_hops.contains_key(&id("H1")));
    assert!(!at_a.first_hops.contains_key(&id("H7")));
}

#[test]
fn test_stub_of_unreachable_router_excluded() {
    // C is disconnected from A; its host must not be reported at A.
    let lsdb = lsdb_from(&[
        lsa("A", 1, &[("B", 1)]),
        lsa("B", 1, &[("A", 1)]),
        lsa("C", 1, &[("H9", 0)]),
    ]);

    let at_a = spf::compute(&lsdb, &id("A"));
    assert!(!at_a.stubs.contains_key(&id("H9")));
}

#[test]
fn test_hosts_never_transit() {
    // Even a host advertised by two routers must not stitch them
    // together: A and B share H1 but have no router-router edge.
    let lsdb = lsdb_from(&[
        lsa("A", 1, &[("H1", 0)]),
        lsa("B", 1, &[("H1", 0)]),
    ]);

    let at_a = spf::compute(&lsdb, &id("A"));
    assert!(!at_a.first_hops.contains_key(&id("B")));
}

#[test]
fn test_unknown_source_yields_empty_result() {
    let lsdb = lsdb_from(&[lsa("A", 1, &[("B", 1)])]);
    let result = spf::compute(&lsdb, &id("Z"));
    assert!(result.first_hops.is_empty());
    assert!(result.stubs.is_empty());
}

#[test]
fn test_empty_lsdb() {
    let lsdb = Lsdb::new();
    let result = spf::compute(&lsdb, &id("A"));
    assert!(result.first_hops.is_empty());
}
