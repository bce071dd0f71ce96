//! LSA acceptance and flooding.

use crate::router::lsdb::LsaDisposition;
use crate::router::Router;
use crate::wire::{Lsa, Message};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{debug, trace};

impl Router {
    /// Handle a received LSA: freshness check, store, reflood, recompute.
    ///
    /// Split horizon by arrival endpoint: an accepted LSA goes back out to
    /// every router neighbor except the one it arrived from. Stale and
    /// duplicate LSAs are dropped without reflooding, which is what stops
    /// the flood from circulating forever.
    pub(crate) async fn handle_lsa(&mut self, mut lsa: Lsa, from: SocketAddr) {
        let now = Instant::now();

        match self.lsdb.apply(&lsa, now) {
            LsaDisposition::Stale => {
                self.stats.lsas_stale += 1;
                debug!(
                    id = %self.id,
                    originator = %lsa.originator,
                    sequence = lsa.sequence,
                    "stale LSA dropped"
                );
                return;
            }
            LsaDisposition::Accepted => {}
        }
        self.stats.lsas_accepted += 1;

        // Any LSA from an originator we neighbor refreshes its liveness,
        // no matter which interface carried it here.
        if let Some(neighbor) = self.neighbors.get_mut(&lsa.originator) {
            neighbor.last_seen = now;
        }

        debug!(
            id = %self.id,
            originator = %lsa.originator,
            sequence = lsa.sequence,
            links = lsa.links.len(),
            "LSA accepted"
        );

        // Spend one hop of the flood budget before passing it on.
        lsa.ttl = lsa.ttl.saturating_sub(1);
        if lsa.ttl > 0 {
            self.flood(Message::Lsa(lsa), Some(from)).await;
        } else {
            self.stats.ttl_expired += 1;
            trace!(id = %self.id, "LSA hop budget exhausted, stored without reflood");
        }

        self.rebuild_forwarding();
    }

    /// Send a message to every router neighbor, optionally excluding the
    /// endpoint it arrived on.
    pub(crate) async fn flood(&mut self, message: Message, except: Option<SocketAddr>) {
        let targets: Vec<SocketAddr> = self
            .neighbors
            .values()
            .map(|n| n.addr)
            .filter(|addr| Some(*addr) != except)
            .collect();

        for addr in targets {
            self.send_message(&message, addr).await;
            self.stats.flooded += 1;
        }
    }
}
