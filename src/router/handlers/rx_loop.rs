//! Router event loop: datagram dispatch, LSA origination, age sweep.

use crate::router::{Router, RouterError};
use crate::transport::ReceivedPacket;
use crate::wire::{Lsa, Message, NodeId, WireError};
use rand::Rng;
use std::collections::BTreeMap;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

impl Router {
    /// Run the event loop until the packet channel closes.
    ///
    /// Three activities share the loop: datagram dispatch from the
    /// receive task, periodic LSA origination, and the LSDB age sweep.
    /// Origination is jittered ±10% per cycle so a freshly started
    /// topology does not flood in lockstep. The first origination fires
    /// immediately to bootstrap the flood.
    pub async fn run(&mut self) -> Result<(), RouterError> {
        let mut packet_rx = self.packet_rx.take().ok_or(RouterError::NotStarted)?;

        let mut sweep = tokio::time::interval(self.config.timers.age_sweep());
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut next_origination = tokio::time::Instant::now();

        info!(id = %self.id, "router event loop started");

        loop {
            tokio::select! {
                packet = packet_rx.recv() => {
                    match packet {
                        Some(p) => self.handle_packet(p).await,
                        None => break, // channel closed
                    }
                }
                _ = tokio::time::sleep_until(next_origination) => {
                    self.originate_lsa(Instant::now()).await;
                    next_origination = tokio::time::Instant::now() + self.jittered_lsa_period();
                }
                _ = sweep.tick() => {
                    self.age_sweep(Instant::now());
                }
            }
        }

        info!(id = %self.id, "router event loop stopped (channel closed)");
        Ok(())
    }

    /// Next origination delay: the configured period ±10%.
    fn jittered_lsa_period(&self) -> Duration {
        let factor = rand::thread_rng().gen_range(0.9..=1.1);
        self.config.timers.lsa_period().mul_f64(factor)
    }

    /// Decode and dispatch one received datagram.
    pub(crate) async fn handle_packet(&mut self, packet: ReceivedPacket) {
        let message = match Message::decode(&packet.data) {
            Ok(m) => m,
            Err(WireError::UnknownKind(kind)) => {
                self.stats.unknown_kind += 1;
                warn!(kind = %kind, from = %packet.from, "unknown message kind, dropping");
                return;
            }
            Err(e) => {
                // Malformed datagrams are dropped without telling the
                // sender anything.
                self.stats.malformed += 1;
                debug!(from = %packet.from, error = %e, "malformed datagram, dropping");
                return;
            }
        };

        match message {
            Message::Lsa(lsa) => self.handle_lsa(lsa, packet.from).await,
            Message::Data(data) => self.handle_data(data).await,
            Message::Ack(ack) => self.handle_ack(ack).await,
            Message::Hello(hello) => {
                debug!(source = %hello.source, from = %packet.from, "hello received");
            }
        }
    }

    /// Originate this router's own LSA and flood it to every neighbor.
    pub(crate) async fn originate_lsa(&mut self, now: Instant) {
        self.sequence += 1;
        let links = self.build_links(now);

        debug!(
            id = %self.id,
            sequence = self.sequence,
            links = links.len(),
            "originating LSA"
        );

        let lsa = Lsa {
            originator: self.id.clone(),
            sequence: self.sequence,
            ttl: self.config.ttl,
            links,
            emitted_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .ok(),
        };

        self.lsdb.apply(&lsa, now);
        self.rebuild_forwarding();
        self.flood(Message::Lsa(lsa), None).await;
    }

    /// Links advertised in the next LSA: live neighbors at their
    /// configured cost, attached hosts at cost 0.
    fn build_links(&self, now: Instant) -> BTreeMap<NodeId, u32> {
        let dead_after = self.config.timers.neighbor_dead();
        let mut links = BTreeMap::new();

        for neighbor in self.neighbors.values() {
            if now.duration_since(neighbor.last_seen) < dead_after {
                links.insert(neighbor.id.clone(), neighbor.cost);
            } else {
                debug!(
                    id = %self.id,
                    neighbor = %neighbor.id,
                    "neighbor silent past dead interval, omitting from LSA"
                );
            }
        }

        for host_id in self.attached_hosts.keys() {
            links.insert(host_id.clone(), 0);
        }

        links
    }

    /// Expire stale LSDB entries and recompute when anything was removed.
    pub(crate) fn age_sweep(&mut self, now: Instant) {
        let expired = self.lsdb.expire(self.config.timers.lsa_max_age(), now);
        if expired.is_empty() {
            return;
        }

        for originator in &expired {
            info!(id = %self.id, originator = %originator, "LSDB entry aged out");
        }
        self.rebuild_forwarding();
    }
}
