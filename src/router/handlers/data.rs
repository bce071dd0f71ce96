//! DATA and ACK forwarding.

use crate::router::Router;
use crate::wire::{Ack, Data, Message, NodeId};
use tracing::{debug, trace, warn};

impl Router {
    /// Handle a DATA datagram: spend a hop, then deliver or forward.
    pub(crate) async fn handle_data(&mut self, mut data: Data) {
        data.ttl = data.ttl.saturating_sub(1);
        if data.ttl == 0 {
            self.stats.ttl_expired += 1;
            debug!(
                id = %self.id,
                source = %data.source,
                destination = %data.destination,
                "DATA hop budget exhausted, dropping"
            );
            return;
        }

        let destination = data.destination.clone();
        self.route(Message::Data(data), &destination).await;
    }

    /// ACKs carry no hop budget; they are routed by destination alone.
    pub(crate) async fn handle_ack(&mut self, ack: Ack) {
        let destination = ack.destination.clone();
        self.route(Message::Ack(ack), &destination).await;
    }

    /// Deliver to a locally attached host or forward along the shortest
    /// path. Unroutable datagrams are dropped with a diagnostic; there is
    /// no error signal back to the sender.
    async fn route(&mut self, message: Message, destination: &NodeId) {
        if let Some(&addr) = self.attached_hosts.get(destination) {
            self.send_message(&message, addr).await;
            self.stats.delivered += 1;
            trace!(id = %self.id, destination = %destination, "delivered to attached host");
            return;
        }

        match self.forwarding.get(destination).copied() {
            Some(next_hop) => {
                self.send_message(&message, next_hop).await;
                self.stats.forwarded += 1;
                trace!(
                    id = %self.id,
                    destination = %destination,
                    next_hop = %next_hop,
                    "forwarded"
                );
            }
            None => {
                self.stats.unroutable += 1;
                warn!(
                    id = %self.id,
                    destination = %destination,
                    kind = message.kind(),
                    "no route to destination, dropping"
                );
            }
        }
    }
}
