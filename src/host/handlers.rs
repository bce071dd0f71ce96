//! Host event loop and message handling.

use super::{Host, HostError, REPLY_PAYLOAD};
use crate::host::pending::ScanAction;
use crate::transport::ReceivedPacket;
use crate::wire::{Ack, Data, Message, WireError};
use std::time::Instant;
use tracing::{debug, info, warn};

impl Host {
    /// Run the event loop until the packet channel closes.
    ///
    /// Two activities share the loop: datagram dispatch from the receive
    /// task and the periodic pending-request scan.
    pub async fn run(&mut self) -> Result<(), HostError> {
        let mut packet_rx = self.packet_rx.take().ok_or(HostError::NotStarted)?;

        let mut scan = tokio::time::interval(self.config.timers.scan_period());
        scan.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(id = %self.id, "host event loop started");

        loop {
            tokio::select! {
                packet = packet_rx.recv() => {
                    match packet {
                        Some(p) => self.handle_packet(p).await,
                        None => break, // channel closed
                    }
                }
                _ = scan.tick() => {
                    self.retry_scan(Instant::now()).await;
                }
            }
        }

        info!(id = %self.id, "host event loop stopped (channel closed)");
        Ok(())
    }

    /// Decode and dispatch one received datagram.
    pub(crate) async fn handle_packet(&mut self, packet: ReceivedPacket) {
        let message = match Message::decode(&packet.data) {
            Ok(m) => m,
            Err(WireError::UnknownKind(kind)) => {
                self.stats.unknown_kind += 1;
                warn!(id = %self.id, kind = %kind, "unknown message kind, dropping");
                return;
            }
            Err(e) => {
                self.stats.malformed += 1;
                debug!(id = %self.id, error = %e, "malformed datagram, dropping");
                return;
            }
        };

        match message {
            Message::Data(data) => self.handle_data(data).await,
            Message::Ack(ack) => self.handle_ack(ack),
            other => {
                // Routing traffic is none of a host's business.
                debug!(id = %self.id, kind = other.kind(), "ignoring non-host message");
            }
        }
    }

    /// Acknowledge a received DATA, then answer it with fresh traffic of
    /// our own.
    async fn handle_data(&mut self, data: Data) {
        if data.destination != self.id {
            debug!(
                id = %self.id,
                destination = %data.destination,
                "DATA for another node, ignoring"
            );
            return;
        }

        self.stats.received += 1;
        debug!(
            id = %self.id,
            source = %data.source,
            sequence = data.sequence,
            payload = %data.payload,
            "DATA received"
        );

        let ack = Ack {
            source: self.id.clone(),
            destination: data.source.clone(),
            ack_sequence: data.sequence,
        };
        self.send_to_router(&Message::Ack(ack)).await;
        self.stats.acks_sent += 1;

        let reply = self.make_data(data.source, REPLY_PAYLOAD);
        self.send_data(reply, Instant::now()).await;
    }

    /// Clear the pending request an ACK names; unmatched ACKs are noise.
    fn handle_ack(&mut self, ack: Ack) {
        match self.pending.acknowledge(ack.ack_sequence, &ack.source) {
            Some(request) => {
                self.stats.acked += 1;
                debug!(
                    id = %self.id,
                    sequence = ack.ack_sequence,
                    destination = %request.data.destination,
                    attempts = request.attempts,
                    "request acknowledged"
                );
            }
            None => {
                self.stats.unmatched_acks += 1;
                debug!(
                    id = %self.id,
                    sequence = ack.ack_sequence,
                    source = %ack.source,
                    "unmatched ACK ignored"
                );
            }
        }
    }

    /// Retransmit due requests; abandon those whose budget ran out.
    pub(crate) async fn retry_scan(&mut self, now: Instant) {
        let actions = self.pending.scan(
            now,
            self.config.timers.retry_interval(),
            self.config.max_attempts,
        );

        for action in actions {
            match action {
                ScanAction::Retransmit(data) => {
                    self.stats.retransmits += 1;
                    debug!(
                        id = %self.id,
                        destination = %data.destination,
                        sequence = data.sequence,
                        "retransmitting request"
                    );
                    self.send_to_router(&Message::Data(data)).await;
                }
                ScanAction::Abandon(data) => {
                    self.stats.abandoned += 1;
                    warn!(
                        id = %self.id,
                        destination = %data.destination,
                        sequence = data.sequence,
                        "request abandoned, retry budget exhausted"
                    );
                }
            }
        }
    }
}
