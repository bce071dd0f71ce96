//! Host lifecycle: socket binding, startup burst, shutdown.

use super::{Host, HostError, BURST_PAYLOAD};
use crate::transport::{packet_channel, UdpEndpoint, PACKET_CHANNEL_CAPACITY};
use rand::Rng;
use std::time::Instant;
use tracing::{debug, info};

impl Host {
    /// Bind the UDP endpoint and spawn its receive task.
    pub async fn start(&mut self) -> Result<(), HostError> {
        if self.endpoint.is_some() {
            return Err(HostError::AlreadyStarted);
        }

        let (packet_tx, packet_rx) = packet_channel(PACKET_CHANNEL_CAPACITY);
        let endpoint = UdpEndpoint::bind(self.listen, packet_tx.clone()).await?;

        info!(
            id = %self.id,
            local_addr = %endpoint.local_addr(),
            router = %self.config.router,
            peers = self.config.peers.len(),
            "host started"
        );

        self.endpoint = Some(endpoint);
        self.packet_tx = Some(packet_tx);
        self.packet_rx = Some(packet_rx);
        Ok(())
    }

    /// Initial traffic: `initial_burst` datagrams, each addressed to a
    /// uniformly random known peer, with consecutive sequences. Every one
    /// registers a pending request and will be retried like any other.
    pub async fn startup_burst(&mut self) {
        if self.config.peers.is_empty() {
            debug!(id = %self.id, "no known peers, skipping startup burst");
            return;
        }

        let burst = self.config.initial_burst;
        info!(id = %self.id, burst, "sending startup burst");

        let now = Instant::now();
        for _ in 0..burst {
            let index = rand::thread_rng().gen_range(0..self.config.peers.len());
            let peer = self.config.peers[index].clone();
            let data = self.make_data(peer, BURST_PAYLOAD);
            self.send_data(data, now).await;
        }
    }

    /// Stop the receive task and drop the packet channel. Pending
    /// requests are discarded; restart is a cold start.
    pub fn stop(&mut self) {
        if let Some(mut endpoint) = self.endpoint.take() {
            endpoint.shutdown();
        }
        self.packet_tx.take();
        self.packet_rx.take();
        info!(id = %self.id, "host stopped");
    }
}
