//! Router lifecycle: socket binding and shutdown.

use super::{Router, RouterError};
use crate::transport::{packet_channel, UdpEndpoint, PACKET_CHANNEL_CAPACITY};
use tracing::info;

impl Router {
    /// Bind the UDP endpoint and spawn its receive task.
    ///
    /// A bind failure here is the unrecoverable startup error; callers
    /// exit non-zero on it.
    pub async fn start(&mut self) -> Result<(), RouterError> {
        if self.endpoint.is_some() {
            return Err(RouterError::AlreadyStarted);
        }

        let (packet_tx, packet_rx) = packet_channel(PACKET_CHANNEL_CAPACITY);
        let endpoint = UdpEndpoint::bind(self.listen, packet_tx.clone()).await?;

        info!(
            id = %self.id,
            local_addr = %endpoint.local_addr(),
            neighbors = self.neighbors.len(),
            hosts = self.attached_hosts.len(),
            "router started"
        );

        self.endpoint = Some(endpoint);
        self.packet_tx = Some(packet_tx);
        self.packet_rx = Some(packet_rx);
        Ok(())
    }

    /// Stop the receive task and drop the packet channel.
    ///
    /// All routing state is in-memory and discarded; peers age this
    /// originator out of their databases on their own.
    pub fn stop(&mut self) {
        if let Some(mut endpoint) = self.endpoint.take() {
            endpoint.shutdown();
        }
        self.packet_tx.take();
        self.packet_rx.take();
        info!(id = %self.id, "router stopped");
    }
}
