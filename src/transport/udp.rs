//! UDP endpoint: socket binding, sending, and the receive task.

use super::{PacketTx, ReceivedPacket, TransportError};
use crate::wire::MAX_DATAGRAM_SIZE;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A bound UDP socket shared by the send path and the receive task.
///
/// Binding spawns the receive loop, which pushes every incoming datagram
/// into the packet channel until the channel closes or the endpoint is
/// shut down.
pub struct UdpEndpoint {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
    recv_task: Option<JoinHandle<()>>,
}

impl UdpEndpoint {
    /// Bind the socket and spawn the receive loop.
    ///
    /// A bind failure is a fatal startup error for the caller.
    pub async fn bind(addr: SocketAddr, packet_tx: PacketTx) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| TransportError::Bind { addr, source: e })?;
        let local_addr = socket
            .local_addr()
            .map_err(|e| TransportError::Bind { addr, source: e })?;

        let socket = Arc::new(socket);
        let recv_socket = socket.clone();
        let recv_task = tokio::spawn(async move {
            recv_loop(recv_socket, packet_tx).await;
        });

        info!(local_addr = %local_addr, "UDP endpoint bound");

        Ok(Self {
            socket,
            local_addr,
            recv_task: Some(recv_task),
        })
    }

    /// The actual bound address (resolves port 0 binds).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Send one datagram.
    ///
    /// Oversized payloads are refused before hitting the socket.
    pub async fn send(&self, addr: SocketAddr, data: &[u8]) -> Result<usize, TransportError> {
        if data.len() > MAX_DATAGRAM_SIZE {
            return Err(TransportError::DatagramTooLarge {
                size: data.len(),
                limit: MAX_DATAGRAM_SIZE,
            });
        }

        let sent = self
            .socket
            .send_to(data, addr)
            .await
            .map_err(|e| TransportError::Send { addr, source: e })?;

        debug!(remote_addr = %addr, bytes = sent, "datagram sent");
        Ok(sent)
    }

    /// Stop the receive task. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(task) = self.recv_task.take() {
            task.abort();
            debug!(local_addr = %self.local_addr, "UDP endpoint shut down");
        }
    }
}

impl Drop for UdpEndpoint {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Receive loop, runs as a spawned task.
async fn recv_loop(socket: Arc<UdpSocket>, packet_tx: PacketTx) {
    // Headroom beyond the limit so oversized datagrams are observed
    // (and dropped by the decoder) rather than silently truncated.
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE + 64];

    debug!("UDP receive loop starting");

    loop {
        match socket.recv_from(&mut buf).await {
            Ok((len, from)) => {
                let packet = ReceivedPacket {
                    from,
                    data: buf[..len].to_vec(),
                };
                if packet_tx.send(packet).await.is_err() {
                    info!("packet channel closed, stopping receive loop");
                    break;
                }
            }
            Err(e) => {
                // Transient receive errors are expected; keep going
                warn!(error = %e, "UDP receive error");
            }
        }
    }

    debug!("UDP receive loop stopped");
}

// ============================================================================
// Tests
// ============================================================================
