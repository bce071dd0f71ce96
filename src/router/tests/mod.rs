//! Router test support.
//!
//! Routers under test bind real sockets on `127.0.0.1:0`. Scripted
//! neighbors and hosts are plain UDP sockets whose addresses are written
//! into the router's configuration after binding, so refloods and
//! forwarded datagrams can be observed on the wire. Packets are injected
//! by calling the handlers directly; the event loop is not running, which
//! keeps every test deterministic.

mod spf;

use crate::config::{
    AttachedHostConfig, Config, NeighborConfig, NodeSection, RouterConfig, RouterTimers,
};
use crate::router::Router;
use crate::transport::ReceivedPacket;
use crate::wire::{Lsa, Message, NodeId};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::time::{timeout, Duration};

pub(super) fn id(s: &str) -> NodeId {
    NodeId::new(s)
}

/// Build a router config with the given neighbors and attached hosts.
pub(super) fn make_config(
    node_id: &str,
    neighbors: Vec<(&str, SocketAddr, u32)>,
    hosts: Vec<(&str, SocketAddr)>,
) -> Config {
    Config {
        node: NodeSection {
            id: id(node_id),
            listen: "127.0.0.1:0".parse().unwrap(),
        },
        router: Some(RouterConfig {
            neighbors: neighbors
                .into_iter()
                .map(|(n, addr, cost)| NeighborConfig {
                    id: id(n),
                    addr,
                    cost,
                })
                .collect(),
            hosts: hosts
                .into_iter()
                .map(|(h, addr)| AttachedHostConfig { id: id(h), addr })
                .collect(),
            timers: RouterTimers::default(),
            ttl: 16,
        }),
        host: None,
    }
}

/// Create and start a router.
pub(super) async fn make_router(config: Config) -> Router {
    let mut router = Router::new(config).unwrap();
    router.start().await.unwrap();
    router
}

/// Bind a scripted peer socket on an ephemeral port.
pub(super) async fn peer_socket() -> (UdpSocket, SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    (socket, addr)
}

pub(super) fn lsa(originator: &str, sequence: u64, links: &[(&str, u32)]) -> Lsa {
    Lsa {
        originator: id(originator),
        sequence,
        ttl: 16,
        links: links.iter().map(|(n, c)| (id(n), *c)).collect(),
        emitted_at: None,
    }
}

/// Inject a message into the router as if it arrived from `from`.
pub(super) async fn inject(router: &mut Router, message: Message, from: SocketAddr) {
    let packet = ReceivedPacket {
        from,
        data: message.encode().unwrap(),
    };
    router.handle_packet(packet).await;
}

/// Receive and decode one datagram with a deadline.
pub(super) async fn recv_message(socket: &UdpSocket) -> Message {
    let mut buf = [0u8; 4096];
    let (len, _) = timeout(Duration::from_secs(1), socket.recv_from(&mut buf))
        .await
        .expect("timed out waiting for datagram")
        .unwrap();
    Message::decode(&buf[..len]).unwrap()
}

/// Assert that no datagram arrives within a short window.
pub(super) async fn expect_silence(socket: &UdpSocket) {
    let mut buf = [0u8; 4096];
    let result = timeout(Duration::from_millis(200), socket.recv_from(&mut buf)).await;
    assert!(result.is_err(), "unexpected datagram");
}
