//! Host behavior tests.
//!
//! Hosts under test bind real sockets on `127.0.0.1:0`; the "router" is a
//! plain UDP socket whose address goes into the host's configuration, so
//! everything the host emits can be observed on the wire. Packets are
//! injected by calling the handlers directly and the retry schedule is
//! driven with synthetic instants, so no test sleeps.

use crate::config::{Config, HostConfig, HostTimers, NodeSection};
use crate::host::Host;
use crate::transport::ReceivedPacket;
use crate::wire::{Ack, Data, Message, NodeId};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::time::timeout;

fn id(s: &str) -> NodeId {
    NodeId::new(s)
}

fn make_config(node_id: &str, router: SocketAddr, peers: &[&str], initial_burst: u32) -> Config {
    Config {
        node: NodeSection {
            id: id(node_id),
            listen: "127.0.0.1:0".parse().unwrap(),
        },
        router: None,
        host: Some(HostConfig {
            router,
            peers: peers.iter().map(|p| id(p)).collect(),
            timers: HostTimers::default(),
            max_attempts: 3,
            initial_burst,
            ttl: 16,
        }),
    }
}

async fn router_socket() -> (UdpSocket, SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    (socket, addr)
}

async fn make_host(config: Config) -> Host {
    let mut host = Host::new(config).unwrap();
    host.start().await.unwrap();
    host
}

async fn inject(host: &mut Host, message: Message, from: SocketAddr) {
    let packet = ReceivedPacket {
        from,
        data: message.encode().unwrap(),
    };
    host.handle_packet(packet).await;
}

async fn recv_message(socket: &UdpSocket) -> Message {
    let mut buf = [0u8; 4096];
    let (len, _) = timeout(Duration::from_secs(1), socket.recv_from(&mut buf))
        .await
        .expect("timed out waiting for datagram")
        .unwrap();
    Message::decode(&buf[..len]).unwrap()
}

async fn expect_silence(socket: &UdpSocket) {
    let mut buf = [0u8; 4096];
    let result = timeout(Duration::from_millis(200), socket.recv_from(&mut buf)).await;
    assert!(result.is_err(), "unexpected datagram");
}

#[tokio::test]
async fn test_startup_burst_targets_known_peers() {
    let (router, router_addr) = router_socket().await;
    let mut host = make_host(make_config("H1", router_addr, &["H2", "H3"], 5)).await;

    host.startup_burst().await;

    let mut sequences = Vec::new();
    for _ in 0..5 {
        let Message::Data(data) = recv_message(&router).await else {
            panic!("expected DATA");
        };
        assert_eq!(data.source, id("H1"));
        assert!(data.destination == id("H2") || data.destination == id("H3"));
        assert_eq!(data.ttl, 16);
        sequences.push(data.sequence);
    }
    assert_eq!(sequences, vec![1, 2, 3, 4, 5]);
    assert_eq!(host.pending_count(), 5);
    assert_eq!(host.stats().sent, 5);
}

#[tokio::test]
async fn test_burst_without_peers_is_a_noop() {
    let (router, router_addr) = router_socket().await;
    let mut host = make_host(make_config("H1", router_addr, &[], 100)).await;

    host.startup_burst().await;

    expect_silence(&router).await;
    assert_eq!(host.pending_count(), 0);
}

#[tokio::test]
async fn test_data_receipt_acks_then_replies() {
    let (router, router_addr) = router_socket().await;
    let mut host = make_host(make_config("H7", router_addr, &["H1"], 0)).await;

    inject(
        &mut host,
        Message::Data(Data {
            source: id("H1"),
            destination: id("H7"),
            sequence: 42,
            ttl: 12,
            payload: "hello".to_string(),
        }),
        router_addr,
    )
    .await;

    // First the ACK echoing the sender's sequence...
    let Message::Ack(ack) = recv_message(&router).await else {
        panic!("expected ACK first");
    };
    assert_eq!(ack.source, id("H7"));
    assert_eq!(ack.destination, id("H1"));
    assert_eq!(ack.ack_sequence, 42);

    // ...then a reply DATA with our own fresh sequence.
    let Message::Data(reply) = recv_message(&router).await else {
        panic!("expected reply DATA");
    };
    assert_eq!(reply.source, id("H7"));
    assert_eq!(reply.destination, id("H1"));
    assert_eq!(reply.sequence, 1);

    // The reply is tracked like any other request.
    assert_eq!(host.pending_count(), 1);
    assert_eq!(host.stats().received, 1);
    assert_eq!(host.stats().acks_sent, 1);
}

#[tokio::test]
async fn test_data_for_another_host_ignored() {
    let (router, router_addr) = router_socket().await;
    let mut host = make_host(make_config("H7", router_addr, &[], 0)).await;

    inject(
        &mut host,
        Message::Data(Data {
            source: id("H1"),
            destination: id("H9"),
            sequence: 1,
            ttl: 12,
            payload: "misdelivered".to_string(),
        }),
        router_addr,
    )
    .await;

    expect_silence(&router).await;
    assert_eq!(host.stats().received, 0);
}

#[tokio::test]
async fn test_ack_clears_pending_request() {
    let (router, router_addr) = router_socket().await;
    let mut host = make_host(make_config("H1", router_addr, &["H7"], 1)).await;

    host.startup_burst().await;
    let _ = recv_message(&router).await;
    assert_eq!(host.pending_count(), 1);

    inject(
        &mut host,
        Message::Ack(Ack {
            source: id("H7"),
            destination: id("H1"),
            ack_sequence: 1,
        }),
        router_addr,
    )
    .await;

    assert_eq!(host.pending_count(), 0);
    assert_eq!(host.stats().acked, 1);
}

#[tokio::test]
async fn test_ack_from_wrong_source_ignored() {
    let (router, router_addr) = router_socket().await;
    let mut host = make_host(make_config("H1", router_addr, &["H7"], 1)).await;

    host.startup_burst().await;
    let _ = recv_message(&router).await;

    // Right sequence, wrong origin: the request must stay pending.
    inject(
        &mut host,
        Message::Ack(Ack {
            source: id("H3"),
            destination: id("H1"),
            ack_sequence: 1,
        }),
        router_addr,
    )
    .await;

    assert_eq!(host.pending_count(), 1);
    assert_eq!(host.stats().unmatched_acks, 1);
    assert_eq!(host.stats().acked, 0);
}

#[tokio::test]
async fn test_retry_then_abandon_timeline() {
    let (router, router_addr) = router_socket().await;
    let mut host = make_host(make_config("H1", router_addr, &["H7"], 1)).await;

    host.startup_burst().await;
    let t0 = Instant::now();
    let Message::Data(original) = recv_message(&router).await else {
        panic!("expected DATA");
    };

    // 5 s: first retransmission, identical datagram.
    host.retry_scan(t0 + Duration::from_secs(5)).await;
    let Message::Data(retry1) = recv_message(&router).await else {
        panic!("expected retransmission");
    };
    assert_eq!(retry1, original);
    assert_eq!(host.stats().retransmits, 1);

    // 10 s: second retransmission.
    host.retry_scan(t0 + Duration::from_secs(10)).await;
    let Message::Data(retry2) = recv_message(&router).await else {
        panic!("expected retransmission");
    };
    assert_eq!(retry2.sequence, original.sequence);

    // 15 s: budget exhausted, request abandoned, nothing sent.
    host.retry_scan(t0 + Duration::from_secs(15)).await;
    expect_silence(&router).await;
    assert_eq!(host.stats().abandoned, 1);
    assert_eq!(host.pending_count(), 0);
}

#[tokio::test]
async fn test_scan_before_deadline_sends_nothing() {
    let (router, router_addr) = router_socket().await;
    let mut host = make_host(make_config("H1", router_addr, &["H7"], 1)).await;

    host.startup_burst().await;
    let t0 = Instant::now();
    let _ = recv_message(&router).await;

    host.retry_scan(t0 + Duration::from_secs(3)).await;
    expect_silence(&router).await;
    assert_eq!(host.stats().retransmits, 0);
}

#[tokio::test]
async fn test_lsa_ignored_by_host() {
    let (router, router_addr) = router_socket().await;
    let mut host = make_host(make_config("H1", router_addr, &[], 0)).await;

    inject(
        &mut host,
        Message::Lsa(crate::wire::Lsa {
            originator: id("A"),
            sequence: 1,
            ttl: 16,
            links: Default::default(),
            emitted_at: None,
        }),
        router_addr,
    )
    .await;

    expect_silence(&router).await;
    assert_eq!(host.stats().malformed, 0);
}

#[tokio::test]
async fn test_malformed_and_unknown_counted() {
    let (_router, router_addr) = router_socket().await;
    let mut host = make_host(make_config("H1", router_addr, &[], 0)).await;

    host.handle_packet(ReceivedPacket {
        from: router_addr,
        data: b"{broken".to_vec(),
    })
    .await;
    host.handle_packet(ReceivedPacket {
        from: router_addr,
        data: br#"{"kind":"NOPE"}"#.to_vec(),
    })
    .await;

    assert_eq!(host.stats().malformed, 1);
    assert_eq!(host.stats().unknown_kind, 1);
}
