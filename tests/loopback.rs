//! Real UDP exchanges against the bundled responder on loopback.

use std::time::Duration;

use rdp_sender::core::constants::{MAX_SYN_ATTEMPTS, SYN_HEADER_SIZE};
use rdp_sender::prelude::*;
use rdp_sender::server::{Responder, ResponderBuilder};
use tokio::net::UdpSocket;

async fn responder(window: u32) -> Responder {
    let config = ResponderBuilder::new()
        .bind_addr("127.0.0.1:0".parse().unwrap())
        .recv_window(window)
        .seed(7)
        .build();
    Responder::bind(config).await.unwrap()
}

#[tokio::test]
async fn test_open_send_close_against_responder() {
    let mut responder = responder(32).await;
    let port = responder.local_addr().unwrap().port();
    let server = tokio::spawn(async move { responder.serve_sessions(1).await });

    let config = SenderConfigBuilder::new()
        .destination("127.0.0.1")
        .port(port)
        .window(10)
        .rtt(0.01)
        .speed(1e7)
        .loss(0.0, 0.0)
        .build()
        .unwrap();

    let mut socket = SenderSocket::bind().await.unwrap();
    let link = socket.open_config(&config).await.unwrap();
    assert_eq!(link.buffer_size, 15);
    assert!(socket.is_connected());
    assert!(socket.rto() < Duration::from_secs(1));

    for chunk in [&b"first"[..], b"second", b"third"] {
        socket.send(chunk).await.unwrap();
    }
    socket.close().await.unwrap();
    assert_eq!(socket.phase(), ConnectionPhase::Closed);

    let stats = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(stats.syns, 1);
    assert_eq!(stats.fins, 1);
    assert_eq!(stats.sessions_closed, 1);
    assert_eq!(stats.data_packets, 3);
    assert_eq!(stats.dropped_forward, 0);
}

#[tokio::test]
async fn test_open_by_hostname() {
    let config = ResponderBuilder::new()
        .bind_addr("127.0.0.1:0".parse().unwrap())
        .build();
    let mut responder = Responder::bind(config).await.unwrap();
    let port = responder.local_addr().unwrap().port();
    let server = tokio::spawn(async move { responder.serve_sessions(1).await });

    let link = LinkProperties::new(0.01, 1e7, 0.0, 0.0);
    let mut socket = SenderSocket::bind().await.unwrap();
    socket.open("localhost", port, 4, &link).await.unwrap();
    socket.close().await.unwrap();

    let stats = server.await.unwrap().unwrap();
    assert_eq!(stats.sessions_closed, 1);
}

#[tokio::test]
async fn test_silent_peer_times_out() {
    let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = silent.local_addr().unwrap().port();

    let link = LinkProperties::new(0.01, 1e7, 0.0, 0.0);
    let mut socket = SenderSocket::bind().await.unwrap();
    let err = socket.open("127.0.0.1", port, 4, &link).await.unwrap_err();

    assert!(matches!(
        err,
        RdpError::Transport(TransportError::TimedOut { attempts }) if attempts == MAX_SYN_ATTEMPTS
    ));
    assert_eq!(socket.phase(), ConnectionPhase::Closed);

    let mut buf = [0u8; 64];
    let (len, _) = silent.recv_from(&mut buf).await.unwrap();
    assert_eq!(len, SYN_HEADER_SIZE);
}
