#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use libnfcp2p::llcp::{LlcpServiceSocket, LlcpSocket};
use libnfcp2p::test_support::loopback_pair;
use libnfcp2p::transport::Transport;
use libnfcp2p::{Error, P2pConfig};

#[test]
fn echo_over_loopback() {
    common::helpers::init_logger();
    let pair = loopback_pair(P2pConfig::default());
    let service = LlcpServiceSocket::create(&pair.target, "urn:nfc:sn:echo", 248, 1).unwrap();

    // the server keeps both sockets alive until the client has read
    let server = thread::spawn(move || {
        let mut peer = service.accept()?;
        let data = peer.receive()?;
        peer.send(&data)?;
        Ok::<_, libnfcp2p::Error>((service, peer))
    });

    let mut client = LlcpSocket::create(&pair.initiator, 128, 1)
        .unwrap()
        .connect_to_service("urn:nfc:sn:echo")
        .unwrap();
    assert_eq!(client.remote_max_info_unit().unwrap(), 248);

    client.send(b"ping").unwrap();
    assert_eq!(client.receive().unwrap(), b"ping".to_vec());
    let (_service, _peer) = server.join().unwrap().unwrap();
    client.close().unwrap();
}

#[test]
fn connect_by_sap() {
    let pair = loopback_pair(P2pConfig::default());
    let service = LlcpServiceSocket::create(&pair.target, "urn:nfc:sn:snep", 248, 1).unwrap();
    let acceptor = thread::spawn(move || service.accept().map(|s| s.local_miu()));

    let client = LlcpSocket::create(&pair.initiator, 128, 1)
        .unwrap()
        .connect_to_sap(4)
        .unwrap();
    assert_eq!(acceptor.join().unwrap().unwrap(), 248);
    assert_eq!(client.remote_recv_window().unwrap(), 1);
}

#[test]
fn unknown_service_fails_connect() {
    let pair = loopback_pair(P2pConfig::default());
    let err = LlcpSocket::create(&pair.initiator, 128, 1)
        .unwrap()
        .connect_to_service("urn:nfc:sn:nobody")
        .unwrap_err();
    assert!(matches!(err, Error::LinkFailure(_)));
}

#[test]
fn peer_close_ends_blocked_receive() {
    let pair = loopback_pair(P2pConfig::default());
    let service = Arc::new(
        LlcpServiceSocket::create(&pair.target, "urn:nfc:sn:close", 248, 1).unwrap(),
    );
    let reader = {
        let service = Arc::clone(&service);
        thread::spawn(move || {
            let mut peer = service.accept()?;
            peer.receive()
        })
    };

    let mut client = LlcpSocket::create(&pair.initiator, 128, 1)
        .unwrap()
        .connect_to_service("urn:nfc:sn:close")
        .unwrap();
    thread::sleep(Duration::from_millis(50));
    client.close().unwrap();

    assert!(reader.join().unwrap().unwrap_err().is_link_error());
}

#[test]
fn messages_larger_than_local_miu_are_split() {
    let pair = loopback_pair(P2pConfig::default());
    let service = LlcpServiceSocket::create(&pair.target, "urn:nfc:sn:split", 16, 1).unwrap();
    let reader = thread::spawn(move || -> libnfcp2p::Result<Vec<Vec<u8>>> {
        let mut peer = service.accept()?;
        Ok(vec![peer.receive()?, peer.receive()?])
    });

    let mut client = LlcpSocket::create(&pair.initiator, 128, 1)
        .unwrap()
        .connect_to_service("urn:nfc:sn:split")
        .unwrap();
    let data: Vec<u8> = (0..24).collect();
    client.send(&data).unwrap();

    let parts = reader.join().unwrap().unwrap();
    assert_eq!(parts[0].len(), 16);
    assert_eq!(parts.concat(), data);
}
