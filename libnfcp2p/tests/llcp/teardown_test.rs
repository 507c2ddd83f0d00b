#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use libnfcp2p::llcp::{LlcpServiceSocket, LlcpSocket};
use libnfcp2p::test_support::loopback_pair;
use libnfcp2p::transport::Transport;
use libnfcp2p::P2pConfig;

const SETTLE: Duration = Duration::from_millis(50);

#[test]
fn nfc_off_releases_accept_and_receive() {
    common::helpers::init_logger();
    let pair = loopback_pair(P2pConfig::default());
    let idle = Arc::new(
        LlcpServiceSocket::create(&pair.target, "urn:nfc:sn:idle", 248, 1).unwrap(),
    );
    let busy = LlcpServiceSocket::create(&pair.target, "urn:nfc:sn:busy", 248, 1).unwrap();

    let blocked_accept = {
        let idle = Arc::clone(&idle);
        thread::spawn(move || idle.accept().map(|_| ()))
    };
    let blocked_receive = thread::spawn(move || {
        let mut peer = busy.accept()?;
        peer.receive()
    });

    let _client = LlcpSocket::create(&pair.initiator, 128, 1)
        .unwrap()
        .connect_to_service("urn:nfc:sn:busy")
        .unwrap();
    thread::sleep(SETTLE);

    pair.target.handle_nfc_on_off(false);

    assert!(blocked_accept.join().unwrap().is_err());
    assert!(blocked_receive.join().unwrap().is_err());
}

#[test]
fn services_register_again_after_nfc_cycle() {
    let pair = loopback_pair(P2pConfig::default());
    let stale = LlcpServiceSocket::create(&pair.target, "urn:nfc:sn:cycle", 248, 1).unwrap();
    pair.nfc_off();
    pair.nfc_on();

    let service = LlcpServiceSocket::create(&pair.target, "urn:nfc:sn:cycle", 248, 1).unwrap();
    // the old socket no longer owns the registration
    drop(stale);

    let acceptor = thread::spawn(move || {
        let peer = service.accept()?;
        Ok::<_, libnfcp2p::Error>((service, peer))
    });
    let client = LlcpSocket::create(&pair.initiator, 128, 1)
        .unwrap()
        .connect_to_service("urn:nfc:sn:cycle");
    assert!(client.is_ok());
    assert!(acceptor.join().unwrap().is_ok());
}

#[test]
fn closing_service_fails_pending_accept() {
    let pair = loopback_pair(P2pConfig::default());
    let service = Arc::new(
        LlcpServiceSocket::create(&pair.target, "urn:nfc:sn:stop", 248, 1).unwrap(),
    );
    let acceptor = {
        let service = Arc::clone(&service);
        thread::spawn(move || service.accept().map(|_| ()))
    };
    thread::sleep(SETTLE);
    service.close().unwrap();
    assert!(acceptor.join().unwrap().unwrap_err().is_link_error());
}
