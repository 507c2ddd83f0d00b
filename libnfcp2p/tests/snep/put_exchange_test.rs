#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::time::Duration;

use common::fixtures::{text_message, uri_message};
use common::helpers::{ForwardingHandler, init_logger};
use libnfcp2p::constants::{SNEP_RESPONSE_NOT_IMPLEMENTED, SNEP_RESPONSE_SUCCESS};
use libnfcp2p::test_support::loopback_pair;
use libnfcp2p::{P2pConfig, SnepClient, SnepConfig, SnepServer};

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn put_reaches_remote_handler() {
    init_logger();
    let pair = loopback_pair(P2pConfig::default());
    let (handler, inbox) = ForwardingHandler::new();
    let server = SnepServer::start(&pair.target, SnepConfig::server(), Arc::new(handler)).unwrap();
    assert_eq!(server.service_name(), "urn:nfc:sn:snep");

    let mut client = SnepClient::connect(&pair.initiator, &SnepConfig::client()).unwrap();
    assert_eq!(client.put(uri_message()).unwrap(), SNEP_RESPONSE_SUCCESS);
    assert_eq!(inbox.recv_timeout(WAIT).unwrap(), uri_message());
    client.close().unwrap();
}

#[test]
fn several_puts_share_one_session() {
    let pair = loopback_pair(P2pConfig::default());
    let (handler, inbox) = ForwardingHandler::new();
    let _server = SnepServer::start(&pair.target, SnepConfig::server(), Arc::new(handler)).unwrap();

    let mut client = SnepClient::connect(&pair.initiator, &SnepConfig::client()).unwrap();
    for text in ["one", "two", "three"] {
        assert_eq!(client.put(text_message(text)).unwrap(), SNEP_RESPONSE_SUCCESS);
        assert_eq!(inbox.recv_timeout(WAIT).unwrap(), text_message(text));
    }
}

#[test]
fn connect_by_well_known_sap() {
    let pair = loopback_pair(P2pConfig::default());
    let (handler, inbox) = ForwardingHandler::new();
    let _server = SnepServer::start(&pair.target, SnepConfig::server(), Arc::new(handler)).unwrap();

    let config = SnepConfig::client().with_sap(4);
    let mut client = SnepClient::connect(&pair.initiator, &config).unwrap();
    assert_eq!(client.put(uri_message()).unwrap(), SNEP_RESPONSE_SUCCESS);
    assert!(inbox.recv_timeout(WAIT).is_ok());
}

#[test]
fn get_is_not_implemented_by_default() {
    let pair = loopback_pair(P2pConfig::default());
    let (handler, _inbox) = ForwardingHandler::new();
    let _server = SnepServer::start(&pair.target, SnepConfig::server(), Arc::new(handler)).unwrap();

    let mut client = SnepClient::connect(&pair.initiator, &SnepConfig::client()).unwrap();
    let reply = client.get(uri_message()).unwrap();
    assert_eq!(reply.field(), SNEP_RESPONSE_NOT_IMPLEMENTED);
    assert!(reply.ndef().is_none());
}

#[test]
fn get_answered_when_enabled() {
    let pair = loopback_pair(P2pConfig::default());
    let (handler, _inbox) = ForwardingHandler::new();
    let config = SnepConfig::server().with_get_enabled(true);
    let _server = SnepServer::start(&pair.target, config, Arc::new(handler)).unwrap();

    let mut client = SnepClient::connect(&pair.initiator, &SnepConfig::client()).unwrap();
    let reply = client.get(text_message("lookup")).unwrap();
    assert_eq!(reply.field(), SNEP_RESPONSE_SUCCESS);
    assert_eq!(reply.ndef(), Some(&text_message("lookup")));
}

#[test]
fn connect_fails_after_server_stops() {
    let pair = loopback_pair(P2pConfig::default());
    let (handler, _inbox) = ForwardingHandler::new();
    let mut server =
        SnepServer::start(&pair.target, SnepConfig::server(), Arc::new(handler)).unwrap();
    server.stop().unwrap();

    assert!(SnepClient::connect(&pair.initiator, &SnepConfig::client()).is_err());
}

#[test]
fn client_and_server_sessions_close_cleanly() -> anyhow::Result<()> {
    let pair = loopback_pair(P2pConfig::default());
    let (handler, inbox) = ForwardingHandler::new();
    let mut server = SnepServer::start(&pair.target, SnepConfig::server(), Arc::new(handler))?;

    for _ in 0..2 {
        let mut client = SnepClient::connect(&pair.initiator, &SnepConfig::client())?;
        anyhow::ensure!(client.put(uri_message())? == SNEP_RESPONSE_SUCCESS);
        inbox.recv_timeout(WAIT)?;
        client.close()?;
    }
    server.stop()?;
    Ok(())
}
