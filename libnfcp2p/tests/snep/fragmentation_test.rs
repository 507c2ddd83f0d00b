#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::time::Duration;

use common::fixtures::bulky_message;
use common::helpers::{ForwardingHandler, init_logger};
use libnfcp2p::constants::SNEP_RESPONSE_SUCCESS;
use libnfcp2p::test_support::loopback_pair;
use libnfcp2p::{P2pConfig, SnepClient, SnepConfig, SnepServer};

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn large_put_is_fragmented_and_reassembled() {
    init_logger();
    let pair = loopback_pair(P2pConfig::default());
    let (handler, inbox) = ForwardingHandler::new();
    let _server = SnepServer::start(&pair.target, SnepConfig::server(), Arc::new(handler)).unwrap();

    let mut client = SnepClient::connect(&pair.initiator, &SnepConfig::client()).unwrap();
    // the server's MIU bounds what the client may put in one fragment
    assert_eq!(client.messenger().fragment_length(), 248);

    let message = bulky_message(2000);
    assert_eq!(client.put(message.clone()).unwrap(), SNEP_RESPONSE_SUCCESS);
    assert_eq!(inbox.recv_timeout(WAIT).unwrap(), message);
}

#[test]
fn configured_fragment_length_caps_writes() {
    let pair = loopback_pair(P2pConfig::default());
    let (handler, inbox) = ForwardingHandler::new();
    let _server = SnepServer::start(&pair.target, SnepConfig::server(), Arc::new(handler)).unwrap();

    let config = SnepConfig::client().with_fragment_length(32);
    let mut client = SnepClient::connect(&pair.initiator, &config).unwrap();
    assert_eq!(client.messenger().fragment_length(), 32);

    let message = bulky_message(500);
    assert_eq!(client.put(message.clone()).unwrap(), SNEP_RESPONSE_SUCCESS);
    assert_eq!(inbox.recv_timeout(WAIT).unwrap(), message);
}

#[test]
fn large_get_response_comes_back_in_fragments() {
    let pair = loopback_pair(P2pConfig::default());
    let (handler, _inbox) = ForwardingHandler::new();
    let config = SnepConfig::server().with_get_enabled(true);
    let _server = SnepServer::start(&pair.target, config, Arc::new(handler)).unwrap();

    let mut client = SnepClient::connect(&pair.initiator, &SnepConfig::client()).unwrap();
    let message = bulky_message(1500);
    let reply = client.get(message.clone()).unwrap();
    assert_eq!(reply.field(), SNEP_RESPONSE_SUCCESS);
    assert_eq!(reply.ndef(), Some(&message));
}
