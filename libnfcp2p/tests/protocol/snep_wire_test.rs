#[path = "../common/mod.rs"]
mod common;

use libnfcp2p::constants::*;
use libnfcp2p::protocol::snep::{SnepClient, SnepMessage, SnepMessenger};
use libnfcp2p::transport::MockTransport;
use libnfcp2p::SnepConfig;

#[test]
fn put_request_capture() {
    let msg = SnepMessage::put_request(common::fixtures::uri_message());
    let mut expected = common::fixtures::bytes("10 02 00 00 00 10");
    expected.extend(common::fixtures::uri_record_bytes());
    assert_eq!(msg.to_bytes(), expected);
    assert_eq!(SnepMessage::from_bytes(&expected).unwrap(), msg);
}

#[test]
fn get_request_capture() {
    let msg = SnepMessage::get_request(0x400, common::fixtures::uri_message());
    let mut expected = common::fixtures::bytes("10 01 00 00 00 14 00 00 04 00");
    expected.extend(common::fixtures::uri_record_bytes());
    assert_eq!(msg.to_bytes(), expected);
}

#[test]
fn client_sends_fragments_after_continue() {
    let msg = common::fixtures::bulky_message(300);
    let mut mock = MockTransport::new(64);
    mock.push_response(SnepMessage::response(SNEP_RESPONSE_CONTINUE).to_bytes());
    mock.push_response(SnepMessage::response(SNEP_RESPONSE_SUCCESS).to_bytes());
    let mut client = SnepClient::with_transport(mock, &SnepConfig::client(), 64);

    assert_eq!(client.put(msg.clone()).unwrap(), SNEP_RESPONSE_SUCCESS);
    let sent = &client.messenger().transport().sent;
    let wire = SnepMessage::put_request(msg).to_bytes();
    assert!(sent.iter().all(|f| f.len() <= 64));
    assert_eq!(sent.concat(), wire);
}

#[test]
fn server_side_reassembly() {
    let msg = SnepMessage::put_request(common::fixtures::bulky_message(500));
    let mut mock = MockTransport::new(128);
    for chunk in msg.to_bytes().chunks(128) {
        mock.push_response(chunk.to_vec());
    }
    let mut messenger = SnepMessenger::new(false, mock, 128);
    assert_eq!(messenger.get_message().unwrap(), msg);
    assert_eq!(
        messenger.transport().sent,
        vec![SnepMessage::response(SNEP_RESPONSE_CONTINUE).to_bytes()]
    );
}
