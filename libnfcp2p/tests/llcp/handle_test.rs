#[path = "../common/mod.rs"]
mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use libnfcp2p::llcp::ConnectionManagerBuilder;
use libnfcp2p::transport::MockLink;
use libnfcp2p::Handle;

#[test]
fn handles_unique_under_contention() {
    let manager = ConnectionManagerBuilder::new()
        .with_link(Arc::new(MockLink::new()))
        .build()
        .unwrap();

    let workers: Vec<_> = (0..16)
        .map(|_| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || (0..500).map(|_| manager.new_handle()).collect::<Vec<Handle>>())
        })
        .collect();

    let mut seen = HashSet::new();
    for worker in workers {
        for handle in worker.join().unwrap() {
            assert!(seen.insert(handle), "duplicate handle {}", handle);
        }
    }
    assert_eq!(seen.len(), 16 * 500);
}
