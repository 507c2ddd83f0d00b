// Shared helpers for integration tests. Each aggregator pulls this in via
// `#[path = "../common/mod.rs"]`.
#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;
