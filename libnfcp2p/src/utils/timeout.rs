//! Timeout helpers used across the crate.
//!
//! Centralizes the bounded wait used for link establishment steps and a
//! small conversion helper so tests can express timeouts in milliseconds.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::{Error, Result};

/// Bound applied to registration and disconnect handshakes with the link
/// layer, in milliseconds.
pub const DEFAULT_ESTABLISH_TIMEOUT_MS: u64 = 1000;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

pub fn default_establish_timeout() -> Duration {
    ms(DEFAULT_ESTABLISH_TIMEOUT_MS)
}

/// Block on a one-shot completion channel.
///
/// A dropped sender means the operation was abandoned (teardown, close)
/// and maps to [`Error::LinkClosed`]; an expired bound maps to
/// [`Error::Timeout`].
pub fn wait_for<T>(rx: &Receiver<T>, timeout: Option<Duration>) -> Result<T> {
    match timeout {
        Some(t) => rx.recv_timeout(t).map_err(|e| match e {
            RecvTimeoutError::Timeout => Error::Timeout,
            RecvTimeoutError::Disconnected => Error::LinkClosed,
        }),
        None => rx.recv().map_err(|_| Error::LinkClosed),
    }
}
