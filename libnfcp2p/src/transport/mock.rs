// libnfcp2p/src/transport/mock.rs

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::transport::link::{LinkLayer, SendStatus};
use crate::transport::traits::Transport;
use crate::types::{Handle, HwHandle};
use crate::{Error, Result};

/// Mock transport for unit tests. It records sent payloads and returns queued responses.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub sent: Vec<Vec<u8>>,
    pub responses: Vec<Vec<u8>>,
    pub remote_miu: u16,
    pub remote_rw: u8,
    pub closed: bool,
    /// Testing hook: number of subsequent sends that should fail
    pub send_failures: usize,
}

impl MockTransport {
    pub fn new(remote_miu: u16) -> Self {
        Self {
            remote_miu,
            remote_rw: 1,
            ..Self::default()
        }
    }

    pub fn set_send_failures(&mut self, n: usize) {
        self.send_failures = n;
    }

    pub fn push_response(&mut self, resp: Vec<u8>) {
        self.responses.push(resp);
    }

    pub fn pop_sent(&mut self) -> Option<Vec<u8>> {
        self.sent.pop()
    }
}

impl Transport for MockTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        if self.send_failures > 0 {
            self.send_failures -= 1;
            return Err(Error::LinkFailure("mock send failure".into()));
        }
        self.sent.push(data.to_vec());
        Ok(())
    }

    /// An exhausted queue behaves like a peer that went away.
    fn receive(&mut self) -> Result<Vec<u8>> {
        if self.responses.is_empty() {
            Err(Error::LinkClosed)
        } else {
            Ok(self.responses.remove(0))
        }
    }

    fn remote_miu(&self) -> u16 {
        self.remote_miu
    }

    fn remote_rw(&self) -> u8 {
        self.remote_rw
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// One primitive invocation recorded by [`MockLink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCall {
    RegisterServer(String),
    RegisterClient(Handle),
    Deregister(HwHandle),
    ConnectByName {
        client: HwHandle,
        service_name: String,
        miu: u16,
        rw: u8,
    },
    ConnectBySap {
        client: HwHandle,
        sap: u8,
        miu: u16,
        rw: u8,
    },
    Accept {
        conn: HwHandle,
        miu: u16,
        rw: u8,
    },
    Send {
        conn: HwHandle,
        data: Vec<u8>,
    },
    Read(HwHandle),
    Disconnect(HwHandle),
    SetListenTechnology(u32),
}

/// Scriptable [`LinkLayer`] that never emits events on its own.
///
/// Tests drive the manager by feeding `LinkEvent`s by hand, using
/// [`MockLink::wait_for`] to sequence against blocked callers.
#[derive(Default)]
pub struct MockLink {
    calls: Mutex<Vec<LinkCall>>,
    changed: Condvar,
    send_results: Mutex<VecDeque<SendStatus>>,
    inbox: Mutex<HashMap<HwHandle, VecDeque<Vec<u8>>>>,
    failing: Mutex<bool>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<LinkCall> {
        self.calls.lock().clone()
    }

    /// Results handed out by subsequent sends, `Sent` once exhausted.
    pub fn push_send_result(&self, status: SendStatus) {
        self.send_results.lock().push_back(status);
    }

    pub fn push_read(&self, conn: HwHandle, data: Vec<u8>) {
        self.inbox.lock().entry(conn).or_default().push_back(data);
    }

    /// Make every primitive fail with `LinkFailure`.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    /// Block until `count` recorded calls satisfy `pred`.
    pub fn wait_for<F>(&self, count: usize, timeout: Duration, pred: F) -> bool
    where
        F: Fn(&LinkCall) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut calls = self.calls.lock();
        loop {
            if calls.iter().filter(|c| pred(c)).count() >= count {
                return true;
            }
            if self.changed.wait_until(&mut calls, deadline).timed_out() {
                return calls.iter().filter(|c| pred(c)).count() >= count;
            }
        }
    }

    fn record(&self, call: LinkCall) -> Result<()> {
        self.calls.lock().push(call);
        self.changed.notify_all();
        if *self.failing.lock() {
            return Err(Error::LinkFailure("mock link failure".into()));
        }
        Ok(())
    }
}

impl LinkLayer for MockLink {
    fn register_server(&self, service_name: &str) -> Result<()> {
        self.record(LinkCall::RegisterServer(service_name.to_string()))
    }

    fn register_client(&self, token: Handle) -> Result<()> {
        self.record(LinkCall::RegisterClient(token))
    }

    fn deregister(&self, registration: HwHandle) -> Result<()> {
        self.record(LinkCall::Deregister(registration))
    }

    fn connect_by_name(
        &self,
        client: HwHandle,
        service_name: &str,
        miu: u16,
        rw: u8,
    ) -> Result<()> {
        self.record(LinkCall::ConnectByName {
            client,
            service_name: service_name.to_string(),
            miu,
            rw,
        })
    }

    fn connect_by_sap(&self, client: HwHandle, sap: u8, miu: u16, rw: u8) -> Result<()> {
        self.record(LinkCall::ConnectBySap {
            client,
            sap,
            miu,
            rw,
        })
    }

    fn accept(&self, conn: HwHandle, miu: u16, rw: u8) -> Result<()> {
        self.record(LinkCall::Accept { conn, miu, rw })
    }

    fn send(&self, conn: HwHandle, data: &[u8]) -> Result<SendStatus> {
        self.record(LinkCall::Send {
            conn,
            data: data.to_vec(),
        })?;
        Ok(self
            .send_results
            .lock()
            .pop_front()
            .unwrap_or(SendStatus::Sent))
    }

    fn read(&self, conn: HwHandle, max_len: usize) -> Result<Vec<u8>> {
        let mut inbox = self.inbox.lock();
        let data = inbox
            .get_mut(&conn)
            .and_then(VecDeque::pop_front)
            .map(|mut data| {
                data.truncate(max_len);
                data
            })
            .unwrap_or_default();
        drop(inbox);
        self.record(LinkCall::Read(conn))?;
        Ok(data)
    }

    fn disconnect(&self, conn: HwHandle) -> Result<()> {
        self.record(LinkCall::Disconnect(conn))
    }

    fn set_listen_technology(&self, tech_mask: u32) -> Result<()> {
        self.record(LinkCall::SetListenTechnology(tech_mask))
    }
}
