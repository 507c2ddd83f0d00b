// libnfcp2p/src/llcp/connection.rs

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};

use crate::types::{Handle, HwHandle};
use crate::{Error, Result};

/// Link-side state of one connection, guarded by the connection mutex.
#[derive(Debug, Default)]
struct LinkState {
    hw: Option<HwHandle>,
    remote_miu: u16,
    remote_rw: u8,
    /// Bumped on every data-available event
    data_epoch: u64,
    /// Bumped on every congestion-cleared event
    uncongest_epoch: u64,
    /// Set once a local disconnect starts; waiters bail out
    closing: bool,
    disconnect_done: Option<Sender<()>>,
}

/// One data link connection, shared between the manager's registry and
/// whichever caller is blocked on it.
///
/// Readiness is level-triggered: a caller snapshots the relevant epoch
/// before touching the link and then waits only while that epoch is
/// unchanged, so an event landing between the link call and the wait is
/// never lost.
#[derive(Debug)]
pub(crate) struct Connection {
    handle: Handle,
    miu: u16,
    rw: u8,
    state: Mutex<LinkState>,
    readable: Condvar,
    uncongested: Condvar,
}

impl Connection {
    pub(crate) fn new(handle: Handle, miu: u16, rw: u8) -> Arc<Self> {
        Arc::new(Self {
            handle,
            miu,
            rw,
            state: Mutex::new(LinkState::default()),
            readable: Condvar::new(),
            uncongested: Condvar::new(),
        })
    }

    pub(crate) fn handle(&self) -> Handle {
        self.handle
    }

    pub(crate) fn miu(&self) -> u16 {
        self.miu
    }

    pub(crate) fn rw(&self) -> u8 {
        self.rw
    }

    pub(crate) fn hw(&self) -> Option<HwHandle> {
        self.state.lock().hw
    }

    pub(crate) fn remote_miu(&self) -> u16 {
        self.state.lock().remote_miu
    }

    pub(crate) fn remote_rw(&self) -> u8 {
        self.state.lock().remote_rw
    }

    pub(crate) fn bind(&self, hw: HwHandle, remote_miu: u16, remote_rw: u8) {
        let mut st = self.state.lock();
        st.hw = Some(hw);
        st.remote_miu = remote_miu;
        st.remote_rw = remote_rw;
    }

    fn live(st: &LinkState) -> Result<HwHandle> {
        match st.hw {
            Some(hw) if !st.closing => Ok(hw),
            _ => Err(Error::LinkClosed),
        }
    }

    /// Current link handle plus the data epoch to wait against.
    pub(crate) fn read_ticket(&self) -> Result<(HwHandle, u64)> {
        let st = self.state.lock();
        Ok((Self::live(&st)?, st.data_epoch))
    }

    pub(crate) fn send_ticket(&self) -> Result<(HwHandle, u64)> {
        let st = self.state.lock();
        Ok((Self::live(&st)?, st.uncongest_epoch))
    }

    /// Block until data arrives after `seen`. False once the connection
    /// is gone.
    pub(crate) fn wait_readable(&self, seen: u64) -> bool {
        let mut st = self.state.lock();
        while st.data_epoch == seen && Self::live(&st).is_ok() {
            self.readable.wait(&mut st);
        }
        Self::live(&st).is_ok()
    }

    pub(crate) fn wait_uncongested(&self, seen: u64) -> bool {
        let mut st = self.state.lock();
        while st.uncongest_epoch == seen && Self::live(&st).is_ok() {
            self.uncongested.wait(&mut st);
        }
        Self::live(&st).is_ok()
    }

    pub(crate) fn notify_data(&self) {
        let mut st = self.state.lock();
        st.data_epoch = st.data_epoch.wrapping_add(1);
        self.readable.notify_all();
    }

    /// Only a cleared congestion wakes senders; they learn of a new one
    /// from their next send.
    pub(crate) fn notify_congestion(&self, congested: bool) {
        if congested {
            return;
        }
        let mut st = self.state.lock();
        st.uncongest_epoch = st.uncongest_epoch.wrapping_add(1);
        self.uncongested.notify_all();
    }

    /// Mark the connection closing and release blocked readers/senders.
    /// Returns the link handle (if still bound) together with a receiver
    /// completed by the matching disconnect event.
    pub(crate) fn begin_close(&self) -> Option<(HwHandle, Receiver<()>)> {
        let mut st = self.state.lock();
        st.closing = true;
        self.readable.notify_all();
        self.uncongested.notify_all();
        let hw = st.hw?;
        let (tx, rx) = bounded(1);
        st.disconnect_done = Some(tx);
        Some((hw, rx))
    }

    /// The link is gone: drop the handle, wake every waiter and complete a
    /// pending local disconnect.
    pub(crate) fn invalidate(&self) {
        let mut st = self.state.lock();
        st.hw = None;
        self.readable.notify_all();
        self.uncongested.notify_all();
        if let Some(done) = st.disconnect_done.take() {
            let _ = done.send(());
        }
    }
}
