// libnfcp2p/src/llcp/socket.rs

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use super::manager::ConnectionManager;
use crate::transport::Transport;
use crate::types::{Handle, ServiceTarget};
use crate::Result;

/// Type-state markers
pub struct Unconnected;
pub struct Connected;

/// Connection-oriented LLCP endpoint.
///
/// An `LlcpSocket<Unconnected>` holds a registered client; connecting
/// consumes it and yields an `LlcpSocket<Connected>`, which is the
/// [`Transport`] SNEP runs on. Dropping a socket closes it.
pub struct LlcpSocket<State = Connected> {
    manager: Arc<ConnectionManager>,
    handle: Handle,
    miu: u16,
    rw: u8,
    closed: bool,
    _state: PhantomData<State>,
}

impl<S> LlcpSocket<S> {
    fn transition<T>(mut self) -> LlcpSocket<T> {
        self.closed = true;
        LlcpSocket {
            manager: Arc::clone(&self.manager),
            handle: self.handle,
            miu: self.miu,
            rw: self.rw,
            closed: false,
            _state: PhantomData,
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn local_miu(&self) -> u16 {
        self.miu
    }

    pub fn local_rw(&self) -> u8 {
        self.rw
    }

    /// Disconnect and release the handle. Later calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.manager.disconnect_conn_oriented(self.handle)
    }
}

impl<S> fmt::Debug for LlcpSocket<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlcpSocket")
            .field("handle", &self.handle)
            .field("miu", &self.miu)
            .field("rw", &self.rw)
            .field("closed", &self.closed)
            .finish()
    }
}

impl<S> Drop for LlcpSocket<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            debug!("llcp: closing {} on drop: {}", self.handle, e);
        }
    }
}

impl LlcpSocket<Unconnected> {
    /// Register a new client endpoint with the link layer.
    pub fn create(manager: &Arc<ConnectionManager>, miu: u16, rw: u8) -> Result<Self> {
        let handle = manager.new_handle();
        manager.create_client(handle, miu, rw)?;
        Ok(Self {
            manager: Arc::clone(manager),
            handle,
            miu,
            rw,
            closed: false,
            _state: PhantomData,
        })
    }

    pub fn connect_to_service(self, service_name: &str) -> Result<LlcpSocket<Connected>> {
        self.connect(ServiceTarget::Name(service_name.to_string()))
    }

    pub fn connect_to_sap(self, sap: u8) -> Result<LlcpSocket<Connected>> {
        self.connect(ServiceTarget::Sap(sap))
    }

    pub fn connect(mut self, target: ServiceTarget) -> Result<LlcpSocket<Connected>> {
        match self.manager.connect_conn_oriented(self.handle, &target) {
            Ok(()) => Ok(self.transition()),
            Err(e) => {
                // the manager already dropped the client
                self.closed = true;
                Err(e)
            }
        }
    }
}

impl LlcpSocket<Connected> {
    pub(crate) fn accepted(
        manager: &Arc<ConnectionManager>,
        handle: Handle,
        miu: u16,
        rw: u8,
    ) -> Self {
        Self {
            manager: Arc::clone(manager),
            handle,
            miu,
            rw,
            closed: false,
            _state: PhantomData,
        }
    }

    pub fn remote_max_info_unit(&self) -> Result<u16> {
        self.manager.remote_max_info_unit(self.handle)
    }

    pub fn remote_recv_window(&self) -> Result<u8> {
        self.manager.remote_recv_window(self.handle)
    }
}

impl Transport for LlcpSocket<Connected> {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.manager.send(self.handle, data)
    }

    fn receive(&mut self) -> Result<Vec<u8>> {
        self.manager.receive(self.handle, self.miu as usize)
    }

    /// Falls back to `0` once the connection is gone.
    fn remote_miu(&self) -> u16 {
        self.remote_max_info_unit().unwrap_or(0)
    }

    fn remote_rw(&self) -> u8 {
        self.remote_recv_window().unwrap_or(0)
    }

    fn close(&mut self) -> Result<()> {
        LlcpSocket::close(self)
    }
}

/// Listening LLCP endpoint bound to a service name.
///
/// `accept` and `close` take `&self` so one thread can block in accept
/// while another shuts the service down.
pub struct LlcpServiceSocket {
    manager: Arc<ConnectionManager>,
    handle: Handle,
    service_name: String,
    miu: u16,
    rw: u8,
    closed: AtomicBool,
}

impl LlcpServiceSocket {
    pub fn create(
        manager: &Arc<ConnectionManager>,
        service_name: &str,
        miu: u16,
        rw: u8,
    ) -> Result<Self> {
        let handle = manager.new_handle();
        manager.register_server(handle, service_name)?;
        Ok(Self {
            manager: Arc::clone(manager),
            handle,
            service_name: service_name.to_string(),
            miu,
            rw,
            closed: AtomicBool::new(false),
        })
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Block until a peer connects.
    pub fn accept(&self) -> Result<LlcpSocket<Connected>> {
        let conn = self.manager.new_handle();
        self.manager.accept(self.handle, conn, self.miu, self.rw)?;
        Ok(LlcpSocket::accepted(&self.manager, conn, self.miu, self.rw))
    }

    /// Deregister the service; a blocked `accept` fails.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.manager.deregister_server(self.handle)
    }
}

impl fmt::Debug for LlcpServiceSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlcpServiceSocket")
            .field("handle", &self.handle)
            .field("service_name", &self.service_name)
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

impl Drop for LlcpServiceSocket {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            debug!("llcp: closing service {} on drop: {}", self.service_name, e);
        }
    }
}
