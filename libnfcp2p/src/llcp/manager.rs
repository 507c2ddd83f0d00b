// libnfcp2p/src/llcp/manager.rs

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use crossbeam_channel::bounded;
use log::{debug, error, info, warn};
use parking_lot::{Mutex, RwLock};

use super::connection::Connection;
use super::listener::{LinkInfo, LinkListener};
use super::registry::{P2pClient, P2pServer, PeerRequest, Registry, ServerSlot};
use crate::config::P2pConfig;
use crate::transport::link::{LinkEvent, LinkLayer, SendStatus};
use crate::types::{Handle, HwHandle, ServiceTarget};
use crate::utils::timeout::wait_for;
use crate::{Error, Result};

/// Bridges blocking socket callers with the asynchronous link layer.
///
/// Callers issue a primitive and park on a one-shot channel or on the
/// connection's readiness condition; [`ConnectionManager::handle_event`]
/// completes them from the link layer's callback thread.
///
/// Lock order is registry before connection. Link primitives are never
/// invoked with the registry held.
pub struct ConnectionManager {
    link: Arc<dyn LinkLayer>,
    config: P2pConfig,
    next_handle: AtomicU32,
    registry: Mutex<Registry>,
    listener: RwLock<Option<Arc<dyn LinkListener>>>,
    listen_mask: AtomicU32,
    listening: AtomicBool,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("config", &self.config)
            .field("next_handle", &self.next_handle)
            .finish_non_exhaustive()
    }
}

enum Pending {
    Ready(PeerRequest),
    Wait(crossbeam_channel::Receiver<PeerRequest>),
}

impl ConnectionManager {
    pub fn new(link: Arc<dyn LinkLayer>, config: P2pConfig) -> Arc<Self> {
        let listen_mask = config.listen_tech_mask;
        Arc::new(Self {
            link,
            config,
            next_handle: AtomicU32::new(1),
            registry: Mutex::new(Registry::default()),
            listener: RwLock::new(None),
            listen_mask: AtomicU32::new(listen_mask),
            listening: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &P2pConfig {
        &self.config
    }

    pub fn set_link_listener(&self, listener: Option<Arc<dyn LinkListener>>) {
        *self.listener.write() = listener;
    }

    /// Fresh handle, unique for the lifetime of this manager.
    pub fn new_handle(&self) -> Handle {
        Handle::new(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a listening service under `handle`.
    ///
    /// Re-registering a name that is already live just rebinds it to the
    /// new handle. A caller arriving while the name's registration is in
    /// flight rebinds it too and waits for the same outcome. A server torn
    /// down by an NFC-off is registered with the link layer again.
    pub fn register_server(&self, handle: Handle, service_name: &str) -> Result<()> {
        let (rx, first) = {
            let mut reg = self.registry.lock();
            let old = reg.server_key_by_name(service_name);
            let mut server = old
                .and_then(|key| reg.servers.remove(&key))
                .unwrap_or_else(|| P2pServer::new(handle, service_name));
            server.handle = handle;
            if server.hw.is_some() {
                debug!(
                    "llcp: server {} already registered, rebound to {}",
                    service_name, handle
                );
                reg.servers.insert(handle, server);
                return Ok(());
            }
            let first = server.registering.is_empty();
            let (tx, rx) = bounded(1);
            server.registering.push(tx);
            reg.servers.insert(handle, server);
            (rx, first)
        };

        let issued = if first {
            self.link.register_server(service_name)
        } else {
            debug!("llcp: joining pending registration of {}", service_name);
            Ok(())
        };
        let outcome = issued.and_then(|_| wait_for(&rx, self.config.registration_timeout));
        match outcome {
            Ok(Some(hw)) => {
                info!("llcp: server {} registered as {} ({})", service_name, handle, hw);
                Ok(())
            }
            Ok(None) => {
                self.forget_unregistered(service_name);
                Err(Error::LinkFailure(format!(
                    "registration of {} refused",
                    service_name
                )))
            }
            Err(e) => {
                warn!("llcp: server {} registration failed: {}", service_name, e);
                self.forget_unregistered(service_name);
                Err(e)
            }
        }
    }

    /// Drop a server entry whose registration never completed. Other
    /// callers still waiting on it are released with `LinkClosed`.
    fn forget_unregistered(&self, service_name: &str) {
        let mut reg = self.registry.lock();
        if let Some(key) = reg.server_key_by_name(service_name) {
            if reg.servers.get(&key).is_some_and(|s| s.hw.is_none()) {
                reg.servers.remove(&key);
            }
        }
    }

    /// Drop a server and every connection it holds.
    pub fn deregister_server(&self, handle: Handle) -> Result<()> {
        let server = self
            .registry
            .lock()
            .servers
            .remove(&handle)
            .ok_or(Error::UnknownHandle(handle))?;

        for slot in &server.slots {
            if let Some(hw) = slot.conn.hw() {
                if let Err(e) = self.link.disconnect(hw) {
                    debug!("llcp: disconnect of {} failed: {}", hw, e);
                }
            }
            slot.conn.invalidate();
        }
        for req in &server.backlog {
            if let Err(e) = self.link.disconnect(req.conn) {
                debug!("llcp: dropping queued connect {}: {}", req.conn, e);
            }
        }
        if let Some(hw) = server.hw {
            self.link.deregister(hw)?;
        }
        debug!("llcp: server {} ({}) deregistered", server.service_name, handle);
        Ok(())
    }

    /// Register an outbound endpoint whose connection will use `miu`/`rw`.
    pub fn create_client(&self, handle: Handle, miu: u16, rw: u8) -> Result<()> {
        let rx = {
            let mut reg = self.registry.lock();
            if reg.contains(handle) {
                return Err(Error::ResourceExhausted("handle already in use"));
            }
            let (tx, rx) = bounded(1);
            reg.clients.insert(
                handle,
                P2pClient {
                    hw: None,
                    registering: Some(tx),
                    connecting: None,
                    conn: Connection::new(handle, miu, rw),
                },
            );
            rx
        };

        let outcome = self
            .link
            .register_client(handle)
            .and_then(|_| wait_for(&rx, self.config.registration_timeout));
        match outcome {
            Ok(Some(hw)) => {
                debug!("llcp: client {} registered ({})", handle, hw);
                Ok(())
            }
            Ok(None) => {
                self.registry.lock().clients.remove(&handle);
                Err(Error::LinkFailure("client registration refused".into()))
            }
            Err(e) => {
                self.registry.lock().clients.remove(&handle);
                Err(e)
            }
        }
    }

    /// Connect a client by service name or SAP. Any failure removes the
    /// client.
    pub fn connect_conn_oriented(&self, handle: Handle, target: &ServiceTarget) -> Result<()> {
        let (client_hw, conn, rx) = {
            let mut reg = self.registry.lock();
            let client = reg
                .clients
                .get_mut(&handle)
                .ok_or(Error::UnknownHandle(handle))?;
            let hw = client.hw.ok_or(Error::LinkClosed)?;
            let (tx, rx) = bounded(1);
            client.connecting = Some(tx);
            (hw, Arc::clone(&client.conn), rx)
        };

        debug!("llcp: client {} connecting to {}", handle, target);
        let issued = match target {
            ServiceTarget::Name(name) => {
                self.link
                    .connect_by_name(client_hw, name, conn.miu(), conn.rw())
            }
            ServiceTarget::Sap(sap) => {
                self.link
                    .connect_by_sap(client_hw, *sap, conn.miu(), conn.rw())
            }
        };
        let outcome = issued.and_then(|_| wait_for(&rx, self.config.connect_timeout));

        if let Some(client) = self.registry.lock().clients.get_mut(&handle) {
            client.connecting = None;
        }
        match outcome {
            Ok(Some(peer)) => {
                debug!(
                    "llcp: client {} connected ({}, remote miu {})",
                    handle, peer.conn, peer.remote_miu
                );
                Ok(())
            }
            Ok(None) => {
                self.remove_connection(handle);
                Err(Error::LinkFailure(format!("connect to {} refused", target)))
            }
            Err(e) => {
                debug!("llcp: client {} connect failed: {}", handle, e);
                self.remove_connection(handle);
                Err(e)
            }
        }
    }

    /// Wait for (or take from the backlog) an inbound connection on
    /// `server` and bind it to `conn_handle`.
    pub fn accept(&self, server: Handle, conn_handle: Handle, miu: u16, rw: u8) -> Result<()> {
        let pending = {
            let mut reg = self.registry.lock();
            let srv = reg
                .servers
                .get_mut(&server)
                .ok_or(Error::UnknownHandle(server))?;
            if srv.hw.is_none() {
                return Err(Error::LinkClosed);
            }
            if srv.slots.len() >= self.config.max_connections_per_server {
                return Err(Error::ResourceExhausted("server connection slots"));
            }
            let conn = Connection::new(conn_handle, miu, rw);
            match srv.backlog.pop_front() {
                Some(req) => {
                    conn.bind(req.conn, req.remote_miu, req.remote_rw);
                    srv.slots.push(ServerSlot { conn, waiter: None });
                    Pending::Ready(req)
                }
                None => {
                    let (tx, rx) = bounded(1);
                    srv.slots.push(ServerSlot {
                        conn,
                        waiter: Some(tx),
                    });
                    Pending::Wait(rx)
                }
            }
        };

        let req = match pending {
            Pending::Ready(req) => req,
            Pending::Wait(rx) => match wait_for(&rx, None) {
                Ok(req) => req,
                Err(e) => {
                    self.registry.lock().remove_slot(conn_handle);
                    return Err(e);
                }
            },
        };

        if let Err(e) = self.link.accept(req.conn, miu, rw) {
            error!("llcp: accept of {} failed: {}", req.conn, e);
            self.registry.lock().remove_slot(conn_handle);
            return Err(e);
        }
        debug!("llcp: server {} accepted {} as {}", server, req.conn, conn_handle);
        Ok(())
    }

    fn connection(&self, handle: Handle) -> Result<Arc<Connection>> {
        self.registry
            .lock()
            .connection(handle)
            .ok_or(Error::UnknownHandle(handle))
    }

    /// Send one message, waiting out congestion.
    pub fn send(&self, handle: Handle, data: &[u8]) -> Result<()> {
        let conn = self.connection(handle)?;
        loop {
            let (hw, epoch) = conn.send_ticket()?;
            match self.link.send(hw, data)? {
                SendStatus::Sent => return Ok(()),
                SendStatus::Congested => {
                    debug!("llcp: {} congested, waiting", handle);
                    if !conn.wait_uncongested(epoch) {
                        return Err(Error::LinkClosed);
                    }
                }
            }
        }
    }

    /// Block until data arrives, returning at most `max_len` bytes.
    pub fn receive(&self, handle: Handle, max_len: usize) -> Result<Vec<u8>> {
        let conn = self.connection(handle)?;
        loop {
            let (hw, epoch) = conn.read_ticket()?;
            let data = self.link.read(hw, max_len)?;
            if !data.is_empty() {
                return Ok(data);
            }
            if !conn.wait_readable(epoch) {
                return Err(Error::LinkClosed);
            }
        }
    }

    /// Tear down a connection. Disconnecting a client that is still
    /// connecting only aborts the connect, which then removes the client.
    pub fn disconnect_conn_oriented(&self, handle: Handle) -> Result<()> {
        let conn = {
            let mut reg = self.registry.lock();
            if let Some(client) = reg.clients.get_mut(&handle) {
                if client.connecting.take().is_some() {
                    debug!("llcp: aborting connect of {}", handle);
                    return Ok(());
                }
            }
            reg.connection(handle).ok_or(Error::UnknownHandle(handle))?
        };

        if let Some((hw, done)) = conn.begin_close() {
            match self.link.disconnect(hw) {
                Ok(()) => {
                    if let Err(e) = wait_for(&done, self.config.disconnect_timeout) {
                        warn!("llcp: no disconnect confirmation for {}: {}", handle, e);
                    }
                }
                Err(e) => error!("llcp: disconnect of {} failed: {}", handle, e),
            }
        }
        self.remove_connection(handle);
        Ok(())
    }

    fn remove_connection(&self, handle: Handle) {
        let client = {
            let mut reg = self.registry.lock();
            match reg.clients.remove(&handle) {
                Some(client) => Some(client),
                None => {
                    reg.remove_slot(handle);
                    None
                }
            }
        };
        if let Some(client) = client {
            client.conn.invalidate();
            if let Some(hw) = client.hw {
                if let Err(e) = self.link.deregister(hw) {
                    debug!("llcp: deregister of client {} failed: {}", handle, e);
                }
            }
        }
    }

    pub fn remote_max_info_unit(&self, handle: Handle) -> Result<u16> {
        Ok(self.connection(handle)?.remote_miu())
    }

    pub fn remote_recv_window(&self, handle: Handle) -> Result<u8> {
        Ok(self.connection(handle)?.remote_rw())
    }

    pub fn enable_p2p_listening(&self, enable: bool) -> Result<()> {
        let mask = if enable {
            self.listen_mask.load(Ordering::Relaxed)
        } else {
            0
        };
        self.link.set_listen_technology(mask)?;
        self.listening.store(enable, Ordering::Relaxed);
        Ok(())
    }

    /// Change the listen technologies, applied at once when listening.
    pub fn set_listen_tech_mask(&self, mask: u32) -> Result<()> {
        self.listen_mask.store(mask, Ordering::Relaxed);
        if self.listening.load(Ordering::Relaxed) {
            self.link.set_listen_technology(mask)?;
        }
        Ok(())
    }

    /// React to the NFC controller going up or down.
    ///
    /// Going down releases every blocked caller: pending registrations,
    /// connects and accepts fail and live connections lose their link.
    /// Servers stay known and register again on the next
    /// [`register_server`](Self::register_server) for their name.
    pub fn handle_nfc_on_off(&self, is_on: bool) {
        if is_on {
            info!("llcp: nfc on");
            return;
        }
        info!("llcp: nfc off, releasing all waiters");
        let mut reg = self.registry.lock();
        for client in reg.clients.values_mut() {
            client.registering = None;
            client.hw = None;
            if client.connecting.take().is_none() {
                client.conn.invalidate();
            }
        }
        for server in reg.servers.values_mut() {
            server.registering.clear();
            server.hw = None;
            server.backlog.clear();
            for slot in &mut server.slots {
                slot.waiter = None;
                slot.conn.invalidate();
            }
        }
        self.listening.store(false, Ordering::Relaxed);
    }

    /// Entry point for the link layer's asynchronous notifications.
    pub fn handle_event(&self, event: LinkEvent) {
        match event {
            LinkEvent::ServerRegistered {
                service_name,
                server,
            } => self.on_server_registered(&service_name, server),
            LinkEvent::ClientRegistered { token, client } => {
                let known = {
                    let mut reg = self.registry.lock();
                    match reg.clients.get_mut(&token) {
                        Some(c) => {
                            if let Some(tx) = c.registering.take() {
                                c.hw = client;
                                let _ = tx.send(client);
                            }
                            true
                        }
                        None => false,
                    }
                };
                if !known {
                    warn!("llcp: registration for unknown client {}", token);
                    self.release_registration(client);
                }
            }
            LinkEvent::ConnectRequest {
                server,
                conn,
                remote_miu,
                remote_rw,
            } => self.on_connect_request(
                server,
                PeerRequest {
                    conn,
                    remote_miu,
                    remote_rw,
                },
            ),
            LinkEvent::Connected {
                client,
                conn,
                remote_miu,
                remote_rw,
            } => {
                let waiter = {
                    let mut reg = self.registry.lock();
                    reg.client_by_hw_mut(client).and_then(|c| {
                        let conn = Arc::clone(&c.conn);
                        c.connecting.take().map(|tx| (tx, conn))
                    })
                };
                match waiter {
                    Some((tx, c)) => {
                        c.bind(conn, remote_miu, remote_rw);
                        let _ = tx.send(Some(PeerRequest {
                            conn,
                            remote_miu,
                            remote_rw,
                        }));
                    }
                    None => {
                        warn!("llcp: connected event for idle client {}", client);
                        if let Err(e) = self.link.disconnect(conn) {
                            debug!("llcp: dropping orphan {}: {}", conn, e);
                        }
                    }
                }
            }
            LinkEvent::Disconnected { handle } => self.on_disconnected(handle),
            LinkEvent::DataAvailable { conn } => {
                let found = self.registry.lock().connection_by_hw(conn);
                match found {
                    Some(c) => c.notify_data(),
                    None => debug!("llcp: data for unknown {}", conn),
                }
            }
            LinkEvent::Congestion { conn, congested } => {
                let found = self.registry.lock().connection_by_hw(conn);
                if let Some(c) = found {
                    c.notify_congestion(congested);
                }
            }
            LinkEvent::LinkActivated {
                remote_miu,
                remote_lto,
                is_initiator,
            } => {
                info!(
                    "llcp: link activated (miu {}, lto {}, initiator {})",
                    remote_miu, remote_lto, is_initiator
                );
                let listener = self.listener.read().clone();
                if let Some(l) = listener {
                    l.on_llcp_activated(LinkInfo {
                        remote_miu,
                        remote_lto,
                        is_initiator,
                    });
                }
            }
            LinkEvent::LinkDeactivated => {
                info!("llcp: link deactivated");
                let listener = self.listener.read().clone();
                if let Some(l) = listener {
                    l.on_llcp_deactivated();
                }
            }
        }
    }

    fn release_registration(&self, hw: Option<HwHandle>) {
        if let Some(hw) = hw {
            if let Err(e) = self.link.deregister(hw) {
                debug!("llcp: deregister of orphan {} failed: {}", hw, e);
            }
        }
    }

    fn on_server_registered(&self, service_name: &str, server: Option<HwHandle>) {
        let (waiters, current) = {
            let mut reg = self.registry.lock();
            match reg.server_by_name_mut(service_name) {
                Some(s) => {
                    let waiters = std::mem::take(&mut s.registering);
                    if !waiters.is_empty() {
                        s.hw = server;
                    }
                    (waiters, s.hw)
                }
                None => (Vec::new(), None),
            }
        };
        if !waiters.is_empty() {
            for tx in waiters {
                let _ = tx.send(server);
            }
            return;
        }
        if server.is_some() && server == current {
            debug!("llcp: repeated registration of {}", service_name);
            return;
        }
        warn!("llcp: unexpected registration of {}", service_name);
        self.release_registration(server);
    }

    fn on_connect_request(&self, server: HwHandle, req: PeerRequest) {
        let cap = self.config.max_connections_per_server;
        let accepted = 'route: {
            let mut reg = self.registry.lock();
            let Some(srv) = reg.server_by_hw_mut(server) else {
                break 'route false;
            };
            if let Some(slot) = srv.slots.iter_mut().find(|slot| slot.waiter.is_some()) {
                slot.conn.bind(req.conn, req.remote_miu, req.remote_rw);
                if let Some(tx) = slot.waiter.take() {
                    let _ = tx.send(req);
                }
                true
            } else if srv.load() < cap {
                debug!("llcp: queueing connect {} on {}", req.conn, server);
                srv.backlog.push_back(req);
                true
            } else {
                false
            }
        };
        if !accepted {
            warn!("llcp: rejecting connect {} on {}", req.conn, server);
            if let Err(e) = self.link.disconnect(req.conn) {
                debug!("llcp: reject of {} failed: {}", req.conn, e);
            }
        }
    }

    fn on_disconnected(&self, handle: HwHandle) {
        let mut reg = self.registry.lock();
        if let Some(client) = reg.client_by_hw_mut(handle) {
            if let Some(tx) = client.connecting.take() {
                let _ = tx.send(None);
                return;
            }
        }
        if let Some(conn) = reg.connection_by_hw(handle) {
            debug!("llcp: {} disconnected ({})", conn.handle(), handle);
            conn.invalidate();
            return;
        }
        for server in reg.servers.values_mut() {
            server.backlog.retain(|req| req.conn != handle);
        }
    }
}
