// libnfcp2p/src/llcp/registry.rs

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crossbeam_channel::Sender;

use super::connection::Connection;
use crate::types::{Handle, HwHandle};

/// An inbound connect announced by the link layer, not yet accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PeerRequest {
    pub conn: HwHandle,
    pub remote_miu: u16,
    pub remote_rw: u8,
}

/// A server connection slot. `waiter` is set while an accept call is
/// parked on it.
pub(crate) struct ServerSlot {
    pub conn: Arc<Connection>,
    pub waiter: Option<Sender<PeerRequest>>,
}

pub(crate) struct P2pServer {
    pub handle: Handle,
    pub service_name: String,
    pub hw: Option<HwHandle>,
    /// Every caller waiting on the registration in flight
    pub registering: Vec<Sender<Option<HwHandle>>>,
    pub slots: Vec<ServerSlot>,
    /// Connect requests that arrived with no accept waiting
    pub backlog: VecDeque<PeerRequest>,
}

impl P2pServer {
    pub fn new(handle: Handle, service_name: &str) -> Self {
        Self {
            handle,
            service_name: service_name.to_string(),
            hw: None,
            registering: Vec::new(),
            slots: Vec::new(),
            backlog: VecDeque::new(),
        }
    }

    /// Slots plus queued requests, the figure bounded by the per-server cap.
    pub fn load(&self) -> usize {
        self.slots.len() + self.backlog.len()
    }
}

pub(crate) struct P2pClient {
    pub hw: Option<HwHandle>,
    pub registering: Option<Sender<Option<HwHandle>>>,
    pub connecting: Option<Sender<Option<PeerRequest>>>,
    /// Shares the client's handle
    pub conn: Arc<Connection>,
}

#[derive(Default)]
pub(crate) struct Registry {
    pub servers: HashMap<Handle, P2pServer>,
    pub clients: HashMap<Handle, P2pClient>,
}

impl Registry {
    pub fn server_key_by_name(&self, service_name: &str) -> Option<Handle> {
        self.servers
            .values()
            .find(|s| s.service_name == service_name)
            .map(|s| s.handle)
    }

    pub fn server_by_name_mut(&mut self, service_name: &str) -> Option<&mut P2pServer> {
        self.servers
            .values_mut()
            .find(|s| s.service_name == service_name)
    }

    pub fn server_by_hw_mut(&mut self, hw: HwHandle) -> Option<&mut P2pServer> {
        self.servers.values_mut().find(|s| s.hw == Some(hw))
    }

    pub fn client_by_hw_mut(&mut self, hw: HwHandle) -> Option<&mut P2pClient> {
        self.clients.values_mut().find(|c| c.hw == Some(hw))
    }

    pub fn connections(&self) -> impl Iterator<Item = &Arc<Connection>> {
        self.clients.values().map(|c| &c.conn).chain(
            self.servers
                .values()
                .flat_map(|s| s.slots.iter().map(|slot| &slot.conn)),
        )
    }

    pub fn connection(&self, handle: Handle) -> Option<Arc<Connection>> {
        self.connections()
            .find(|c| c.handle() == handle)
            .map(Arc::clone)
    }

    pub fn connection_by_hw(&self, hw: HwHandle) -> Option<Arc<Connection>> {
        self.connections()
            .find(|c| c.hw() == Some(hw))
            .map(Arc::clone)
    }

    /// Remove a server slot by connection handle. True when one was found.
    pub fn remove_slot(&mut self, handle: Handle) -> bool {
        for server in self.servers.values_mut() {
            let before = server.slots.len();
            server.slots.retain(|slot| slot.conn.handle() != handle);
            if server.slots.len() != before {
                return true;
            }
        }
        false
    }

    /// Every handle in use by a server, client or connection.
    pub fn contains(&self, handle: Handle) -> bool {
        self.servers.contains_key(&handle)
            || self.clients.contains_key(&handle)
            || self.connection(handle).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_by_name_and_hw() {
        let mut reg = Registry::default();
        let mut server = P2pServer::new(Handle::new(1), "urn:nfc:sn:snep");
        server.hw = Some(HwHandle::new(0x20));
        reg.servers.insert(Handle::new(1), server);

        assert_eq!(
            reg.server_key_by_name("urn:nfc:sn:snep"),
            Some(Handle::new(1))
        );
        assert!(reg.server_by_name_mut("urn:nfc:sn:other").is_none());
        assert!(reg.server_by_hw_mut(HwHandle::new(0x20)).is_some());
        assert!(reg.contains(Handle::new(1)));
    }

    #[test]
    fn slot_and_client_connections_are_found() {
        let mut reg = Registry::default();
        let conn = Connection::new(Handle::new(7), 128, 1);
        conn.bind(HwHandle::new(0x31), 128, 1);
        let mut server = P2pServer::new(Handle::new(1), "svc");
        server.slots.push(ServerSlot {
            conn,
            waiter: None,
        });
        reg.servers.insert(Handle::new(1), server);
        reg.clients.insert(
            Handle::new(9),
            P2pClient {
                hw: Some(HwHandle::new(0x40)),
                registering: None,
                connecting: None,
                conn: Connection::new(Handle::new(9), 128, 1),
            },
        );

        assert!(reg.connection(Handle::new(7)).is_some());
        assert!(reg.connection(Handle::new(9)).is_some());
        assert!(reg.connection_by_hw(HwHandle::new(0x31)).is_some());
        // a client registration handle is not a connection handle
        assert!(reg.connection_by_hw(HwHandle::new(0x40)).is_none());
        assert!(reg.client_by_hw_mut(HwHandle::new(0x40)).is_some());

        assert!(reg.remove_slot(Handle::new(7)));
        assert!(!reg.remove_slot(Handle::new(7)));
    }
}
