//! Test support helpers intended for use by unit and integration tests.
//!
//! [`loopback_pair`] wires two connection managers to each other through
//! an in-memory link layer that behaves like a pair of activated NFC
//! controllers: registrations, connects and data are routed to the other
//! side and completions arrive as events on a per-side pump thread.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Weak};
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::trace;
use parking_lot::Mutex;

use crate::config::P2pConfig;
use crate::constants::{SNEP_DEFAULT_SAP, SNEP_SERVICE_NAME};
use crate::llcp::ConnectionManager;
use crate::transport::link::{LinkEvent, LinkLayer, SendStatus};
use crate::types::{Handle, HwHandle};
use crate::utils::bytes_to_hex_spaced;
use crate::{Error, Result};

/// First SAP handed to services other than SNEP
const FIRST_DYNAMIC_SAP: u8 = 0x10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Side {
    Initiator,
    Target,
}

impl Side {
    fn other(self) -> Self {
        match self {
            Side::Initiator => Side::Target,
            Side::Target => Side::Initiator,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::Initiator => 0,
            Side::Target => 1,
        }
    }
}

struct PendingConnect {
    client_side: Side,
    client: HwHandle,
}

struct Endpoint {
    side: Side,
    peer: Option<HwHandle>,
    inbox: VecDeque<Vec<u8>>,
}

struct Fabric {
    next_hw: u16,
    next_sap: u8,
    servers: HashMap<(Side, String), HwHandle>,
    saps: HashMap<(Side, u8), String>,
    clients: HashMap<HwHandle, Side>,
    pending: HashMap<HwHandle, PendingConnect>,
    endpoints: HashMap<HwHandle, Endpoint>,
    listen_mask: [u32; 2],
}

impl Default for Fabric {
    fn default() -> Self {
        Self {
            next_hw: 1,
            next_sap: FIRST_DYNAMIC_SAP,
            servers: HashMap::new(),
            saps: HashMap::new(),
            clients: HashMap::new(),
            pending: HashMap::new(),
            endpoints: HashMap::new(),
            listen_mask: [0; 2],
        }
    }
}

impl Fabric {
    fn alloc(&mut self) -> HwHandle {
        let hw = HwHandle::new(self.next_hw);
        self.next_hw = self.next_hw.wrapping_add(1).max(1);
        hw
    }
}

struct Shared {
    fabric: Mutex<Fabric>,
    events: [Sender<LinkEvent>; 2],
}

impl Shared {
    fn emit(&self, side: Side, event: LinkEvent) {
        trace!("loopback: {:?} <- {:?}", side, event);
        let _ = self.events[side.index()].send(event);
    }
}

/// One side of an in-memory link.
pub struct LoopbackLink {
    side: Side,
    shared: Arc<Shared>,
}

impl LoopbackLink {
    fn connect(&self, client: HwHandle, service: Option<String>, miu: u16, rw: u8) -> Result<()> {
        let peer = self.side.other();
        let mut fabric = self.shared.fabric.lock();
        if !fabric.clients.contains_key(&client) {
            return Err(Error::LinkFailure(format!("unknown client {}", client)));
        }
        let server = service
            .as_ref()
            .and_then(|name| fabric.servers.get(&(peer, name.clone())).copied());
        match server {
            Some(server) => {
                let conn = fabric.alloc();
                fabric.pending.insert(
                    conn,
                    PendingConnect {
                        client_side: self.side,
                        client,
                    },
                );
                fabric.endpoints.insert(
                    conn,
                    Endpoint {
                        side: peer,
                        peer: None,
                        inbox: VecDeque::new(),
                    },
                );
                self.shared.emit(
                    peer,
                    LinkEvent::ConnectRequest {
                        server,
                        conn,
                        remote_miu: miu,
                        remote_rw: rw,
                    },
                );
            }
            None => self
                .shared
                .emit(self.side, LinkEvent::Disconnected { handle: client }),
        }
        Ok(())
    }
}

impl LinkLayer for LoopbackLink {
    fn register_server(&self, service_name: &str) -> Result<()> {
        let mut fabric = self.shared.fabric.lock();
        let key = (self.side, service_name.to_string());
        if fabric.servers.contains_key(&key) {
            self.shared.emit(
                self.side,
                LinkEvent::ServerRegistered {
                    service_name: service_name.to_string(),
                    server: None,
                },
            );
            return Ok(());
        }
        let hw = fabric.alloc();
        let sap = if service_name == SNEP_SERVICE_NAME {
            SNEP_DEFAULT_SAP
        } else {
            let sap = fabric.next_sap;
            fabric.next_sap = fabric.next_sap.wrapping_add(1);
            sap
        };
        fabric.servers.insert(key, hw);
        fabric.saps.insert((self.side, sap), service_name.to_string());
        self.shared.emit(
            self.side,
            LinkEvent::ServerRegistered {
                service_name: service_name.to_string(),
                server: Some(hw),
            },
        );
        Ok(())
    }

    fn register_client(&self, token: Handle) -> Result<()> {
        let mut fabric = self.shared.fabric.lock();
        let hw = fabric.alloc();
        fabric.clients.insert(hw, self.side);
        self.shared.emit(
            self.side,
            LinkEvent::ClientRegistered {
                token,
                client: Some(hw),
            },
        );
        Ok(())
    }

    fn deregister(&self, registration: HwHandle) -> Result<()> {
        let mut fabric = self.shared.fabric.lock();
        if fabric.clients.remove(&registration).is_some() {
            return Ok(());
        }
        let side = self.side;
        let name = fabric
            .servers
            .iter()
            .find(|((s, _), hw)| *s == side && **hw == registration)
            .map(|((_, name), _)| name.clone());
        match name {
            Some(name) => {
                fabric.servers.remove(&(side, name.clone()));
                fabric.saps.retain(|(s, _), n| !(*s == side && *n == name));
                Ok(())
            }
            None => Err(Error::LinkFailure(format!(
                "unknown registration {}",
                registration
            ))),
        }
    }

    fn connect_by_name(
        &self,
        client: HwHandle,
        service_name: &str,
        miu: u16,
        rw: u8,
    ) -> Result<()> {
        self.connect(client, Some(service_name.to_string()), miu, rw)
    }

    fn connect_by_sap(&self, client: HwHandle, sap: u8, miu: u16, rw: u8) -> Result<()> {
        let name = self
            .shared
            .fabric
            .lock()
            .saps
            .get(&(self.side.other(), sap))
            .cloned();
        self.connect(client, name, miu, rw)
    }

    fn accept(&self, conn: HwHandle, miu: u16, rw: u8) -> Result<()> {
        let mut fabric = self.shared.fabric.lock();
        let pending = fabric
            .pending
            .remove(&conn)
            .ok_or_else(|| Error::LinkFailure(format!("no pending connect {}", conn)))?;
        let client_conn = fabric.alloc();
        fabric.endpoints.insert(
            client_conn,
            Endpoint {
                side: pending.client_side,
                peer: Some(conn),
                inbox: VecDeque::new(),
            },
        );
        if let Some(ep) = fabric.endpoints.get_mut(&conn) {
            ep.peer = Some(client_conn);
        }
        self.shared.emit(
            pending.client_side,
            LinkEvent::Connected {
                client: pending.client,
                conn: client_conn,
                remote_miu: miu,
                remote_rw: rw,
            },
        );
        Ok(())
    }

    fn send(&self, conn: HwHandle, data: &[u8]) -> Result<SendStatus> {
        let mut fabric = self.shared.fabric.lock();
        let peer = fabric
            .endpoints
            .get(&conn)
            .ok_or(Error::LinkClosed)?
            .peer
            .ok_or_else(|| Error::LinkFailure(format!("{} not connected", conn)))?;
        let ep = fabric.endpoints.get_mut(&peer).ok_or(Error::LinkClosed)?;
        trace!("loopback: {} -> {}: {}", conn, peer, bytes_to_hex_spaced(data));
        ep.inbox.push_back(data.to_vec());
        let side = ep.side;
        self.shared
            .emit(side, LinkEvent::DataAvailable { conn: peer });
        Ok(SendStatus::Sent)
    }

    fn read(&self, conn: HwHandle, max_len: usize) -> Result<Vec<u8>> {
        let mut fabric = self.shared.fabric.lock();
        let ep = fabric.endpoints.get_mut(&conn).ok_or(Error::LinkClosed)?;
        let Some(mut data) = ep.inbox.pop_front() else {
            return Ok(Vec::new());
        };
        if data.len() > max_len {
            let rest = data.split_off(max_len);
            ep.inbox.push_front(rest);
        }
        Ok(data)
    }

    fn disconnect(&self, conn: HwHandle) -> Result<()> {
        let mut fabric = self.shared.fabric.lock();
        let ep = fabric
            .endpoints
            .remove(&conn)
            .ok_or_else(|| Error::LinkFailure(format!("unknown connection {}", conn)))?;
        self.shared
            .emit(ep.side, LinkEvent::Disconnected { handle: conn });
        if let Some(pending) = fabric.pending.remove(&conn) {
            self.shared.emit(
                pending.client_side,
                LinkEvent::Disconnected {
                    handle: pending.client,
                },
            );
        }
        if let Some(peer) = ep.peer {
            if let Some(peer_ep) = fabric.endpoints.remove(&peer) {
                self.shared
                    .emit(peer_ep.side, LinkEvent::Disconnected { handle: peer });
            }
        }
        Ok(())
    }

    fn set_listen_technology(&self, tech_mask: u32) -> Result<()> {
        self.shared.fabric.lock().listen_mask[self.side.index()] = tech_mask;
        Ok(())
    }
}

/// Two managers joined by a [`LoopbackLink`].
pub struct LoopbackPair {
    pub initiator: Arc<ConnectionManager>,
    pub target: Arc<ConnectionManager>,
    shared: Arc<Shared>,
}

impl LoopbackPair {
    /// Power both controllers down: every registration and connection is
    /// forgotten and both managers are told NFC went off.
    pub fn nfc_off(&self) {
        *self.shared.fabric.lock() = Fabric::default();
        self.initiator.handle_nfc_on_off(false);
        self.target.handle_nfc_on_off(false);
    }

    pub fn nfc_on(&self) {
        self.initiator.handle_nfc_on_off(true);
        self.target.handle_nfc_on_off(true);
    }

    /// Deliver a link activation to both sides.
    pub fn activate(&self, miu: u16) {
        for (mgr, is_initiator) in [(&self.initiator, true), (&self.target, false)] {
            mgr.handle_event(LinkEvent::LinkActivated {
                remote_miu: miu,
                remote_lto: 150,
                is_initiator,
            });
        }
    }
}

fn pump(events: Receiver<LinkEvent>, manager: Weak<ConnectionManager>) {
    for event in events.iter() {
        match manager.upgrade() {
            Some(m) => m.handle_event(event),
            None => break,
        }
    }
}

fn spawn_side(
    side: Side,
    shared: &Arc<Shared>,
    events: Receiver<LinkEvent>,
    config: P2pConfig,
) -> Arc<ConnectionManager> {
    let link = Arc::new(LoopbackLink {
        side,
        shared: Arc::clone(shared),
    });
    let manager = ConnectionManager::new(link, config);
    let weak = Arc::downgrade(&manager);
    thread::spawn(move || pump(events, weak));
    manager
}

/// Build two managers talking to each other in memory.
#[doc(hidden)]
pub fn loopback_pair(config: P2pConfig) -> LoopbackPair {
    let (initiator_tx, initiator_rx) = unbounded();
    let (target_tx, target_rx) = unbounded();
    let shared = Arc::new(Shared {
        fabric: Mutex::new(Fabric::default()),
        events: [initiator_tx, target_tx],
    });
    LoopbackPair {
        initiator: spawn_side(Side::Initiator, &shared, initiator_rx, config.clone()),
        target: spawn_side(Side::Target, &shared, target_rx, config),
        shared,
    }
}

