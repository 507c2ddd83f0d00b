// libnfcp2p/src/protocol/snep/server.rs

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use super::message::{SnepMessage, field_name};
use super::messenger::SnepMessenger;
use crate::config::SnepConfig;
use crate::constants::*;
use crate::llcp::{ConnectionManager, LlcpServiceSocket};
use crate::protocol::ndef::NdefMessage;
use crate::transport::Transport;
use crate::{Error, Result};

/// Application callbacks for incoming SNEP requests.
pub trait SnepHandler: Send + Sync {
    fn on_put(&self, msg: NdefMessage) -> SnepMessage;

    /// Only consulted when the server was configured to allow GET.
    fn on_get(&self, _acceptable_length: u32, _msg: NdefMessage) -> SnepMessage {
        SnepMessage::response(SNEP_RESPONSE_NOT_IMPLEMENTED)
    }
}

/// Read one request and answer it. `Ok(false)` means the session should
/// end.
pub fn handle_request<T: Transport>(
    messenger: &mut SnepMessenger<T>,
    handler: &dyn SnepHandler,
    allow_get: bool,
) -> Result<bool> {
    let request = match messenger.get_message() {
        Ok(request) => request,
        Err(Error::Rejected(e)) => {
            // the messenger already answered with REJECT
            warn!("snep server: refused request: {}", e);
            return Ok(false);
        }
        Err(Error::Format(e)) => {
            warn!("snep server: malformed request: {}", e);
            messenger.send_message(&SnepMessage::response(SNEP_RESPONSE_BAD_REQUEST))?;
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    let response = if request.major_version() != SNEP_VERSION_MAJOR {
        SnepMessage::response(SNEP_RESPONSE_UNSUPPORTED_VERSION)
    } else {
        match request.field() {
            SNEP_REQUEST_GET if !allow_get => SnepMessage::response(SNEP_RESPONSE_NOT_IMPLEMENTED),
            SNEP_REQUEST_GET => {
                let acceptable = request.acceptable_length().unwrap_or(0);
                match request.into_ndef() {
                    Some(ndef) => handler.on_get(acceptable, ndef),
                    None => SnepMessage::response(SNEP_RESPONSE_BAD_REQUEST),
                }
            }
            SNEP_REQUEST_PUT => match request.into_ndef() {
                Some(ndef) => handler.on_put(ndef),
                None => SnepMessage::response(SNEP_RESPONSE_BAD_REQUEST),
            },
            other => {
                debug!("snep server: unexpected {}", field_name(other));
                SnepMessage::response(SNEP_RESPONSE_BAD_REQUEST)
            }
        }
    };
    messenger.send_message(&response)?;
    Ok(true)
}

/// Serve requests on one connection until the peer goes away.
pub fn serve_connection<T: Transport>(
    mut messenger: SnepMessenger<T>,
    handler: &dyn SnepHandler,
    allow_get: bool,
) {
    loop {
        match handle_request(&mut messenger, handler, allow_get) {
            Ok(true) => continue,
            Ok(false) => break,
            Err(e) => {
                debug!("snep server: session ended: {}", e);
                break;
            }
        }
    }
    if let Err(e) = messenger.close() {
        debug!("snep server: close failed: {}", e);
    }
}

/// SNEP server: a registered service with an accept loop handing each
/// peer to its own worker thread.
pub struct SnepServer {
    service: Arc<LlcpServiceSocket>,
    acceptor: Option<JoinHandle<()>>,
}

impl SnepServer {
    pub fn start(
        manager: &Arc<ConnectionManager>,
        config: SnepConfig,
        handler: Arc<dyn SnepHandler>,
    ) -> Result<Self> {
        let service = Arc::new(LlcpServiceSocket::create(
            manager,
            &config.service_name,
            config.miu,
            config.rw,
        )?);
        info!("snep server: listening on {}", config.service_name);

        let acceptor = {
            let service = Arc::clone(&service);
            thread::Builder::new()
                .name("snep-accept".into())
                .spawn(move || accept_loop(&service, &config, handler))
                .map_err(|_| Error::ResourceExhausted("snep accept thread"))?
        };
        Ok(Self {
            service,
            acceptor: Some(acceptor),
        })
    }

    pub fn service_name(&self) -> &str {
        self.service.service_name()
    }

    /// Deregister the service and wait for the accept loop to exit.
    /// Sessions still in progress are disconnected along with the service.
    pub fn stop(&mut self) -> Result<()> {
        let closed = self.service.close();
        if let Some(acceptor) = self.acceptor.take() {
            if acceptor.join().is_err() {
                warn!("snep server: accept thread panicked");
            }
        }
        closed
    }
}

impl Drop for SnepServer {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            debug!("snep server: stop on drop: {}", e);
        }
    }
}

fn accept_loop(service: &LlcpServiceSocket, config: &SnepConfig, handler: Arc<dyn SnepHandler>) {
    loop {
        let socket = match service.accept() {
            Ok(socket) => socket,
            Err(Error::ResourceExhausted(what)) => {
                debug!("snep server: {} full, backing off", what);
                thread::sleep(Duration::from_millis(50));
                continue;
            }
            Err(e) => {
                debug!("snep server: accept loop ended: {}", e);
                return;
            }
        };
        let remote_miu = match socket.remote_max_info_unit() {
            Ok(miu) => miu,
            Err(e) => {
                debug!("snep server: peer gone before first request: {}", e);
                continue;
            }
        };
        let messenger = SnepMessenger::new(false, socket, config.fragment_length_for(remote_miu));
        let handler = Arc::clone(&handler);
        let allow_get = config.allow_get;
        let spawned = thread::Builder::new()
            .name("snep-session".into())
            .spawn(move || serve_connection(messenger, handler.as_ref(), allow_get));
        if let Err(e) = spawned {
            warn!("snep server: could not start session: {}", e);
        }
    }
}
