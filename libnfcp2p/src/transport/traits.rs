// libnfcp2p/src/transport/traits.rs

use crate::Result;

/// A connected, message-oriented byte channel to a peer.
///
/// Implemented by connected LLCP sockets; SNEP runs on top of it.
pub trait Transport {
    /// Send one link-layer message to the peer.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Block until at least one message from the peer is available.
    fn receive(&mut self) -> Result<Vec<u8>>;

    /// Largest message the peer accepts in a single send
    fn remote_miu(&self) -> u16;

    /// Peer receive window
    fn remote_rw(&self) -> u8 {
        1
    }

    /// Release the channel. Default is a no-op for transports without
    /// link state.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        (**self).send(data)
    }

    fn receive(&mut self) -> Result<Vec<u8>> {
        (**self).receive()
    }

    fn remote_miu(&self) -> u16 {
        (**self).remote_miu()
    }

    fn remote_rw(&self) -> u8 {
        (**self).remote_rw()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
