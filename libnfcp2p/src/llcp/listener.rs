// libnfcp2p/src/llcp/listener.rs

/// Parameters of a freshly activated LLCP link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkInfo {
    pub remote_miu: u16,
    /// Peer link timeout in milliseconds
    pub remote_lto: u16,
    /// True when the local side initiated the link
    pub is_initiator: bool,
}

/// Observer for link activation, typically the layer that starts SNEP
/// clients when a peer comes into range.
pub trait LinkListener: Send + Sync {
    fn on_llcp_activated(&self, info: LinkInfo);

    fn on_llcp_deactivated(&self);
}
