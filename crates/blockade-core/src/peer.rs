//! Per-connection identity.

/// Identifier for a connected peer.
///
/// This is intentionally opaque; we just guarantee uniqueness over the
/// lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(pub u64);

/// Identity for one live connection.
///
/// The nickname is mutable until the peer authenticates, then stable for
/// the connection's life. The room field is present from construction
/// with `None` meaning "not seated"; it is never attached later.
#[derive(Debug, Default)]
pub struct Peer {
    pub nickname: String,
    pub authenticated: bool,
    pub room: Option<u16>,
}

impl Peer {
    pub fn new() -> Self {
        Peer::default()
    }
}
