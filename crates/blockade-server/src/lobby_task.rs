//! Central lobby loop.
//!
//! This task owns the `Lobby` instance and processes every
//! `LobbyRequest` coming from connection tasks. It is the only
//! execution context that touches peer/room/session state, so that
//! state needs no locks; each request is handled to completion before
//! the next one is received.
//!
//! Outbound traffic queued by the handlers is flushed here through the
//! client registry, in queue order, which preserves the relative order
//! of a room broadcast for every recipient.

use blockade_core::{Lobby, Outbox};
use tracing::debug;

use crate::router::Router;
use crate::types::{ClientRegistry, LobbyRequest, LobbyRx};

/// Run the central lobby processing loop.
///
/// - `lobby_rx`: receives requests from all connection tasks.
/// - `clients`: registry of connected peers and their outbound channels.
pub async fn run(mut lobby_rx: LobbyRx, clients: ClientRegistry) {
    let router = Router::new();
    let mut lobby = Lobby::new();
    let mut out = Outbox::new();

    while let Some(req) = lobby_rx.recv().await {
        match req {
            LobbyRequest::Connected { peer } => lobby.connect(peer),
            LobbyRequest::Inbound { peer, msg } => {
                router.dispatch(&mut lobby, peer, &msg, &mut out);
            }
            LobbyRequest::Disconnected { peer } => lobby.disconnect(peer, &mut out),
        }

        if out.is_empty() {
            continue;
        }

        // Snapshot of current clients to minimize lock hold time.
        let current_clients = {
            let guard = clients.read().await;
            guard.clone()
        };

        for (peer, msg) in out.drain() {
            if let Some(tx) = current_clients.get(&peer) {
                // A failed send means the connection is already gone;
                // its Disconnected cleanup is queued behind us.
                let _ = tx.send(msg);
            }
        }
    }

    debug!("lobby loop shutting down (lobby_rx closed)");
}
