//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Accepts new TCP connections.
//! - Assigns each connection a `PeerId`.
//! - Spawns:
//!   - a per-connection task to handle I/O,
//!   - a single central lobby task that owns the `Lobby`.
//!
//! The actual per-connection logic and lobby loop live in `client`
//! and `lobby_task` modules respectively.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use blockade_core::PeerId;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::client;
use crate::config::Config;
use crate::lobby_task;
use crate::types::{ClientRegistry, LobbyRequest, LobbyRx, LobbyTx, OutboundRx, OutboundTx};

/// Global-ish counter for assigning unique `PeerId`s.
static NEXT_PEER_ID: AtomicU64 = AtomicU64::new(1);

fn next_peer_id() -> PeerId {
    let id = NEXT_PEER_ID.fetch_add(1, Ordering::Relaxed);
    PeerId(id)
}

/// Run the TCP server with the given configuration.
pub async fn run(config: Config) -> Result<()> {
    let addr = config.socket_addr_string();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, max_clients = config.max_clients, "listening");

    serve(listener, config.max_clients).await
}

/// Accept loop over an already-bound listener.
///
/// Split out from [`run`] so tests can bind an ephemeral port first.
pub async fn serve(listener: TcpListener, max_clients: usize) -> Result<()> {
    // Shared registry of peers → outbound channels.
    let clients: ClientRegistry = Arc::new(tokio::sync::RwLock::new(Default::default()));

    // Channel from connection tasks → lobby task.
    let (lobby_tx, lobby_rx): (LobbyTx, LobbyRx) = mpsc::unbounded_channel();

    // Spawn the central lobby task.
    {
        let clients_clone = clients.clone();
        tokio::spawn(async move {
            lobby_task::run(lobby_rx, clients_clone).await;
        });
    }

    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let current_clients = {
            let guard = clients.read().await;
            guard.len()
        };

        if current_clients >= max_clients {
            warn!(%peer_addr, max_clients, "rejecting connection: at capacity");
            // Just drop the stream; the client sees the connection close.
            continue;
        }

        let peer = next_peer_id();
        info!(peer = peer.0, %peer_addr, "accepted connection");

        // Create the outbound channel for this peer and register it.
        let (out_tx, out_rx): (OutboundTx, OutboundRx) = mpsc::unbounded_channel();
        {
            let mut guard = clients.write().await;
            guard.insert(peer, out_tx);
        }

        if lobby_tx.send(LobbyRequest::Connected { peer }).is_err() {
            anyhow::bail!("lobby task stopped");
        }

        // Clone handles to move into the connection task.
        let clients_clone = clients.clone();
        let lobby_tx_clone = lobby_tx.clone();

        tokio::spawn(async move {
            client::run_client(peer, stream, lobby_tx_clone, out_rx, clients_clone).await;
        });
    }
}
