//! Per-connection I/O.
//!
//! Each connection gets a reader loop (this task) plus a spawned writer
//! task. The reader feeds raw bytes into a `FrameAssembler` and forwards
//! every completed message to the lobby task, preserving arrival order.
//! The writer drains the peer's outbound channel and encodes frames onto
//! the socket.
//!
//! Transport failure in either direction is a disconnect, never an
//! error that propagates: the lobby is told exactly once and runs the
//! same cleanup as an explicit leave.

use blockade_core::PeerId;
use blockade_protocol::frame::FrameAssembler;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::types::{ClientRegistry, LobbyRequest, LobbyTx, OutboundRx};

/// Run the I/O loops for a single connection until the transport
/// closes or errors.
pub async fn run_client(
    peer: PeerId,
    stream: TcpStream,
    lobby_tx: LobbyTx,
    mut out_rx: OutboundRx,
    clients: ClientRegistry,
) {
    let (mut read_half, mut write_half) = stream.into_split();

    // Writer task: consume queued messages and write wire frames. Ends
    // when the registry entry (the last sender) is dropped.
    let _writer_handle = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            if let Err(err) = write_half.write_all(&msg.encode()).await {
                debug!(peer = peer.0, %err, "write failed");
                break;
            }
        }
    });

    // Reader loop: a single receive may complete zero, one, or many
    // frames; drain them all before waiting for more bytes.
    let mut assembler = FrameAssembler::new();
    let mut buf = BytesMut::with_capacity(4096);

    'reader: loop {
        match read_half.read_buf(&mut buf).await {
            Ok(0) => {
                debug!(peer = peer.0, "connection closed");
                break;
            }
            Ok(_) => {
                assembler.push(&buf);
                buf.clear();

                while let Some(msg) = assembler.next_message() {
                    if lobby_tx.send(LobbyRequest::Inbound { peer, msg }).is_err() {
                        warn!(peer = peer.0, "lobby task stopped");
                        break 'reader;
                    }
                }
            }
            Err(err) => {
                debug!(peer = peer.0, %err, "read failed");
                break;
            }
        }
    }

    // Deregister first (dropping the outbound sender stops the writer),
    // then hand state cleanup to the lobby task.
    {
        let mut guard = clients.write().await;
        guard.remove(&peer);
    }
    let _ = lobby_tx.send(LobbyRequest::Disconnected { peer });
}
