//! Shared types for the blockade TCP server.
//!
//! This module defines:
//! - channel aliases between connection tasks and the lobby task
//! - `ClientRegistry`: connected peers and their outbound channels
//! - `LobbyRequest`: everything flowing into the central lobby task

use std::collections::HashMap;
use std::sync::Arc;

use blockade_core::PeerId;
use blockade_protocol::frame::Message;
use tokio::sync::mpsc;
use tokio::sync::RwLock;

/// Outbound messages from the lobby to a given peer. The connection's
/// writer task encodes them into wire frames.
pub type OutboundTx = mpsc::UnboundedSender<Message>;
pub type OutboundRx = mpsc::UnboundedReceiver<Message>;

/// Registry of connected peers and their outbound channels.
///
/// - Key: `PeerId`
/// - Value: `OutboundTx` to send `Message`s to that peer.
pub type ClientRegistry = Arc<RwLock<HashMap<PeerId, OutboundTx>>>;

/// Message flowing from a connection task into the central lobby task.
///
/// Connection lifecycle travels on the same queue as inbound traffic so
/// the lobby observes everything for one peer in order: a disconnect
/// is never processed ahead of messages that arrived before it.
#[derive(Debug)]
pub enum LobbyRequest {
    /// A connection was accepted and registered.
    Connected { peer: PeerId },

    /// One complete framed message arrived from the peer.
    Inbound { peer: PeerId, msg: Message },

    /// The transport reported closure or error.
    Disconnected { peer: PeerId },
}

/// Channel from connection tasks → lobby task.
pub type LobbyTx = mpsc::UnboundedSender<LobbyRequest>;
pub type LobbyRx = mpsc::UnboundedReceiver<LobbyRequest>;
