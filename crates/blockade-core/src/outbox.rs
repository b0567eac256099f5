//! Ordered queue of outbound messages.
//!
//! Handlers and room/session logic decide who receives what in which
//! order; the transport layer drains the queue and performs the actual
//! sends. Keeping delivery out of the core makes every state transition
//! testable without sockets, and preserves broadcast ordering: messages
//! queued for the same room come out exactly as they went in.

use blockade_protocol::frame::Message;

use crate::peer::PeerId;

#[derive(Debug, Default)]
pub struct Outbox {
    queued: Vec<(PeerId, Message)>,
}

impl Outbox {
    pub fn new() -> Self {
        Outbox::default()
    }

    /// Queue one message for one peer.
    pub fn push(&mut self, to: PeerId, msg: Message) {
        self.queued.push((to, msg));
    }

    /// Drain everything queued so far, in queue order.
    pub fn drain(&mut self) -> std::vec::Drain<'_, (PeerId, Message)> {
        self.queued.drain(..)
    }

    /// Peek at the queued traffic without consuming it.
    pub fn as_slice(&self) -> &[(PeerId, Message)] {
        &self.queued
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }
}
