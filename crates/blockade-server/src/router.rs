//! Opcode → handler dispatch.
//!
//! The table is an explicit immutable mapping built once at startup,
//! with no registration side effects. Unknown opcodes are logged and
//! ignored: protocol evolution requires forward tolerance, so a message
//! this build does not understand must never drop the connection.

use std::collections::HashMap;

use blockade_core::{Lobby, Outbox, PeerId};
use blockade_protocol::frame::Message;
use blockade_protocol::opcode::OpCode;
use tracing::warn;

/// Shape shared by every request handler on the lobby.
type Handler = fn(&mut Lobby, PeerId, &[u8], &mut Outbox);

pub struct Router {
    routes: HashMap<u8, Handler>,
}

impl Router {
    /// Build the dispatch table: every request opcode, one handler.
    pub fn new() -> Self {
        let mut routes: HashMap<u8, Handler> = HashMap::new();
        routes.insert(OpCode::Login as u8, Lobby::on_login);
        routes.insert(OpCode::SearchRoom as u8, Lobby::on_search_room);
        routes.insert(OpCode::CreateRoom as u8, Lobby::on_create_room);
        routes.insert(OpCode::JoinRoom as u8, Lobby::on_join_room);
        routes.insert(OpCode::LeaveRoom as u8, Lobby::on_leave_room);
        routes.insert(OpCode::RoomInfo as u8, Lobby::on_room_info);
        routes.insert(OpCode::ToggleReady as u8, Lobby::on_toggle_ready);
        routes.insert(OpCode::Move as u8, Lobby::on_move);
        routes.insert(OpCode::Attack as u8, Lobby::on_attack);
        routes.insert(OpCode::GameOver as u8, Lobby::on_game_over);
        Router { routes }
    }

    /// Look up and invoke the handler for one inbound message.
    pub fn dispatch(&self, lobby: &mut Lobby, peer: PeerId, msg: &Message, out: &mut Outbox) {
        match self.routes.get(&msg.opcode) {
            Some(handler) => handler(lobby, peer, &msg.body, out),
            None => warn!(peer = peer.0, opcode = msg.opcode, "no handler for opcode"),
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Router::new()
    }
}
