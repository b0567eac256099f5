//! The lobby coordinator: peer table, room directory, and one handler
//! per request opcode.
//!
//! A single execution context owns the `Lobby` and is the only thing
//! that touches peer/room/session state, so none of it needs locks.
//! Handlers run to completion, queueing any outbound traffic into the
//! caller's [`Outbox`].
//!
//! Error policy per the protocol's taxonomy: malformed bodies are
//! dropped with a warning; protocol-state violations (requests that make
//! no sense in the peer's current state) answer with a failure code
//! where one is defined and are silently ignored otherwise. Nothing a
//! peer sends is fatal to the server or to the connection.

use std::collections::HashMap;

use blockade_protocol::opcode::{validate_title_len, JoinResult, RESULT_OK};
use blockade_protocol::payload::{self, RoomSummary};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::directory::RoomDirectory;
use crate::outbox::Outbox;
use crate::peer::{Peer, PeerId};
use crate::room::{JoinRefusal, Room, HOST_SEAT};

#[derive(Debug, Default)]
pub struct Lobby {
    peers: HashMap<PeerId, Peer>,
    rooms: RoomDirectory,
}

impl Lobby {
    pub fn new() -> Self {
        Lobby::default()
    }

    /// Register a freshly accepted connection.
    pub fn connect(&mut self, peer: PeerId) {
        self.peers.insert(peer, Peer::new());
        debug!(peer = peer.0, "peer connected");
    }

    /// Tear down a closed connection: same cleanup path as an explicit
    /// leave, then drop the peer record.
    pub fn disconnect(&mut self, peer: PeerId, out: &mut Outbox) {
        self.leave_current_room(peer, out);
        if let Some(state) = self.peers.remove(&peer) {
            info!(peer = peer.0, nickname = %state.nickname, "peer disconnected");
        }
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    // -------------------------------------------------------------------------
    // Request handlers (one per opcode; uniform signature for the router)
    // -------------------------------------------------------------------------

    pub fn on_login(&mut self, peer: PeerId, body: &[u8], out: &mut Outbox) {
        let nickname = match payload::decode_login(body) {
            Ok(n) => n,
            Err(err) => {
                warn!(peer = peer.0, %err, "dropping malformed LOGIN");
                return;
            }
        };

        let Some(state) = self.peers.get_mut(&peer) else {
            return;
        };
        if state.authenticated {
            // Nickname is stable once authenticated.
            debug!(peer = peer.0, "ignoring repeat LOGIN");
            return;
        }

        state.nickname = nickname;
        state.authenticated = true;
        info!(peer = peer.0, nickname = %state.nickname, "logged in");

        out.push(peer, payload::login_result(RESULT_OK));
    }

    pub fn on_search_room(&mut self, peer: PeerId, _body: &[u8], out: &mut Outbox) {
        if self.authenticated(peer).is_none() {
            return;
        }

        // The count is one byte on the wire, so the listing stops at 255.
        let rooms: Vec<RoomSummary> = self
            .rooms
            .iter()
            .take(u8::MAX as usize)
            .map(|room| RoomSummary {
                id: room.id(),
                in_match: room.in_match(),
                title: room.title().to_string(),
            })
            .collect();

        out.push(peer, payload::room_list(&rooms));
    }

    pub fn on_create_room(&mut self, peer: PeerId, body: &[u8], out: &mut Outbox) {
        let Some(state) = self.authenticated(peer) else {
            return;
        };
        if state.room.is_some() {
            debug!(peer = peer.0, "CREATE_ROOM while already seated");
            return;
        }
        let nickname = state.nickname.clone();

        let title = match payload::decode_create_room(body) {
            Ok(t) => t,
            Err(err) => {
                warn!(peer = peer.0, %err, "dropping malformed CREATE_ROOM");
                return;
            }
        };
        if !validate_title_len(title.len()) {
            warn!(peer = peer.0, len = title.len(), "dropping oversized room title");
            return;
        }

        let room = self.rooms.create(&title);
        let room_id = room.id();

        // The creator is seated immediately; a fresh room can be neither
        // full nor in-match.
        let seat = room.enter(peer, nickname.clone());
        debug_assert_eq!(seat, Ok(HOST_SEAT));

        info!(peer = peer.0, nickname = %nickname, room = room_id, title = %title, "room created");

        out.push(peer, payload::create_room_result(RESULT_OK, room_id));
        if let Some(state) = self.peers.get_mut(&peer) {
            state.room = Some(room_id);
        }
    }

    pub fn on_join_room(&mut self, peer: PeerId, body: &[u8], out: &mut Outbox) {
        let Some(state) = self.authenticated(peer) else {
            return;
        };
        if state.room.is_some() {
            debug!(peer = peer.0, "JOIN_ROOM while already seated");
            return;
        }
        let nickname = state.nickname.clone();

        let room_id = match payload::decode_join_room(body) {
            Ok(id) => id,
            Err(err) => {
                warn!(peer = peer.0, %err, "dropping malformed JOIN_ROOM");
                return;
            }
        };

        let Some(room) = self.rooms.get_mut(room_id) else {
            out.push(peer, payload::join_room_result(JoinResult::NotFound, 0));
            return;
        };

        match room.enter(peer, nickname.clone()) {
            Ok(seat) => {
                info!(peer = peer.0, nickname = %nickname, room = room_id, seat, "joined room");

                out.push(peer, payload::join_room_result(JoinResult::Ok, seat as u8));
                room.broadcast_except(&payload::enter_notice(seat as u8, &nickname), peer, out);

                if let Some(state) = self.peers.get_mut(&peer) {
                    state.room = Some(room_id);
                }
            }
            Err(JoinRefusal::Full) => {
                out.push(peer, payload::join_room_result(JoinResult::Full, 0));
            }
            Err(JoinRefusal::InMatch) => {
                out.push(peer, payload::join_room_result(JoinResult::InMatch, 0));
            }
        }
    }

    pub fn on_leave_room(&mut self, peer: PeerId, _body: &[u8], out: &mut Outbox) {
        if self.authenticated(peer).is_none() {
            return;
        }
        self.leave_current_room(peer, out);
    }

    /// Replay the current seat snapshot to the requester as a sequence
    /// of ENTER_NOTICE (plus READY_NOTICE for ready seats).
    pub fn on_room_info(&mut self, peer: PeerId, _body: &[u8], out: &mut Outbox) {
        let Some(room) = self.current_room(peer) else {
            return;
        };

        for (seat, occupant) in room.occupants() {
            out.push(peer, payload::enter_notice(seat as u8, &occupant.nickname));
            if room.is_ready(seat) {
                out.push(peer, payload::ready_notice(seat as u8, true));
            }
        }
    }

    /// Host: start the match if every guest is ready. Guest: flip the
    /// ready flag and announce the new state.
    pub fn on_toggle_ready(&mut self, peer: PeerId, _body: &[u8], out: &mut Outbox) {
        let Some(room) = self.current_room_mut(peer) else {
            return;
        };
        if room.in_match() {
            debug!(room = room.id(), "TOGGLE_READY during a match");
            return;
        }
        let Some(seat) = room.seat_of(peer) else {
            return;
        };

        if seat == HOST_SEAT {
            if room.can_start() {
                let seed: u32 = rand::thread_rng().gen();
                room.start_session(seed, out);
            } else {
                debug!(room = room.id(), "host tried to start before guests were ready");
            }
        } else {
            let ready = room.toggle_ready(seat);
            room.broadcast(&payload::ready_notice(seat as u8, ready), out);
        }
    }

    /// Relay an input action to every other seat in the room.
    pub fn on_move(&mut self, peer: PeerId, body: &[u8], out: &mut Outbox) {
        let Ok(action) = payload::decode_move(body) else {
            return;
        };

        let Some(room) = self.current_room(peer) else {
            return;
        };
        if !room.in_match() {
            return;
        }
        let Some(seat) = room.seat_of(peer) else {
            return;
        };

        room.broadcast_except(&payload::move_notice(seat as u8, action), peer, out);
    }

    pub fn on_attack(&mut self, peer: PeerId, body: &[u8], out: &mut Outbox) {
        let Ok(lines) = payload::decode_attack(body) else {
            return;
        };

        let Some(room) = self.current_room_mut(peer) else {
            return;
        };
        let Some(seat) = room.seat_of(peer) else {
            return;
        };

        room.relay_attack(seat, lines, out);
    }

    pub fn on_game_over(&mut self, peer: PeerId, body: &[u8], out: &mut Outbox) {
        let score = match payload::decode_game_over(body) {
            Ok(s) => s,
            Err(err) => {
                warn!(peer = peer.0, %err, "dropping malformed GAMEOVER");
                return;
            }
        };

        let Some(room) = self.current_room_mut(peer) else {
            return;
        };
        let Some(seat) = room.seat_of(peer) else {
            return;
        };

        room.report_death(seat, score, out);
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn authenticated(&self, peer: PeerId) -> Option<&Peer> {
        match self.peers.get(&peer) {
            Some(state) if state.authenticated => Some(state),
            Some(_) => {
                debug!(peer = peer.0, "request before LOGIN ignored");
                None
            }
            None => None,
        }
    }

    fn current_room(&self, peer: PeerId) -> Option<&Room> {
        let room_id = self.authenticated(peer)?.room?;
        self.rooms.get(room_id)
    }

    fn current_room_mut(&mut self, peer: PeerId) -> Option<&mut Room> {
        let room_id = self.authenticated(peer)?.room?;
        self.rooms.get_mut(room_id)
    }

    /// Vacate the peer's seat (if any) and remove the room once empty.
    /// Shared by LEAVE_ROOM and the disconnect path.
    fn leave_current_room(&mut self, peer: PeerId, out: &mut Outbox) {
        let Some(state) = self.peers.get_mut(&peer) else {
            return;
        };
        let Some(room_id) = state.room.take() else {
            return;
        };
        let nickname = state.nickname.clone();

        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };
        if room.leave(peer, out).is_some() {
            info!(peer = peer.0, nickname = %nickname, room = room_id, "left room");
        }
        if room.is_empty() {
            self.rooms.remove(room_id);
            info!(room = room_id, "room deleted (empty)");
        }
    }
}
