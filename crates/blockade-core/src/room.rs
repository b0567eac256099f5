//! A fixed-capacity seating arrangement with ready tracking, broadcast,
//! and host-migration rules.
//!
//! Seat 0, when occupied, is the host; its ready flag is ignored. A room
//! with an active match accepts no new entrants. Rooms never outlive
//! their last occupant; the directory removes a room as soon as a leave
//! empties it.

use blockade_protocol::frame::Message;
use blockade_protocol::payload;
use tracing::{debug, info};

use crate::outbox::Outbox;
use crate::peer::PeerId;
use crate::session::{GameSession, MatchOutcome};

/// Seats per room.
pub const MAX_SEATS: usize = 4;

/// The host's seat.
pub const HOST_SEAT: usize = 0;

/// One seated connection.
#[derive(Debug, Clone)]
pub struct Occupant {
    pub peer: PeerId,
    pub nickname: String,
}

/// Why an entry attempt was refused; maps onto the wire's join codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRefusal {
    Full,
    InMatch,
}

#[derive(Debug)]
pub struct Room {
    id: u16,
    title: String,
    seats: [Option<Occupant>; MAX_SEATS],
    ready: [bool; MAX_SEATS],
    session: Option<GameSession>,
}

impl Room {
    pub fn new(id: u16, title: &str) -> Self {
        Room {
            id,
            title: title.to_string(),
            seats: [None, None, None, None],
            ready: [false; MAX_SEATS],
            session: None,
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether a match is currently running.
    pub fn in_match(&self) -> bool {
        self.session.as_ref().is_some_and(GameSession::is_active)
    }

    pub fn is_empty(&self) -> bool {
        self.seats.iter().all(Option::is_none)
    }

    pub fn seat_of(&self, peer: PeerId) -> Option<usize> {
        self.seats
            .iter()
            .position(|s| s.as_ref().is_some_and(|o| o.peer == peer))
    }

    pub fn occupant(&self, seat: usize) -> Option<&Occupant> {
        self.seats.get(seat).and_then(Option::as_ref)
    }

    pub fn is_ready(&self, seat: usize) -> bool {
        self.ready[seat]
    }

    /// Seated connections in seat order, dead or alive.
    pub fn occupants(&self) -> impl Iterator<Item = (usize, &Occupant)> {
        self.seats
            .iter()
            .enumerate()
            .filter_map(|(seat, slot)| slot.as_ref().map(|o| (seat, o)))
    }

    fn occupied_seats(&self) -> Vec<usize> {
        self.occupants().map(|(seat, _)| seat).collect()
    }

    /// Seat the peer at the first empty seat, scanning left to right.
    pub fn enter(&mut self, peer: PeerId, nickname: String) -> Result<usize, JoinRefusal> {
        if self.in_match() {
            return Err(JoinRefusal::InMatch);
        }

        let Some(seat) = self.seats.iter().position(Option::is_none) else {
            return Err(JoinRefusal::Full);
        };

        self.seats[seat] = Some(Occupant { peer, nickname });
        self.ready[seat] = false;
        Ok(seat)
    }

    /// Vacate the peer's seat and broadcast the LEAVE_NOTICE to the
    /// remaining occupants, then run the follow-up: a forced death
    /// report when a match is running (host migration waits for the
    /// session to conclude), or immediate host migration when the host
    /// left an open room.
    ///
    /// Returns the vacated seat, or `None` if the peer was not seated.
    pub fn leave(&mut self, peer: PeerId, out: &mut Outbox) -> Option<usize> {
        let seat = self.seat_of(peer)?;
        let was_in_match = self.in_match();

        self.seats[seat] = None;
        self.ready[seat] = false;
        self.broadcast(&payload::leave_notice(seat as u8), out);

        if was_in_match {
            self.report_death(seat, 0, out);
        } else if seat == HOST_SEAT {
            self.migrate_host(out);
        }

        Some(seat)
    }

    /// Flip a guest seat's ready flag, returning the new value. The
    /// host's flag is never meaningful and stays untouched.
    pub fn toggle_ready(&mut self, seat: usize) -> bool {
        if seat == HOST_SEAT || self.seats[seat].is_none() {
            return false;
        }
        self.ready[seat] = !self.ready[seat];
        self.ready[seat]
    }

    /// A match may start when none is running, at least two seats are
    /// occupied, and every occupied guest seat is ready.
    pub fn can_start(&self) -> bool {
        if self.in_match() {
            return false;
        }
        if self.occupants().count() < 2 {
            return false;
        }
        (HOST_SEAT + 1..MAX_SEATS)
            .all(|seat| self.seats[seat].is_none() || self.ready[seat])
    }

    /// Begin a match: every current occupant becomes a survivor, ready
    /// flags reset, and the shared seed goes out to the whole room.
    pub fn start_session(&mut self, seed: u32, out: &mut Outbox) {
        assert!(self.can_start(), "start_session requires can_start");

        self.session = Some(GameSession::new(self.occupied_seats()));
        self.ready = [false; MAX_SEATS];

        info!(room = self.id, seed, "match started");
        self.broadcast(&payload::game_start(seed), out);
    }

    /// Feed a death report into the active session and finish the match
    /// if it concluded. No-op without an active session.
    pub fn report_death(&mut self, seat: usize, score: u32, out: &mut Outbox) {
        let occupied = self.occupied_seats();
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if session.is_alive(seat) {
            info!(room = self.id, seat, score, "seat died");
        }
        if let Some(outcome) = session.report_death(seat, score, &occupied) {
            self.finish_match(outcome, out);
        }
    }

    /// Relay an attack from the given seat to its cyclic target,
    /// broadcasting the applied-garbage notice to the whole room. The
    /// coordinator only relays; counter-attack accounting is client-side.
    pub fn relay_attack(&mut self, attacker: usize, lines: u8, out: &mut Outbox) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if !session.is_active() {
            return;
        }
        let Some(target) = session.attack_target(attacker) else {
            debug!(room = self.id, attacker, "attack dropped, no valid target");
            return;
        };

        self.broadcast(
            &payload::garbage_notice(attacker as u8, target as u8, lines),
            out,
        );
    }

    /// Queue a message for every occupant, in seat order.
    pub fn broadcast(&self, msg: &Message, out: &mut Outbox) {
        for (_, occupant) in self.occupants() {
            out.push(occupant.peer, msg.clone());
        }
    }

    /// Queue a message for every occupant except one.
    pub fn broadcast_except(&self, msg: &Message, except: PeerId, out: &mut Outbox) {
        for (_, occupant) in self.occupants() {
            if occupant.peer != except {
                out.push(occupant.peer, msg.clone());
            }
        }
    }

    /// Broadcast the result, drop the session, reset ready flags, and
    /// run any host migration deferred while the match was running.
    fn finish_match(&mut self, outcome: MatchOutcome, out: &mut Outbox) {
        info!(
            room = self.id,
            winner = ?outcome.winner,
            reason = ?outcome.reason,
            "match finished"
        );

        self.broadcast(
            &payload::result_notice(outcome.winner.map(|seat| seat as u8), outcome.reason),
            out,
        );

        self.session = None;
        self.ready = [false; MAX_SEATS];

        if self.seats[HOST_SEAT].is_none() {
            self.migrate_host(out);
        }
    }

    /// Move the lowest-indexed occupant into the empty host seat and
    /// announce the move as two discrete events (a leave for the old
    /// seat, then an enter for seat 0) after the occupant has moved, so
    /// the new host receives both. A room with no other occupant stays
    /// hostless until the next entrant.
    fn migrate_host(&mut self, out: &mut Outbox) {
        debug_assert!(self.seats[HOST_SEAT].is_none());

        let Some(seat) = (HOST_SEAT + 1..MAX_SEATS).find(|&i| self.seats[i].is_some()) else {
            return;
        };
        let Some(occupant) = self.seats[seat].take() else {
            return;
        };

        let nickname = occupant.nickname.clone();
        self.seats[HOST_SEAT] = Some(occupant);
        self.ready[seat] = false;
        self.ready[HOST_SEAT] = false;

        self.broadcast(&payload::leave_notice(seat as u8), out);
        self.broadcast(&payload::enter_notice(HOST_SEAT as u8, &nickname), out);

        info!(room = self.id, from_seat = seat, new_host = %nickname, "host migrated");
    }
}
