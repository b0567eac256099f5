//! Room seating, ready gating, host migration, and match outcome rules.

use blockade_core::{JoinRefusal, Outbox, PeerId, Room, HOST_SEAT, MAX_SEATS};
use blockade_protocol::opcode::{EndReason, OpCode, NO_WINNER};
use blockade_protocol::payload;

fn peer(n: u64) -> PeerId {
    PeerId(n)
}

/// A room with peers 0..n seated at seats 0..n (nicknames "p0".."pn").
fn seated_room(n: usize) -> Room {
    let mut room = Room::new(1, "test room");
    for i in 0..n {
        let seat = room.enter(peer(i as u64), format!("p{}", i));
        assert_eq!(seat, Ok(i));
    }
    room
}

/// Bodies of every queued message for `to` with the given opcode, in
/// queue order.
fn bodies_for(out: &Outbox, to: PeerId, opcode: OpCode) -> Vec<Vec<u8>> {
    out.as_slice()
        .iter()
        .filter(|(p, m)| *p == to && m.opcode == opcode as u8)
        .map(|(_, m)| m.body.clone())
        .collect()
}

fn count_results(out: &Outbox) -> usize {
    out.as_slice()
        .iter()
        .filter(|(_, m)| m.opcode == OpCode::ResultNotice as u8)
        .count()
}

#[test]
fn seats_fill_left_to_right_and_cap_at_capacity() {
    let mut room = seated_room(MAX_SEATS);
    assert_eq!(room.enter(peer(99), "late".into()), Err(JoinRefusal::Full));

    // Leaving frees exactly one seat, which the next entrant gets.
    let mut out = Outbox::new();
    assert_eq!(room.leave(peer(2), &mut out), Some(2));
    assert_eq!(room.enter(peer(99), "late".into()), Ok(2));
    assert_eq!(room.enter(peer(100), "later".into()), Err(JoinRefusal::Full));
}

#[test]
fn entering_clears_any_stale_ready_state() {
    let mut room = seated_room(2);
    room.toggle_ready(1);
    assert!(room.is_ready(1));

    let mut out = Outbox::new();
    room.leave(peer(1), &mut out);
    assert_eq!(room.enter(peer(5), "fresh".into()), Ok(1));
    assert!(!room.is_ready(1));
}

#[test]
fn match_start_requires_two_seats_and_ready_guests() {
    let mut room = seated_room(1);
    assert!(!room.can_start()); // alone

    assert_eq!(room.enter(peer(1), "p1".into()), Ok(1));
    assert!(!room.can_start()); // guest not ready

    assert!(room.toggle_ready(1));
    assert!(room.can_start());

    // The host's own flag never participates.
    assert!(!room.toggle_ready(HOST_SEAT));
    assert!(room.can_start());

    let mut out = Outbox::new();
    room.start_session(42, &mut out);

    assert!(room.in_match());
    assert!(!room.is_ready(1)); // starting clears the flags
    assert!(!room.can_start());
    assert_eq!(room.enter(peer(9), "p9".into()), Err(JoinRefusal::InMatch));

    // Everyone got the same seed.
    for p in [peer(0), peer(1)] {
        let starts = bodies_for(&out, p, OpCode::GameStart);
        assert_eq!(starts.len(), 1);
        assert_eq!(payload::decode_game_start(&starts[0]), Ok(42));
    }
}

#[test]
fn host_migration_promotes_the_lowest_remaining_seat() {
    // Occupants in seats {0, 2, 3}.
    let mut room = seated_room(4);
    let mut out = Outbox::new();
    room.leave(peer(1), &mut out);

    let mut out = Outbox::new();
    assert!(room.leave(peer(0), &mut out).is_some());

    // The seat-2 occupant moved to seat 0; seat 2 is empty again.
    assert_eq!(room.occupant(HOST_SEAT).map(|o| o.peer), Some(peer(2)));
    assert!(room.occupant(2).is_none());

    // Observed by the untouched seat-3 occupant: the host's departure,
    // then exactly one LEAVE_NOTICE(2) followed by one ENTER_NOTICE(0).
    let leaves = bodies_for(&out, peer(3), OpCode::LeaveNotice);
    assert_eq!(leaves, vec![vec![0], vec![2]]);

    let enters = bodies_for(&out, peer(3), OpCode::EnterNotice);
    assert_eq!(enters.len(), 1);
    assert_eq!(
        payload::decode_enter_notice(&enters[0]),
        Ok((0, "p2".to_string()))
    );

    // The new host received its own move as the same two events.
    assert_eq!(
        bodies_for(&out, peer(2), OpCode::LeaveNotice),
        vec![vec![0], vec![2]]
    );
    assert_eq!(bodies_for(&out, peer(2), OpCode::EnterNotice).len(), 1);
}

#[test]
fn emptied_room_stays_hostless_until_the_next_entrant() {
    let mut room = seated_room(1);
    let mut out = Outbox::new();
    room.leave(peer(0), &mut out);

    assert!(room.is_empty());
    assert_eq!(room.enter(peer(7), "next".into()), Ok(HOST_SEAT));
}

fn started_room(n: usize) -> Room {
    let mut room = seated_room(n);
    for seat in 1..n {
        room.toggle_ready(seat);
    }
    let mut out = Outbox::new();
    room.start_session(7, &mut out);
    room
}

#[test]
fn match_runs_until_the_last_survivor_dies() {
    let mut room = started_room(3);
    let mut out = Outbox::new();

    // Two deaths with all three still seated: the walkover rule counts
    // occupants, not survivors, so the match keeps running.
    room.report_death(1, 50, &mut out);
    room.report_death(2, 80, &mut out);
    assert!(room.in_match());
    assert_eq!(count_results(&out), 0);

    room.report_death(0, 100, &mut out);
    assert!(!room.in_match());

    let results = bodies_for(&out, peer(1), OpCode::ResultNotice);
    assert_eq!(results.len(), 1);
    assert_eq!(
        payload::decode_result_notice(&results[0]),
        Ok((Some(0), EndReason::Normal))
    );
}

#[test]
fn tied_top_scores_mean_no_winner() {
    let mut room = started_room(3);
    let mut out = Outbox::new();

    room.report_death(1, 80, &mut out);
    room.report_death(2, 80, &mut out);
    room.report_death(0, 50, &mut out);

    let results = bodies_for(&out, peer(0), OpCode::ResultNotice);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0], vec![NO_WINNER, EndReason::Normal as u8]);
}

#[test]
fn disconnect_mid_match_awards_a_walkover() {
    let mut room = started_room(2);
    let mut out = Outbox::new();

    // Seat 1 fully disconnects; the survivor wins immediately, without
    // a death report.
    room.leave(peer(1), &mut out);

    assert!(!room.in_match());
    assert_eq!(bodies_for(&out, peer(0), OpCode::LeaveNotice), vec![vec![1]]);

    let results = bodies_for(&out, peer(0), OpCode::ResultNotice);
    assert_eq!(results.len(), 1);
    assert_eq!(
        payload::decode_result_notice(&results[0]),
        Ok((Some(0), EndReason::Walkover))
    );
}

#[test]
fn dead_last_occupant_falls_back_to_the_score_rule() {
    let mut room = started_room(2);
    let mut out = Outbox::new();

    // Seat 1 dies first, then the still-alive host disconnects. The
    // remaining occupant (seat 1) is dead, so no walkover: the match
    // concludes on recorded scores instead.
    room.report_death(1, 30, &mut out);
    assert!(room.in_match());

    room.leave(peer(0), &mut out);
    assert!(!room.in_match());

    let results = bodies_for(&out, peer(1), OpCode::ResultNotice);
    assert_eq!(results.len(), 1);
    assert_eq!(
        payload::decode_result_notice(&results[0]),
        Ok((Some(1), EndReason::Normal))
    );
}

#[test]
fn fully_abandoned_match_concludes_without_a_stuck_session() {
    let mut room = started_room(2);
    let mut out = Outbox::new();

    room.report_death(0, 10, &mut out);
    room.leave(peer(0), &mut out); // already dead; session stays active
    assert!(room.in_match());

    room.leave(peer(1), &mut out); // last connection gone
    assert!(!room.in_match());
    assert!(room.is_empty());
    // Nobody is left to receive a result broadcast.
    assert_eq!(count_results(&out), 0);
}

#[test]
fn conclusion_is_broadcast_exactly_once() {
    let mut room = started_room(2);
    let mut out = Outbox::new();

    // A walkover conclusion racing with a stale death report.
    room.leave(peer(1), &mut out);
    room.report_death(1, 0, &mut out);
    room.report_death(0, 99, &mut out);

    assert_eq!(count_results(&out), 1);
}

#[test]
fn host_migration_is_deferred_until_the_match_concludes() {
    let mut room = started_room(3);
    let mut out = Outbox::new();

    // The host disconnects mid-match: forced death, no migration yet.
    room.leave(peer(0), &mut out);
    assert!(room.in_match());
    assert!(room.occupant(HOST_SEAT).is_none());
    assert_eq!(bodies_for(&out, peer(1), OpCode::EnterNotice), Vec::<Vec<u8>>::new());

    // The match ends; now seat 1 is promoted.
    let mut out = Outbox::new();
    room.report_death(2, 10, &mut out);
    room.report_death(1, 60, &mut out);

    assert!(!room.in_match());
    assert_eq!(room.occupant(HOST_SEAT).map(|o| o.peer), Some(peer(1)));

    // Seat 1 wins (strictly highest score), and the deferred migration
    // is announced after the result.
    let to_new_host = bodies_for(&out, peer(1), OpCode::ResultNotice);
    assert_eq!(
        payload::decode_result_notice(&to_new_host[0]),
        Ok((Some(1), EndReason::Normal))
    );
    assert_eq!(bodies_for(&out, peer(1), OpCode::LeaveNotice), vec![vec![1]]);
    let enters = bodies_for(&out, peer(1), OpCode::EnterNotice);
    assert_eq!(
        payload::decode_enter_notice(&enters[0]),
        Ok((0, "p1".to_string()))
    );
}

#[test]
fn attacks_cycle_through_alive_seats_only() {
    let mut room = started_room(3);
    let mut out = Outbox::new();

    // All three alive: seat 0 attacks seat 1.
    room.relay_attack(0, 2, &mut out);
    let garbage = bodies_for(&out, peer(2), OpCode::GarbageNotice);
    assert_eq!(garbage, vec![vec![0, 1, 2]]);

    // Seat 1 dies; seat 0's next attack wraps past it to seat 2.
    room.report_death(1, 5, &mut out);
    let mut out = Outbox::new();
    room.relay_attack(0, 1, &mut out);
    assert_eq!(
        bodies_for(&out, peer(0), OpCode::GarbageNotice),
        vec![vec![0, 2, 1]]
    );

    // Highest seat wraps around to the lowest alive one.
    let mut out = Outbox::new();
    room.relay_attack(2, 4, &mut out);
    assert_eq!(
        bodies_for(&out, peer(0), OpCode::GarbageNotice),
        vec![vec![2, 0, 4]]
    );

    // With a single survivor there is no valid target.
    room.report_death(2, 9, &mut out);
    let mut out = Outbox::new();
    room.relay_attack(0, 3, &mut out);
    assert!(out.is_empty());
}
