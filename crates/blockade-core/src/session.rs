//! Authoritative tracker for one in-progress match.
//!
//! The session does not simulate gameplay: clients run the deterministic
//! board simulation from a shared seed, and the session only tracks who
//! is still alive, relays attacks, and decides the outcome. It holds no
//! back reference to its room; callers pass in the current occupancy
//! snapshot where the rules need it.

use std::collections::{BTreeMap, BTreeSet};

use blockade_protocol::opcode::EndReason;

/// How a concluded match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Winning seat, or `None` for a draw / abandoned match.
    pub winner: Option<usize>,
    pub reason: EndReason,
}

/// Liveness and outcome state for one match.
#[derive(Debug)]
pub struct GameSession {
    /// Seats still playing, in index order.
    alive: BTreeSet<usize>,

    /// Final score per seat, recorded as each seat dies.
    final_scores: BTreeMap<usize, u32>,

    /// Flips `true → false` exactly once; every result broadcast is a
    /// direct consequence of that transition.
    active: bool,
}

impl GameSession {
    /// Start a match with the given seats as the initial survivors.
    pub fn new(seats: impl IntoIterator<Item = usize>) -> Self {
        GameSession {
            alive: seats.into_iter().collect(),
            final_scores: BTreeMap::new(),
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_alive(&self, seat: usize) -> bool {
        self.alive.contains(&seat)
    }

    /// Remove a seat from the survivors, record its score, and evaluate
    /// termination. `occupied` is the room's current occupancy (seated
    /// connections, dead or alive, not the survivor set).
    ///
    /// No-op when the session has already concluded or the seat was
    /// already dead. Returns the outcome iff this report concluded the
    /// match.
    pub fn report_death(
        &mut self,
        seat: usize,
        score: u32,
        occupied: &[usize],
    ) -> Option<MatchOutcome> {
        if !self.active || !self.alive.remove(&seat) {
            return None;
        }
        self.final_scores.insert(seat, score);

        // Walkover is checked before the all-dead rule: a sole occupant
        // who just died is no longer alive, so the score rule below
        // decides instead.
        if let [last] = occupied {
            if self.alive.contains(last) {
                return self.conclude(Some(*last), EndReason::Walkover);
            }
        }

        // Everyone disconnected mid-match; conclude rather than wait on
        // death reports that can never arrive.
        if occupied.is_empty() {
            return self.conclude(None, EndReason::Normal);
        }

        if self.alive.is_empty() {
            return self.conclude(self.highest_score_seat(), EndReason::Normal);
        }

        None
    }

    /// Conclude the match at most once. A second call is a no-op.
    pub fn conclude(&mut self, winner: Option<usize>, reason: EndReason) -> Option<MatchOutcome> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(MatchOutcome { winner, reason })
    }

    /// Seat with the strictly highest recorded score; `None` when the
    /// top score is shared.
    fn highest_score_seat(&self) -> Option<usize> {
        let best = self.final_scores.values().max().copied()?;
        let mut at_best = self
            .final_scores
            .iter()
            .filter(|(_, &score)| score == best)
            .map(|(&seat, _)| seat);

        let winner = at_best.next()?;
        if at_best.next().is_some() {
            return None;
        }
        Some(winner)
    }

    /// Pick the attack target: the next alive seat cyclically after the
    /// attacker. With fewer than two survivors there is no valid target
    /// and the attack is dropped.
    pub fn attack_target(&self, attacker: usize) -> Option<usize> {
        if self.alive.len() < 2 {
            return None;
        }

        let target = self
            .alive
            .range(attacker + 1..)
            .next()
            .or_else(|| self.alive.iter().next())
            .copied()?;

        (target != attacker).then_some(target)
    }
}
