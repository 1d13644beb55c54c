//! MatchController: placement bookkeeping, per-team level advancement and
//! terminal-team detection across deals (SPEC_FULL.md §4.5).

use crate::card::Rank;
use crate::event::{Event, EventSink, Team};

pub const TEAMS: usize = 2;

fn team_of(seat: u8) -> Team {
    (seat % 2) as Team
}

#[derive(Debug, Clone)]
pub struct MatchState {
    pub team_levels: [Rank; TEAMS],
    pub previous_placements: Vec<u8>,
    pub tribute_pending: bool,
}

/// Outcome of folding a finished deal's placements into the match.
#[derive(Debug, Clone, PartialEq)]
pub enum DealOutcome {
    MatchFinished { winning_team: Team },
    Continues,
}

impl MatchState {
    pub fn new() -> Self {
        MatchState { team_levels: [Rank::Two, Rank::Two], previous_placements: Vec::new(), tribute_pending: false }
    }

    /// The level rank to deal the *next* deal with: the level of the head
    /// team from the most recent deal, or `Two` before any deal has been played.
    pub fn current_level(&self) -> Rank {
        match self.previous_placements.first() {
            Some(&head) => self.team_levels[team_of(head) as usize],
            None => Rank::Two,
        }
    }

    /// Fold a finished deal's `placements` (head seat first) into the match.
    pub fn record_deal(&mut self, placements: Vec<u8>, sink: &mut dyn EventSink) -> DealOutcome {
        let head = placements[0];
        let head_team = team_of(head);
        let delta: u8 = if team_of(placements[1]) == head_team {
            3
        } else if team_of(placements[2]) == head_team {
            2
        } else {
            1
        };

        let already_at_ace = self.team_levels[head_team as usize] == Rank::Ace;
        self.previous_placements = placements;

        if already_at_ace {
            sink.emit(Event::MatchFinished { winning_team: head_team });
            return DealOutcome::MatchFinished { winning_team: head_team };
        }

        self.team_levels[head_team as usize] = advance_level(self.team_levels[head_team as usize], delta);
        self.tribute_pending = true;
        DealOutcome::Continues
    }

    pub fn reset(&mut self) {
        self.team_levels = [Rank::Two, Rank::Two];
        self.previous_placements.clear();
        self.tribute_pending = false;
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Step `level` up by `delta` face values, clamped at Ace.
fn advance_level(level: Rank, delta: u8) -> Rank {
    let value = level.face_value().expect("team levels are always face ranks, never jokers");
    let stepped = (value + delta).min(Rank::Ace.face_value().unwrap());
    Rank::from_face_value(stepped).expect("stepped value stays within the face-rank range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RecordingSink;

    #[test]
    fn sweep_advances_level_by_three_and_clamps_at_ace() {
        let mut state = MatchState::new();
        state.team_levels[0] = Rank::King;
        let mut sink = RecordingSink::default();
        let outcome = state.record_deal(vec![0, 2, 1, 3], &mut sink);
        assert_eq!(outcome, DealOutcome::Continues);
        assert_eq!(state.team_levels[0], Rank::Ace);
    }

    #[test]
    fn winning_at_ace_as_head_finishes_the_match() {
        let mut state = MatchState::new();
        state.team_levels[0] = Rank::Ace;
        let mut sink = RecordingSink::default();
        let outcome = state.record_deal(vec![0, 1, 2, 3], &mut sink);
        assert_eq!(outcome, DealOutcome::MatchFinished { winning_team: 0 });
        assert!(sink.events.contains(&Event::MatchFinished { winning_team: 0 }));
    }

    #[test]
    fn head_alone_among_opponents_advances_by_one() {
        // head=0 (team 0); second=1 and third=3 are both team 1 - no teammate until last place.
        let mut state = MatchState::new();
        let mut sink = RecordingSink::default();
        state.record_deal(vec![0, 1, 3, 2], &mut sink);
        assert_eq!(state.team_levels[0], Rank::Three);
    }

    #[test]
    fn teammate_third_advances_by_two() {
        let mut state = MatchState::new();
        let mut sink = RecordingSink::default();
        state.record_deal(vec![0, 1, 2, 3], &mut sink);
        assert_eq!(state.team_levels[0], Rank::Four);
    }
}
