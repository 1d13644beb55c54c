//! TrickController: the per-deal state machine (SPEC_FULL.md §4.4) -
//! current seat, last play, pass bookkeeping, round closure and deal end.
//! Grounded on the teacher's `GameState` as an example of an entity that
//! "trusts its own invariants" (debug_assert, no re-validation of engine-
//! internal state) rather than the teacher's specific turn-order rules,
//! which are for a different game.

use crate::card::{Card, Rank};
use crate::classify::{classify, PlayInfo};
use crate::compare::beats;
use crate::error::{EngineError, EngineResult};
use crate::event::{Event, EventSink};

pub const SEATS: u8 = 4;

pub fn teammate(seat: u8) -> u8 {
    (seat + 2) % SEATS
}

#[derive(Debug, Clone, PartialEq)]
pub struct LastPlay {
    pub seat: u8,
    pub info: PlayInfo,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone)]
pub struct DealState {
    pub hands: [Vec<Card>; 4],
    pub current_seat: u8,
    pub last_play: Option<LastPlay>,
    pub lead_seat: u8,
    pub passed: [bool; 4],
    pub finished_order: Vec<u8>,
    pub direction: i8,
    ended: bool,
}

impl DealState {
    pub fn new(hands: [Vec<Card>; 4], lead_seat: u8, direction: i8) -> Self {
        DealState {
            hands,
            current_seat: lead_seat,
            last_play: None,
            lead_seat,
            passed: [false; 4],
            finished_order: Vec::new(),
            direction,
            ended: false,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    fn owns(&self, seat: u8, cards: &[Card]) -> bool {
        let hand = &self.hands[seat as usize];
        let mut pool = hand.clone();
        for card in cards {
            match pool.iter().position(|c| c == card) {
                Some(idx) => {
                    pool.swap_remove(idx);
                }
                None => return false,
            }
        }
        true
    }

    fn remove_cards(&mut self, seat: u8, cards: &[Card]) {
        let hand = &mut self.hands[seat as usize];
        for card in cards {
            if let Some(idx) = hand.iter().position(|c| c == card) {
                hand.remove(idx);
            }
        }
    }

    pub fn play(&mut self, seat: u8, cards: &[Card], level: Rank, sink: &mut dyn EventSink) -> EngineResult<()> {
        if self.ended {
            return Err(EngineError::PhaseMismatch);
        }
        if seat != self.current_seat {
            return Err(EngineError::OutOfTurn { expected: self.current_seat, actual: seat });
        }
        if cards.is_empty() || !self.owns(seat, cards) {
            return Err(EngineError::CardsNotOwned);
        }
        let info = classify(cards, level);
        if !info.is_valid() {
            return Err(EngineError::IllegalPlay);
        }
        if let Some(last) = &self.last_play {
            if !beats(&info, Some(&last.info)) {
                return Err(EngineError::IllegalPlay);
            }
        }

        self.remove_cards(seat, cards);
        self.last_play = Some(LastPlay { seat, info, cards: cards.to_vec() });
        self.passed = [false; 4];
        self.lead_seat = seat;

        sink.emit(Event::HandChanged { seat });
        sink.emit(Event::LastPlayUpdated { seat, play: Some(info) });

        let remaining = self.hands[seat as usize].len();
        if self.hands[seat as usize].is_empty() {
            self.finished_order.push(seat);
            let place = self.finished_order.len() as u8;
            sink.emit(Event::PlayerFinished { seat, place });
        } else if (1..=10).contains(&remaining) {
            sink.emit(Event::PlayerReported { seat, remaining });
        }

        if self.finished_order.len() == (SEATS - 1) as usize {
            let remaining_seat = (0..SEATS).find(|s| !self.finished_order.contains(s)).expect("exactly one seat left");
            self.finished_order.push(remaining_seat);
            self.ended = true;
            sink.emit(Event::DealFinished { placements: self.finished_order.clone() });
            return Ok(());
        }

        self.advance(sink);
        Ok(())
    }

    pub fn pass(&mut self, seat: u8, sink: &mut dyn EventSink) -> EngineResult<()> {
        if self.ended {
            return Err(EngineError::PhaseMismatch);
        }
        if seat != self.current_seat {
            return Err(EngineError::OutOfTurn { expected: self.current_seat, actual: seat });
        }
        if self.last_play.is_none() {
            return Err(EngineError::IllegalPlay); // lead must play, passing is illegal
        }
        self.passed[seat as usize] = true;
        sink.emit(Event::LastPlayUpdated { seat, play: None });
        self.advance(sink);
        Ok(())
    }

    /// Debug hook: force `seat` to finish immediately (its hand is
    /// discarded, not distributed), for exercising match-end scenarios
    /// without playing out a full deal.
    pub fn debug_force_finish(&mut self, seat: u8, sink: &mut dyn EventSink) -> EngineResult<()> {
        if self.ended || self.finished_order.contains(&seat) {
            return Err(EngineError::InvalidDebugRequest);
        }
        self.hands[seat as usize].clear();
        self.finished_order.push(seat);
        let place = self.finished_order.len() as u8;
        sink.emit(Event::PlayerFinished { seat, place });

        if self.finished_order.len() == (SEATS - 1) as usize {
            let remaining_seat = (0..SEATS).find(|s| !self.finished_order.contains(s)).expect("exactly one seat left");
            self.finished_order.push(remaining_seat);
            self.ended = true;
            sink.emit(Event::DealFinished { placements: self.finished_order.clone() });
        } else if seat == self.current_seat {
            self.advance(sink);
        }
        Ok(())
    }

    fn next_nonempty_seat(&self, from: u8) -> Option<u8> {
        for step in 1..=SEATS {
            let candidate = (((from as i32 + self.direction as i32 * step as i32) % SEATS as i32 + SEATS as i32) % SEATS as i32) as u8;
            if !self.hands[candidate as usize].is_empty() {
                return Some(candidate);
            }
        }
        None
    }

    fn round_should_close(&self) -> bool {
        let Some(last) = &self.last_play else { return false };
        (0..SEATS).filter(|&s| s != last.seat && !self.hands[s as usize].is_empty()).all(|s| self.passed[s as usize])
    }

    fn close_round(&mut self, sink: &mut dyn EventSink) {
        let old_lead = self.lead_seat;
        let new_lead = if self.hands[old_lead as usize].is_empty() {
            let mate = teammate(old_lead);
            if !self.hands[mate as usize].is_empty() {
                mate
            } else {
                self.next_nonempty_seat(old_lead).expect("a deal still in progress has a non-empty seat")
            }
        } else {
            old_lead
        };
        self.lead_seat = new_lead;
        self.current_seat = new_lead;
        self.last_play = None;
        self.passed = [false; 4];
        sink.emit(Event::TrickCleared);
    }

    fn advance(&mut self, sink: &mut dyn EventSink) {
        if self.round_should_close() {
            self.close_round(sink);
            sink.emit(Event::TurnChanged { seat: self.current_seat });
            sink.emit(Event::PlayerTurnStart { seat: self.current_seat });
            return;
        }
        match self.next_nonempty_seat(self.current_seat) {
            Some(next) => {
                self.current_seat = next;
                sink.emit(Event::TurnChanged { seat: next });
                sink.emit(Event::PlayerTurnStart { seat: next });
            }
            None => {
                debug_assert!(self.ended, "turn advance found no seat but the deal was not marked ended");
            }
        }
    }
}
