//! Engine: the command/event surface (SPEC_FULL.md §6) wiring Card/Deck/
//! HandClassifier/Comparator/TrickController/TributeProtocol/MatchController
//! together. Grounded on the teacher's `AppState` (`infrastructure/
//! app_state.rs`) for the "one struct owns everything, exposes command
//! methods" shape, generalized from a struct holding `Arc<Mutex<_>>` repos
//! to one that owns the rule-engine state directly.
//!
//! Time is the logical tick counter `PlayPolicy`'s think-delay is measured
//! in (SPEC_FULL.md §5), advanced explicitly by the caller via [`Engine::tick`]
//! - there is no wall clock or background thread here.

use crate::card::{Card, Rank};
use crate::deck;
use crate::error::{EngineError, EngineResult};
use crate::event::EventSink;
use crate::match_state::{DealOutcome, MatchState};
use crate::policy::{PlayChoice, PlayPolicy, TributePolicy};
use crate::scheduler::Scheduler;
use crate::trick::DealState;
use crate::tribute::{TributePhase, TributeProtocol};

/// Ticks between an automatic seat becoming eligible to act and its
/// decision being carried out - models AI "think time" without a real timer.
const THINK_DELAY: u64 = 1;

pub struct Engine {
    pub match_state: MatchState,
    pub deal: Option<DealState>,
    tribute: Option<TributeProtocol>,
    pending_hands: Option<[Vec<Card>; 4]>,
    play_policies: [Box<dyn PlayPolicy>; 4],
    tribute_policies: [Box<dyn TributePolicy>; 4],
    automatic: [bool; 4],
    seed: Option<u64>,
    deal_index: u64,
    direction: i8,
    scheduler: Scheduler<()>,
    now: u64,
    last_deal_outcome: Option<DealOutcome>,
}

impl Engine {
    pub fn new(seed: Option<u64>) -> Self {
        Engine::with_policies(
            seed,
            std::array::from_fn(|_| Box::new(crate::policy::SimplePolicy) as Box<dyn PlayPolicy>),
            std::array::from_fn(|_| Box::new(crate::policy::SimplePolicy) as Box<dyn TributePolicy>),
        )
    }

    pub fn with_policies(
        seed: Option<u64>,
        play_policies: [Box<dyn PlayPolicy>; 4],
        tribute_policies: [Box<dyn TributePolicy>; 4],
    ) -> Self {
        Engine {
            match_state: MatchState::new(),
            deal: None,
            tribute: None,
            pending_hands: None,
            play_policies,
            tribute_policies,
            automatic: [true; 4],
            seed,
            deal_index: 0,
            direction: 1,
            scheduler: Scheduler::new(),
            now: 0,
            last_deal_outcome: None,
        }
    }

    /// Mark `seat` as human-controlled: `tick`/`run_to_suspension` will
    /// suspend at its turn instead of consulting its policy.
    pub fn set_human(&mut self, seat: u8) {
        self.automatic[seat as usize] = false;
    }

    pub fn level(&self) -> Rank {
        self.match_state.current_level()
    }

    /// Outcome of the most recently settled deal, if any. Reset by `new_match`.
    pub fn last_deal_outcome(&self) -> Option<&DealOutcome> {
        self.last_deal_outcome.as_ref()
    }

    // ---- NewMatch -------------------------------------------------------

    pub fn new_match(&mut self, seed: Option<u64>) {
        self.match_state.reset();
        self.deal = None;
        self.tribute = None;
        self.pending_hands = None;
        self.seed = seed;
        self.deal_index = 0;
        self.direction = 1;
        self.scheduler = Scheduler::new();
        self.now = 0;
        self.last_deal_outcome = None;
    }

    // ---- NewDeal ----------------------------------------------------------

    pub fn new_deal(&mut self, sink: &mut dyn EventSink) -> EngineResult<()> {
        let _span = tracing::debug_span!("command", name = "NewDeal", deal_index = self.deal_index + 1).entered();
        if self.deal.as_ref().is_some_and(|d| !d.is_ended()) {
            return Err(EngineError::PhaseMismatch);
        }
        if matches!(self.last_deal_outcome, Some(DealOutcome::MatchFinished { .. })) {
            return Err(EngineError::PhaseMismatch);
        }
        self.scheduler.invalidate();
        self.deal_index += 1;
        let deal_seed = self.seed.map(|s| s.wrapping_add(self.deal_index));
        let hands = deck::shuffle_and_deal(deal_seed);

        if self.match_state.tribute_pending && !self.match_state.previous_placements.is_empty() {
            let placements = to_placements_array(&self.match_state.previous_placements);
            let level = self.match_state.current_level();
            let protocol = TributeProtocol::start(&placements, level, &hands, sink);
            self.pending_hands = Some(hands);
            self.tribute = Some(protocol);
            self.maybe_finish_tribute(placements[0], sink);
        } else {
            self.deal = Some(DealState::new(hands, 0, self.direction));
        }
        self.arm_auto_wakeup();
        Ok(())
    }

    fn next_tribute_actor(&self, protocol: &TributeProtocol) -> Option<u8> {
        match &protocol.phase {
            TributePhase::AwaitingOffers { payers, offered, .. } => {
                payers.iter().copied().find(|s| !offered.iter().any(|&(os, _)| os == *s))
            }
            TributePhase::AwaitingReturns { links, returned } => {
                links.iter().map(|&(_, receiver)| receiver).find(|r| !returned.contains(r))
            }
            TributePhase::Done => None,
        }
    }

    fn maybe_finish_tribute(&mut self, head_seat: u8, _sink: &mut dyn EventSink) {
        if self.tribute.as_ref().is_some_and(TributeProtocol::is_done) {
            self.match_state.tribute_pending = false;
            let hands = self.pending_hands.take().expect("tribute completion always has pending hands");
            self.tribute = None;
            self.deal = Some(DealState::new(hands, head_seat, self.direction));
        }
    }

    pub fn submit_tribute(&mut self, seat: u8, card: Card, sink: &mut dyn EventSink) -> EngineResult<()> {
        let _span = tracing::debug_span!("command", name = "SubmitTribute", seat).entered();
        let head_seat = self.match_state.previous_placements.first().copied().unwrap_or(0);
        let hands = self.pending_hands.as_mut().ok_or(EngineError::PhaseMismatch)?;
        let protocol = self.tribute.as_mut().ok_or(EngineError::PhaseMismatch)?;
        protocol.submit(seat, card, hands, sink)?;
        self.maybe_finish_tribute(head_seat, sink);
        self.arm_auto_wakeup();
        Ok(())
    }

    // ---- Play / Pass --------------------------------------------------

    pub fn play(&mut self, seat: u8, cards: &[Card], sink: &mut dyn EventSink) -> EngineResult<()> {
        let _span = tracing::debug_span!("command", name = "Play", seat, cards = cards.len()).entered();
        if self.tribute.is_some() {
            return Err(EngineError::PhaseMismatch);
        }
        let level = self.match_state.current_level();
        let deal = self.deal.as_mut().ok_or(EngineError::PhaseMismatch)?;
        deal.play(seat, cards, level, sink)?;
        self.settle_deal_if_ended(sink);
        self.arm_auto_wakeup();
        Ok(())
    }

    pub fn pass(&mut self, seat: u8, sink: &mut dyn EventSink) -> EngineResult<()> {
        let _span = tracing::debug_span!("command", name = "Pass", seat).entered();
        if self.tribute.is_some() {
            return Err(EngineError::PhaseMismatch);
        }
        let deal = self.deal.as_mut().ok_or(EngineError::PhaseMismatch)?;
        deal.pass(seat, sink)?;
        self.arm_auto_wakeup();
        Ok(())
    }

    fn settle_deal_if_ended(&mut self, sink: &mut dyn EventSink) {
        let Some(deal) = &self.deal else { return };
        if !deal.is_ended() {
            return;
        }
        let placements = deal.finished_order.clone();
        let outcome = self.match_state.record_deal(placements, sink);
        self.last_deal_outcome = Some(outcome);
    }

    // ---- Scheduling -------------------------------------------------------

    /// Whether some automatic seat currently has a decision to make (a
    /// tribute offer/return, or a deal turn).
    fn has_pending_automatic_work(&self) -> bool {
        if let Some(protocol) = &self.tribute {
            if protocol.is_done() {
                return false;
            }
            return self.next_tribute_actor(protocol).is_some_and(|s| self.automatic[s as usize]);
        }
        if let Some(deal) = &self.deal {
            if !deal.is_ended() {
                return self.automatic[deal.current_seat as usize];
            }
        }
        false
    }

    /// Schedule a wakeup `THINK_DELAY` ticks out if there's automatic work
    /// pending and nothing is already queued for it.
    fn arm_auto_wakeup(&mut self) {
        if self.scheduler.is_empty() && self.has_pending_automatic_work() {
            self.scheduler.schedule_after(self.now, THINK_DELAY, ());
        }
    }

    /// Advance logical time by one tick, carrying out at most one
    /// automatic decision per due callback.
    pub fn tick(&mut self, sink: &mut dyn EventSink) {
        self.now += 1;
        let due = self.scheduler.drain_due(self.now);
        for () in due {
            self.perform_one_automatic_step(sink);
        }
    }

    fn perform_one_automatic_step(&mut self, sink: &mut dyn EventSink) {
        if let Some(protocol) = &self.tribute {
            if protocol.is_done() {
                return;
            }
            let Some(seat) = self.next_tribute_actor(protocol) else { return };
            if !self.automatic[seat as usize] {
                return;
            }
            let hands = self.pending_hands.as_ref().expect("tribute is active while hands are pending");
            let level = protocol.level;
            let card = match &protocol.phase {
                TributePhase::AwaitingOffers { .. } => self.tribute_policies[seat as usize].choose_tribute_offer(&hands[seat as usize], level),
                TributePhase::AwaitingReturns { .. } => self.tribute_policies[seat as usize].choose_tribute_return(&hands[seat as usize], level),
                TributePhase::Done => return,
            };
            self.submit_tribute(seat, card, sink).expect("policy-chosen tribute card satisfies the protocol's own rules");
            return;
        }
        if let Some(deal) = &self.deal {
            if deal.is_ended() {
                return;
            }
            let seat = deal.current_seat;
            if !self.automatic[seat as usize] {
                return;
            }
            let level = self.match_state.current_level();
            let hand = deal.hands[seat as usize].clone();
            let last_play = deal.last_play.as_ref().map(|lp| lp.info);
            let choice = self.play_policies[seat as usize].choose_play(&hand, level, last_play.as_ref());
            let outcome = match choice {
                PlayChoice::Play(cards) => self.play(seat, &cards, sink),
                PlayChoice::Pass => self.pass(seat, sink),
            };
            outcome.expect("a policy-chosen command always satisfies its own legality rules");
        }
    }

    /// Fast-forward: tick until no automatic seat has anything left to do
    /// in the current deal/tribute phase. Used by the demo binary and
    /// tests that don't care about realized think-delay pacing.
    pub fn run_to_suspension(&mut self, sink: &mut dyn EventSink) {
        while self.has_pending_automatic_work() {
            self.arm_auto_wakeup();
            self.tick(sink);
        }
    }

    // ---- Debug hooks ----------------------------------------------------

    pub fn debug_force_win(&mut self, seat: u8, sink: &mut dyn EventSink) -> EngineResult<()> {
        tracing::debug!(seat, "DebugForceWin");
        let deal = self.deal.as_mut().ok_or(EngineError::InvalidDebugRequest)?;
        deal.debug_force_finish(seat, sink)?;
        self.settle_deal_if_ended(sink);
        self.arm_auto_wakeup();
        Ok(())
    }

    pub fn debug_set_level(&mut self, team: u8, level: Rank) -> EngineResult<()> {
        if team > 1 || level.is_joker() {
            return Err(EngineError::InvalidDebugRequest);
        }
        self.match_state.team_levels[team as usize] = level;
        Ok(())
    }

    pub fn debug_set_placements(&mut self, placements: Vec<u8>) -> EngineResult<()> {
        if placements.len() != 4 {
            return Err(EngineError::InvalidDebugRequest);
        }
        self.match_state.previous_placements = placements;
        self.match_state.tribute_pending = true;
        Ok(())
    }
}

fn to_placements_array(placements: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&placements[..4]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RecordingSink;

    #[test]
    fn full_automatic_match_runs_a_deal_to_completion() {
        let mut engine = Engine::new(Some(99));
        let mut sink = RecordingSink::default();
        engine.new_deal(&mut sink).unwrap();
        engine.run_to_suspension(&mut sink);
        assert!(engine.deal.as_ref().unwrap().is_ended());
        assert!(sink.events.iter().any(|e| matches!(e, crate::event::Event::HandChanged { .. })));
    }

    #[test]
    fn tick_without_arming_does_nothing() {
        let mut engine = Engine::new(Some(1));
        let mut sink = RecordingSink::default();
        engine.tick(&mut sink);
        assert!(sink.events.is_empty());
        assert!(engine.deal.is_none());
    }

    #[test]
    fn a_human_seat_suspends_automatic_play_at_its_turn() {
        let mut engine = Engine::new(Some(7));
        engine.set_human(1);
        let mut sink = RecordingSink::default();
        engine.new_deal(&mut sink).unwrap();
        // Seat 0 (automatic) leads; seat 1 is human and must not be auto-played.
        engine.run_to_suspension(&mut sink);
        let deal = engine.deal.as_ref().unwrap();
        assert!(!deal.is_ended());
        assert_eq!(deal.current_seat, 1);
    }

    #[test]
    fn debug_set_level_rejects_joker_and_out_of_range_team() {
        let mut engine = Engine::new(Some(1));
        assert!(engine.debug_set_level(0, Rank::King).is_ok());
        assert_eq!(engine.match_state.team_levels[0], Rank::King);
        assert!(engine.debug_set_level(2, Rank::King).is_err());
        assert!(engine.debug_set_level(0, Rank::BigJoker).is_err());
    }

    #[test]
    fn play_is_rejected_while_no_deal_is_active() {
        let mut engine = Engine::new(Some(1));
        let mut sink = RecordingSink::default();
        let err = engine.play(0, &[], &mut sink).unwrap_err();
        assert_eq!(err, EngineError::PhaseMismatch);
    }
}
