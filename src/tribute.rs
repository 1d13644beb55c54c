//! TributeProtocol: the between-deal handshake (SPEC_FULL.md §4.6).
//! Grounded on `judge.cpp`'s `doubleTributeStaging` (a double tribute
//! doesn't resolve until both payers have submitted) and
//! `findLargestCardForTribute` (the wildcard-exclusion rule, shared with
//! [`crate::policy::SimplePolicy`] via [`crate::card::largest_excluding_wild`]).

use crate::card::{logical_order, Card, Rank};
use crate::error::{EngineError, EngineResult};
use crate::event::{Event, EventSink};
use crate::trick::teammate;

#[derive(Debug, Clone, PartialEq)]
pub enum TributePhase {
    AwaitingOffers { head: u8, second: u8, payers: Vec<u8>, offered: Vec<(u8, Card)> },
    AwaitingReturns { links: Vec<(u8, u8)>, returned: Vec<u8> },
    Done,
}

#[derive(Debug, Clone)]
pub struct TributeProtocol {
    pub level: Rank,
    pub phase: TributePhase,
}

impl TributeProtocol {
    /// Begin the protocol for a deal that ended with `placements` (head
    /// seat first, loser last). Resolves resistance immediately; otherwise
    /// requests offers from the paying seats.
    pub fn start(placements: &[u8; 4], level: Rank, hands: &[Vec<Card>; 4], sink: &mut dyn EventSink) -> TributeProtocol {
        let head = placements[0];
        let second = placements[1];
        let double = second == teammate(head);
        let payers: Vec<u8> = if double { vec![placements[2], placements[3]] } else { vec![placements[3]] };

        let resisting_big_jokers: usize =
            payers.iter().map(|&s| hands[s as usize].iter().filter(|c| c.rank == Rank::BigJoker).count()).sum();

        if resisting_big_jokers >= 2 {
            for &p in &payers {
                sink.emit(Event::TributeResisted { seat: p });
            }
            return TributeProtocol { level, phase: TributePhase::Done };
        }

        for &p in &payers {
            sink.emit(Event::TributeRequested { seat: p, is_return: false });
        }
        TributeProtocol { level, phase: TributePhase::AwaitingOffers { head, second, payers, offered: Vec::new() } }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, TributePhase::Done)
    }

    /// Handle `SubmitTribute(seat, card)`, mutating `hands` on a completed
    /// transfer and advancing the sub-phase.
    pub fn submit(&mut self, seat: u8, card: Card, hands: &mut [Vec<Card>; 4], sink: &mut dyn EventSink) -> EngineResult<()> {
        match &mut self.phase {
            TributePhase::Done => Err(EngineError::PhaseMismatch),
            TributePhase::AwaitingOffers { head, second, payers, offered } => {
                if !payers.contains(&seat) || offered.iter().any(|&(s, _)| s == seat) {
                    return Err(EngineError::PhaseMismatch);
                }
                if !hands[seat as usize].contains(&card) {
                    return Err(EngineError::CardsNotOwned);
                }
                let expected = crate::card::largest_excluding_wild(&hands[seat as usize], self.level);
                if card != expected {
                    return Err(EngineError::TributeSelectionViolation);
                }
                offered.push((seat, card));

                if offered.len() == payers.len() {
                    let links = resolve_links(*head, *second, payers.as_slice(), offered.as_slice(), self.level);
                    let offered_snapshot = offered.clone();
                    for &(payer, receiver) in &links {
                        let card = offered_card_for(&offered_snapshot, payer);
                        move_card(hands, payer, receiver, card);
                        sink.emit(Event::TributeSettled { payer, receiver, card, is_return: false });
                        sink.emit(Event::TributeRequested { seat: receiver, is_return: true });
                    }
                    self.phase = TributePhase::AwaitingReturns { links, returned: Vec::new() };
                }
                Ok(())
            }
            TributePhase::AwaitingReturns { links, returned } => {
                let Some(&(payer, _receiver)) = links.iter().find(|&&(_, receiver)| receiver == seat) else {
                    return Err(EngineError::PhaseMismatch);
                };
                if returned.contains(&seat) {
                    return Err(EngineError::PhaseMismatch);
                }
                if !hands[seat as usize].contains(&card) {
                    return Err(EngineError::CardsNotOwned);
                }
                move_card(hands, seat, payer, card);
                sink.emit(Event::TributeSettled { payer: seat, receiver: payer, card, is_return: true });
                returned.push(seat);

                if returned.len() == links.len() {
                    self.phase = TributePhase::Done;
                }
                Ok(())
            }
        }
    }
}

fn offered_card_for(offered: &[(u8, Card)], seat: u8) -> Card {
    offered.iter().find(|&&(s, _)| s == seat).map(|&(_, c)| c).expect("seat submitted an offer")
}

fn move_card(hands: &mut [Vec<Card>; 4], from: u8, to: u8, card: Card) {
    let idx = hands[from as usize].iter().position(|c| *c == card).expect("card to move is present");
    hands[from as usize].remove(idx);
    hands[to as usize].push(card);
}

/// Map each payer to its receiver. Single tribute is fixed; double tribute's
/// larger offered card goes to `head`, the smaller to `second`. Looks each
/// payer up by its fixed seat role (`payers[0]` = third-place, `payers[1]` =
/// loser) rather than by `offered`'s submission order, so the result doesn't
/// depend on which payer happened to call `submit` first. Ties resolve
/// positionally by that same fixed role: the loser's card goes to `head`,
/// third-place's to `second`.
fn resolve_links(head: u8, second: u8, payers: &[u8], offered: &[(u8, Card)], level: Rank) -> Vec<(u8, u8)> {
    if payers.len() == 1 {
        return vec![(payers[0], head)];
    }
    let third = payers[0];
    let loser = payers[1];
    let card_third = offered_card_for(offered, third);
    let card_loser = offered_card_for(offered, loser);
    let order_third = logical_order(card_third.rank, level);
    let order_loser = logical_order(card_loser.rank, level);
    if order_loser >= order_third {
        vec![(loser, head), (third, second)]
    } else {
        vec![(third, head), (loser, second)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;
    use crate::event::RecordingSink;

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn single_tribute_transfers_loser_largest_card_to_head() {
        let placements = [0u8, 1, 2, 3];
        let mut hands: [Vec<Card>; 4] = Default::default();
        hands[0] = vec![c(Rank::Three, Suit::Spades)];
        hands[3] = vec![c(Rank::King, Suit::Spades), c(Rank::Four, Suit::Clubs)];
        let mut sink = RecordingSink::default();
        let mut protocol = TributeProtocol::start(&placements, Rank::Two, &hands, &mut sink);
        assert!(sink.events.contains(&Event::TributeRequested { seat: 3, is_return: false }));

        protocol.submit(3, c(Rank::King, Suit::Spades), &mut hands, &mut sink).unwrap();
        assert!(hands[0].contains(&c(Rank::King, Suit::Spades)));
        assert!(!hands[3].contains(&c(Rank::King, Suit::Spades)));
        assert!(matches!(protocol.phase, TributePhase::AwaitingReturns { .. }));

        protocol.submit(0, c(Rank::Three, Suit::Spades), &mut hands, &mut sink).unwrap();
        assert!(protocol.is_done());
        assert!(hands[3].contains(&c(Rank::Three, Suit::Spades)));
    }

    #[test]
    fn wrong_offer_is_a_selection_violation() {
        let placements = [0u8, 1, 2, 3];
        let mut hands: [Vec<Card>; 4] = Default::default();
        hands[3] = vec![c(Rank::King, Suit::Spades), c(Rank::Four, Suit::Clubs)];
        let mut sink = RecordingSink::default();
        let mut protocol = TributeProtocol::start(&placements, Rank::Two, &hands, &mut sink);
        let err = protocol.submit(3, c(Rank::Four, Suit::Clubs), &mut hands, &mut sink).unwrap_err();
        assert_eq!(err, EngineError::TributeSelectionViolation);
    }

    #[test]
    fn double_tribute_tie_resolves_positionally() {
        // placements: h=0, t=2 (teammate of h), a=1, b=3.
        let placements = [0u8, 2, 1, 3];
        let mut hands: [Vec<Card>; 4] = Default::default();
        hands[1] = vec![c(Rank::Ace, Suit::Spades)];
        hands[3] = vec![c(Rank::Ace, Suit::Hearts)];
        let mut sink = RecordingSink::default();
        let mut protocol = TributeProtocol::start(&placements, Rank::Seven, &hands, &mut sink);
        // seat 1 (payers[0], third-place) submits first here; seat 3 (payers[1],
        // the loser) submits second - the outcome must not depend on that order.
        protocol.submit(1, c(Rank::Ace, Suit::Spades), &mut hands, &mut sink).unwrap();
        protocol.submit(3, c(Rank::Ace, Suit::Hearts), &mut hands, &mut sink).unwrap();
        // Tie: the loser's (seat 3) card goes to head, third-place's (seat 1) to second.
        assert!(hands[0].contains(&c(Rank::Ace, Suit::Hearts)));
        assert!(hands[2].contains(&c(Rank::Ace, Suit::Spades)));
    }

    #[test]
    fn double_tribute_tie_is_independent_of_submission_order() {
        // Same state as above but the loser submits first - must produce the same links.
        let placements = [0u8, 2, 1, 3];
        let mut hands: [Vec<Card>; 4] = Default::default();
        hands[1] = vec![c(Rank::Ace, Suit::Spades)];
        hands[3] = vec![c(Rank::Ace, Suit::Hearts)];
        let mut sink = RecordingSink::default();
        let mut protocol = TributeProtocol::start(&placements, Rank::Seven, &hands, &mut sink);
        protocol.submit(3, c(Rank::Ace, Suit::Hearts), &mut hands, &mut sink).unwrap();
        protocol.submit(1, c(Rank::Ace, Suit::Spades), &mut hands, &mut sink).unwrap();
        assert!(hands[0].contains(&c(Rank::Ace, Suit::Hearts)));
        assert!(hands[2].contains(&c(Rank::Ace, Suit::Spades)));
    }

    #[test]
    fn resistance_skips_tribute_entirely() {
        let placements = [0u8, 1, 2, 3];
        let mut hands: [Vec<Card>; 4] = Default::default();
        hands[3] = vec![Card::big_joker(), Card::big_joker()];
        let mut sink = RecordingSink::default();
        let protocol = TributeProtocol::start(&placements, Rank::Two, &hands, &mut sink);
        assert!(protocol.is_done());
        assert!(sink.events.contains(&Event::TributeResisted { seat: 3 }));
    }
}
