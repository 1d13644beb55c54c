//! Seat-level decision policies, in the shape of the teacher's
//! `BotStrategy` trait (`infrastructure/bot/strategies/mod.rs`): stateless
//! callbacks the engine invokes with a snapshot, never a player object the
//! engine holds a reference back into (SPEC_FULL.md §9's "no cycles
//! between controller and players").

use crate::card::{Card, Rank};
use crate::classify::PlayInfo;
use crate::enumerate::legal_beaters;

/// What a seat wants to do on its turn: play a concrete set of cards, or
/// pass. The engine validates the choice exactly as it would a command
/// from an external caller - a policy cannot bypass HandClassifier/Comparator.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayChoice {
    Play(Vec<Card>),
    Pass,
}

/// Decides a seat's play given its hand and the play it must beat.
pub trait PlayPolicy {
    fn choose_play(&self, hand: &[Card], level: Rank, last_play: Option<&PlayInfo>) -> PlayChoice;
}

/// Decides a seat's tribute offer and, separately, its return-tribute card.
pub trait TributePolicy {
    /// Largest card under logical order of `level`, excluding heart-level
    /// wildcards unless none remain - SPEC_FULL.md §4.6 / §10.5.
    fn choose_tribute_offer(&self, hand: &[Card], level: Rank) -> Card;

    /// Any card preferred to be rank ≤10 and not a joker/level card.
    fn choose_tribute_return(&self, hand: &[Card], level: Rank) -> Card;
}

/// The engine's only bundled policy: always play the cheapest legal
/// beater, pass otherwise when not leading - the "legal-minimum-beater"
/// level named as the deliberate ceiling in spec.md's Non-goals.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplePolicy;

impl PlayPolicy for SimplePolicy {
    fn choose_play(&self, hand: &[Card], level: Rank, last_play: Option<&PlayInfo>) -> PlayChoice {
        match legal_beaters(hand, level, last_play).into_iter().next() {
            Some(play) => PlayChoice::Play(play.cards),
            None if last_play.is_none() => {
                // Leading with nothing legal is impossible for a non-empty hand
                // (any single card is a legal lead), but an empty hand has
                // already finished and is never asked to act.
                PlayChoice::Pass
            }
            None => PlayChoice::Pass,
        }
    }
}

impl TributePolicy for SimplePolicy {
    fn choose_tribute_offer(&self, hand: &[Card], level: Rank) -> Card {
        crate::card::largest_excluding_wild(hand, level)
    }

    fn choose_tribute_return(&self, hand: &[Card], level: Rank) -> Card {
        let preferred: Vec<Card> = hand
            .iter()
            .copied()
            .filter(|c| !c.rank.is_joker() && c.rank != level && c.rank.face_value().map_or(false, |v| v <= 10))
            .collect();
        let mut pool = if preferred.is_empty() { hand.to_vec() } else { preferred };
        crate::card::sort_by_level(&mut pool, level);
        *pool.first().expect("tribute receiver always holds at least one card")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn simple_policy_passes_when_no_beater_exists() {
        let hand = [c(Rank::Three, Suit::Spades)];
        let last = PlayInfo { kind: crate::classify::PlayKind::Single, primary: 200, size: 1 };
        let choice = SimplePolicy.choose_play(&hand, Rank::Two, Some(&last));
        assert_eq!(choice, PlayChoice::Pass);
    }

    #[test]
    fn simple_policy_leads_with_a_single_when_nothing_to_beat() {
        let hand = [c(Rank::Three, Suit::Spades)];
        let choice = SimplePolicy.choose_play(&hand, Rank::Two, None);
        assert_eq!(choice, PlayChoice::Play(vec![c(Rank::Three, Suit::Spades)]));
    }

    #[test]
    fn tribute_offer_excludes_heart_wildcard_when_alternative_exists() {
        let hand = [c(Rank::Two, Suit::Hearts), c(Rank::King, Suit::Spades)];
        let offer = SimplePolicy.choose_tribute_offer(&hand, Rank::Two);
        assert_eq!(offer, c(Rank::King, Suit::Spades));
    }

    #[test]
    fn tribute_offer_falls_back_to_wildcard_when_its_the_only_card() {
        let hand = [c(Rank::Two, Suit::Hearts)];
        let offer = SimplePolicy.choose_tribute_offer(&hand, Rank::Two);
        assert_eq!(offer, c(Rank::Two, Suit::Hearts));
    }
}
