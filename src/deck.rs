//! Two-deck shoe construction, shuffling and round-robin dealing.
//!
//! Mirrors the shuffle/deal shape of the teacher's
//! `domain::services::game_service::initialize_round`: a seedable RNG
//! (`ChaCha8Rng`, falling back to entropy when no seed is given) shuffles a
//! freshly built deck, then hands are dealt from the back of the vector.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::card::{Card, Suit, FACE_RANKS};

pub const SEATS: usize = 4;
pub const CARDS_PER_DEAL: usize = 27;
pub const SHOE_SIZE: usize = 108;

/// Build the 108-card two-deck shoe: two copies of the 52 standard cards
/// plus two Small Jokers and two Big Jokers.
pub fn new_shoe() -> Vec<Card> {
    let mut cards = Vec::with_capacity(SHOE_SIZE);
    for _ in 0..2 {
        for rank in FACE_RANKS {
            for suit in [Suit::Spades, Suit::Clubs, Suit::Diamonds, Suit::Hearts] {
                cards.push(Card::new(rank, suit));
            }
        }
        cards.push(Card::small_joker());
        cards.push(Card::big_joker());
    }
    debug_assert_eq!(cards.len(), SHOE_SIZE);
    cards
}

fn rng_from_seed(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Shuffle a fresh shoe and deal 27 cards to each of the 4 seats.
pub fn shuffle_and_deal(seed: Option<u64>) -> [Vec<Card>; SEATS] {
    let mut shoe = new_shoe();
    let mut rng = rng_from_seed(seed);
    shoe.shuffle(&mut rng);

    let mut hands: [Vec<Card>; SEATS] = Default::default();
    for hand in &mut hands {
        hand.reserve(CARDS_PER_DEAL);
    }
    for (i, card) in shoe.into_iter().enumerate() {
        hands[i % SEATS].push(card);
    }
    for hand in &hands {
        debug_assert_eq!(hand.len(), CARDS_PER_DEAL);
    }
    hands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shoe_has_108_cards() {
        assert_eq!(new_shoe().len(), SHOE_SIZE);
    }

    #[test]
    fn deal_is_exhaustive_and_even() {
        let hands = shuffle_and_deal(Some(7));
        let total: usize = hands.iter().map(|h| h.len()).sum();
        assert_eq!(total, SHOE_SIZE);
        for hand in &hands {
            assert_eq!(hand.len(), CARDS_PER_DEAL);
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = shuffle_and_deal(Some(42));
        let b = shuffle_and_deal(Some(42));
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_usually_differ() {
        let a = shuffle_and_deal(Some(1));
        let b = shuffle_and_deal(Some(2));
        assert_ne!(a, b);
    }
}
