//! HandClassifier: decide whether a set of cards is a legal play and
//! compute its comparison key.
//!
//! Grounded on `card_analyzer::is_valid_same_rank` / `is_valid_sequence`
//! from the native engine (group-by-rank, group-by-suit, let wildcards
//! fill the remaining slots) generalized from ZapZap's joker-only
//! wildcard to Guandan's heart-level wildcard plus the full rank/bomb
//! taxonomy in SPEC_FULL.md §4.1.

use serde::{Deserialize, Serialize};

use crate::card::{logical_order, Card, Rank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayKind {
    Invalid,
    Single,
    Pair,
    Trips,
    TripsWithPair,
    TriplePairs,
    SteelPlate,
    Straight,
    StraightFlush,
    Bomb,
    HeavenKing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayInfo {
    pub kind: PlayKind,
    pub primary: u32,
    pub size: u8,
}

impl PlayInfo {
    pub const INVALID: PlayInfo = PlayInfo { kind: PlayKind::Invalid, primary: 0, size: 0 };

    pub fn is_valid(&self) -> bool {
        self.kind != PlayKind::Invalid
    }
}

/// Split `cards` into heart-level wildcards and the rest, under `level`.
fn split_wild(cards: &[Card], level: Rank) -> (Vec<Card>, Vec<Card>) {
    let (wild, rest): (Vec<Card>, Vec<Card>) = cards.iter().copied().partition(|c| c.is_heart_wild(level));
    (wild, rest)
}

fn has_joker(cards: &[Card]) -> bool {
    cards.iter().any(|c| c.rank.is_joker())
}

fn is_heaven_king(cards: &[Card]) -> bool {
    if cards.len() != 4 {
        return false;
    }
    let small = cards.iter().filter(|c| c.rank == Rank::SmallJoker).count();
    let big = cards.iter().filter(|c| c.rank == Rank::BigJoker).count();
    small == 2 && big == 2
}

/// Same-rank structural check used by Single/Pair/Trips and plain bombs:
/// every non-wildcard card must share one rank. Returns that rank (or
/// `level` if every card given was a wildcard). A bare joker rank is
/// allowed here - callers must separately forbid padding a joker group
/// with wildcards, since a heart-level wildcard can't stand in for a joker.
fn uniform_rank(rest: &[Card], level: Rank) -> Option<Rank> {
    if rest.is_empty() {
        return Some(level);
    }
    let rank = rest[0].rank;
    if rest.iter().all(|c| c.rank == rank) {
        Some(rank)
    } else {
        None
    }
}

/// Plain bombs are the one combination a heart-level wildcard never
/// substitutes into (spec.md §3): every card must already share one
/// literal rank on its own. A wildcard whose *literal* rank happens to
/// equal that rank is just an ordinary card of that rank here, not a
/// substitution - so this never needs to look at which cards are wild.
fn try_bomb(cards: &[Card], level: Rank) -> Option<PlayInfo> {
    if cards.len() < 4 {
        return None;
    }
    let rank = cards[0].rank;
    if rank.is_joker() || !cards.iter().all(|c| c.rank == rank) {
        return None;
    }
    Some(PlayInfo { kind: PlayKind::Bomb, primary: logical_order(rank, level) as u32, size: cards.len() as u8 })
}

/// The nine valid straight "windows": the low Ace-to-five run, plus every
/// run of five consecutive face values from Three..Ace. Window start `1`
/// is the low run; its top card is reported with primary 5 per spec.
const STRAIGHT_WINDOWS: [(bool, u8); 9] =
    [(true, 1), (false, 3), (false, 4), (false, 5), (false, 6), (false, 7), (false, 8), (false, 9), (false, 10)];

fn window_position(rank: Rank, is_low: bool) -> Option<u8> {
    if is_low {
        match rank {
            Rank::Ace => Some(1),
            Rank::Two => Some(2),
            Rank::Three => Some(3),
            Rank::Four => Some(4),
            Rank::Five => Some(5),
            _ => None,
        }
    } else {
        match rank {
            Rank::Two | Rank::SmallJoker | Rank::BigJoker => None,
            r => r.face_value(),
        }
    }
}

/// Fit `rest` (plus up to `wild_count` filler cards) into one of the
/// straight windows. Returns the resulting `primary` on success.
fn try_straight_positions(rest: &[Card], wild_count: usize) -> Option<u32> {
    'window: for (is_low, start) in STRAIGHT_WINDOWS {
        let mut covered = [false; 5];
        for card in rest {
            let pos = match window_position(card.rank, is_low) {
                Some(p) if p >= start && p < start + 5 => p,
                _ => continue 'window,
            };
            let slot = (pos - start) as usize;
            if covered[slot] {
                continue 'window; // duplicate rank within the window
            }
            covered[slot] = true;
        }
        let missing = covered.iter().filter(|c| !**c).count();
        if missing <= wild_count {
            return Some(if is_low { 5 } else { (start + 4) as u32 });
        }
    }
    None
}

fn try_straight(cards: &[Card], level: Rank, require_flush: bool) -> Option<PlayInfo> {
    if cards.len() != 5 {
        return None;
    }
    let (wild, rest) = split_wild(cards, level);
    if has_joker(&rest) {
        return None;
    }
    if require_flush && !rest.is_empty() {
        let suit = rest[0].suit;
        if !rest.iter().all(|c| c.suit == suit) {
            return None;
        }
    }
    let primary = try_straight_positions(&rest, wild.len())?;
    Some(PlayInfo {
        kind: if require_flush { PlayKind::StraightFlush } else { PlayKind::Straight },
        primary,
        size: 5,
    })
}

/// Count solid (non-wildcard, non-joker) cards of each rank among `rest`.
fn rank_counts(rest: &[Card]) -> std::collections::HashMap<Rank, u8> {
    let mut counts = std::collections::HashMap::new();
    for c in rest {
        *counts.entry(c.rank).or_insert(0) += 1;
    }
    counts
}

fn try_trips_with_pair(cards: &[Card], level: Rank) -> Option<PlayInfo> {
    if cards.len() != 5 {
        return None;
    }
    let (wild, rest) = split_wild(cards, level);
    if has_joker(&rest) {
        return None;
    }
    let counts = rank_counts(&rest);
    // HashMap iteration order is randomized per process; sort so the
    // first-successful-rule tie-break below depends only on the cards.
    let mut ranks: Vec<Rank> = counts.keys().copied().collect();
    ranks.sort_unstable_by_key(|&r| logical_order(r, level));
    if ranks.len() > 2 {
        return None;
    }
    let candidates: Vec<Rank> = if ranks.is_empty() {
        vec![] // impossible: 5 cards can't all be wildcards (max 2 exist)
    } else if ranks.len() == 1 {
        vec![ranks[0]]
    } else {
        ranks
    };
    for &triple_rank in &candidates {
        let pair_rank_candidates: Vec<Rank> = if candidates.len() == 2 {
            vec![*candidates.iter().find(|&&r| r != triple_rank)?]
        } else {
            // Only one solid rank present; the other slot is pure wildcard,
            // which can stand in for any rank distinct from triple_rank -
            // classify() only checks structure, not which rank "wins".
            other_face_ranks(triple_rank)
        };
        for pair_rank in pair_rank_candidates {
            let c_triple = *counts.get(&triple_rank).unwrap_or(&0);
            let c_pair = *counts.get(&pair_rank).unwrap_or(&0);
            if c_triple > 3 || c_pair > 2 {
                continue;
            }
            let need_triple = 3 - c_triple;
            let need_pair = 2 - c_pair;
            if c_triple + c_pair + need_triple as u8 + need_pair as u8 != 5 {
                continue;
            }
            if (need_triple + need_pair) as usize <= wild.len() {
                return Some(PlayInfo {
                    kind: PlayKind::TripsWithPair,
                    primary: logical_order(triple_rank, level) as u32,
                    size: 5,
                });
            }
        }
    }
    None
}

fn other_face_ranks(exclude: Rank) -> Vec<Rank> {
    crate::card::FACE_RANKS.iter().copied().filter(|&r| r != exclude).collect()
}

/// Shared engine for SteelPlate (3x2 consecutive ranks) and TriplePairs
/// (2x3 consecutive ranks): `run_len` consecutive ranks each needing
/// `per_rank` copies.
fn try_consecutive_run(cards: &[Card], level: Rank, run_len: u8, per_rank: u8, kind: PlayKind) -> Option<PlayInfo> {
    if cards.len() != (run_len * per_rank) as usize {
        return None;
    }
    let (wild, rest) = split_wild(cards, level);
    if has_joker(&rest) {
        return None;
    }
    let counts = rank_counts(&rest);
    let max_start = 14 - run_len + 1;
    for start in 2..=max_start {
        let ranks: Vec<Rank> = (start..start + run_len).filter_map(Rank::from_face_value).collect();
        if ranks.len() != run_len as usize {
            continue;
        }
        let mut used = 0u8;
        let mut deficit = 0u8;
        let mut ok = true;
        for &r in &ranks {
            let c = *counts.get(&r).unwrap_or(&0);
            if c > per_rank {
                ok = false;
                break;
            }
            used += c;
            deficit += per_rank - c;
        }
        if !ok || used != rest.len() as u8 {
            continue;
        }
        if deficit as usize <= wild.len() {
            let top = ranks[ranks.len() - 1];
            return Some(PlayInfo { kind, primary: logical_order(top, level) as u32, size: cards.len() as u8 });
        }
    }
    None
}

/// Classify `cards` under level rank `level`. Never panics, never mutates
/// the input; returns `PlayInfo::INVALID` on any structural mismatch.
pub fn classify(cards: &[Card], level: Rank) -> PlayInfo {
    if cards.is_empty() {
        return PlayInfo::INVALID;
    }

    if is_heaven_king(cards) {
        let (wild, _) = split_wild(cards, level);
        if wild.is_empty() {
            return PlayInfo { kind: PlayKind::HeavenKing, primary: u32::MAX, size: 4 };
        }
    }

    if cards.len() >= 6 {
        if let Some(info) = try_bomb(cards, level) {
            return info;
        }
        if cards.len() == 6 {
            if let Some(info) = try_consecutive_run(cards, level, 2, 3, PlayKind::SteelPlate) {
                return info;
            }
            if let Some(info) = try_consecutive_run(cards, level, 3, 2, PlayKind::TriplePairs) {
                return info;
            }
        }
        return PlayInfo::INVALID;
    }

    if cards.len() == 5 {
        if let Some(info) = try_straight(cards, level, true) {
            return info;
        }
        if let Some(info) = try_bomb(cards, level) {
            return info;
        }
        if let Some(info) = try_trips_with_pair(cards, level) {
            return info;
        }
        if let Some(info) = try_straight(cards, level, false) {
            return info;
        }
        return PlayInfo::INVALID;
    }

    if cards.len() == 4 {
        return try_bomb(cards, level).unwrap_or(PlayInfo::INVALID);
    }

    let (wild, rest) = split_wild(cards, level);
    match uniform_rank(&rest, level) {
        Some(rank) if wild.len() + rest.len() == cards.len() && !(rank.is_joker() && !wild.is_empty()) => {
            let kind = match cards.len() {
                1 => PlayKind::Single,
                2 => PlayKind::Pair,
                3 => PlayKind::Trips,
                _ => return PlayInfo::INVALID,
            };
            PlayInfo { kind, primary: logical_order(rank, level) as u32, size: cards.len() as u8 }
        }
        _ => PlayInfo::INVALID,
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
    fn single_no_wildcard() {
        let info = classify(&[c(Rank::Seven, Suit::Hearts)], Rank::Two);
        assert_eq!(info.kind, PlayKind::Single);
    }

    #[test]
    fn wildcard_completes_a_pair() {
        // L=3: heart-3 is the wildcard, pairs with a plain King.
        let info = classify(&[c(Rank::Three, Suit::Hearts), c(Rank::King, Suit::Spades)], Rank::Three);
        assert_eq!(info.kind, PlayKind::Pair);
        assert_eq!(info.primary, logical_order(Rank::King, Rank::Three) as u32);
    }

    #[test]
    fn heaven_king_needs_all_four_jokers() {
        let cards = [Card::small_joker(), Card::small_joker(), Card::big_joker(), Card::big_joker()];
        assert_eq!(classify(&cards, Rank::Two).kind, PlayKind::HeavenKing);
    }

    #[test]
    fn bomb_sizes_escalate_past_straight_flush() {
        let bomb4 = [
            c(Rank::Queen, Suit::Spades),
            c(Rank::Queen, Suit::Clubs),
            c(Rank::Queen, Suit::Diamonds),
            c(Rank::Queen, Suit::Hearts),
        ];
        assert_eq!(classify(&bomb4, Rank::Two).kind, PlayKind::Bomb);
    }

    #[test]
    fn wildcard_cannot_pad_a_bomb_of_a_different_rank() {
        // L=Two: heart-Two is the wildcard. 3 solid Queens plus it must not
        // classify as a 4-Queen bomb - plain bombs never take wildcards.
        let cards = [
            c(Rank::Queen, Suit::Spades),
            c(Rank::Queen, Suit::Clubs),
            c(Rank::Queen, Suit::Diamonds),
            c(Rank::Two, Suit::Hearts),
        ];
        assert_eq!(classify(&cards, Rank::Two).kind, PlayKind::Invalid);
    }

    #[test]
    fn straight_flush_rejects_mixed_suits() {
        let cards = [
            c(Rank::Five, Suit::Spades),
            c(Rank::Six, Suit::Spades),
            c(Rank::Seven, Suit::Clubs),
            c(Rank::Eight, Suit::Spades),
            c(Rank::Nine, Suit::Spades),
        ];
        assert_ne!(classify(&cards, Rank::Two).kind, PlayKind::StraightFlush);
    }

    #[test]
    fn low_ace_straight_has_primary_five() {
        let cards = [
            c(Rank::Ace, Suit::Spades),
            c(Rank::Two, Suit::Clubs),
            c(Rank::Three, Suit::Diamonds),
            c(Rank::Four, Suit::Hearts),
            c(Rank::Five, Suit::Spades),
        ];
        let info = classify(&cards, Rank::Seven);
        assert_eq!(info.kind, PlayKind::Straight);
        assert_eq!(info.primary, 5);
    }

    #[test]
    fn straight_rejects_bare_two() {
        let cards = [
            c(Rank::Two, Suit::Spades),
            c(Rank::Three, Suit::Clubs),
            c(Rank::Four, Suit::Diamonds),
            c(Rank::Five, Suit::Hearts),
            c(Rank::Six, Suit::Spades),
        ];
        assert_eq!(classify(&cards, Rank::King).kind, PlayKind::Invalid);
    }

    #[test]
    fn trips_with_pair_identifies_triple_rank() {
        let cards = [
            c(Rank::Nine, Suit::Spades),
            c(Rank::Nine, Suit::Clubs),
            c(Rank::Nine, Suit::Diamonds),
            c(Rank::Four, Suit::Hearts),
            c(Rank::Four, Suit::Spades),
        ];
        let info = classify(&cards, Rank::Two);
        assert_eq!(info.kind, PlayKind::TripsWithPair);
        assert_eq!(info.primary, logical_order(Rank::Nine, Rank::Two) as u32);
    }

    #[test]
    fn lone_joker_is_a_valid_single() {
        let info = classify(&[Card::small_joker()], Rank::Two);
        assert_eq!(info.kind, PlayKind::Single);
    }

    #[test]
    fn joker_pair_is_valid_without_wildcard_padding() {
        let cards = [Card::small_joker(), Card::small_joker()];
        assert_eq!(classify(&cards, Rank::Two).kind, PlayKind::Pair);
    }

    #[test]
    fn wildcard_cannot_pad_a_joker_group() {
        // One Small Joker plus a heart-level wildcard must not classify as a pair.
        let cards = [Card::small_joker(), c(Rank::Five, Suit::Hearts)];
        assert_eq!(classify(&cards, Rank::Five).kind, PlayKind::Invalid);
    }

    #[test]
    fn order_insensitive() {
        let a = [c(Rank::Nine, Suit::Spades), c(Rank::Nine, Suit::Clubs), c(Rank::Nine, Suit::Diamonds)];
        let mut b = a;
        b.reverse();
        assert_eq!(classify(&a, Rank::Two), classify(&b, Rank::Two));
    }
}
