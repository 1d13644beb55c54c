//! PlayEnumerator: list the legal plays reachable from a hand.
//!
//! Grounded on the native engine's `card_analyzer` approach of grouping a
//! hand by rank before testing shapes, generalized to Guandan's wildcard
//! and straight-window rules. The binding invariant (SPEC_FULL.md §4.3) is
//! that every returned play is `classify`-valid, not that every physical
//! combination of cards is surfaced - `SimplePolicy` only ever needs one
//! canonical representative per distinct (kind, primary, size), so this
//! picks the lowest-indexed cards able to form each shape instead of
//! exploring every suit permutation.

use std::collections::HashMap;

use crate::card::{Card, Rank, FACE_RANKS};
use crate::classify::{classify, PlayInfo, PlayKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Play {
    pub cards: Vec<Card>,
    pub info: PlayInfo,
}

fn is_wild(card: Card, level: Rank) -> bool {
    card.is_heart_wild(level)
}

/// Group non-wildcard cards by rank, preserving hand order within each group.
fn group_by_rank(hand: &[Card], level: Rank) -> HashMap<Rank, Vec<Card>> {
    let mut groups: HashMap<Rank, Vec<Card>> = HashMap::new();
    for &card in hand {
        if !is_wild(card, level) {
            groups.entry(card.rank).or_default().push(card);
        }
    }
    groups
}

fn wild_cards(hand: &[Card], level: Rank) -> Vec<Card> {
    hand.iter().copied().filter(|&c| is_wild(c, level)).collect()
}

fn push_if_valid(out: &mut Vec<Play>, cards: Vec<Card>, level: Rank) {
    let info = classify(&cards, level);
    if info.is_valid() {
        out.push(Play { cards, info });
    }
}

/// Same-rank shapes: Single, Pair, Trips, Bomb. One rank at a time, padded
/// with wildcards only when the hand doesn't already have enough solids.
fn enumerate_same_rank(hand: &[Card], level: Rank, out: &mut Vec<Play>) {
    let groups = group_by_rank(hand, level);
    let wild = wild_cards(hand, level);
    let max_size = (hand.len()).min(8);

    for (&rank, solids) in &groups {
        for size in 1..=max_size {
            if rank.is_joker() && size > solids.len() {
                continue; // wildcards can't pad a joker group
            }
            let cards: Vec<Card> = if size <= solids.len() {
                solids.iter().copied().take(size).collect()
            } else {
                let need = size - solids.len();
                if need > wild.len() {
                    continue;
                }
                let mut cards: Vec<Card> = solids.iter().copied().collect();
                cards.extend(wild.iter().copied().take(need));
                cards
            };
            push_if_valid(out, cards, level);
        }
    }

    // A pair/bomb built entirely out of the level's own heart wildcards
    // (e.g. two heart-level cards with no other solid of that rank).
    if !wild.is_empty() && !groups.contains_key(&level) {
        for size in 1..=wild.len().min(4) {
            push_if_valid(out, wild.iter().copied().take(size).collect(), level);
        }
    }
}

/// Straight / straight-flush: slide each of the nine windows across the
/// hand's solids, topping up with wildcards exactly as `classify` would
/// accept, then hand the assembled cards to `classify` for confirmation.
fn enumerate_straights(hand: &[Card], level: Rank, out: &mut Vec<Play>) {
    let groups = group_by_rank(hand, level);
    let wild = wild_cards(hand, level);

    for low in [true, false] {
        let starts: Vec<u8> = if low { vec![1] } else { (3..=10).collect() };
        for start in starts {
            let window_ranks: Vec<Rank> = if low {
                [Rank::Ace, Rank::Two, Rank::Three, Rank::Four, Rank::Five].to_vec()
            } else {
                (start..start + 5).filter_map(Rank::from_face_value).collect()
            };
            if window_ranks.len() != 5 {
                continue;
            }
            // Suit-blind straight: one solid per rank slot if present.
            let mut picked: Vec<Card> = Vec::new();
            let mut missing = 0usize;
            for &r in &window_ranks {
                match groups.get(&r).and_then(|g| g.first()) {
                    Some(&card) => picked.push(card),
                    None => missing += 1,
                }
            }
            if missing <= wild.len() {
                let mut cards = picked.clone();
                cards.extend(wild.iter().copied().take(missing));
                push_if_valid(out, cards, level);

                // Flush variant: only meaningful when the solids actually share a suit.
                if let Some(&suit) = picked.first().map(|c| &c.suit) {
                    if picked.iter().all(|c| c.suit == suit) {
                        if let Some(flush_cards) = flush_window(&groups, &window_ranks, suit, wild.len()) {
                            push_if_valid(out, flush_cards, level);
                        }
                    }
                }
            }
        }
    }
}

fn flush_window(groups: &HashMap<Rank, Vec<Card>>, window: &[Rank], suit: crate::card::Suit, wild_len: usize) -> Option<Vec<Card>> {
    let mut cards = Vec::new();
    let mut missing = 0;
    for &r in window {
        match groups.get(&r).and_then(|g| g.iter().find(|c| c.suit == suit)) {
            Some(&card) => cards.push(card),
            None => missing += 1,
        }
    }
    if missing <= wild_len {
        Some(cards)
    } else {
        None
    }
}

/// Trips-with-pair: for each candidate triple rank, pair it with every
/// other rank that has at least one solid (or is reachable via wildcard).
fn enumerate_trips_with_pair(hand: &[Card], level: Rank, out: &mut Vec<Play>) {
    let groups = group_by_rank(hand, level);
    let wild = wild_cards(hand, level);

    for &triple_rank in &FACE_RANKS {
        let triple_solids = groups.get(&triple_rank).map(|g| g.len()).unwrap_or(0);
        if triple_solids > 3 {
            continue;
        }
        let triple_need = 3 - triple_solids;
        if triple_need > wild.len() {
            continue;
        }
        for &pair_rank in &FACE_RANKS {
            if pair_rank == triple_rank {
                continue;
            }
            let pair_solids = groups.get(&pair_rank).map(|g| g.len()).unwrap_or(0);
            if pair_solids > 2 {
                continue;
            }
            let pair_need = 2 - pair_solids;
            if triple_need + pair_need > wild.len() {
                continue;
            }
            let mut cards: Vec<Card> = groups.get(&triple_rank).cloned().unwrap_or_default();
            cards.truncate(3);
            cards.extend(groups.get(&pair_rank).cloned().unwrap_or_default().into_iter().take(2));
            cards.extend(wild.iter().copied().take(triple_need + pair_need));
            push_if_valid(out, cards, level);
        }
    }
}

/// SteelPlate (3x2 consecutive ranks) and TriplePairs (2x3 consecutive ranks).
fn enumerate_consecutive_runs(hand: &[Card], level: Rank, out: &mut Vec<Play>) {
    let groups = group_by_rank(hand, level);
    let wild = wild_cards(hand, level);

    for (run_len, per_rank) in [(2u8, 3u8), (3, 2)] {
        let max_start = 14 - run_len + 1;
        for start in 2..=max_start {
            let ranks: Vec<Rank> = (start..start + run_len).filter_map(Rank::from_face_value).collect();
            if ranks.len() != run_len as usize {
                continue;
            }
            let mut cards = Vec::new();
            let mut deficit = 0usize;
            for &r in &ranks {
                let solids = groups.get(&r).cloned().unwrap_or_default();
                if solids.len() as u8 > per_rank {
                    deficit = usize::MAX;
                    break;
                }
                deficit += (per_rank as usize) - solids.len();
                cards.extend(solids.into_iter().take(per_rank as usize));
            }
            if deficit <= wild.len() {
                cards.extend(wild.iter().copied().take(deficit));
                push_if_valid(out, cards, level);
            }
        }
    }
}

fn heaven_king(hand: &[Card], level: Rank, out: &mut Vec<Play>) {
    let small = hand.iter().filter(|c| c.rank == Rank::SmallJoker).count();
    let big = hand.iter().filter(|c| c.rank == Rank::BigJoker).count();
    if small >= 2 && big >= 2 {
        let mut cards: Vec<Card> = hand.iter().copied().filter(|c| c.rank == Rank::SmallJoker).take(2).collect();
        cards.extend(hand.iter().copied().filter(|c| c.rank == Rank::BigJoker).take(2));
        push_if_valid(out, cards, level);
    }
}

fn canonical_signature(play: &Play) -> (PlayKind, u32, u8) {
    (play.info.kind, play.info.primary, play.info.size)
}

/// All distinct (kind, primary, size) plays reachable from `hand` under
/// `level`, each with one concrete set of cards realizing it.
pub fn enumerate(hand: &[Card], level: Rank) -> Vec<Play> {
    let mut out = Vec::new();
    heaven_king(hand, level, &mut out);
    enumerate_same_rank(hand, level, &mut out);
    enumerate_straights(hand, level, &mut out);
    enumerate_trips_with_pair(hand, level, &mut out);
    enumerate_consecutive_runs(hand, level, &mut out);

    let mut seen = std::collections::HashSet::new();
    out.retain(|p| seen.insert(canonical_signature(p)));
    out
}

/// Every play in `hand` that legally beats `last` (or any play, when
/// leading). Sorted ascending by comparator strength so policies can pick
/// the cheapest beater first.
pub fn legal_beaters(hand: &[Card], level: Rank, last: Option<&PlayInfo>) -> Vec<Play> {
    let mut plays: Vec<Play> = enumerate(hand, level).into_iter().filter(|p| crate::compare::beats(&p.info, last)).collect();
    plays.sort_by_key(|p| (p.info.kind != PlayKind::HeavenKing, p.info.size, p.info.primary));
    plays
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{logical_order, Suit};

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn every_enumerated_play_is_classify_valid() {
        let hand = [
            c(Rank::Three, Suit::Spades),
            c(Rank::Three, Suit::Clubs),
            c(Rank::Four, Suit::Diamonds),
            c(Rank::Five, Suit::Hearts),
            c(Rank::Six, Suit::Spades),
            c(Rank::Seven, Suit::Clubs),
            c(Rank::King, Suit::Spades),
            c(Rank::King, Suit::Hearts),
        ];
        for play in enumerate(&hand, Rank::Two) {
            assert!(play.info.is_valid());
            assert_eq!(classify(&play.cards, Rank::Two), play.info);
        }
    }

    #[test]
    fn finds_a_pair_and_a_straight() {
        let hand = [
            c(Rank::King, Suit::Spades),
            c(Rank::King, Suit::Hearts),
            c(Rank::Three, Suit::Spades),
            c(Rank::Four, Suit::Clubs),
            c(Rank::Five, Suit::Diamonds),
            c(Rank::Six, Suit::Hearts),
            c(Rank::Seven, Suit::Spades),
        ];
        let plays = enumerate(&hand, Rank::Two);
        assert!(plays.iter().any(|p| p.info.kind == PlayKind::Pair));
        assert!(plays.iter().any(|p| p.info.kind == PlayKind::Straight));
    }

    #[test]
    fn heart_wildcard_opens_extra_pairs() {
        let hand = [c(Rank::Five, Suit::Hearts), c(Rank::Queen, Suit::Spades), c(Rank::Jack, Suit::Clubs)];
        let plays = enumerate(&hand, Rank::Five);
        assert!(plays.iter().any(|p| p.info.kind == PlayKind::Pair && p.cards.contains(&c(Rank::Queen, Suit::Spades))));
        assert!(plays.iter().any(|p| p.info.kind == PlayKind::Pair && p.cards.contains(&c(Rank::Jack, Suit::Clubs))));
    }

    #[test]
    fn legal_beaters_excludes_non_beating_plays() {
        let hand = [c(Rank::Four, Suit::Spades), c(Rank::Four, Suit::Hearts), c(Rank::King, Suit::Spades)];
        let last = PlayInfo { kind: PlayKind::Pair, primary: logical_order(Rank::Queen, Rank::Two) as u32, size: 2 };
        let beaters = legal_beaters(&hand, Rank::Two, Some(&last));
        assert!(beaters.iter().all(|p| crate::compare::beats(&p.info, Some(&last))));
    }
}
