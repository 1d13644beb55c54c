//! Cards, ranks, suits and the level-dependent logical ordering.
//!
//! `Rank` intentionally has no `Ord` impl: whether one rank outranks
//! another depends on the deal's level rank (see [`logical_order`]), so a
//! context-free `Ord` would silently be wrong half the time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Spades,
    Clubs,
    Diamonds,
    Hearts,
    /// Only valid on jokers.
    None,
}

impl Suit {
    pub fn glyph(self) -> &'static str {
        match self {
            Suit::Spades => "\u{2660}",
            Suit::Clubs => "\u{2663}",
            Suit::Diamonds => "\u{2666}",
            Suit::Hearts => "\u{2665}",
            Suit::None => "",
        }
    }

    fn from_glyph(s: &str) -> Option<Self> {
        match s {
            "\u{2660}" => Some(Suit::Spades),
            "\u{2663}" => Some(Suit::Clubs),
            "\u{2666}" => Some(Suit::Diamonds),
            "\u{2665}" => Some(Suit::Hearts),
            "" => Some(Suit::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
    Two,
    SmallJoker,
    BigJoker,
}

pub const FACE_RANKS: [Rank; 13] = [
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
    Rank::Two,
];

impl Rank {
    pub fn is_joker(self) -> bool {
        matches!(self, Rank::SmallJoker | Rank::BigJoker)
    }

    /// Face value used by straights: Two=2 .. Ace=14. Jokers have none.
    pub fn face_value(self) -> Option<u8> {
        match self {
            Rank::Three => Some(3),
            Rank::Four => Some(4),
            Rank::Five => Some(5),
            Rank::Six => Some(6),
            Rank::Seven => Some(7),
            Rank::Eight => Some(8),
            Rank::Nine => Some(9),
            Rank::Ten => Some(10),
            Rank::Jack => Some(11),
            Rank::Queen => Some(12),
            Rank::King => Some(13),
            Rank::Ace => Some(14),
            Rank::Two => Some(2),
            Rank::SmallJoker | Rank::BigJoker => None,
        }
    }

    pub fn from_face_value(v: u8) -> Option<Rank> {
        FACE_RANKS.iter().copied().find(|r| r.face_value() == Some(v))
    }

    fn token(self) -> &'static str {
        match self {
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::SmallJoker => "jokerSmall",
            Rank::BigJoker => "jokerBig",
        }
    }

    fn from_token(s: &str) -> Option<Rank> {
        match s {
            "3" => Some(Rank::Three),
            "4" => Some(Rank::Four),
            "5" => Some(Rank::Five),
            "6" => Some(Rank::Six),
            "7" => Some(Rank::Seven),
            "8" => Some(Rank::Eight),
            "9" => Some(Rank::Nine),
            "10" => Some(Rank::Ten),
            "J" => Some(Rank::Jack),
            "Q" => Some(Rank::Queen),
            "K" => Some(Rank::King),
            "A" => Some(Rank::Ace),
            "2" => Some(Rank::Two),
            "jokerSmall" => Some(Rank::SmallJoker),
            "jokerBig" => Some(Rank::BigJoker),
            _ => None,
        }
    }
}

/// Logical order of `rank` under level rank `level`: `2<3<...<10<J<Q<K<A<L<SmallJoker<BigJoker`.
/// When `level` is Two, the "2" is lifted to sit just below the jokers instead of at the bottom.
pub fn logical_order(rank: Rank, level: Rank) -> u8 {
    match rank {
        Rank::BigJoker => 17,
        Rank::SmallJoker => 16,
        r if r == level => 15,
        r => r.face_value().expect("non-joker, non-level rank always has a face value"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Card { rank, suit }
    }

    pub fn small_joker() -> Self {
        Card::new(Rank::SmallJoker, Suit::None)
    }

    pub fn big_joker() -> Self {
        Card::new(Rank::BigJoker, Suit::None)
    }

    /// True iff this card is a heart-level wildcard under `level`.
    pub fn is_heart_wild(self, level: Rank) -> bool {
        self.suit == Suit::Hearts && self.rank == level
    }

    pub fn encode(self) -> String {
        format!("{}{}", self.suit.glyph(), self.rank.token())
    }

    pub fn decode(s: &str) -> Option<Card> {
        for len in (0..=s.len()).rev() {
            if !s.is_char_boundary(len) {
                continue;
            }
            let (suit_part, rank_part) = s.split_at(len);
            if let (Some(suit), Some(rank)) = (Suit::from_glyph(suit_part), Rank::from_token(rank_part)) {
                return Some(Card::new(rank, suit));
            }
        }
        None
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

/// The tribute payer's offer: the largest card under logical order of
/// `level`, excluding heart-level wildcards unless none remain (§4.6).
pub fn largest_excluding_wild(cards: &[Card], level: Rank) -> Card {
    let mut pool: Vec<Card> = cards.iter().copied().filter(|c| !c.is_heart_wild(level)).collect();
    if pool.is_empty() {
        pool = cards.to_vec();
    }
    sort_by_level(&mut pool, level);
    *pool.last().expect("tribute payer always holds at least one card")
}

/// Sort cards by logical order under `level`, for canonical/deduped representations.
pub fn sort_by_level(cards: &mut [Card], level: Rank) {
    cards.sort_unstable_by(|a, b| {
        logical_order(a.rank, level)
            .cmp(&logical_order(b.rank, level))
            .then_with(|| format!("{:?}", a.suit).cmp(&format!("{:?}", b.suit)))
    });
}
