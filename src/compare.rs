//! Comparator: decide whether one play beats another under the bomb
//! hierarchy. Grounded on SPEC_FULL.md §4.2; the bomb-size tier formula
//! (`10 * size`) makes "higher size breaks ties" fall out of ordinary
//! integer comparison rather than needing a special case.

use crate::classify::{PlayInfo, PlayKind};

fn tier(info: &PlayInfo) -> u64 {
    match info.kind {
        PlayKind::HeavenKing => u64::MAX,
        PlayKind::Bomb if info.size >= 6 => 10 * info.size as u64,
        PlayKind::StraightFlush => 55,
        PlayKind::Bomb if info.size == 5 => 50,
        PlayKind::Bomb if info.size == 4 => 40,
        _ => 0,
    }
}

/// True iff `cur` legally beats `last` (or, when `last` is `None`, iff
/// `cur` is simply a valid play - the lead seat has nothing to beat).
pub fn beats(cur: &PlayInfo, last: Option<&PlayInfo>) -> bool {
    if !cur.is_valid() {
        return false;
    }
    let last = match last {
        None => return true,
        Some(l) => l,
    };
    if cur.kind == PlayKind::HeavenKing {
        return last.kind != PlayKind::HeavenKing;
    }
    if last.kind == PlayKind::HeavenKing {
        return false;
    }

    let (cur_tier, last_tier) = (tier(cur), tier(last));
    if cur_tier > 0 || last_tier > 0 {
        if cur_tier != last_tier {
            cur_tier > last_tier
        } else {
            cur.primary > last.primary
        }
    } else {
        cur.kind == last.kind && cur.size == last.size && cur.primary > last.primary
    }
}
