use std::fmt;

use crate::api::Player;

/// What the points cell actually shows for one player. Depends on the whole
/// roster, not just the player: once anyone holds advantage, only the holder's
/// cell carries a marker and everyone else's goes blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsDisplay {
    Tiebreak(u32),
    Advantage,
    Blank,
    Points(u32),
}

impl fmt::Display for PointsDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointsDisplay::Tiebreak(n) => write!(f, "{n}"),
            PointsDisplay::Advantage => write!(f, "Ad"),
            PointsDisplay::Blank => Ok(()),
            PointsDisplay::Points(n) => write!(f, "{n}"),
        }
    }
}

/// First matching rule wins; the order is part of the contract. Tiebreak mode
/// beats an advantage flag, and a roster-wide advantage scan beats the plain
/// point count.
pub fn resolve_points(player: &Player, roster: &[Player]) -> PointsDisplay {
    if player.tiebreak {
        return PointsDisplay::Tiebreak(player.tiebreak_points);
    }
    if player.advantage {
        return PointsDisplay::Advantage;
    }
    if roster.iter().any(|p| p.advantage) {
        return PointsDisplay::Blank;
    }
    PointsDisplay::Points(player.points)
}

/// One column per completed set, sized by whichever player has more; never
/// zero columns even before the first set finishes.
pub fn set_column_count(roster: &[Player]) -> usize {
    roster
        .iter()
        .map(|p| p.sets.len())
        .max()
        .unwrap_or(0)
        .max(1)
}

/// A player's cell for set column `idx`: the recorded games if that set
/// exists for them, otherwise blank. Missing cells are not padded with zeros.
pub fn set_cell(player: &Player, idx: usize) -> String {
    player
        .sets
        .get(idx)
        .map(|games| games.to_string())
        .unwrap_or_default()
}
