//! Shared enums used across the kernel: colors, card types, zones, turn
//! structure, counters and keywords.
//!
//! Subtypes (creature types, land types) are not enumerated exhaustively the
//! way a full card database would: they are opaque, interned-free strings.
//! The kernel only ever needs to compare them for equality or membership, and
//! the handful of basic land subtypes get their own small enum because the
//! layer engine's basic-land-type scenario (DESIGN.md, Blood Moon) depends on
//! them directly.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];
}

/// Bitset of colors; colorless is the empty set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorSet(u8);

impl ColorSet {
    pub const COLORLESS: Self = Self(0);

    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn from_color(color: Color) -> Self {
        Self(1 << color as u8)
    }

    pub fn from_colors(colors: impl IntoIterator<Item = Color>) -> Self {
        colors.into_iter().fold(Self::new(), |acc, c| acc.with(c))
    }

    pub const fn with(self, color: Color) -> Self {
        Self(self.0 | (1 << color as u8))
    }

    pub const fn contains(self, color: Color) -> bool {
        self.0 & (1 << color as u8) != 0
    }

    pub const fn is_colorless(self) -> bool {
        self.0 == 0
    }

    pub fn colors(self) -> impl Iterator<Item = Color> {
        Color::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Supertype {
    Basic,
    Legendary,
    Snow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardType {
    Land,
    Creature,
    Artifact,
    Enchantment,
    Planeswalker,
    Instant,
    Sorcery,
    Battle,
    Kindred,
}

impl CardType {
    pub fn is_permanent(self) -> bool {
        !matches!(self, CardType::Instant | CardType::Sorcery)
    }
}

/// The five basic land subtypes, called out specially because continuous
/// effects that grant or strip basic land types (Blood Moon, Urborg) key off
/// them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicLandType {
    Plains,
    Island,
    Swamp,
    Mountain,
    Forest,
}

impl BasicLandType {
    pub fn produces(self) -> Color {
        match self {
            BasicLandType::Plains => Color::White,
            BasicLandType::Island => Color::Blue,
            BasicLandType::Swamp => Color::Black,
            BasicLandType::Mountain => Color::Red,
            BasicLandType::Forest => Color::Green,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BasicLandType::Plains => "Plains",
            BasicLandType::Island => "Island",
            BasicLandType::Swamp => "Swamp",
            BasicLandType::Mountain => "Mountain",
            BasicLandType::Forest => "Forest",
        }
    }
}

/// Any other subtype (creature type, artifact type, nonbasic land type, …).
/// Opaque on purpose: the kernel never branches on a specific value, only on
/// equality, so a database-supplied string is sufficient.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subtype(pub String);

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Subtype {
    fn from(value: &str) -> Self {
        Subtype(value.to_string())
    }
}

/// The seven zones (§3). Every object is in exactly one at a time (I1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Stack,
    Exile,
    Command,
}

impl Zone {
    pub fn is_public(self) -> bool {
        matches!(
            self,
            Zone::Battlefield | Zone::Graveyard | Zone::Stack | Zone::Exile | Zone::Command
        )
    }

    pub fn is_hidden(self) -> bool {
        matches!(self, Zone::Library | Zone::Hand)
    }

    pub fn is_ordered(self) -> bool {
        matches!(self, Zone::Library | Zone::Stack | Zone::Graveyard)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Beginning,
    PrecombatMain,
    Combat,
    PostcombatMain,
    Ending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    Untap,
    Upkeep,
    Draw,
    BeginCombat,
    DeclareAttackers,
    DeclareBlockers,
    FirstStrikeDamage,
    CombatDamage,
    EndCombat,
    End,
    Cleanup,
}

impl Step {
    pub fn phase(self) -> Phase {
        match self {
            Step::Untap | Step::Upkeep | Step::Draw => Phase::Beginning,
            Step::BeginCombat
            | Step::DeclareAttackers
            | Step::DeclareBlockers
            | Step::FirstStrikeDamage
            | Step::CombatDamage
            | Step::EndCombat => Phase::Combat,
            Step::End | Step::Cleanup => Phase::Ending,
        }
    }

    /// Steps where nobody is given priority under ordinary rules (§4.9).
    pub fn grants_priority(self) -> bool {
        !matches!(self, Step::Untap | Step::Cleanup)
    }

    pub fn next(self) -> Step {
        use Step::*;
        match self {
            Untap => Upkeep,
            Upkeep => Draw,
            Draw => BeginCombat,
            BeginCombat => DeclareAttackers,
            DeclareAttackers => DeclareBlockers,
            DeclareBlockers => FirstStrikeDamage,
            FirstStrikeDamage => CombatDamage,
            CombatDamage => EndCombat,
            EndCombat => End,
            End => Cleanup,
            Cleanup => Untap,
        }
    }
}

/// A small, closed set of counter kinds the kernel itself reasons about
/// (P/T math and the +1/+1 vs -1/-1 SBA annihilation). Ability-granting and
/// purely cosmetic counter kinds are represented as opaque named counters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounterKind {
    PlusOnePlusOne,
    MinusOneMinusOne,
    Loyalty,
    Poison,
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Flying,
    Reach,
    FirstStrike,
    DoubleStrike,
    Deathtouch,
    Trample,
    Lifelink,
    Vigilance,
    Haste,
    Menace,
    Defender,
    Hexproof,
    Shroud,
    Indestructible,
    Ward(u32),
    ProtectionFrom(Color),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_set_round_trips() {
        let set = ColorSet::from_colors([Color::Red, Color::Green]);
        assert!(set.contains(Color::Red));
        assert!(set.contains(Color::Green));
        assert!(!set.contains(Color::Blue));
        assert!(!set.is_colorless());
    }

    #[test]
    fn step_sequence_wraps_to_untap() {
        assert_eq!(Step::Cleanup.next(), Step::Untap);
        assert_eq!(Step::Untap.phase(), Phase::Beginning);
        assert_eq!(Step::DeclareBlockers.phase(), Phase::Combat);
    }

    #[test]
    fn untap_and_cleanup_do_not_grant_priority() {
        assert!(!Step::Untap.grants_priority());
        assert!(!Step::Cleanup.grants_priority());
        assert!(Step::Upkeep.grants_priority());
    }
}
