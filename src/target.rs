//! Targets and target legality (part of component G, CR 115 distilled).
//!
//! A target stays legal only while every one of a small set of conditions
//! holds; [`is_legal`] re-evaluates them fresh each time it's called so the
//! same check works both at cast time and at resolution (I6).

use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::types::{CardType, Color, Zone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneRequirement {
    Battlefield,
    Graveyard,
    Hand,
    Library,
    Stack,
    AnyPublicZone,
}

/// What a target must be, beyond being in the right zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetRestriction {
    Creature,
    Planeswalker,
    Permanent,
    Spell,
    Player,
    /// "any target": creature, planeswalker, battle, or player.
    AnyTarget,
    ControlledBy(PlayerId),
    NotControlledBy(PlayerId),
    OfCardType(CardType),
    PowerAtMost(i32),
    /// Conjunction of restrictions (e.g. "target creature you don't control").
    All(Vec<TargetRestriction>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRef {
    Object(ObjectId),
    Player(PlayerId),
}

/// One target slot on a spell or ability, carrying its legal-at-cast
/// snapshot (§3 StackObject/Target).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub restriction: TargetRestriction,
    pub zone: ZoneRequirement,
    pub chosen: TargetRef,
    pub was_legal_on_cast: bool,
    pub source: ObjectId,
    pub source_controller: PlayerId,
}

fn zone_matches(zone: Zone, requirement: ZoneRequirement) -> bool {
    match requirement {
        ZoneRequirement::Battlefield => zone == Zone::Battlefield,
        ZoneRequirement::Graveyard => zone == Zone::Graveyard,
        ZoneRequirement::Hand => zone == Zone::Hand,
        ZoneRequirement::Library => zone == Zone::Library,
        ZoneRequirement::Stack => zone == Zone::Stack,
        ZoneRequirement::AnyPublicZone => zone.is_public(),
    }
}

fn restriction_matches(
    game: &GameState,
    restriction: &TargetRestriction,
    target: TargetRef,
) -> bool {
    match restriction {
        TargetRestriction::Creature => object_is_type(game, target, CardType::Creature),
        TargetRestriction::Planeswalker => object_is_type(game, target, CardType::Planeswalker),
        TargetRestriction::Permanent => matches!(target, TargetRef::Object(id) if game.zones.zone_of(id) == Some(Zone::Battlefield)),
        TargetRestriction::Spell => matches!(target, TargetRef::Object(id) if game.zones.zone_of(id) == Some(Zone::Stack)),
        TargetRestriction::Player => matches!(target, TargetRef::Player(_)),
        TargetRestriction::AnyTarget => {
            matches!(target, TargetRef::Player(_))
                || object_is_type(game, target, CardType::Creature)
                || object_is_type(game, target, CardType::Planeswalker)
                || object_is_type(game, target, CardType::Battle)
        }
        TargetRestriction::ControlledBy(pid) => match target {
            TargetRef::Object(id) => game.zones.get(id).map(|o| o.controller() == *pid).unwrap_or(false),
            TargetRef::Player(p) => p == *pid,
        },
        TargetRestriction::NotControlledBy(pid) => !restriction_matches(
            game,
            &TargetRestriction::ControlledBy(*pid),
            target,
        ),
        TargetRestriction::OfCardType(t) => object_is_type(game, target, *t),
        TargetRestriction::PowerAtMost(max) => match target {
            TargetRef::Object(id) => game
                .zones
                .get(id)
                .and_then(|o| o.printed_pt())
                .map(|(p, _)| p <= *max)
                .unwrap_or(false),
            TargetRef::Player(_) => false,
        },
        TargetRestriction::All(list) => list.iter().all(|r| restriction_matches(game, r, target)),
    }
}

fn object_is_type(game: &GameState, target: TargetRef, t: CardType) -> bool {
    match target {
        TargetRef::Object(id) => game
            .zones
            .get(id)
            .map(|o| o.current_characteristics.is_type(t))
            .unwrap_or(false),
        TargetRef::Player(_) => false,
    }
}

fn has_protection_from(game: &GameState, target: ObjectId, colors: &[Color]) -> bool {
    let Some(obj) = game.zones.get(target) else { return false };
    obj.current_characteristics.keywords.iter().any(|k| {
        matches!(k, crate::types::Keyword::ProtectionFrom(c) if colors.contains(c))
    })
}

/// Is this target still legal right now? (CR 115 distilled, §4.2.)
pub fn is_legal(game: &GameState, target: &Target) -> bool {
    match target.chosen {
        TargetRef::Player(pid) => {
            if game.players.iter().find(|p| p.id == pid).is_none() {
                return false;
            }
        }
        TargetRef::Object(id) => {
            let Some(zone) = game.zones.zone_of(id) else { return false };
            if !zone_matches(zone, target.zone) {
                return false;
            }
            let Some(obj) = game.zones.get(id) else { return false };
            if obj.current_characteristics.has_keyword(crate::types::Keyword::Shroud) {
                return false;
            }
            if obj.current_characteristics.has_keyword(crate::types::Keyword::Hexproof)
                && obj.controller() != target.source_controller
            {
                return false;
            }
            let source_colors: Vec<Color> = game
                .zones
                .get(target.source)
                .map(|s| s.current_characteristics.colors.colors().collect())
                .unwrap_or_default();
            if has_protection_from(game, id, &source_colors) {
                return false;
            }
        }
    }
    restriction_matches(game, &target.restriction, target.chosen)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_requirement_matches_exactly() {
        assert!(zone_matches(Zone::Battlefield, ZoneRequirement::Battlefield));
        assert!(!zone_matches(Zone::Hand, ZoneRequirement::Battlefield));
        assert!(zone_matches(Zone::Graveyard, ZoneRequirement::AnyPublicZone));
        assert!(!zone_matches(Zone::Hand, ZoneRequirement::AnyPublicZone));
    }
}
