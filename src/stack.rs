//! The stack (component G, CR 608): LIFO resolution of spells and abilities.
//!
//! Targets are re-checked at resolution time rather than trusted from cast
//! time (I6); a spell or ability with one or more targets, all of which have
//! since become illegal, fizzles (CR 608.2b) instead of resolving.

use crate::effect::execute_effect;
use crate::game_state::GameState;
use crate::ids::ObjectId;
use crate::object::{GameObject, ObjectKind, Permanent};
use crate::target::is_legal;
use crate::types::Zone;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved,
    Fizzled,
    BecamePermanent,
}

/// Resolves the top object of the stack, if any. Does nothing and returns
/// `None` on an empty stack.
pub fn resolve_top(game: &mut GameState) -> Option<ResolutionOutcome> {
    let id = game.zones.stack_top()?;
    let obj = game.zones.get(id)?.clone();
    let controller = obj.controller();

    let outcome = match &obj.kind {
        ObjectKind::SpellOnStack(spell) => {
            let legal: Vec<bool> = spell.targets.iter().map(|t| is_legal(game, t)).collect();
            if fizzles(&spell.targets, &legal) {
                fizzle(game, id, &obj);
                ResolutionOutcome::Fizzled
            } else if obj.current_characteristics.card_types.iter().any(|t| t.is_permanent()) {
                become_permanent(game, id);
                ResolutionOutcome::BecamePermanent
            } else {
                execute_effect(game, id, controller, &spell.targets, &legal, &spell.effect);
                game.zones.move_object(id, Zone::Graveyard, &mut game.events);
                ResolutionOutcome::Resolved
            }
        }
        ObjectKind::StackedAbility(ability) => {
            let legal: Vec<bool> = ability.targets.iter().map(|t| is_legal(game, t)).collect();
            if fizzles(&ability.targets, &legal) {
                game.zones.remove(id);
                ResolutionOutcome::Fizzled
            } else {
                execute_effect(game, ability.source, controller, &ability.targets, &legal, &ability.effect);
                game.zones.remove(id);
                ResolutionOutcome::Resolved
            }
        }
        _ => return None,
    };
    Some(outcome)
}

fn fizzles(targets: &[crate::target::Target], legal: &[bool]) -> bool {
    !targets.is_empty() && legal.iter().all(|l| !l)
}

fn fizzle(game: &mut GameState, id: ObjectId, obj: &GameObject) {
    if obj.is_token() {
        game.zones.remove(id);
    } else {
        game.zones.move_object(id, Zone::Graveyard, &mut game.events);
    }
}

fn become_permanent(game: &mut GameState, id: ObjectId) {
    if let Some(o) = game.zones.get_mut(id) {
        o.kind = ObjectKind::Permanent(Permanent::default());
    }
    game.zones.move_object(id, Zone::Battlefield, &mut game.events);
    game.recompute_characteristics(id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card_db::HeuristicCardDatabase;
    use crate::config::GameConfig;
    use crate::effect::Effect;
    use crate::ids::{CardId, PlayerId};
    use crate::mana::ManaCost;
    use crate::object::{Characteristics, SpellOnStack};
    use crate::player::Player;
    use crate::target::{Target, TargetRef, TargetRestriction, ZoneRequirement};
    use crate::types::{CardType, ColorSet};

    fn game() -> GameState {
        let players = vec![Player::new(PlayerId(0), "Alice", 20), Player::new(PlayerId(1), "Bob", 20)];
        GameState::new(players, GameConfig::default(), Box::new(HeuristicCardDatabase))
    }

    fn push_bolt(game: &mut GameState, target: TargetRef) -> ObjectId {
        let id = game.ids.next_object_id();
        let chars = Characteristics {
            name: "Shock".into(),
            mana_cost: ManaCost::new(),
            colors: ColorSet::new(),
            card_types: vec![CardType::Instant],
            subtypes: vec![],
            supertypes: vec![],
            power: None,
            toughness: None,
            rules_text: String::new(),
            keywords: vec![],
            ability_ids: vec![],
        };
        let spell = SpellOnStack {
            targets: vec![Target {
                restriction: TargetRestriction::AnyTarget,
                zone: ZoneRequirement::AnyPublicZone,
                chosen: target,
                was_legal_on_cast: true,
                source: id,
                source_controller: PlayerId(0),
            }],
            x_value: 0,
            chosen_modes: vec![],
            is_copy: false,
            effect: Effect::DealDamage { amount: 2, target_index: 0, deathtouch: false },
        };
        let obj = GameObject {
            object_id: id,
            owner_id: PlayerId(0),
            controller_id: Some(PlayerId(0)),
            timestamp: game.ids.next_timestamp(),
            card_id: Some(CardId(1)),
            base_characteristics: chars.clone(),
            current_characteristics: chars,
            kind: ObjectKind::SpellOnStack(spell),
        };
        game.zones.insert_new(obj, Zone::Stack);
        id
    }

    #[test]
    fn resolving_a_damage_spell_hits_its_target_and_leaves_the_stack() {
        let mut game = game();
        push_bolt(&mut game, TargetRef::Player(PlayerId(1)));
        let outcome = resolve_top(&mut game);
        assert_eq!(outcome, Some(ResolutionOutcome::Resolved));
        assert_eq!(game.player(PlayerId(1)).unwrap().life, 18);
        assert!(game.zones.stack_is_empty());
    }

    #[test]
    fn spell_with_no_legal_targets_fizzles_without_resolving() {
        let mut game = game();
        // Player 9 does not exist: target is illegal from the start.
        push_bolt(&mut game, TargetRef::Player(PlayerId(9)));
        let outcome = resolve_top(&mut game);
        assert_eq!(outcome, Some(ResolutionOutcome::Fizzled));
        assert_eq!(game.player(PlayerId(1)).unwrap().life, 20);
    }
}
