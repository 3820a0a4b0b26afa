//! Spell-cast transaction (component O, CR 601 distilled).
//!
//! Casting a spell is "all or nothing": choose targets, choose X, determine
//! the cost, pay it, and move the card to the stack as one atomic step. Any
//! failure along the way rolls back with no observable side effect (CR
//! 601.2i), implemented here with a snapshot-and-restore of the one piece of
//! mutable state a failed cast could otherwise touch: the caster's mana pool.

use crate::effect::Effect;
use crate::error::TransactionError;
use crate::event::Event;
use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::mana::{try_pay_from_pool, ManaCost};
use crate::object::{ObjectKind, SpellOnStack};
use crate::target::{is_legal, Target};
use crate::types::Zone;

pub struct CastRequest {
    pub card: ObjectId,
    pub caster: PlayerId,
    pub cost: ManaCost,
    pub x_value: u32,
    pub targets: Vec<Target>,
    pub chosen_modes: Vec<usize>,
    pub effect: Effect,
}

/// Attempts to cast a spell: validates targets exist and are legal, pays the
/// cost, and moves the card from its current zone to the stack. On any
/// failure, returns the error and leaves `game` exactly as it was (CR
/// 601.2i).
pub fn cast_spell(game: &mut GameState, request: CastRequest) -> Result<ObjectId, TransactionError> {
    if !request.targets.is_empty() && request.targets.iter().all(|t| !is_legal(game, t)) {
        return Err(TransactionError::NoLegalTargets);
    }

    let Some(player) = game.player(request.caster) else {
        return Err(TransactionError::PaymentFailed);
    };

    // Pay from a clone of the pool; only commit it back once payment as a
    // whole succeeds, so a failed payment leaves the real pool untouched.
    let mut pool = player.mana_pool.clone();
    if try_pay_from_pool(&request.cost, request.x_value, &mut pool).is_none() {
        return Err(TransactionError::PaymentFailed);
    }
    game.player_mut(request.caster).unwrap().mana_pool = pool;

    let legal: Vec<bool> = request.targets.iter().map(|t| is_legal(game, t)).collect();
    let spell = SpellOnStack {
        targets: request
            .targets
            .into_iter()
            .zip(legal)
            .map(|(mut t, l)| {
                t.was_legal_on_cast = l;
                t
            })
            .collect(),
        x_value: request.x_value,
        chosen_modes: request.chosen_modes,
        is_copy: false,
        effect: request.effect,
    };
    if let Some(obj) = game.zones.get_mut(request.card) {
        obj.kind = ObjectKind::SpellOnStack(spell);
        obj.controller_id = Some(request.caster);
    }
    game.zones.move_object(request.card, Zone::Stack, &mut game.events);
    game.events.publish(Event::SpellCast { player: request.caster, object: request.card });
    Ok(request.card)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card_db::HeuristicCardDatabase;
    use crate::config::GameConfig;
    use crate::ids::CardId;
    use crate::mana::{ManaSymbol, PoolMana};
    use crate::object::{Characteristics, GameObject};
    use crate::player::Player;
    use crate::types::{CardType, ColorSet};

    fn game_with_card_in_hand(mana_in_pool: &[PoolMana]) -> (GameState, ObjectId) {
        let mut players = vec![Player::new(PlayerId(0), "Alice", 20), Player::new(PlayerId(1), "Bob", 20)];
        for mana in mana_in_pool {
            players[0].mana_pool.add(*mana);
        }
        let mut game = GameState::new(players, GameConfig::default(), Box::new(HeuristicCardDatabase));
        let id = game.ids.next_object_id();
        let chars = Characteristics {
            name: "Shock".into(),
            mana_cost: ManaCost::from_symbols(vec![ManaSymbol::Red]),
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
        let obj = GameObject {
            object_id: id,
            owner_id: PlayerId(0),
            controller_id: None,
            timestamp: game.ids.next_timestamp(),
            card_id: Some(CardId(1)),
            base_characteristics: chars.clone(),
            current_characteristics: chars,
            kind: ObjectKind::Card,
        };
        game.zones.insert_new(obj, Zone::Hand);
        (game, id)
    }

    #[test]
    fn casting_with_enough_mana_moves_the_card_to_the_stack() {
        let (mut game, card) = game_with_card_in_hand(&[PoolMana::Colored(crate::types::Color::Red)]);
        let request = CastRequest {
            card,
            caster: PlayerId(0),
            cost: ManaCost::from_symbols(vec![ManaSymbol::Red]),
            x_value: 0,
            targets: vec![],
            chosen_modes: vec![],
            effect: Effect::NoEffect,
        };
        let result = cast_spell(&mut game, request);
        assert!(result.is_ok());
        assert_eq!(game.zones.zone_of(card), Some(Zone::Stack));
        assert!(game.player(PlayerId(0)).unwrap().mana_pool.is_empty());
    }

    #[test]
    fn casting_without_enough_mana_rolls_back_with_no_side_effects() {
        let (mut game, card) = game_with_card_in_hand(&[]);
        let request = CastRequest {
            card,
            caster: PlayerId(0),
            cost: ManaCost::from_symbols(vec![ManaSymbol::Red]),
            x_value: 0,
            targets: vec![],
            chosen_modes: vec![],
            effect: Effect::NoEffect,
        };
        let result = cast_spell(&mut game, request);
        assert_eq!(result, Err(TransactionError::PaymentFailed));
        assert_eq!(game.zones.zone_of(card), Some(Zone::Hand));
    }
}
