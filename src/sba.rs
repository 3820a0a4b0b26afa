//! State-based actions (component K, CR 704 distilled).
//!
//! [`check_state_based_actions`] applies every action whose condition
//! currently holds, once, then the caller re-invokes it until nothing
//! changes (§4.8: "a fixed point, not a single pass" — CR 704.3 checks SBAs
//! again after any are performed, before anyone gets priority).

use std::collections::HashMap;

use crate::event::{Event, LossReason};
use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::types::{CounterKind, Zone};

/// Runs one pass of every state-based action and reports whether any fired.
/// Callers loop this until it returns `false` (fixed point, §4.8).
pub fn check_state_based_actions(game: &mut GameState) -> bool {
    let mut changed = false;
    changed |= check_player_losses(game);
    changed |= check_legend_rule(game);
    changed |= check_lethal_damage_and_zero_toughness(game);
    changed |= check_counter_annihilation(game);
    changed |= check_aura_attachment(game);
    changed |= check_planeswalker_loyalty(game);
    changed |= check_token_existence(game);
    changed
}

fn check_player_losses(game: &mut GameState) -> bool {
    let threshold = game.config.poison_threshold as u32;
    let mut losers = Vec::new();
    for player in &game.players {
        if player.lost || player.cannot_lose {
            continue;
        }
        let reason = if player.life <= 0 {
            Some(LossReason::Life)
        } else if player.poison >= threshold {
            Some(LossReason::Poison)
        } else if player.drew_from_empty_library {
            Some(LossReason::DrewFromEmpty)
        } else {
            None
        };
        if let Some(reason) = reason {
            losers.push((player.id, reason));
        }
    }
    if losers.is_empty() {
        return false;
    }
    for (pid, reason) in losers {
        if let Some(player) = game.player_mut(pid) {
            player.lost = true;
        }
        game.events.publish(Event::PlayerLost { player: pid, reason });
    }
    true
}

/// CR 704.5j: a player controlling two or more legendary permanents with the
/// same name puts all but one into the graveyard.
fn check_legend_rule(game: &mut GameState) -> bool {
    let mut by_controller_name: HashMap<(PlayerId, String), Vec<ObjectId>> = HashMap::new();
    for &id in game.zones.battlefield() {
        let Some(obj) = game.zones.get(id) else { continue };
        if !obj.current_characteristics.is_legendary() {
            continue;
        }
        by_controller_name
            .entry((obj.controller(), obj.current_characteristics.name.clone()))
            .or_default()
            .push(id);
    }
    let mut to_destroy = Vec::new();
    for ids in by_controller_name.into_values() {
        if ids.len() > 1 {
            // Keep the oldest (lowest timestamp); the controller chooses in the
            // full rules, but a deterministic tiebreak keeps this core testable
            // without a player decision hook.
            let mut ids = ids;
            ids.sort_by_key(|id| game.zones.get(*id).map(|o| o.timestamp).unwrap_or(crate::ids::Timestamp(0)));
            to_destroy.extend(ids.into_iter().skip(1));
        }
    }
    if to_destroy.is_empty() {
        return false;
    }
    for id in to_destroy {
        game.zones.move_object(id, Zone::Graveyard, &mut game.events);
    }
    true
}

fn check_lethal_damage_and_zero_toughness(game: &mut GameState) -> bool {
    let mut to_destroy = Vec::new();
    for &id in game.zones.battlefield() {
        let Some(obj) = game.zones.get(id) else { continue };
        if !obj.current_characteristics.is_type(crate::types::CardType::Creature) {
            continue;
        }
        let Some((_, toughness)) = game.effective_power_toughness(id) else { continue };
        if toughness <= 0 {
            to_destroy.push(id);
            continue;
        }
        let Some(perm) = obj.permanent() else { continue };
        let lethal = perm.damage_marked as i32 >= toughness;
        let deathtouched = perm.dealt_damage_by_deathtouch && perm.damage_marked > 0;
        if lethal || deathtouched {
            to_destroy.push(id);
        }
    }
    if to_destroy.is_empty() {
        return false;
    }
    for id in to_destroy {
        // Toughness <= 0 is not "destroy" (ignores indestructible, CR 704.5f);
        // lethal/deathtouch damage is "destroy" (respects it, CR 704.5g/h).
        let toughness_zero = game
            .effective_power_toughness(id)
            .map(|(_, t)| t <= 0)
            .unwrap_or(false);
        if toughness_zero {
            game.zones.move_object(id, Zone::Graveyard, &mut game.events);
        } else {
            game.destroy(id);
        }
    }
    true
}

/// CR 704.5p/704.5q: +1/+1 and -1/-1 counters on the same permanent annihilate
/// in pairs.
fn check_counter_annihilation(game: &mut GameState) -> bool {
    let mut changed = false;
    let ids: Vec<ObjectId> = game.zones.battlefield().to_vec();
    for id in ids {
        let Some(obj) = game.zones.get(id) else { continue };
        let Some(perm) = obj.permanent() else { continue };
        let plus = perm.counters.get(&CounterKind::PlusOnePlusOne).copied().unwrap_or(0);
        let minus = perm.counters.get(&CounterKind::MinusOneMinusOne).copied().unwrap_or(0);
        let pairs = plus.min(minus);
        if pairs == 0 {
            continue;
        }
        if let Some(obj) = game.zones.get_mut(id) {
            if let Some(perm) = obj.permanent_mut() {
                *perm.counters.entry(CounterKind::PlusOnePlusOne).or_insert(0) -= pairs;
                *perm.counters.entry(CounterKind::MinusOneMinusOne).or_insert(0) -= pairs;
            }
        }
        game.recompute_characteristics(id);
        changed = true;
    }
    changed
}

/// CR 704.5m/n: an Aura or Equipment attached illegally becomes unattached or
/// goes to the graveyard.
fn check_aura_attachment(game: &mut GameState) -> bool {
    let mut to_unattach = Vec::new();
    let mut to_destroy = Vec::new();
    for &id in game.zones.battlefield() {
        let Some(obj) = game.zones.get(id) else { continue };
        let Some(perm) = obj.permanent() else { continue };
        let Some(host) = perm.attached_to else { continue };
        let host_on_battlefield = game.zones.zone_of(host) == Some(Zone::Battlefield);
        if !host_on_battlefield {
            if obj.current_characteristics.is_type(crate::types::CardType::Enchantment)
                && obj.current_characteristics.has_subtype(&crate::types::Subtype::from("Aura"))
            {
                to_destroy.push(id);
            } else {
                to_unattach.push(id);
            }
        }
    }
    if to_unattach.is_empty() && to_destroy.is_empty() {
        return false;
    }
    for id in to_unattach {
        if let Some(obj) = game.zones.get_mut(id) {
            if let Some(perm) = obj.permanent_mut() {
                perm.attached_to = None;
            }
        }
    }
    for id in to_destroy {
        game.zones.move_object(id, Zone::Graveyard, &mut game.events);
    }
    true
}

fn check_planeswalker_loyalty(game: &mut GameState) -> bool {
    let mut to_destroy = Vec::new();
    for &id in game.zones.battlefield() {
        let Some(obj) = game.zones.get(id) else { continue };
        if !obj.current_characteristics.is_type(crate::types::CardType::Planeswalker) {
            continue;
        }
        if let Some(perm) = obj.permanent() {
            if perm.loyalty.unwrap_or(0) <= 0 {
                to_destroy.push(id);
            }
        }
    }
    if to_destroy.is_empty() {
        return false;
    }
    for id in to_destroy {
        game.zones.move_object(id, Zone::Graveyard, &mut game.events);
    }
    true
}

/// CR 704.5d / I7: a token in any zone other than the battlefield ceases to
/// exist; it is not "destroyed" or "discarded," it simply stops being an
/// object in the game.
fn check_token_existence(game: &mut GameState) -> bool {
    let to_remove: Vec<ObjectId> = game
        .zones
        .all_object_ids()
        .filter(|&id| {
            game.zones.get(id).map(|o| o.is_token()).unwrap_or(false)
                && game.zones.zone_of(id) != Some(Zone::Battlefield)
        })
        .collect();
    if to_remove.is_empty() {
        return false;
    }
    for id in to_remove {
        let Some(from) = game.zones.zone_of(id) else { continue };
        game.zones.remove(id);
        game.events.publish(Event::CeasesToExist { object: id, from });
    }
    true
}
