//! Turn structure (component M, CR 500-514 distilled): the turn-based
//! actions that happen automatically at each step, with no window for
//! priority (untap, several draw/cleanup effects).
//!
//! Step-to-step sequencing and handing out priority in between live in the
//! controller's main loop; this module only implements what happens *at*
//! each step boundary.

use crate::event::Event;
use crate::game_state::GameState;
use crate::ids::PlayerId;
use crate::types::{Phase, Step, Zone};

/// Hand size above which a player discards during cleanup (CR 514.1). Not a
/// configuration knob: changing it is a rules variant, not a tuning value.
const MAX_HAND_SIZE: usize = 7;

/// Starts a new turn for `active_player`: advances the turn counter, resets
/// per-turn state, and runs the untap step (CR 502).
pub fn start_new_turn(game: &mut GameState, active_player: PlayerId, turn_number: u32) {
    game.turn_number = turn_number;
    game.active_player = active_player;
    game.phase = Phase::Beginning;
    game.step = Some(Step::Untap);
    game.lands_played_this_turn = 0;
    game.events.publish(Event::TurnStart { player: active_player, turn_number });
    untap_step(game);
}

/// CR 502: untap all permanents the active player controls; no player
/// receives priority during this step.
pub fn untap_step(game: &mut GameState) {
    let active = game.active_player;
    let ids: Vec<_> = game.zones.battlefield().to_vec();
    for id in ids {
        if game.zones.get(id).map(|o| o.controller()) != Some(active) {
            continue;
        }
        if let Some(obj) = game.zones.get_mut(id) {
            if let Some(perm) = obj.permanent_mut() {
                perm.tapped = false;
                perm.summoning_sick = false;
                perm.regeneration_shields = 0;
            }
        }
    }
}

/// Publishes the step/phase-start events for entering `step`, and runs any
/// automatic turn-based action tied to that step (CR 503-514). `skip_draw`
/// implements CR 103.8a: the player going first skips their first draw step;
/// the controller passes `true` only for that one step of the whole game.
pub fn enter_step(game: &mut GameState, step: Step, previous_phase: Option<Phase>, skip_draw: bool) {
    game.step = Some(step);
    game.phase = step.phase();
    if previous_phase != Some(step.phase()) {
        game.events.publish(Event::PhaseStart { phase: step.phase() });
    }
    game.events.publish(Event::StepStart { step });

    match step {
        Step::Upkeep => {
            game.events.publish(Event::BeginningOfUpkeep { player: game.active_player });
        }
        Step::Draw => {
            if !skip_draw {
                game.draw_card(game.active_player);
            }
        }
        Step::End => {
            game.events.publish(Event::BeginningOfEndStep { player: game.active_player });
        }
        Step::Cleanup => cleanup_step(game),
        _ => {}
    }
}

/// CR 514: discard to maximum hand size, clear marked damage, end
/// "until end of turn"/"this turn" continuous effects, empty mana pools.
pub fn cleanup_step(game: &mut GameState) {
    discard_to_hand_size(game, game.active_player);

    let ids: Vec<_> = game.zones.battlefield().to_vec();
    for id in ids {
        if let Some(obj) = game.zones.get_mut(id) {
            if let Some(perm) = obj.permanent_mut() {
                perm.damage_marked = 0;
                perm.dealt_damage_by_deathtouch = false;
            }
        }
    }
    game.layers.remove_expired(|d| matches!(d, crate::layers::Duration::EndOfTurn));
    for player in &mut game.players {
        player.mana_pool.empty();
        player.land_played_this_turn = false;
    }
}

fn discard_to_hand_size(game: &mut GameState, player: PlayerId) {
    loop {
        let hand = game.zones.objects_in(Zone::Hand, player);
        if hand.len() <= MAX_HAND_SIZE {
            return;
        }
        let Some(&excess) = hand.last() else { return };
        game.zones.move_object(excess, Zone::Graveyard, &mut game.events);
    }
}
