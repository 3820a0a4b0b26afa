//! Combat (component L, CR 506-511 distilled): attacker/blocker declaration
//! and damage assignment, including first strike, trample, deathtouch,
//! lifelink, and menace.

use crate::error::CombatError;
use crate::event::{DamageTarget, Event};
use crate::game_state::GameState;
use crate::ids::ObjectId;
use crate::types::{CardType, Keyword, Zone};

fn has_keyword(game: &GameState, id: ObjectId, keyword: Keyword) -> bool {
    game.zones.get(id).map(|o| o.current_characteristics.has_keyword(keyword)).unwrap_or(false)
}

fn can_block_flier(game: &GameState, blocker: ObjectId) -> bool {
    has_keyword(game, blocker, Keyword::Flying) || has_keyword(game, blocker, Keyword::Reach)
}

/// Declares `attacker` as attacking `defender` (CR 508). Taps the attacker
/// unless it has vigilance.
pub fn declare_attacker(game: &mut GameState, attacker: ObjectId, defender: DamageTarget) -> Result<(), CombatError> {
    let illegal = || CombatError::CannotAttack { creature: attacker };
    let Some(obj) = game.zones.get(attacker) else { return Err(illegal()) };
    if game.zones.zone_of(attacker) != Some(Zone::Battlefield) {
        return Err(illegal());
    }
    if !obj.current_characteristics.is_type(CardType::Creature) {
        return Err(illegal());
    }
    let Some(perm) = obj.permanent() else { return Err(illegal()) };
    if perm.tapped {
        return Err(illegal());
    }
    if perm.summoning_sick && !obj.current_characteristics.has_keyword(Keyword::Haste) {
        return Err(illegal());
    }
    let has_vigilance = obj.current_characteristics.has_keyword(Keyword::Vigilance);
    if let Some(obj) = game.zones.get_mut(attacker) {
        if let Some(perm) = obj.permanent_mut() {
            if !has_vigilance {
                perm.tapped = true;
            }
            perm.combat.attacking = Some(defender);
        }
    }
    game.events.publish(Event::Attacks { attacker, defender });
    Ok(())
}

/// Declares `blocker` as blocking `attacker` (CR 509). One blocker may block
/// only one attacker through this call; a creature that wants to block
/// multiple attackers (double block granted by an effect) calls this once
/// per attacker.
pub fn declare_blocker(game: &mut GameState, blocker: ObjectId, attacker: ObjectId) -> Result<(), CombatError> {
    let illegal = || CombatError::IllegalBlock { blocker, attacker };
    let Some(blocker_obj) = game.zones.get(blocker) else { return Err(illegal()) };
    if game.zones.zone_of(blocker) != Some(Zone::Battlefield) {
        return Err(illegal());
    }
    let Some(perm) = blocker_obj.permanent() else { return Err(illegal()) };
    if perm.tapped {
        return Err(illegal());
    }
    let attacker_flies = has_keyword(game, attacker, Keyword::Flying);
    if attacker_flies && !can_block_flier(game, blocker) {
        return Err(illegal());
    }
    if let Some(obj) = game.zones.get_mut(attacker) {
        if let Some(perm) = obj.permanent_mut() {
            perm.combat.blocked_by.push(blocker);
        }
    }
    if let Some(obj) = game.zones.get_mut(blocker) {
        if let Some(perm) = obj.permanent_mut() {
            perm.combat.blocking.push(attacker);
        }
    }
    game.events.publish(Event::Blocks { blocker, attacker });
    Ok(())
}

/// CR 702.111e: a creature with menace can't be blocked except by two or
/// more creatures. Called once after blocks are declared, before damage.
pub fn validate_menace(game: &GameState) -> Result<(), CombatError> {
    for &id in game.zones.battlefield() {
        let Some(obj) = game.zones.get(id) else { continue };
        if !obj.current_characteristics.has_keyword(Keyword::Menace) {
            continue;
        }
        let Some(perm) = obj.permanent() else { continue };
        let blocked_by = &perm.combat.blocked_by;
        if !blocked_by.is_empty() && blocked_by.len() < 2 {
            return Err(CombatError::MenaceRequiresTwoBlockers { attacker: id });
        }
    }
    Ok(())
}

fn remaining_toughness(game: &GameState, id: ObjectId) -> i32 {
    let (_, toughness) = game.effective_power_toughness(id).unwrap_or((0, 0));
    let damage = game.zones.get(id).and_then(|o| o.permanent()).map(|p| p.damage_marked as i32).unwrap_or(0);
    (toughness - damage).max(0)
}

/// The default, rules-minimal damage assignment: lethal to each blocker in
/// the order given before moving to the next, unless the source has
/// deathtouch (one point is lethal). Stops once `power` is used up; whatever
/// is left over is not included here (the caller decides whether it tramples
/// through to the defending player). This is what a core-driven game uses
/// when no agent-specific [`Agent::assign_combat_damage`] choice is plugged
/// in, and what [`validate_assignment`] checks a chosen assignment against.
pub fn lethal_first_assignment(game: &GameState, source: ObjectId, power: u32, blockers: &[ObjectId]) -> Vec<u32> {
    let deathtouch = has_keyword(game, source, Keyword::Deathtouch);
    let mut remaining = power;
    let mut amounts = Vec::with_capacity(blockers.len());
    for &blocker in blockers {
        if remaining == 0 {
            amounts.push(0);
            continue;
        }
        let lethal = if deathtouch { 1 } else { remaining_toughness(game, blocker) as u32 };
        let assign = lethal.min(remaining);
        amounts.push(assign);
        remaining -= assign;
    }
    amounts
}

/// CR 510.1c: validates a proposed combat-damage assignment. `amounts` must
/// align 1:1 with `blockers` (already in the attacking player's chosen
/// damage-assignment order); any power left over after `amounts` is the
/// trample excess, legal only when `trample` is set. A blocker may receive
/// less than lethal only if every blocker after it and the trample excess
/// are all zero — damage can't skip past an underfed blocker to reach the
/// next one or the defending player. Returns the validated trample excess.
pub fn validate_assignment(
    game: &GameState,
    source: ObjectId,
    power: u32,
    blockers: &[ObjectId],
    amounts: &[u32],
    trample: bool,
) -> Result<u32, CombatError> {
    if amounts.len() != blockers.len() {
        return Err(CombatError::DamageAssignmentMismatch);
    }
    let total: u32 = amounts.iter().sum();
    if total > power {
        return Err(CombatError::DamageAssignmentMismatch);
    }
    let excess = power - total;
    if excess > 0 && !trample {
        return Err(CombatError::DamageAssignmentMismatch);
    }
    let deathtouch = has_keyword(game, source, Keyword::Deathtouch);
    let mut power_left = power;
    for (i, &blocker) in blockers.iter().enumerate() {
        let lethal = (if deathtouch { 1 } else { remaining_toughness(game, blocker) as u32 }).min(power_left);
        if amounts[i] < lethal {
            let nothing_moves_past = amounts[i + 1..].iter().all(|&a| a == 0) && excess == 0;
            if !nothing_moves_past {
                return Err(CombatError::DamageAssignmentSkipsLethal { blocker });
            }
        }
        power_left = power_left.saturating_sub(amounts[i]);
    }
    Ok(excess)
}

/// Deals damage for one combat damage step (CR 510), using the default
/// lethal-first assignment in blocker-declaration order. `first_strike_step`
/// selects which creatures act: first-strike/double-strike creatures in the
/// first strike step, everyone else (plus double-strike again) in the
/// regular step.
pub fn deal_combat_damage(game: &mut GameState, first_strike_step: bool) {
    deal_combat_damage_with(game, first_strike_step, |game, attacker, declared, power| {
        (declared.to_vec(), lethal_first_assignment(game, attacker, power, declared))
    });
}

/// Deals damage for one combat damage step (CR 510), asking `choose` for
/// each multiply-blocked attacker's damage-assignment order (CR 509.2) and
/// chosen amounts (CR 510.1c). `choose` receives the attacker, its blockers
/// in declaration order, and its power; if its answer doesn't validate
/// (wrong blocker set or under-lethal skip), the default lethal-first
/// assignment in declared order is used instead.
pub fn deal_combat_damage_with<F>(game: &mut GameState, first_strike_step: bool, mut choose: F)
where
    F: FnMut(&GameState, ObjectId, &[ObjectId], u32) -> (Vec<ObjectId>, Vec<u32>),
{
    let attackers: Vec<ObjectId> = game
        .zones
        .battlefield()
        .iter()
        .copied()
        .filter(|&id| game.zones.get(id).and_then(|o| o.permanent()).and_then(|p| p.combat.attacking).is_some())
        .collect();

    for attacker in attackers {
        let acts_now = acts_in_step(game, attacker, first_strike_step);
        if !acts_now {
            continue;
        }
        let Some((power, _)) = game.effective_power_toughness(attacker) else { continue };
        if power <= 0 {
            continue;
        }
        let deathtouch = has_keyword(game, attacker, Keyword::Deathtouch);
        let trample = has_keyword(game, attacker, Keyword::Trample);
        let declared: Vec<ObjectId> = game
            .zones
            .get(attacker)
            .and_then(|o| o.permanent())
            .map(|p| p.combat.blocked_by.clone())
            .unwrap_or_default();
        let defender = game.zones.get(attacker).and_then(|o| o.permanent()).and_then(|p| p.combat.attacking);

        if declared.is_empty() {
            if let Some(defender) = defender {
                game.deal_damage(attacker, to_target_ref(defender), power as u32, deathtouch);
            }
            continue;
        }

        let (order, amounts) = choose(game, attacker, &declared, power as u32);
        let same_blockers = {
            let mut sorted_order = order.clone();
            let mut sorted_declared = declared.clone();
            sorted_order.sort_by_key(|id| id.0);
            sorted_declared.sort_by_key(|id| id.0);
            sorted_order == sorted_declared
        };
        let valid = same_blockers && validate_assignment(game, attacker, power as u32, &order, &amounts, trample).is_ok();
        let (blockers, amounts) = if valid {
            (order, amounts)
        } else {
            let fallback = lethal_first_assignment(game, attacker, power as u32, &declared);
            (declared.clone(), fallback)
        };
        deal_assignment(game, attacker, &blockers, &amounts, trample, power as u32, defender, deathtouch);
        deal_blocker_return_damage(game, attacker, &declared, first_strike_step);
    }
}

fn deal_assignment(
    game: &mut GameState,
    attacker: ObjectId,
    blockers: &[ObjectId],
    amounts: &[u32],
    trample: bool,
    power: u32,
    defender: Option<DamageTarget>,
    deathtouch: bool,
) {
    let total: u32 = amounts.iter().sum();
    for (&blocker, &amount) in blockers.iter().zip(amounts) {
        if amount > 0 {
            game.deal_damage(attacker, crate::target::TargetRef::Object(blocker), amount, deathtouch);
        }
    }
    let excess = if trample { power.saturating_sub(total) } else { 0 };
    if excess > 0 {
        if let Some(defender) = defender {
            game.deal_damage(attacker, to_target_ref(defender), excess, deathtouch);
        }
    }
}

fn deal_blocker_return_damage(game: &mut GameState, attacker: ObjectId, blockers: &[ObjectId], first_strike_step: bool) {
    for &blocker in blockers {
        if !acts_in_step(game, blocker, first_strike_step) {
            continue;
        }
        let Some((bp, _)) = game.effective_power_toughness(blocker) else { continue };
        if bp <= 0 {
            continue;
        }
        let blocker_deathtouch = has_keyword(game, blocker, Keyword::Deathtouch);
        game.deal_damage(blocker, crate::target::TargetRef::Object(attacker), bp as u32, blocker_deathtouch);
    }
}

fn acts_in_step(game: &GameState, id: ObjectId, first_strike_step: bool) -> bool {
    let has_fs = has_keyword(game, id, Keyword::FirstStrike);
    let has_ds = has_keyword(game, id, Keyword::DoubleStrike);
    if first_strike_step {
        has_fs || has_ds
    } else {
        !has_fs || has_ds
    }
}

fn to_target_ref(target: DamageTarget) -> crate::target::TargetRef {
    match target {
        DamageTarget::Player(p) => crate::target::TargetRef::Player(p),
        DamageTarget::Object(o) => crate::target::TargetRef::Object(o),
    }
}

/// Clears every permanent's combat role (end of combat, CR 511.3).
pub fn clear_combat_state(game: &mut GameState) {
    let ids: Vec<ObjectId> = game.zones.battlefield().to_vec();
    for id in ids {
        if let Some(obj) = game.zones.get_mut(id) {
            if let Some(perm) = obj.permanent_mut() {
                perm.combat = Default::default();
            }
        }
    }
}
