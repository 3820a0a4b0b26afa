//! Resolved spell/ability effects (§4.2 "its effect executes").
//!
//! Card text parsing is out of scope (§1 Non-goals); what the kernel needs
//! instead is a small, closed vocabulary of primitive effects that the
//! external card database compiles card text down to (or that a test
//! constructs directly), executed here the same way regardless of source.
//! This mirrors the teacher's "effects are data interpreted by a small
//! executor" design (§9), just over a much smaller effect set since the
//! oracle-text-to-effect compiler itself is explicitly out of scope.

use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::target::{Target, TargetRef};
use crate::types::CounterKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    NoEffect,
    /// Deals damage to target slot `target_index`. `deathtouch` flags the
    /// recipient for the lethal-damage SBA (§4.8).
    DealDamage { amount: u32, target_index: usize, deathtouch: bool },
    Destroy { target_index: usize },
    DrawCards { player: EffectPlayer, count: u32 },
    GainLife { player: EffectPlayer, amount: i32 },
    LoseLife { player: EffectPlayer, amount: i32 },
    PutCounters { target_index: usize, kind: CounterKind, amount: u32 },
    TapPermanent { target_index: usize },
    Sequence(Vec<Effect>),
}

/// Which player an effect acts on, relative to the resolving spell/ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectPlayer {
    Controller,
    TargetPlayer(usize),
}

fn resolve_player(game: &GameState, controller: PlayerId, targets: &[Target], who: EffectPlayer) -> Option<PlayerId> {
    match who {
        EffectPlayer::Controller => Some(controller),
        EffectPlayer::TargetPlayer(idx) => match targets.get(idx)?.chosen {
            TargetRef::Player(p) => Some(p),
            TargetRef::Object(_) => None,
        },
    }
    .filter(|p| game.players.iter().any(|pl| pl.id == *p))
}

/// Executes `effect`, skipping any individual target slot that is no longer
/// legal (§4.2: "applying its effect only to legal targets"). `legal` marks,
/// per target index, whether that target is still legal at resolution time.
pub fn execute_effect(
    game: &mut GameState,
    source: ObjectId,
    controller: PlayerId,
    targets: &[Target],
    legal: &[bool],
    effect: &Effect,
) {
    match effect {
        Effect::NoEffect => {}
        Effect::Sequence(effects) => {
            for e in effects {
                execute_effect(game, source, controller, targets, legal, e);
            }
        }
        Effect::DealDamage { amount, target_index, deathtouch } => {
            if !legal.get(*target_index).copied().unwrap_or(false) {
                return;
            }
            if let Some(target) = targets.get(*target_index) {
                game.deal_damage(source, target.chosen, *amount, *deathtouch);
            }
        }
        Effect::Destroy { target_index } => {
            if !legal.get(*target_index).copied().unwrap_or(false) {
                return;
            }
            if let Some(Target { chosen: TargetRef::Object(id), .. }) = targets.get(*target_index) {
                game.destroy(*id);
            }
        }
        Effect::DrawCards { player, count } => {
            if let Some(pid) = resolve_player(game, controller, targets, *player) {
                for _ in 0..*count {
                    game.draw_card(pid);
                }
            }
        }
        Effect::GainLife { player, amount } => {
            if let Some(pid) = resolve_player(game, controller, targets, *player) {
                game.gain_life(pid, *amount);
            }
        }
        Effect::LoseLife { player, amount } => {
            if let Some(pid) = resolve_player(game, controller, targets, *player) {
                game.lose_life(pid, *amount);
            }
        }
        Effect::PutCounters { target_index, kind, amount } => {
            if !legal.get(*target_index).copied().unwrap_or(false) {
                return;
            }
            if let Some(Target { chosen: TargetRef::Object(id), .. }) = targets.get(*target_index) {
                game.put_counters(*id, kind.clone(), *amount);
            }
        }
        Effect::TapPermanent { target_index } => {
            if !legal.get(*target_index).copied().unwrap_or(false) {
                return;
            }
            if let Some(Target { chosen: TargetRef::Object(id), .. }) = targets.get(*target_index) {
                if let Some(perm) = game.zones.get_mut(*id).and_then(|o| o.permanent_mut()) {
                    perm.tapped = true;
                }
            }
        }
    }
}
