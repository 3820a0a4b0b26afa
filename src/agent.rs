//! Decision interface (component P) and a reference random implementation.
//!
//! The kernel never decides anything a rule leaves up to a player: which
//! legal action to take, which targets to choose among legal candidates,
//! which creatures attack, how to assign blockers, and in what order to
//! stack simultaneous triggers one player controls. All of that is asked of
//! an [`Agent`]; the kernel only ever offers already-legal choices.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::target::TargetRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorityAction {
    PassPriority,
    CastSpell { card: ObjectId },
    PlayLand { card: ObjectId },
    ActivateAbility { source: ObjectId, ability_index: usize },
}

pub trait Agent {
    fn choose_priority_action(&mut self, game: &GameState, player: PlayerId, legal: &[PriorityAction]) -> PriorityAction;

    /// Chooses `count` targets from `candidates`, all of which are already
    /// legal; the agent only breaks ties.
    fn choose_targets(&mut self, game: &GameState, player: PlayerId, candidates: &[TargetRef], count: usize) -> Vec<TargetRef>;

    fn choose_attackers(&mut self, game: &GameState, player: PlayerId, eligible: &[ObjectId]) -> Vec<ObjectId>;

    /// Returns (blocker, attacker) pairs; a blocker may appear more than
    /// once only if double-blocking was independently granted (the kernel
    /// doesn't enforce the one-block limit here, `combat::declare_blocker`
    /// does by rejecting an already-tapped or already-committed blocker).
    fn choose_blocks(
        &mut self,
        game: &GameState,
        player: PlayerId,
        attackers: &[ObjectId],
        eligible_blockers: &[ObjectId],
    ) -> Vec<(ObjectId, ObjectId)>;

    /// Orders `pending` (indices into the caller's own trigger batch) for
    /// this player's APNAP slot (§4.6).
    fn order_simultaneous_triggers(&mut self, game: &GameState, player: PlayerId, pending: &[u64]) -> Vec<usize>;

    /// CR 103.5: keep this opening hand of `hand_size` cards, or mulligan?
    fn wants_mulligan(&mut self, game: &GameState, player: PlayerId, hand_size: usize) -> bool;

    /// CR 509.2: `attacker`'s controller orders its blockers for damage
    /// assignment. The returned vector must be a permutation of `blockers`;
    /// the kernel falls back to `blockers`'s own (declaration) order if it
    /// isn't.
    fn order_blockers(&mut self, game: &GameState, player: PlayerId, attacker: ObjectId, blockers: &[ObjectId]) -> Vec<ObjectId>;

    /// CR 510.1c: assigns `attacker`'s combat damage (`power` total) among
    /// `blockers`, already in damage-assignment order. The returned amounts
    /// must align 1:1 with `blockers`; each blocker needs at least lethal
    /// before the next (or, with trample, the defending player) can receive
    /// any. An assignment that doesn't validate is discarded by the kernel
    /// in favor of its own lethal-first default.
    fn assign_combat_damage(&mut self, game: &GameState, player: PlayerId, attacker: ObjectId, blockers: &[ObjectId], power: u32) -> Vec<u32>;
}

/// Deterministic (seeded) reference agent used by the runners and by tests
/// that need an opponent but don't care how it plays.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Agent for RandomAgent {
    fn choose_priority_action(&mut self, _game: &GameState, _player: PlayerId, legal: &[PriorityAction]) -> PriorityAction {
        legal.choose(&mut self.rng).cloned().unwrap_or(PriorityAction::PassPriority)
    }

    fn choose_targets(&mut self, _game: &GameState, _player: PlayerId, candidates: &[TargetRef], count: usize) -> Vec<TargetRef> {
        let mut pool = candidates.to_vec();
        pool.shuffle(&mut self.rng);
        pool.into_iter().take(count).collect()
    }

    fn choose_attackers(&mut self, _game: &GameState, _player: PlayerId, eligible: &[ObjectId]) -> Vec<ObjectId> {
        eligible.iter().copied().filter(|_| self.rng.random_bool(0.5)).collect()
    }

    fn choose_blocks(
        &mut self,
        _game: &GameState,
        _player: PlayerId,
        attackers: &[ObjectId],
        eligible_blockers: &[ObjectId],
    ) -> Vec<(ObjectId, ObjectId)> {
        if attackers.is_empty() {
            return Vec::new();
        }
        let mut assignments = Vec::new();
        for &blocker in eligible_blockers.iter() {
            if !self.rng.random_bool(0.3) {
                continue;
            }
            if let Some(&attacker) = attackers.choose(&mut self.rng) {
                assignments.push((blocker, attacker));
            }
        }
        assignments
    }

    fn order_simultaneous_triggers(&mut self, _game: &GameState, _player: PlayerId, pending: &[u64]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..pending.len()).collect();
        order.shuffle(&mut self.rng);
        order
    }

    fn wants_mulligan(&mut self, _game: &GameState, _player: PlayerId, _hand_size: usize) -> bool {
        self.rng.random_bool(0.1)
    }

    fn order_blockers(&mut self, _game: &GameState, _player: PlayerId, _attacker: ObjectId, blockers: &[ObjectId]) -> Vec<ObjectId> {
        let mut order = blockers.to_vec();
        order.shuffle(&mut self.rng);
        order
    }

    fn assign_combat_damage(&mut self, game: &GameState, _player: PlayerId, attacker: ObjectId, blockers: &[ObjectId], power: u32) -> Vec<u32> {
        // A random agent has no preference beyond making a legal assignment,
        // so it assigns the same way the kernel's own default does.
        crate::combat::lethal_first_assignment(game, attacker, power, blockers)
    }
}
