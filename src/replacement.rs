//! Replacement and prevention effects (component J, CR 614/615 distilled).
//!
//! A replacement effect intercepts a pending event before it occurs. Self-
//! replacement effects apply first; "applies once per event" (CR 614.5) is
//! modeled by an exhausted-set scoped to one pipeline invocation rather than
//! a flag stored on the effect (§9), so the same effect can still fire again
//! on the *next* event.

use std::collections::HashSet;

use crate::event::DamageTarget;
use crate::ids::{ObjectId, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplacementEffectId(pub u64);

/// The small set of events a replacement effect can intercept. Prevention
/// effects are replacement effects restricted to `Damage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceableEventKind {
    Damage,
    Draw,
    LifeGain,
    LifeLoss,
    EntersBattlefield,
    Dies,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingEvent {
    Damage { source: ObjectId, target: DamageTarget, amount: u32, deathtouch: bool },
    Draw { player: PlayerId, count: u32 },
    LifeGain { player: PlayerId, amount: i32 },
    LifeLoss { player: PlayerId, amount: i32 },
}

impl PendingEvent {
    fn kind(&self) -> ReplaceableEventKind {
        match self {
            PendingEvent::Damage { .. } => ReplaceableEventKind::Damage,
            PendingEvent::Draw { .. } => ReplaceableEventKind::Draw,
            PendingEvent::LifeGain { .. } => ReplaceableEventKind::LifeGain,
            PendingEvent::LifeLoss { .. } => ReplaceableEventKind::LifeLoss,
        }
    }

    fn affected_object(&self) -> Option<ObjectId> {
        match self {
            PendingEvent::Damage { target: DamageTarget::Object(id), .. } => Some(*id),
            _ => None,
        }
    }

    fn affected_player(&self) -> Option<PlayerId> {
        match self {
            PendingEvent::Damage { target: DamageTarget::Player(p), .. } => Some(*p),
            PendingEvent::Draw { player, .. }
            | PendingEvent::LifeGain { player, .. }
            | PendingEvent::LifeLoss { player, .. } => Some(*player),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplacementAction {
    Prevent,
    ReduceDamage(u32),
    PreventLifeLossBelow(i32),
}

#[derive(Debug, Clone)]
pub struct ReplacementEffect {
    pub id: ReplacementEffectId,
    pub source: ObjectId,
    pub kind: ReplaceableEventKind,
    /// If set, only applies when the affected object is this id (a
    /// self-replacement or prevention shield tied to one permanent).
    pub applies_to_object: Option<ObjectId>,
    pub applies_to_player: Option<PlayerId>,
    pub action: ReplacementAction,
    pub self_replacement: bool,
    /// `Some(n)` for a shield with `n` uses remaining (CR 614.5/702.17).
    pub uses_remaining: Option<u32>,
}

#[derive(Debug, Default)]
pub struct ReplacementManager {
    effects: Vec<ReplacementEffect>,
    next_id: u64,
}

impl ReplacementManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&mut self, mut effect: ReplacementEffect) -> ReplacementEffectId {
        let id = ReplacementEffectId(self.next_id);
        self.next_id += 1;
        effect.id = id;
        self.effects.push(effect);
        id
    }

    pub fn remove(&mut self, id: ReplacementEffectId) {
        self.effects.retain(|e| e.id != id);
    }

    pub fn remove_from_source(&mut self, source: ObjectId) {
        self.effects.retain(|e| e.source != source);
    }

    fn applicable(&self, event: &PendingEvent) -> Vec<usize> {
        self.effects
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                if e.kind != event.kind() {
                    return false;
                }
                if let Some(obj) = e.applies_to_object {
                    if event.affected_object() != Some(obj) {
                        return false;
                    }
                }
                if let Some(pid) = e.applies_to_player {
                    if event.affected_player() != Some(pid) {
                        return false;
                    }
                }
                e.uses_remaining != Some(0)
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Runs `event` through the pipeline, applying self-replacement effects
    /// first (CR 616.1), then any other single applicable effect, consuming
    /// one use of a shield as it goes. Each effect applies at most once to
    /// this event (CR 614.5), tracked by a used-set scoped to this call, so
    /// an unlimited-use effect (`uses_remaining: None`) that doesn't change
    /// the event can't be picked again forever and a `ReduceDamage` shield
    /// can't be re-selected to keep shaving the same event down past zero.
    pub fn apply(&mut self, mut event: PendingEvent) -> Option<PendingEvent> {
        let mut used: HashSet<ReplacementEffectId> = HashSet::new();
        loop {
            let mut candidates: Vec<usize> =
                self.applicable(&event).into_iter().filter(|&i| !used.contains(&self.effects[i].id)).collect();
            if candidates.is_empty() {
                return Some(event);
            }
            candidates.sort_by_key(|&i| !self.effects[i].self_replacement);
            let idx = candidates[0];
            used.insert(self.effects[idx].id);
            let action = self.effects[idx].action;
            if let Some(uses) = self.effects[idx].uses_remaining.as_mut() {
                *uses = uses.saturating_sub(1);
            }
            match action {
                ReplacementAction::Prevent => return None,
                ReplacementAction::ReduceDamage(n) => {
                    if let PendingEvent::Damage { amount, .. } = &mut event {
                        *amount = amount.saturating_sub(n);
                        if *amount == 0 {
                            return None;
                        }
                    }
                }
                ReplacementAction::PreventLifeLossBelow(floor) => {
                    if let PendingEvent::LifeLoss { amount, .. } = &mut event {
                        if (*amount as i32) < floor {
                            return None;
                        }
                    }
                }
            }
            if self.effects[idx].uses_remaining == Some(0) {
                self.effects.remove(idx);
            }
        }
    }
}
