//! Triggered-ability engine (component I, §4.6).
//!
//! Registered abilities are data: an event-kind + source-binding predicate,
//! an effect, and optional intervening-if / state-trigger flags. Intervening
//! conditions are kept as plain `fn` pointers rather than closures so a
//! `RegisteredTrigger` stays a plain, cloneable data record in the spirit of
//! "abilities are data interpreted by a small executor" (§9) — a trigger
//! with a genuinely stateful condition would be represented as a state
//! trigger instead (see `is_state` below), not a closure capturing mutable
//! state.

use crate::effect::Effect;
use crate::event::Event;
use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::target::Target;
use crate::types::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    TurnStart,
    TurnEnd,
    StepStart,
    DrawCard,
    LandPlayed,
    SpellCast,
    EntersBattlefield,
    LeavesBattlefield,
    Dies,
    Attacks,
    Blocks,
    DealsDamage,
    DealsCombatDamage,
    LifeGained,
    LifeLost,
    CounterAdded,
    ZoneChange,
    BeginningOfUpkeep,
    BeginningOfEndStep,
    PlayerLost,
    PlayerWon,
    CeasesToExist,
}

pub fn event_kind(event: &Event) -> EventKind {
    match event {
        Event::TurnStart { .. } => EventKind::TurnStart,
        Event::TurnEnd { .. } => EventKind::TurnEnd,
        Event::PhaseStart { .. } => EventKind::StepStart,
        Event::StepStart { .. } => EventKind::StepStart,
        Event::DrawCard { .. } => EventKind::DrawCard,
        Event::LandPlayed { .. } => EventKind::LandPlayed,
        Event::SpellCast { .. } => EventKind::SpellCast,
        Event::EntersBattlefield { .. } => EventKind::EntersBattlefield,
        Event::LeavesBattlefield { .. } => EventKind::LeavesBattlefield,
        Event::Dies { .. } => EventKind::Dies,
        Event::Attacks { .. } => EventKind::Attacks,
        Event::Blocks { .. } => EventKind::Blocks,
        Event::DealsDamage { .. } => EventKind::DealsDamage,
        Event::DealsCombatDamage { .. } => EventKind::DealsCombatDamage,
        Event::LifeGained { .. } => EventKind::LifeGained,
        Event::LifeLost { .. } => EventKind::LifeLost,
        Event::CounterAdded { .. } => EventKind::CounterAdded,
        Event::ZoneChange { .. } => EventKind::ZoneChange,
        Event::BeginningOfUpkeep { .. } => EventKind::BeginningOfUpkeep,
        Event::BeginningOfEndStep { .. } => EventKind::BeginningOfEndStep,
        Event::PlayerLost { .. } => EventKind::PlayerLost,
        Event::PlayerWon { .. } => EventKind::PlayerWon,
        Event::GameEnded => EventKind::PlayerWon,
        Event::CeasesToExist { .. } => EventKind::CeasesToExist,
    }
}

fn event_source(event: &Event) -> Option<ObjectId> {
    match event {
        Event::DrawCard { object, .. }
        | Event::LandPlayed { object, .. }
        | Event::SpellCast { object, .. }
        | Event::EntersBattlefield { object, .. }
        | Event::LeavesBattlefield { object, .. }
        | Event::Dies { object }
        | Event::CounterAdded { object, .. } => Some(*object),
        Event::Attacks { attacker, .. } => Some(*attacker),
        Event::Blocks { blocker, .. } => Some(*blocker),
        Event::DealsDamage { source, .. } | Event::DealsCombatDamage { source, .. } => Some(*source),
        Event::ZoneChange { object, .. } => Some(*object),
        _ => None,
    }
}

/// Which sources a registered ability cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceBinding {
    /// "Whenever a creature..." — any source matches.
    Any,
    /// "Whenever this creature..." — only this ability's own source.
    Itself,
    /// "Whenever a creature you control..." — source controlled by the
    /// ability's controller at the time of the event.
    YouControl,
}

#[derive(Clone)]
pub struct RegisteredTrigger {
    pub id: u64,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub event_kind: EventKind,
    pub binding: SourceBinding,
    pub effect: Effect,
    pub description: String,
    pub one_shot: bool,
    pub intervening_if: Option<fn(&GameState) -> bool>,
    pub is_state_trigger: bool,
    pub delayed_expiry: Option<Step>,
}

impl std::fmt::Debug for RegisteredTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTrigger")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("event_kind", &self.event_kind)
            .field("description", &self.description)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PendingTrigger {
    pub ability_id: u64,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub effect: Effect,
    pub description: String,
}

#[derive(Debug, Default)]
pub struct TriggerManager {
    registered: Vec<RegisteredTrigger>,
    pending: Vec<PendingTrigger>,
    next_id: u64,
    /// Last-seen truth value of each state trigger, keyed by id, so a
    /// state trigger only fires on a false->true transition (§4.6).
    state_trigger_last_seen: std::collections::HashMap<u64, bool>,
}

impl TriggerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, mut trigger: RegisteredTrigger) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        trigger.id = id;
        self.registered.push(trigger);
        id
    }

    pub fn unregister(&mut self, id: u64) {
        self.registered.retain(|t| t.id != id);
        self.state_trigger_last_seen.remove(&id);
    }

    pub fn unregister_from_source(&mut self, source: ObjectId) {
        self.registered.retain(|t| t.source != source);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Scans `events` against every registered, non-state trigger and
    /// enqueues matches (§4.6 step 1). Called after every event batch.
    pub fn collect_event_triggers(&mut self, events: &[Event]) {
        let mut fired_one_shots = Vec::new();
        for event in events {
            let kind = event_kind(event);
            let source = event_source(event);
            for trigger in &self.registered {
                if trigger.is_state_trigger || trigger.event_kind != kind {
                    continue;
                }
                let matches_binding = match trigger.binding {
                    SourceBinding::Any => true,
                    SourceBinding::Itself => source == Some(trigger.source),
                    SourceBinding::YouControl => source.is_some(),
                };
                if !matches_binding {
                    continue;
                }
                self.pending.push(PendingTrigger {
                    ability_id: trigger.id,
                    source: trigger.source,
                    controller: trigger.controller,
                    effect: trigger.effect.clone(),
                    description: trigger.description.clone(),
                });
                if trigger.one_shot {
                    fired_one_shots.push(trigger.id);
                }
            }
        }
        for id in fired_one_shots {
            self.unregister(id);
        }
    }

    /// Evaluates every registered state trigger's predicate against
    /// `game`, firing on false->true transitions only (§4.6).
    pub fn poll_state_triggers(&mut self, game: &GameState) {
        let snapshot: Vec<(u64, ObjectId, PlayerId, Effect, String, Option<fn(&GameState) -> bool>)> = self
            .registered
            .iter()
            .filter(|t| t.is_state_trigger)
            .map(|t| (t.id, t.source, t.controller, t.effect.clone(), t.description.clone(), t.intervening_if))
            .collect();
        for (id, source, controller, effect, description, pred) in snapshot {
            let now = pred.map(|f| f(game)).unwrap_or(false);
            let was = self.state_trigger_last_seen.get(&id).copied().unwrap_or(false);
            if now && !was {
                self.pending.push(PendingTrigger { ability_id: id, source, controller, effect, description });
            }
            self.state_trigger_last_seen.insert(id, now);
        }
    }

    /// Removes delayed triggers whose expiry step has arrived (§4.6).
    pub fn expire_delayed(&mut self, current_step: Step) {
        self.registered.retain(|t| t.delayed_expiry != Some(current_step));
    }

    /// Partitions pending triggers by controller in APNAP order, checks
    /// intervening-if, and returns them ready to push (§4.6 step 2). Stack
    /// placement order within one controller's batch is the order the
    /// caller passes `order_within_controller`; callers that have no agent
    /// ordering opinion can pass the identity order.
    pub fn drain_to_stack(
        &mut self,
        game: &GameState,
        apnap_order: &[PlayerId],
        mut order_within_controller: impl FnMut(&[PendingTrigger]) -> Vec<usize>,
    ) -> Vec<PendingTrigger> {
        let pending = std::mem::take(&mut self.pending);
        let intervening: std::collections::HashMap<u64, Option<fn(&GameState) -> bool>> = self
            .registered
            .iter()
            .map(|t| (t.id, t.intervening_if))
            .collect();

        let mut result = Vec::new();
        for player in apnap_order {
            let mut batch: Vec<PendingTrigger> =
                pending.iter().filter(|p| p.controller == *player).cloned().collect();
            batch.retain(|p| match intervening.get(&p.ability_id).copied().flatten() {
                Some(pred) => pred(game),
                None => true,
            });
            let order = order_within_controller(&batch);
            for idx in order {
                if let Some(t) = batch.get(idx) {
                    result.push(t.clone());
                }
            }
        }
        result
    }
}

/// Builds the stacked-ability description for a freshly-drained trigger.
pub fn as_stacked_ability(trigger: &PendingTrigger, targets: Vec<Target>) -> crate::object::StackedAbility {
    crate::object::StackedAbility {
        source: trigger.source,
        targets,
        description: trigger.description.clone(),
        effect: trigger.effect.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_trigger_fires_once_then_unregisters() {
        let mut mgr = TriggerManager::new();
        mgr.register(RegisteredTrigger {
            id: 0,
            source: ObjectId(1),
            controller: PlayerId(0),
            event_kind: EventKind::Dies,
            binding: SourceBinding::Itself,
            effect: Effect::NoEffect,
            description: "dies".into(),
            one_shot: true,
            intervening_if: None,
            is_state_trigger: false,
            delayed_expiry: None,
        });
        mgr.collect_event_triggers(&[Event::Dies { object: ObjectId(1) }]);
        assert!(mgr.has_pending());
        mgr.collect_event_triggers(&[Event::Dies { object: ObjectId(1) }]);
        // second Dies event should not add a second pending trigger since
        // the one-shot unregistered itself.
        assert_eq!(mgr.pending.len(), 1);
    }

    #[test]
    fn apnap_order_places_active_players_triggers_first() {
        let mut mgr = TriggerManager::new();
        mgr.register(RegisteredTrigger {
            id: 0,
            source: ObjectId(1),
            controller: PlayerId(1),
            event_kind: EventKind::DrawCard,
            binding: SourceBinding::Any,
            effect: Effect::NoEffect,
            description: "nap".into(),
            one_shot: false,
            intervening_if: None,
            is_state_trigger: false,
            delayed_expiry: None,
        });
        mgr.register(RegisteredTrigger {
            id: 0,
            source: ObjectId(2),
            controller: PlayerId(0),
            event_kind: EventKind::DrawCard,
            binding: SourceBinding::Any,
            effect: Effect::NoEffect,
            description: "ap".into(),
            one_shot: false,
            intervening_if: None,
            is_state_trigger: false,
            delayed_expiry: None,
        });
        mgr.collect_event_triggers(&[Event::DrawCard { player: PlayerId(0), object: ObjectId(9) }]);
        use crate::game_state::GameState;
        let game = GameState::new_empty();
        let drained = mgr.drain_to_stack(&game, &[PlayerId(0), PlayerId(1)], |batch| (0..batch.len()).collect());
        assert_eq!(drained[0].description, "ap");
        assert_eq!(drained[1].description, "nap");
    }
}
