//! Typed event bus (component B).
//!
//! Events carry only primitive fields and object-id references, never live
//! object references, so observers stay correct after further mutation (§6).
//! Emission is synchronous and strictly ordered: [`EventBus::publish`]
//! appends to an append-only log, and consumers (the trigger manager,
//! outside observers) read forward from a cursor rather than registering
//! callbacks — this sidesteps re-entrant-borrow issues that a callback-style
//! bus would hit when a trigger's own resolution publishes further events.

use serde::{Deserialize, Serialize};

use crate::ids::{ObjectId, PlayerId};
use crate::types::{CounterKind, Phase, Step, Zone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageTarget {
    Player(PlayerId),
    Object(ObjectId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    Life,
    Poison,
    DrewFromEmpty,
    Concede,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    TurnStart { player: PlayerId, turn_number: u32 },
    TurnEnd { player: PlayerId },
    PhaseStart { phase: Phase },
    StepStart { step: Step },
    DrawCard { player: PlayerId, object: ObjectId },
    LandPlayed { player: PlayerId, object: ObjectId },
    SpellCast { player: PlayerId, object: ObjectId },
    EntersBattlefield { object: ObjectId, controller: PlayerId },
    LeavesBattlefield { object: ObjectId, from: Zone },
    Dies { object: ObjectId },
    Attacks { attacker: ObjectId, defender: DamageTarget },
    Blocks { blocker: ObjectId, attacker: ObjectId },
    DealsDamage { source: ObjectId, target: DamageTarget, amount: u32, deathtouch: bool },
    DealsCombatDamage { source: ObjectId, target: DamageTarget, amount: u32 },
    LifeGained { player: PlayerId, amount: i32 },
    LifeLost { player: PlayerId, amount: i32 },
    CounterAdded { object: ObjectId, kind: CounterKind, amount: u32 },
    ZoneChange { object: ObjectId, from: Zone, to: Zone },
    BeginningOfUpkeep { player: PlayerId },
    BeginningOfEndStep { player: PlayerId },
    PlayerLost { player: PlayerId, reason: LossReason },
    PlayerWon { player: PlayerId },
    GameEnded,
    CeasesToExist { object: ObjectId, from: Zone },
}

/// Append-only, cursor-read event log.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    log: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { log: Vec::new() }
    }

    pub fn publish(&mut self, event: Event) {
        self.log.push(event);
    }

    pub fn cursor(&self) -> usize {
        self.log.len()
    }

    pub fn events_since(&self, cursor: usize) -> &[Event] {
        &self.log[cursor.min(self.log.len())..]
    }

    pub fn all(&self) -> &[Event] {
        &self.log
    }
}
