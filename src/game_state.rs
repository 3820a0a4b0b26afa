//! The central game container (§3 Game/GameState): owns every subsystem and
//! exposes the small set of state-mutating primitives that spells, abilities,
//! and turn-based actions all funnel through, so every life/damage/draw
//! change goes through the same replacement-effect and event-publication
//! path regardless of who triggered it (§9).

use crate::card_db::{CardDatabase, HeuristicCardDatabase};
use crate::config::GameConfig;
use crate::event::{DamageTarget, Event, EventBus};
use crate::ids::{IdAllocator, ObjectId, PlayerId};
use crate::layers::LayerEngine;
use crate::player::Player;
use crate::priority::PrioritySystem;
use crate::replacement::{PendingEvent, ReplacementManager};
use crate::target::TargetRef;
use crate::triggers::TriggerManager;
use crate::types::{CounterKind, Keyword, Phase, Step, Zone};
use crate::zone::ZoneManager;

pub struct GameState {
    pub ids: IdAllocator,
    pub players: Vec<Player>,
    pub zones: ZoneManager,
    pub layers: LayerEngine,
    pub events: EventBus,
    pub replacements: ReplacementManager,
    pub triggers: TriggerManager,
    pub priority: PrioritySystem,
    pub card_db: Box<dyn CardDatabase>,
    pub config: GameConfig,
    pub turn_number: u32,
    pub active_player: PlayerId,
    pub phase: Phase,
    pub step: Option<Step>,
    pub lands_played_this_turn: u32,
}

impl GameState {
    pub fn new(players: Vec<Player>, config: GameConfig, card_db: Box<dyn CardDatabase>) -> Self {
        let turn_order: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
        let active_player = turn_order.first().copied().unwrap_or(PlayerId(0));
        Self {
            ids: IdAllocator::new(),
            zones: ZoneManager::new(),
            layers: LayerEngine::new(),
            events: EventBus::new(),
            replacements: ReplacementManager::new(),
            triggers: TriggerManager::new(),
            priority: PrioritySystem::new(turn_order),
            players,
            card_db,
            config,
            turn_number: 1,
            active_player,
            phase: Phase::Beginning,
            step: Some(Step::Untap),
            lands_played_this_turn: 0,
        }
    }

    /// A minimal, playerless instance for unit tests that only need a
    /// `GameState` to exist, not a populated game.
    pub fn new_empty() -> Self {
        Self::new(Vec::new(), GameConfig::default(), Box::new(HeuristicCardDatabase))
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Publishes an event to the log and immediately offers it to the
    /// trigger manager (§4.6: triggers watch the event stream).
    fn publish(&mut self, event: Event) {
        self.events.publish(event.clone());
        self.triggers.collect_event_triggers(std::slice::from_ref(&event));
    }

    fn counters_tuple(&self, id: ObjectId) -> (u32, u32) {
        self.zones
            .get(id)
            .and_then(|o| o.permanent())
            .map(|p| {
                let plus = p.counters.get(&CounterKind::PlusOnePlusOne).copied().unwrap_or(0);
                let minus = p.counters.get(&CounterKind::MinusOneMinusOne).copied().unwrap_or(0);
                (plus, minus)
            })
            .unwrap_or((0, 0))
    }

    /// Refolds layer 7c's counter math plus every registered continuous
    /// effect into `id`'s current characteristics (§4.1).
    pub fn recompute_characteristics(&mut self, id: ObjectId) {
        let counters = self.counters_tuple(id);
        let chars = match self.zones.get(id) {
            Some(obj) => self.layers.compute_characteristics(obj, counters),
            None => return,
        };
        if let Some(obj) = self.zones.get_mut(id) {
            obj.current_characteristics = chars;
        }
    }

    pub fn effective_power_toughness(&self, id: ObjectId) -> Option<(i32, i32)> {
        let obj = self.zones.get(id)?;
        let counters = self.counters_tuple(id);
        Some(self.layers.effective_power_toughness(obj, counters))
    }

    fn target_to_damage_target(target: TargetRef) -> DamageTarget {
        match target {
            TargetRef::Object(id) => DamageTarget::Object(id),
            TargetRef::Player(p) => DamageTarget::Player(p),
        }
    }

    /// Deals damage to a player or object, running it through the
    /// replacement pipeline first (§4.7, CR 120/614).
    pub fn deal_damage(&mut self, source: ObjectId, target: TargetRef, amount: u32, deathtouch: bool) {
        if amount == 0 {
            return;
        }
        let dmg_target = Self::target_to_damage_target(target);
        let pending = PendingEvent::Damage { source, target: dmg_target, amount, deathtouch };
        let Some(PendingEvent::Damage { amount, target: dmg_target, deathtouch, .. }) = self.replacements.apply(pending)
        else {
            return;
        };
        if amount == 0 {
            return;
        }
        match dmg_target {
            DamageTarget::Player(pid) => {
                if let Some(player) = self.player_mut(pid) {
                    player.life -= amount as i32;
                }
                self.publish(Event::DealsDamage { source, target: dmg_target, amount, deathtouch });
                self.publish(Event::LifeLost { player: pid, amount: amount as i32 });
            }
            DamageTarget::Object(id) => {
                if let Some(obj) = self.zones.get_mut(id) {
                    if let Some(perm) = obj.permanent_mut() {
                        perm.damage_marked += amount;
                        if deathtouch {
                            perm.dealt_damage_by_deathtouch = true;
                        }
                    }
                }
                self.publish(Event::DealsDamage { source, target: dmg_target, amount, deathtouch });
            }
        }
        self.apply_lifelink(source, amount);
    }

    fn apply_lifelink(&mut self, source: ObjectId, amount: u32) {
        let has_lifelink = self
            .zones
            .get(source)
            .map(|o| o.current_characteristics.has_keyword(Keyword::Lifelink))
            .unwrap_or(false);
        if !has_lifelink {
            return;
        }
        if let Some(controller) = self.zones.get(source).map(|o| o.controller()) {
            self.gain_life(controller, amount as i32);
        }
    }

    /// Destroys a permanent, honoring indestructible and regeneration
    /// shields (CR 701.6, 701.18). Does nothing if `id` isn't a permanent.
    pub fn destroy(&mut self, id: ObjectId) {
        let Some(obj) = self.zones.get(id) else { return };
        if !obj.is_permanent() {
            return;
        }
        if obj.current_characteristics.has_keyword(Keyword::Indestructible) {
            return;
        }
        let has_shield = obj.permanent().map(|p| p.regeneration_shields > 0).unwrap_or(false);
        if has_shield {
            if let Some(obj) = self.zones.get_mut(id) {
                if let Some(perm) = obj.permanent_mut() {
                    perm.regeneration_shields -= 1;
                    perm.tapped = true;
                    perm.damage_marked = 0;
                    perm.combat = Default::default();
                }
            }
            return;
        }
        self.zones.move_object(id, Zone::Graveyard, &mut self.events);
        self.layers.remove_effects_from_source(id);
        self.triggers.unregister_from_source(id);
        self.publish(Event::Dies { object: id });
    }

    /// Draws one card, or marks the player as having drawn from an empty
    /// library (the SBA loop checks this flag, §4.8 I9).
    pub fn draw_card(&mut self, pid: PlayerId) {
        match self.zones.library_top(pid) {
            Some(id) => {
                self.zones.move_object(id, Zone::Hand, &mut self.events);
                self.publish(Event::DrawCard { player: pid, object: id });
            }
            None => {
                if let Some(player) = self.player_mut(pid) {
                    player.drew_from_empty_library = true;
                }
            }
        }
    }

    pub fn gain_life(&mut self, pid: PlayerId, amount: i32) {
        if amount <= 0 {
            return;
        }
        let pending = PendingEvent::LifeGain { player: pid, amount };
        let Some(PendingEvent::LifeGain { amount, .. }) = self.replacements.apply(pending) else {
            return;
        };
        if let Some(player) = self.player_mut(pid) {
            player.life += amount;
        }
        self.publish(Event::LifeGained { player: pid, amount });
    }

    pub fn lose_life(&mut self, pid: PlayerId, amount: i32) {
        if amount <= 0 {
            return;
        }
        let pending = PendingEvent::LifeLoss { player: pid, amount };
        let Some(PendingEvent::LifeLoss { amount, .. }) = self.replacements.apply(pending) else {
            return;
        };
        if let Some(player) = self.player_mut(pid) {
            player.life -= amount;
        }
        self.publish(Event::LifeLost { player: pid, amount });
    }

    pub fn put_counters(&mut self, id: ObjectId, kind: CounterKind, amount: u32) {
        if amount == 0 {
            return;
        }
        if let Some(obj) = self.zones.get_mut(id) {
            if let Some(perm) = obj.permanent_mut() {
                *perm.counters.entry(kind.clone()).or_insert(0) += amount;
            }
        }
        self.recompute_characteristics(id);
        self.publish(Event::CounterAdded { object: id, kind, amount });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Timestamp;
    use crate::mana::ManaCost;
    use crate::object::{Characteristics, GameObject, ObjectKind, Permanent};
    use crate::types::{CardType, ColorSet};

    fn creature(game: &mut GameState, owner: PlayerId, power: i32, toughness: i32) -> ObjectId {
        let id = game.ids.next_object_id();
        let chars = Characteristics {
            name: "Test Creature".into(),
            mana_cost: ManaCost::new(),
            colors: ColorSet::new(),
            card_types: vec![CardType::Creature],
            subtypes: vec![],
            supertypes: vec![],
            power: Some(crate::object::PtValue::Fixed(power)),
            toughness: Some(crate::object::PtValue::Fixed(toughness)),
            rules_text: String::new(),
            keywords: vec![],
            ability_ids: vec![],
        };
        let obj = GameObject {
            object_id: id,
            owner_id: owner,
            controller_id: None,
            timestamp: game.ids.next_timestamp(),
            card_id: None,
            base_characteristics: chars.clone(),
            current_characteristics: chars,
            kind: ObjectKind::Permanent(Permanent::default()),
        };
        game.zones.insert_new(obj, Zone::Battlefield);
        id
    }

    fn two_player_game() -> GameState {
        let players = vec![Player::new(PlayerId(0), "Alice", 20), Player::new(PlayerId(1), "Bob", 20)];
        GameState::new(players, GameConfig::default(), Box::new(HeuristicCardDatabase))
    }

    #[test]
    fn deal_damage_to_player_reduces_life_and_publishes_events() {
        let mut game = two_player_game();
        let source = creature(&mut game, PlayerId(0), 3, 3);
        game.deal_damage(source, TargetRef::Player(PlayerId(1)), 3, false);
        assert_eq!(game.player(PlayerId(1)).unwrap().life, 17);
        assert!(game.events.all().iter().any(|e| matches!(e, Event::DealsDamage { .. })));
    }

    #[test]
    fn lifelink_creature_gains_controller_life_on_damage() {
        let mut game = two_player_game();
        let source = creature(&mut game, PlayerId(0), 2, 2);
        if let Some(obj) = game.zones.get_mut(source) {
            obj.current_characteristics.keywords.push(Keyword::Lifelink);
        }
        game.deal_damage(source, TargetRef::Player(PlayerId(1)), 2, false);
        assert_eq!(game.player(PlayerId(0)).unwrap().life, 22);
    }

    #[test]
    fn indestructible_creature_survives_destroy() {
        let mut game = two_player_game();
        let id = creature(&mut game, PlayerId(0), 2, 2);
        if let Some(obj) = game.zones.get_mut(id) {
            obj.current_characteristics.keywords.push(Keyword::Indestructible);
        }
        game.destroy(id);
        assert_eq!(game.zones.zone_of(id), Some(Zone::Battlefield));
    }

    #[test]
    fn regeneration_shield_intercepts_destroy_and_is_consumed() {
        let mut game = two_player_game();
        let id = creature(&mut game, PlayerId(0), 2, 2);
        if let Some(obj) = game.zones.get_mut(id) {
            if let Some(perm) = obj.permanent_mut() {
                perm.regeneration_shields = 1;
            }
        }
        game.destroy(id);
        assert_eq!(game.zones.zone_of(id), Some(Zone::Battlefield));
        assert!(game.zones.get(id).unwrap().permanent().unwrap().tapped);
        game.destroy(id);
        assert_eq!(game.zones.zone_of(id), Some(Zone::Graveyard));
    }

    #[test]
    fn drawing_from_an_empty_library_sets_the_flag_instead_of_crashing() {
        let mut game = two_player_game();
        game.draw_card(PlayerId(0));
        assert!(game.player(PlayerId(0)).unwrap().drew_from_empty_library);
    }

    #[test]
    fn put_counters_recomputes_effective_power_toughness() {
        let mut game = two_player_game();
        let id = creature(&mut game, PlayerId(0), 2, 2);
        game.put_counters(id, CounterKind::PlusOnePlusOne, 2);
        assert_eq!(game.effective_power_toughness(id), Some((4, 4)));
    }
}
